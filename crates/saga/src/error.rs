//! Saga error types.

use common::{BudgetId, ClientId};
use domain::DomainError;
use thiserror::Error;

/// Errors raised by the collaborators a budget event handler calls.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The budget referenced by an event does not exist.
    #[error("Budget not found: {0}")]
    BudgetNotFound(BudgetId),

    /// The client referenced by an event does not exist.
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// Client lookup failed for a reason other than absence.
    #[error("Client lookup error: {0}")]
    ClientLookup(String),

    /// Service order status update failed.
    #[error("Service order error: {0}")]
    ServiceOrder(String),

    /// Notification dispatch failed.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl SagaError {
    /// Returns true for the "referenced entity does not exist" kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SagaError::BudgetNotFound(_) | SagaError::ClientNotFound(_)
        )
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
