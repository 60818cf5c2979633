//! Domain error types.

use common::BudgetId;
use thiserror::Error;

use crate::budget::BudgetError;

/// Common interface of domain rule violations.
///
/// Lets callers treat every domain error kind uniformly (for example to map
/// it to a stable code) without knowing the concrete enum.
pub trait DomainErrorKind: std::error::Error + Send + Sync {
    /// Returns a stable, machine-readable code for the error kind.
    fn code(&self) -> &'static str;
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A budget rule was violated.
    #[error("Budget error: {0}")]
    Budget(#[from] BudgetError),

    /// Budget not found.
    #[error("Budget not found: {0}")]
    BudgetNotFound(BudgetId),

    /// The repository failed.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl DomainError {
    /// Returns the domain rule behind this error, if it is one.
    pub fn as_domain_kind(&self) -> Option<&dyn DomainErrorKind> {
        match self {
            DomainError::Budget(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience type alias for domain results.
pub type Result<T> = std::result::Result<T, DomainError>;
