//! Budget aggregate and related types.

mod aggregate;
mod commands;
pub mod events;
mod repository;
mod service;
mod state;
mod value_objects;

pub use aggregate::{Budget, BudgetSnapshot};
pub use commands::CreateBudget;
pub use repository::{BudgetRepository, InMemoryBudgetRepository};
pub use service::BudgetService;
pub use state::BudgetStatus;
pub use value_objects::{BudgetItem, DeliveryMethod, Money, ParseMoneyError};

use chrono::{DateTime, Utc};
use common::BudgetId;
use thiserror::Error;

use crate::error::DomainErrorKind;

/// Errors raised by guarded budget operations.
///
/// Each kind carries the offending budget id plus the context needed to
/// explain the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// The budget was already approved.
    #[error("Budget {budget_id} is already approved")]
    AlreadyApproved { budget_id: BudgetId },

    /// The budget was already rejected.
    #[error("Budget {budget_id} is already rejected")]
    AlreadyRejected { budget_id: BudgetId },

    /// The budget's validity period has elapsed.
    #[error("Budget {budget_id} expired at {expiration_date}")]
    Expired {
        budget_id: BudgetId,
        expiration_date: DateTime<Utc>,
    },

    /// The requested transition is not allowed from the current status.
    #[error("Budget {budget_id}: invalid status transition from {current} to {target}")]
    InvalidStatusTransition {
        budget_id: BudgetId,
        current: BudgetStatus,
        target: BudgetStatus,
    },

    /// The declared total does not match the sum of the budget items.
    #[error(
        "Budget {budget_id}: declared total {declared} does not match calculated total {calculated}"
    )]
    TotalMismatch {
        budget_id: BudgetId,
        declared: Money,
        calculated: Money,
    },

    /// The sum of the budget items does not fit in a money amount.
    #[error("Budget {budget_id}: item total exceeds the representable amount")]
    TotalOverflow { budget_id: BudgetId },
}

impl BudgetError {
    /// Returns the id of the budget the error concerns.
    pub fn budget_id(&self) -> &BudgetId {
        match self {
            BudgetError::AlreadyApproved { budget_id }
            | BudgetError::AlreadyRejected { budget_id }
            | BudgetError::Expired { budget_id, .. }
            | BudgetError::InvalidStatusTransition { budget_id, .. }
            | BudgetError::TotalMismatch { budget_id, .. }
            | BudgetError::TotalOverflow { budget_id } => budget_id,
        }
    }
}

impl DomainErrorKind for BudgetError {
    fn code(&self) -> &'static str {
        match self {
            BudgetError::AlreadyApproved { .. } => "BUDGET_ALREADY_APPROVED",
            BudgetError::AlreadyRejected { .. } => "BUDGET_ALREADY_REJECTED",
            BudgetError::Expired { .. } => "BUDGET_EXPIRED",
            BudgetError::InvalidStatusTransition { .. } => "BUDGET_INVALID_STATUS_TRANSITION",
            BudgetError::TotalMismatch { .. } => "BUDGET_TOTAL_MISMATCH",
            BudgetError::TotalOverflow { .. } => "BUDGET_TOTAL_OVERFLOW",
        }
    }
}
