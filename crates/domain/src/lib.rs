//! Domain layer for the workshop budget subsystem.
//!
//! This crate provides:
//! - The `Budget` aggregate and its status state machine
//! - The `BudgetError` taxonomy and the `DomainErrorKind` marker
//! - Factories for the budget lifecycle events
//! - `BudgetService`, the use-cases that mutate, persist and publish

pub mod budget;
pub mod error;

pub use budget::{
    Budget, BudgetError, BudgetItem, BudgetRepository, BudgetService, BudgetSnapshot,
    BudgetStatus, CreateBudget, DeliveryMethod, InMemoryBudgetRepository, Money, ParseMoneyError,
    events,
};
pub use error::{DomainError, DomainErrorKind, Result};
