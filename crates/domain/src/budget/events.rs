//! Budget lifecycle events.
//!
//! The aggregate does not publish anything itself; the application service
//! builds one of these after a successful transition and hands it to the bus.

use event_bus::{DomainEvent, EventType};

use super::Budget;

/// Payload keys used by budget events.
pub mod keys {
    pub const CLIENT_ID: &str = "clientId";
    pub const BUDGET_TOTAL: &str = "budgetTotal";
    pub const VALIDITY_PERIOD: &str = "validityPeriod";
    pub const REASON: &str = "reason";
}

/// Builds the event emitted after a budget was sent.
pub fn budget_sent(budget: &Budget) -> DomainEvent {
    DomainEvent::builder(budget.id().as_str(), EventType::BudgetSent)
        .field(keys::CLIENT_ID, budget.client_id().as_str())
        .field(keys::BUDGET_TOTAL, budget.total_amount().to_decimal_string())
        .field(keys::VALIDITY_PERIOD, budget.validity_period())
        .build()
}

/// Builds the event emitted after a budget was approved.
pub fn budget_approved(budget: &Budget) -> DomainEvent {
    DomainEvent::builder(budget.id().as_str(), EventType::BudgetApproved)
        .field(keys::CLIENT_ID, budget.client_id().as_str())
        .field(keys::BUDGET_TOTAL, budget.total_amount().to_decimal_string())
        .build()
}

/// Builds the event emitted after a budget was rejected.
pub fn budget_rejected(budget: &Budget, reason: impl Into<String>) -> DomainEvent {
    DomainEvent::builder(budget.id().as_str(), EventType::BudgetRejected)
        .field(keys::CLIENT_ID, budget.client_id().as_str())
        .field(keys::BUDGET_TOTAL, budget.total_amount().to_decimal_string())
        .field(keys::REASON, reason.into())
        .build()
}
