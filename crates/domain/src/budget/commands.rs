//! Budget creation command.

use common::{BudgetId, ClientId, ServiceOrderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BudgetStatus, DeliveryMethod, Money};

/// Command to create a new budget for a service order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBudget {
    /// The ID to assign to the budget.
    pub budget_id: BudgetId,

    /// The service order the budget prices.
    pub service_order_id: ServiceOrderId,

    /// The client the budget is addressed to.
    pub client_id: ClientId,

    /// Days after generation during which the budget can be decided.
    pub validity_period: u32,

    /// How the budget will reach the client.
    pub delivery_method: Option<DeliveryMethod>,

    /// Free-form notes.
    pub notes: Option<String>,

    /// Initial status.
    pub status: BudgetStatus,

    /// Declared total; zero when omitted.
    pub total_amount: Option<Money>,
}

impl CreateBudget {
    /// Creates a command with a freshly generated budget ID and defaults.
    pub fn new(
        service_order_id: impl Into<ServiceOrderId>,
        client_id: impl Into<ClientId>,
        validity_period: u32,
    ) -> Self {
        Self {
            budget_id: BudgetId::new(Uuid::new_v4().to_string()),
            service_order_id: service_order_id.into(),
            client_id: client_id.into(),
            validity_period,
            delivery_method: None,
            notes: None,
            status: BudgetStatus::Generated,
            total_amount: None,
        }
    }

    /// Uses the given ID instead of a generated one.
    pub fn with_id(mut self, budget_id: impl Into<BudgetId>) -> Self {
        self.budget_id = budget_id.into();
        self
    }

    pub fn with_delivery_method(mut self, method: DeliveryMethod) -> Self {
        self.delivery_method = Some(method);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_status(mut self, status: BudgetStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_total_amount(mut self, total: Money) -> Self {
        self.total_amount = Some(total);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let a = CreateBudget::new("so-1", "c1", 7);
        let b = CreateBudget::new("so-1", "c1", 7);
        assert_ne!(a.budget_id, b.budget_id);
        assert_eq!(a.status, BudgetStatus::Generated);
        assert!(a.total_amount.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let cmd = CreateBudget::new("so-1", "c1", 10)
            .with_id("b-1")
            .with_delivery_method(DeliveryMethod::Email)
            .with_notes("call before noon")
            .with_total_amount(Money::from_cents(500));

        assert_eq!(cmd.budget_id.as_str(), "b-1");
        assert_eq!(cmd.delivery_method, Some(DeliveryMethod::Email));
        assert_eq!(cmd.notes.as_deref(), Some("call before noon"));
        assert_eq!(cmd.total_amount, Some(Money::from_cents(500)));
    }
}
