//! Budget event handler.
//!
//! Reacts to budget lifecycle events in three strictly sequential steps:
//!
//! ```text
//! ResolveBudget ──► UpdateServiceOrder ──► ResolveClient ──► SendNotification
//!       │                                        │
//!       └─ not found: warn, stop                 └─ not found: warn, stop
//! ```
//!
//! Any other failure ends the invocation with an error log. Nothing is
//! rolled back: a service order updated before a failed client lookup stays
//! updated.

use std::sync::Arc;

use async_trait::async_trait;
use common::{BudgetId, ClientId};
use domain::Budget;
use domain::events::keys;
use event_bus::{DomainEvent, EventBus, EventHandler, EventType, HandlerError};

use crate::error::{Result, SagaError};
use crate::services::{
    BudgetLookup, ClientLookup, NotificationService, ServiceOrderStatus, ServiceOrderStatusUpdater,
};

/// Name the handler registers under.
pub const HANDLER_EVENT_TYPE: &str = "BudgetEvents";

/// Actor recorded on service order updates made by the handler.
pub const SYSTEM_ACTOR: &str = "system";

/// The budget transitions the handler reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BudgetTransition {
    Sent,
    Approved,
    Rejected,
}

impl BudgetTransition {
    fn from_event_type(event_type: &EventType) -> Option<Self> {
        match event_type {
            EventType::BudgetSent => Some(BudgetTransition::Sent),
            EventType::BudgetApproved => Some(BudgetTransition::Approved),
            EventType::BudgetRejected => Some(BudgetTransition::Rejected),
            EventType::Unrecognized(_) => None,
        }
    }

    fn service_order_status(self) -> ServiceOrderStatus {
        match self {
            BudgetTransition::Sent => ServiceOrderStatus::AwaitingApproval,
            BudgetTransition::Approved => ServiceOrderStatus::InExecution,
            BudgetTransition::Rejected => ServiceOrderStatus::Cancelled,
        }
    }
}

/// How a single event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Every step ran and the client was notified.
    Notified,

    /// The budget no longer exists; nothing was done.
    BudgetNotFound,

    /// The service order was updated but the client could not be found.
    ClientNotFound,

    /// The event type is not one this handler understands.
    Ignored,
}

impl HandleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleOutcome::Notified => "notified",
            HandleOutcome::BudgetNotFound => "budget_not_found",
            HandleOutcome::ClientNotFound => "client_not_found",
            HandleOutcome::Ignored => "ignored",
        }
    }
}

/// Returns the event types a `BudgetEventHandler` subscribes to.
pub fn subscribed_event_types() -> [EventType; 3] {
    [
        EventType::BudgetSent,
        EventType::BudgetApproved,
        EventType::BudgetRejected,
    ]
}

/// Keeps service orders in step with budget decisions and notifies clients.
///
/// `handle` never fails: every error is logged and swallowed so that the
/// bus can keep delivering to other handlers.
pub struct BudgetEventHandler<B, C, O, N>
where
    B: BudgetLookup,
    C: ClientLookup,
    O: ServiceOrderStatusUpdater,
    N: NotificationService,
{
    budgets: B,
    clients: C,
    service_orders: O,
    notifications: N,
    actor: String,
}

impl<B, C, O, N> BudgetEventHandler<B, C, O, N>
where
    B: BudgetLookup,
    C: ClientLookup,
    O: ServiceOrderStatusUpdater,
    N: NotificationService,
{
    /// Creates a handler that updates service orders as `SYSTEM_ACTOR`.
    pub fn new(budgets: B, clients: C, service_orders: O, notifications: N) -> Self {
        Self {
            budgets,
            clients,
            service_orders,
            notifications,
            actor: SYSTEM_ACTOR.to_string(),
        }
    }

    /// Records service order updates under a different actor name.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Returns the fixed registration name, distinct from the event types
    /// dispatched on.
    pub fn event_type(&self) -> &'static str {
        HANDLER_EVENT_TYPE
    }

    /// Runs the saga for one event.
    ///
    /// Not-found collaborators end the run early with a warning and an
    /// `Ok` outcome; any other failure is returned.
    #[tracing::instrument(
        skip(self, event),
        fields(event_type = %event.event_type(), budget_id = %event.aggregate_id())
    )]
    pub async fn process(&self, event: &DomainEvent) -> Result<HandleOutcome> {
        let Some(transition) = BudgetTransition::from_event_type(event.event_type()) else {
            tracing::warn!(
                event_type = %event.event_type(),
                "unrecognized budget event type, ignoring"
            );
            return Ok(HandleOutcome::Ignored);
        };

        let budget_id = BudgetId::new(event.aggregate_id());
        let budget = match self.budgets.get_budget_by_id(&budget_id).await {
            Ok(budget) => budget,
            Err(SagaError::BudgetNotFound(_)) => {
                tracing::warn!(%budget_id, "budget not found, skipping event");
                return Ok(HandleOutcome::BudgetNotFound);
            }
            Err(e) => return Err(e),
        };

        let status = transition.service_order_status();
        self.service_orders
            .update_service_order_status(budget.service_order_id(), status, &self.actor)
            .await?;
        tracing::debug!(
            service_order_id = %budget.service_order_id(),
            %status,
            "service order updated"
        );

        let client_id = event
            .data_str(keys::CLIENT_ID)
            .map(ClientId::from)
            .unwrap_or_else(|| budget.client_id().clone());
        let client = match self.clients.get_client_by_id(&client_id).await {
            Ok(client) => client,
            Err(SagaError::ClientNotFound(_)) => {
                tracing::warn!(%budget_id, %client_id, "client not found, notification not sent");
                return Ok(HandleOutcome::ClientNotFound);
            }
            Err(e) => return Err(e),
        };

        let total = budget_total(event, &budget);
        match transition {
            BudgetTransition::Sent => {
                let validity_days = event
                    .data_i64(keys::VALIDITY_PERIOD)
                    .and_then(|days| u32::try_from(days).ok())
                    .unwrap_or_else(|| budget.validity_period());
                self.notifications
                    .send_budget_to_client(&client, budget.id(), &total, validity_days)
                    .await?;
            }
            BudgetTransition::Approved => {
                self.notifications
                    .send_budget_approval_notification(&client, budget.id(), &total)
                    .await?;
            }
            BudgetTransition::Rejected => {
                self.notifications
                    .send_budget_rejection_notification(
                        &client,
                        budget.id(),
                        &total,
                        event.data_str(keys::REASON),
                    )
                    .await?;
            }
        }

        tracing::info!(%client_id, "budget notification sent");
        Ok(HandleOutcome::Notified)
    }
}

impl<B, C, O, N> BudgetEventHandler<B, C, O, N>
where
    B: BudgetLookup + 'static,
    C: ClientLookup + 'static,
    O: ServiceOrderStatusUpdater + 'static,
    N: NotificationService + 'static,
{
    /// Subscribes this handler to every budget event type on `bus`.
    pub async fn subscribe_to(self: Arc<Self>, bus: &EventBus) {
        for event_type in subscribed_event_types() {
            bus.subscribe(event_type, self.clone()).await;
        }
    }
}

/// Prefers the total carried by the event, falling back to the stored one.
fn budget_total(event: &DomainEvent, budget: &Budget) -> String {
    event
        .data_str(keys::BUDGET_TOTAL)
        .map(str::to_string)
        .unwrap_or_else(|| budget.total_amount().to_decimal_string())
}

#[async_trait]
impl<B, C, O, N> EventHandler for BudgetEventHandler<B, C, O, N>
where
    B: BudgetLookup,
    C: ClientLookup,
    O: ServiceOrderStatusUpdater,
    N: NotificationService,
{
    fn name(&self) -> &str {
        HANDLER_EVENT_TYPE
    }

    async fn handle(&self, event: &DomainEvent) -> std::result::Result<(), HandlerError> {
        match self.process(event).await {
            Ok(outcome) => {
                metrics::counter!("budget_events_handled_total", "outcome" => outcome.as_str())
                    .increment(1);
            }
            Err(error) => {
                tracing::error!(
                    event_type = %event.event_type(),
                    budget_id = %event.aggregate_id(),
                    %error,
                    "failed to handle budget event"
                );
                metrics::counter!("budget_event_handler_failures_total").increment(1);
            }
        }
        Ok(())
    }
}
