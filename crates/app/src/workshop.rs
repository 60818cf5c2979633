//! Wiring of the budget workflow over in-memory collaborators.

use std::sync::Arc;

use common::{ClientId, ServiceOrderId};
use domain::{Budget, BudgetService, CreateBudget, InMemoryBudgetRepository, Money};
use event_bus::EventBus;
use saga::{
    BudgetEventHandler, InMemoryClientDirectory, InMemoryNotificationService,
    InMemoryServiceOrderService, RepositoryBudgetLookup,
};

use crate::config::Config;
use crate::error::AppError;

/// The budget event handler as wired over in-memory collaborators.
pub type WorkshopHandler = BudgetEventHandler<
    RepositoryBudgetLookup<InMemoryBudgetRepository>,
    InMemoryClientDirectory,
    InMemoryServiceOrderService,
    InMemoryNotificationService,
>;

/// One owned bus with the budget service publishing on it and the budget
/// event handler subscribed to it.
pub struct Workshop {
    bus: EventBus,
    budgets: BudgetService<InMemoryBudgetRepository>,
    clients: InMemoryClientDirectory,
    service_orders: InMemoryServiceOrderService,
    notifications: InMemoryNotificationService,
    handler: Arc<WorkshopHandler>,
    default_validity_days: u32,
}

impl Workshop {
    /// Builds the workflow and subscribes the handler.
    pub async fn new(config: &Config) -> Self {
        let bus = EventBus::new();
        let repository = InMemoryBudgetRepository::new();
        let clients = InMemoryClientDirectory::new();
        let service_orders = InMemoryServiceOrderService::new();
        let notifications = InMemoryNotificationService::new();

        let handler = Arc::new(
            BudgetEventHandler::new(
                RepositoryBudgetLookup::new(repository.clone()),
                clients.clone(),
                service_orders.clone(),
                notifications.clone(),
            )
            .with_actor(config.system_actor.clone()),
        );
        handler.clone().subscribe_to(&bus).await;
        tracing::info!(actor = %config.system_actor, "budget event handler subscribed");

        Self {
            budgets: BudgetService::new(repository, bus.clone()),
            bus,
            clients,
            service_orders,
            notifications,
            handler,
            default_validity_days: config.default_validity_days,
        }
    }

    /// Opens a budget for a service order using the configured validity.
    pub async fn open_budget(
        &self,
        service_order_id: impl Into<ServiceOrderId>,
        client_id: impl Into<ClientId>,
        total_amount: Money,
    ) -> Result<Budget, AppError> {
        let cmd = CreateBudget::new(service_order_id, client_id, self.default_validity_days)
            .with_total_amount(total_amount);
        Ok(self.budgets.create_budget(cmd).await?)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn budgets(&self) -> &BudgetService<InMemoryBudgetRepository> {
        &self.budgets
    }

    pub fn clients(&self) -> &InMemoryClientDirectory {
        &self.clients
    }

    pub fn service_orders(&self) -> &InMemoryServiceOrderService {
        &self.service_orders
    }

    pub fn notifications(&self) -> &InMemoryNotificationService {
        &self.notifications
    }

    /// Returns the subscribed handler.
    pub fn handler(&self) -> &Arc<WorkshopHandler> {
        &self.handler
    }
}
