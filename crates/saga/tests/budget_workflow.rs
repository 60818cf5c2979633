//! End-to-end tests: budget service publishing on a bus the saga listens to.

use std::sync::Arc;

use async_trait::async_trait;
use common::{BudgetId, ServiceOrderId};
use domain::{BudgetService, BudgetStatus, CreateBudget, InMemoryBudgetRepository, Money};
use event_bus::{DomainEvent, EventBus, EventHandler, EventType, HandlerError};
use saga::{
    BudgetEventHandler, Client, InMemoryClientDirectory, InMemoryNotificationService,
    InMemoryServiceOrderService, Notification, RepositoryBudgetLookup, ServiceOrderStatus,
    subscribed_event_types,
};

struct Workshop {
    service: BudgetService<InMemoryBudgetRepository>,
    service_orders: InMemoryServiceOrderService,
    notifications: InMemoryNotificationService,
    bus: EventBus,
}

async fn workshop() -> Workshop {
    let bus = EventBus::new();
    let repository = InMemoryBudgetRepository::new();
    let clients = InMemoryClientDirectory::new();
    clients.insert(Client::new("c1", "Ana", "a@a.com"));
    let service_orders = InMemoryServiceOrderService::new();
    let notifications = InMemoryNotificationService::new();

    let handler = Arc::new(BudgetEventHandler::new(
        RepositoryBudgetLookup::new(repository.clone()),
        clients,
        service_orders.clone(),
        notifications.clone(),
    ));
    handler.subscribe_to(&bus).await;

    Workshop {
        service: BudgetService::new(repository, bus.clone()),
        service_orders,
        notifications,
        bus,
    }
}

async fn create(workshop: &Workshop, id: &str) -> BudgetId {
    workshop
        .service
        .create_budget(
            CreateBudget::new("so-1", "c1", 7)
                .with_id(id)
                .with_total_amount(Money::from_cents(10000)),
        )
        .await
        .unwrap();
    BudgetId::new(id)
}

#[tokio::test]
async fn test_handler_subscribes_to_every_budget_event() {
    let workshop = workshop().await;

    for event_type in subscribed_event_types() {
        assert_eq!(workshop.bus.handler_count(&event_type).await, 1);
    }
}

#[tokio::test]
async fn test_send_then_approve_drives_service_order() {
    let workshop = workshop().await;
    let id = create(&workshop, "b-1").await;
    let so = ServiceOrderId::new("so-1");

    workshop.service.send_budget(&id).await.unwrap();
    assert_eq!(
        workshop.service_orders.status_of(&so),
        Some(ServiceOrderStatus::AwaitingApproval)
    );

    workshop.service.approve_budget(&id).await.unwrap();
    assert_eq!(
        workshop.service_orders.status_of(&so),
        Some(ServiceOrderStatus::InExecution)
    );

    let sent = workshop.notifications.sent();
    assert_eq!(sent.len(), 2);
    assert!(matches!(
        &sent[0],
        Notification::BudgetSent { total, validity_days: 7, .. } if total == "100.00"
    ));
    assert!(matches!(&sent[1], Notification::BudgetApproved { .. }));
}

#[tokio::test]
async fn test_reject_cancels_service_order_with_reason() {
    let workshop = workshop().await;
    let id = create(&workshop, "b-1").await;

    workshop
        .service
        .reject_budget(&id, "too expensive")
        .await
        .unwrap();

    assert_eq!(
        workshop.service_orders.status_of(&ServiceOrderId::new("so-1")),
        Some(ServiceOrderStatus::Cancelled)
    );
    assert!(matches!(
        workshop.notifications.sent().as_slice(),
        [Notification::BudgetRejected { reason: Some(reason), .. }] if reason == "too expensive"
    ));
}

#[tokio::test]
async fn test_guard_failure_reaches_no_collaborator() {
    let workshop = workshop().await;
    let id = create(&workshop, "b-1").await;
    workshop.service.send_budget(&id).await.unwrap();

    assert!(workshop.service.send_budget(&id).await.is_err());

    assert_eq!(workshop.service_orders.updates().len(), 1);
    assert_eq!(workshop.notifications.sent().len(), 1);
}

#[tokio::test]
async fn test_notification_outage_does_not_fail_use_case() {
    let workshop = workshop().await;
    let id = create(&workshop, "b-1").await;
    workshop.notifications.set_fail_on_send(true);

    let budget = workshop.service.send_budget(&id).await.unwrap();

    assert_eq!(budget.status(), BudgetStatus::Sent);
    assert_eq!(
        workshop.service_orders.status_of(&ServiceOrderId::new("so-1")),
        Some(ServiceOrderStatus::AwaitingApproval)
    );
    assert!(workshop.notifications.sent().is_empty());
}

struct Exploding;

#[async_trait]
impl EventHandler for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    async fn handle(&self, _event: &DomainEvent) -> Result<(), HandlerError> {
        panic!("audit log offline");
    }
}

#[tokio::test]
async fn test_panicking_neighbour_does_not_stop_saga() {
    let workshop = workshop().await;
    workshop
        .bus
        .subscribe(EventType::BudgetSent, Arc::new(Exploding))
        .await;
    let id = create(&workshop, "b-1").await;

    workshop.service.send_budget(&id).await.unwrap();

    assert_eq!(workshop.notifications.sent().len(), 1);
}
