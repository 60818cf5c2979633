//! Integration tests for the wired budget workflow.

use app::{Config, Workshop};
use common::ServiceOrderId;
use domain::{BudgetStatus, Money};
use event_bus::EventType;
use saga::{Client, Notification, ServiceOrderStatus, subscribed_event_types};

fn config() -> Config {
    Config {
        system_actor: "front-desk".to_string(),
        default_validity_days: 10,
        ..Config::default()
    }
}

async fn workshop() -> Workshop {
    let workshop = Workshop::new(&config()).await;
    workshop
        .clients()
        .insert(Client::new("c1", "Ana", "a@a.com"));
    workshop
}

#[tokio::test]
async fn test_handler_is_subscribed_once_per_budget_event() {
    let workshop = workshop().await;

    let mut types = workshop.bus().event_types().await;
    types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    let mut expected = subscribed_event_types().to_vec();
    expected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    assert_eq!(types, expected);
    assert!(!workshop.bus().has_handlers(&EventType::from("Other")).await);
}

#[tokio::test]
async fn test_open_budget_uses_configured_validity() {
    let workshop = workshop().await;

    let budget = workshop
        .open_budget("so-1", "c1", Money::from_units(250))
        .await
        .unwrap();

    assert_eq!(budget.validity_period(), 10);
    assert_eq!(budget.status(), BudgetStatus::Generated);
    assert_eq!(budget.total_amount(), Money::from_cents(25000));
}

#[tokio::test]
async fn test_send_is_recorded_under_configured_actor() {
    let workshop = workshop().await;
    let budget = workshop
        .open_budget("so-1", "c1", Money::from_units(100))
        .await
        .unwrap();

    workshop.budgets().send_budget(budget.id()).await.unwrap();

    let updates = workshop.service_orders().updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].service_order_id, ServiceOrderId::new("so-1"));
    assert_eq!(updates[0].status, ServiceOrderStatus::AwaitingApproval);
    assert_eq!(updates[0].actor, "front-desk");

    assert!(matches!(
        workshop.notifications().sent().as_slice(),
        [Notification::BudgetSent { total, validity_days: 10, .. }] if total == "100.00"
    ));
}

#[tokio::test]
async fn test_full_lifecycle() {
    let workshop = workshop().await;
    let budget = workshop
        .open_budget("so-1", "c1", Money::from_units(100))
        .await
        .unwrap();

    workshop.budgets().send_budget(budget.id()).await.unwrap();
    workshop.budgets().mark_received(budget.id()).await.unwrap();
    let approved = workshop.budgets().approve_budget(budget.id()).await.unwrap();

    assert_eq!(approved.status(), BudgetStatus::Approved);
    assert_eq!(
        workshop
            .service_orders()
            .status_of(&ServiceOrderId::new("so-1")),
        Some(ServiceOrderStatus::InExecution)
    );
    assert_eq!(workshop.notifications().sent().len(), 2);
}
