//! Runs one budget through the workflow and prints the resulting metrics.

use app::{AppError, Config, Workshop, telemetry};
use domain::Money;
use saga::Client;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Configuration and observability
    let config = Config::from_env()?;
    telemetry::init(&config)?;
    let metrics_handle = telemetry::install_metrics()?;

    // 2. Wire bus, service and handler
    let workshop = Workshop::new(&config).await;
    workshop
        .clients()
        .insert(Client::new("c1", "Ana Souza", "ana@example.com"));

    // 3. Drive one budget through its lifecycle
    let budget = workshop
        .open_budget("so-1", "c1", Money::from_units(100))
        .await?;
    tracing::info!(budget_id = %budget.id(), "budget opened");

    workshop.budgets().send_budget(budget.id()).await?;
    workshop.budgets().mark_received(budget.id()).await?;
    workshop.budgets().approve_budget(budget.id()).await?;

    for update in workshop.service_orders().updates() {
        tracing::info!(
            service_order_id = %update.service_order_id,
            status = %update.status,
            actor = %update.actor,
            "service order status"
        );
    }
    tracing::info!(
        notifications = workshop.notifications().sent().len(),
        "workflow finished"
    );

    println!("{}", metrics_handle.render());
    Ok(())
}
