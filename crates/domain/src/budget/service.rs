//! Budget application service.

use chrono::{DateTime, Utc};
use common::BudgetId;
use event_bus::{DomainEvent, EventBus};

use super::{Budget, BudgetRepository, BudgetStatus, CreateBudget, events};
use crate::error::{DomainError, Result};

/// Application-layer use-cases around the budget aggregate.
///
/// Every transition follows the same sequence: load the budget, run the
/// guarded operation, persist the result, then publish the matching event.
/// Guard failures are returned before anything is saved or published, and
/// handler failures on the bus never fail the use-case.
pub struct BudgetService<R: BudgetRepository> {
    repository: R,
    bus: EventBus,
}

impl<R: BudgetRepository> BudgetService<R> {
    /// Creates a service persisting to `repository` and publishing on `bus`.
    pub fn new(repository: R, bus: EventBus) -> Self {
        Self { repository, bus }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the bus events are published on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Creates and stores a new budget.
    #[tracing::instrument(skip(self, cmd), fields(budget_id = %cmd.budget_id))]
    pub async fn create_budget(&self, cmd: CreateBudget) -> Result<Budget> {
        let budget = Budget::create(cmd);
        self.repository.save(&budget).await?;
        tracing::info!(service_order_id = %budget.service_order_id(), "budget created");
        Ok(budget)
    }

    /// Loads a budget by ID.
    pub async fn get_budget(&self, id: &BudgetId) -> Result<Budget> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::BudgetNotFound(id.clone()))
    }

    /// Sends a budget to its client and publishes `BudgetSent`.
    #[tracing::instrument(skip(self), fields(budget_id = %id))]
    pub async fn send_budget(&self, id: &BudgetId) -> Result<Budget> {
        let mut budget = self.get_budget(id).await?;
        budget.send()?;
        self.commit(&budget, Some(events::budget_sent(&budget))).await?;
        Ok(budget)
    }

    /// Approves a budget and publishes `BudgetApproved`.
    #[tracing::instrument(skip(self), fields(budget_id = %id))]
    pub async fn approve_budget(&self, id: &BudgetId) -> Result<Budget> {
        let mut budget = self.get_budget(id).await?;
        budget.approve()?;
        self.commit(&budget, Some(events::budget_approved(&budget)))
            .await?;
        Ok(budget)
    }

    /// Rejects a budget and publishes `BudgetRejected` carrying the reason.
    #[tracing::instrument(skip(self, reason), fields(budget_id = %id))]
    pub async fn reject_budget(&self, id: &BudgetId, reason: impl Into<String>) -> Result<Budget> {
        let mut budget = self.get_budget(id).await?;
        budget.reject()?;
        self.commit(&budget, Some(events::budget_rejected(&budget, reason)))
            .await?;
        Ok(budget)
    }

    /// Records that the client received the budget. Publishes nothing.
    #[tracing::instrument(skip(self), fields(budget_id = %id))]
    pub async fn mark_received(&self, id: &BudgetId) -> Result<Budget> {
        let mut budget = self.get_budget(id).await?;
        budget.mark_as_received();
        self.commit(&budget, None).await?;
        Ok(budget)
    }

    /// Marks every pending budget whose validity elapsed as expired.
    ///
    /// Returns the IDs of the budgets that were marked.
    pub async fn expire_overdue(&self) -> Result<Vec<BudgetId>> {
        self.expire_overdue_at(Utc::now()).await
    }

    /// Same as `expire_overdue`, evaluated at `now`.
    #[tracing::instrument(skip(self))]
    pub async fn expire_overdue_at(&self, now: DateTime<Utc>) -> Result<Vec<BudgetId>> {
        let pending = self
            .repository
            .find_by_status(&[
                BudgetStatus::Generated,
                BudgetStatus::Sent,
                BudgetStatus::Received,
            ])
            .await?;

        let mut expired = Vec::new();
        for mut budget in pending.into_iter().filter(|b| b.is_expired_at(now)) {
            budget.mark_as_expired();
            self.commit(&budget, None).await?;
            expired.push(budget.id().clone());
        }

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "overdue budgets expired");
        }
        Ok(expired)
    }

    async fn commit(&self, budget: &Budget, event: Option<DomainEvent>) -> Result<()> {
        self.repository.save(budget).await?;
        metrics::counter!("budget_transitions_total", "status" => budget.status().as_str())
            .increment(1);
        tracing::info!(status = %budget.status(), "budget status changed");

        if let Some(event) = event {
            let report = self.bus.publish(&event).await;
            if !report.is_clean() {
                tracing::warn!(
                    event_type = %event.event_type(),
                    failures = report.failures.len(),
                    "some handlers failed to process budget event"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetError, InMemoryBudgetRepository};
    use chrono::Duration;

    fn service() -> BudgetService<InMemoryBudgetRepository> {
        BudgetService::new(InMemoryBudgetRepository::new(), EventBus::new())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service();
        let created = service
            .create_budget(CreateBudget::new("so-1", "c1", 7).with_id("b-1"))
            .await
            .unwrap();

        let loaded = service.get_budget(&BudgetId::new("b-1")).await.unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn test_get_missing_budget() {
        let result = service().get_budget(&BudgetId::new("missing")).await;
        assert!(matches!(result, Err(DomainError::BudgetNotFound(id)) if id.as_str() == "missing"));
    }

    #[tokio::test]
    async fn test_send_persists_status() {
        let service = service();
        service
            .create_budget(CreateBudget::new("so-1", "c1", 7).with_id("b-1"))
            .await
            .unwrap();

        service.send_budget(&BudgetId::new("b-1")).await.unwrap();

        let stored = service.get_budget(&BudgetId::new("b-1")).await.unwrap();
        assert_eq!(stored.status(), BudgetStatus::Sent);
        assert!(stored.sent_date().is_some());
    }

    #[tokio::test]
    async fn test_guard_failure_is_not_persisted() {
        let service = service();
        let id = BudgetId::new("b-1");
        service
            .create_budget(CreateBudget::new("so-1", "c1", 7).with_id("b-1"))
            .await
            .unwrap();
        service.approve_budget(&id).await.unwrap();

        let result = service.approve_budget(&id).await;
        assert!(matches!(
            result,
            Err(DomainError::Budget(BudgetError::AlreadyApproved { .. }))
        ));
    }

    #[tokio::test]
    async fn test_expire_overdue_marks_only_elapsed_pending_budgets() {
        let service = service();
        for (id, days) in [("b-short", 1), ("b-long", 30)] {
            service
                .create_budget(CreateBudget::new("so-1", "c1", days).with_id(id))
                .await
                .unwrap();
        }
        service
            .create_budget(CreateBudget::new("so-2", "c1", 1).with_id("b-approved"))
            .await
            .unwrap();
        service
            .approve_budget(&BudgetId::new("b-approved"))
            .await
            .unwrap();

        let expired = service
            .expire_overdue_at(Utc::now() + Duration::days(2))
            .await
            .unwrap();

        assert_eq!(expired, vec![BudgetId::new("b-short")]);
        let short = service.get_budget(&BudgetId::new("b-short")).await.unwrap();
        assert_eq!(short.status(), BudgetStatus::Expired);
        let long = service.get_budget(&BudgetId::new("b-long")).await.unwrap();
        assert_eq!(long.status(), BudgetStatus::Generated);
    }

    #[tokio::test]
    async fn test_expire_overdue_survives_unbounded_validity() {
        let service = service();
        service
            .create_budget(CreateBudget::new("so-1", "c1", u32::MAX).with_id("b-open"))
            .await
            .unwrap();
        service
            .create_budget(CreateBudget::new("so-2", "c1", 1).with_id("b-short"))
            .await
            .unwrap();

        let expired = service
            .expire_overdue_at(Utc::now() + Duration::days(2))
            .await
            .unwrap();

        assert_eq!(expired, vec![BudgetId::new("b-short")]);
        let open = service.get_budget(&BudgetId::new("b-open")).await.unwrap();
        assert_eq!(open.status(), BudgetStatus::Generated);
    }
}
