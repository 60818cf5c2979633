//! Client notification trait and in-memory implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::{BudgetId, ClientId};

use super::client::Client;
use crate::error::{Result, SagaError};

/// Sends budget-related messages to clients.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Delivers a budget to the client for review.
    async fn send_budget_to_client(
        &self,
        client: &Client,
        budget_id: &BudgetId,
        total: &str,
        validity_days: u32,
    ) -> Result<()>;

    /// Confirms to the client that the budget was approved.
    async fn send_budget_approval_notification(
        &self,
        client: &Client,
        budget_id: &BudgetId,
        total: &str,
    ) -> Result<()>;

    /// Confirms to the client that the budget was rejected.
    async fn send_budget_rejection_notification(
        &self,
        client: &Client,
        budget_id: &BudgetId,
        total: &str,
        reason: Option<&str>,
    ) -> Result<()>;
}

/// A notification recorded by `InMemoryNotificationService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    BudgetSent {
        client_id: ClientId,
        email: String,
        budget_id: BudgetId,
        total: String,
        validity_days: u32,
    },
    BudgetApproved {
        client_id: ClientId,
        email: String,
        budget_id: BudgetId,
        total: String,
    },
    BudgetRejected {
        client_id: ClientId,
        email: String,
        budget_id: BudgetId,
        total: String,
        reason: Option<String>,
    },
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    sent: Arc<RwLock<Vec<Notification>>>,
    fail_on_send: Arc<AtomicBool>,
}

impl InMemoryNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every notification to fail.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.fail_on_send.store(fail, Ordering::SeqCst);
    }

    /// Returns every notification sent, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, notification: Notification) -> Result<()> {
        if self.fail_on_send.load(Ordering::SeqCst) {
            return Err(SagaError::Notification("mail server unavailable".to_string()));
        }
        self.sent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_budget_to_client(
        &self,
        client: &Client,
        budget_id: &BudgetId,
        total: &str,
        validity_days: u32,
    ) -> Result<()> {
        self.record(Notification::BudgetSent {
            client_id: client.id.clone(),
            email: client.email.clone(),
            budget_id: budget_id.clone(),
            total: total.to_string(),
            validity_days,
        })
    }

    async fn send_budget_approval_notification(
        &self,
        client: &Client,
        budget_id: &BudgetId,
        total: &str,
    ) -> Result<()> {
        self.record(Notification::BudgetApproved {
            client_id: client.id.clone(),
            email: client.email.clone(),
            budget_id: budget_id.clone(),
            total: total.to_string(),
        })
    }

    async fn send_budget_rejection_notification(
        &self,
        client: &Client,
        budget_id: &BudgetId,
        total: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        self.record(Notification::BudgetRejected {
            client_id: client.id.clone(),
            email: client.email.clone(),
            budget_id: budget_id.clone(),
            total: total.to_string(),
            reason: reason.map(str::to_string),
        })
    }
}
