//! Service order status synchronization trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::ServiceOrderId;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagaError};

/// Status of a service order in the workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceOrderStatus {
    Received,
    InDiagnosis,
    /// A budget was sent and the client has not decided yet.
    AwaitingApproval,
    InExecution,
    Finished,
    Delivered,
    Cancelled,
}

impl ServiceOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceOrderStatus::Received => "RECEIVED",
            ServiceOrderStatus::InDiagnosis => "IN_DIAGNOSIS",
            ServiceOrderStatus::AwaitingApproval => "AWAITING_APPROVAL",
            ServiceOrderStatus::InExecution => "IN_EXECUTION",
            ServiceOrderStatus::Finished => "FINISHED",
            ServiceOrderStatus::Delivered => "DELIVERED",
            ServiceOrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ServiceOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Updates the status of a service order on behalf of an actor.
#[async_trait]
pub trait ServiceOrderStatusUpdater: Send + Sync {
    async fn update_service_order_status(
        &self,
        service_order_id: &ServiceOrderId,
        status: ServiceOrderStatus,
        actor: &str,
    ) -> Result<()>;
}

/// A recorded status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub service_order_id: ServiceOrderId,
    pub status: ServiceOrderStatus,
    pub actor: String,
}

#[derive(Debug, Default)]
struct InMemoryServiceOrderState {
    statuses: HashMap<ServiceOrderId, ServiceOrderStatus>,
    updates: Vec<StatusUpdate>,
}

/// In-memory service order service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceOrderService {
    state: Arc<RwLock<InMemoryServiceOrderState>>,
    fail_on_update: Arc<AtomicBool>,
}

impl InMemoryServiceOrderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every status update to fail.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.fail_on_update.store(fail, Ordering::SeqCst);
    }

    /// Returns the current status of a service order, if it was ever updated.
    pub fn status_of(&self, service_order_id: &ServiceOrderId) -> Option<ServiceOrderStatus> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .statuses
            .get(service_order_id)
            .copied()
    }

    /// Returns every successful update, oldest first.
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .updates
            .clone()
    }
}

#[async_trait]
impl ServiceOrderStatusUpdater for InMemoryServiceOrderService {
    async fn update_service_order_status(
        &self,
        service_order_id: &ServiceOrderId,
        status: ServiceOrderStatus,
        actor: &str,
    ) -> Result<()> {
        if self.fail_on_update.load(Ordering::SeqCst) {
            return Err(SagaError::ServiceOrder(format!(
                "failed to update service order {service_order_id}"
            )));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.statuses.insert(service_order_id.clone(), status);
        state.updates.push(StatusUpdate {
            service_order_id: service_order_id.clone(),
            status,
            actor: actor.to_string(),
        });
        Ok(())
    }
}
