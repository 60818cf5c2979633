//! Budget persistence port and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::BudgetId;
use tokio::sync::RwLock;

use super::{Budget, BudgetStatus};
use crate::error::{DomainError, Result};

/// Storage for budget aggregates.
#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Loads a budget by ID.
    async fn find_by_id(&self, id: &BudgetId) -> Result<Option<Budget>>;

    /// Returns every budget currently in one of the given statuses.
    async fn find_by_status(&self, statuses: &[BudgetStatus]) -> Result<Vec<Budget>>;

    /// Inserts or replaces a budget.
    async fn save(&self, budget: &Budget) -> Result<()>;
}

/// In-memory budget repository for testing and local wiring.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBudgetRepository {
    budgets: Arc<RwLock<HashMap<BudgetId, Budget>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryBudgetRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every save call.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored budgets.
    pub async fn len(&self) -> usize {
        self.budgets.read().await.len()
    }

    /// Returns true if no budget is stored.
    pub async fn is_empty(&self) -> bool {
        self.budgets.read().await.is_empty()
    }
}

#[async_trait]
impl BudgetRepository for InMemoryBudgetRepository {
    async fn find_by_id(&self, id: &BudgetId) -> Result<Option<Budget>> {
        Ok(self.budgets.read().await.get(id).cloned())
    }

    async fn find_by_status(&self, statuses: &[BudgetStatus]) -> Result<Vec<Budget>> {
        let budgets = self.budgets.read().await;
        let mut found: Vec<Budget> = budgets
            .values()
            .filter(|b| statuses.contains(&b.status()))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(found)
    }

    async fn save(&self, budget: &Budget) -> Result<()> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(DomainError::Repository(format!(
                "failed to save budget {}",
                budget.id()
            )));
        }

        self.budgets
            .write()
            .await
            .insert(budget.id().clone(), budget.clone());
        Ok(())
    }
}
