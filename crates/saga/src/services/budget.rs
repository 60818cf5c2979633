//! Budget lookup use-case.

use async_trait::async_trait;
use common::BudgetId;
use domain::{Budget, BudgetRepository};

use crate::error::{Result, SagaError};

/// Reads the current state of a budget.
#[async_trait]
pub trait BudgetLookup: Send + Sync {
    /// Loads a budget, failing with `SagaError::BudgetNotFound` if absent.
    async fn get_budget_by_id(&self, id: &BudgetId) -> Result<Budget>;
}

/// `BudgetLookup` backed by a budget repository.
#[derive(Debug, Clone)]
pub struct RepositoryBudgetLookup<R> {
    repository: R,
}

impl<R: BudgetRepository> RepositoryBudgetLookup<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: BudgetRepository> BudgetLookup for RepositoryBudgetLookup<R> {
    async fn get_budget_by_id(&self, id: &BudgetId) -> Result<Budget> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| SagaError::BudgetNotFound(id.clone()))
    }
}
