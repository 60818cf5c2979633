//! Client lookup trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::ClientId;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SagaError};

/// The contact details needed to notify a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
}

impl Client {
    pub fn new(id: impl Into<ClientId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Reads client contact details.
#[async_trait]
pub trait ClientLookup: Send + Sync {
    /// Loads a client, failing with `SagaError::ClientNotFound` if absent.
    async fn get_client_by_id(&self, id: &ClientId) -> Result<Client>;
}

/// In-memory client directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientDirectory {
    clients: Arc<RwLock<HashMap<ClientId, Client>>>,
    lookups: Arc<AtomicUsize>,
    fail_on_lookup: Arc<AtomicBool>,
}

impl InMemoryClientDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a client.
    pub fn insert(&self, client: Client) {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(client.id.clone(), client);
    }

    /// Configures every lookup to fail with a non-"not found" error.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.fail_on_lookup.store(fail, Ordering::SeqCst);
    }

    /// Returns how many lookups were made.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientLookup for InMemoryClientDirectory {
    async fn get_client_by_id(&self, id: &ClientId) -> Result<Client> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.fail_on_lookup.load(Ordering::SeqCst) {
            return Err(SagaError::ClientLookup("client directory unavailable".to_string()));
        }

        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| SagaError::ClientNotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_existing_client() {
        let directory = InMemoryClientDirectory::new();
        directory.insert(Client::new("c1", "Ana", "a@a.com"));

        let client = directory.get_client_by_id(&ClientId::new("c1")).await.unwrap();
        assert_eq!(client.email, "a@a.com");
        assert_eq!(directory.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_missing_client() {
        let directory = InMemoryClientDirectory::new();
        let result = directory.get_client_by_id(&ClientId::new("c9")).await;
        assert!(matches!(result, Err(SagaError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_fail_on_lookup() {
        let directory = InMemoryClientDirectory::new();
        directory.insert(Client::new("c1", "Ana", "a@a.com"));
        directory.set_fail_on_lookup(true);

        let result = directory.get_client_by_id(&ClientId::new("c1")).await;
        assert!(matches!(result, Err(SagaError::ClientLookup(_))));
    }
}
