//! Event handler trait.

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::event::DomainEvent;

/// A subscriber that reacts to published domain events.
///
/// Handlers are registered with an `EventBus` per event type and invoked
/// concurrently with the other handlers of that type. Returned errors and
/// panics are contained by the bus.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns the handler name, used in log fields and failure reports.
    fn name(&self) -> &str;

    /// Processes a single event.
    async fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}
