//! Publish/subscribe dispatcher.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::join_all;
use tokio::sync::RwLock;

use crate::error::{FailureKind, HandlerFailure};
use crate::event::{DomainEvent, EventType};
use crate::handler::EventHandler;

type Registry = HashMap<EventType, Vec<Arc<dyn EventHandler>>>;

/// Summary of a single `publish` call.
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Number of handlers the event was delivered to.
    pub handlers_invoked: usize,

    /// Failures caught while the handlers ran.
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    /// Returns true if every invoked handler succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of handlers that completed without failure.
    pub fn succeeded(&self) -> usize {
        self.handlers_invoked - self.failures.len()
    }
}

/// In-process event bus mapping event types to ordered handler lists.
///
/// The bus is an owned value; clones share the same registry, so a
/// publisher and its subscribers only need a handle to one instance.
///
/// Publishing invokes every handler for the event's type concurrently and
/// waits for all of them to settle. A handler that returns an error or
/// panics is logged and recorded in the `PublishReport`; it never affects
/// its siblings or the publisher.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<Registry>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an event type.
    ///
    /// Registering the same handler instance twice for a type is a no-op
    /// that logs a warning. Returns true if the handler was added.
    pub async fn subscribe(&self, event_type: EventType, handler: Arc<dyn EventHandler>) -> bool {
        let mut registry = self.handlers.write().await;
        let handlers = registry.entry(event_type.clone()).or_default();

        if handlers.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            tracing::warn!(
                %event_type,
                handler = handler.name(),
                "handler already subscribed, ignoring duplicate registration"
            );
            return false;
        }

        tracing::debug!(%event_type, handler = handler.name(), "handler subscribed");
        handlers.push(handler);
        true
    }

    /// Removes a handler from an event type.
    ///
    /// Removing the last handler of a type drops the type from the registry.
    /// Returns true if the handler was registered.
    pub async fn unsubscribe(
        &self,
        event_type: &EventType,
        handler: &Arc<dyn EventHandler>,
    ) -> bool {
        let mut registry = self.handlers.write().await;
        let Some(handlers) = registry.get_mut(event_type) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|h| !Arc::ptr_eq(h, handler));
        let removed = handlers.len() < before;

        if handlers.is_empty() {
            registry.remove(event_type);
        }

        if removed {
            tracing::debug!(%event_type, handler = handler.name(), "handler unsubscribed");
        }
        removed
    }

    /// Publishes an event to every handler subscribed to its type.
    ///
    /// Resolves once every handler has settled. Having no subscribers is
    /// normal and returns an empty report.
    #[tracing::instrument(
        skip(self, event),
        fields(event_type = %event.event_type(), event_id = %event.event_id())
    )]
    pub async fn publish(&self, event: &DomainEvent) -> PublishReport {
        // Snapshot the list so handlers can (un)subscribe while running.
        let handlers = {
            let registry = self.handlers.read().await;
            match registry.get(event.event_type()) {
                Some(handlers) => handlers.clone(),
                None => {
                    tracing::debug!("no handlers subscribed");
                    return PublishReport::default();
                }
            }
        };

        metrics::counter!(
            "event_bus_events_published_total",
            "event_type" => event.event_type().to_string()
        )
        .increment(1);

        let outcomes =
            join_all(handlers.iter().map(|handler| dispatch(handler.as_ref(), event))).await;

        let report = PublishReport {
            handlers_invoked: handlers.len(),
            failures: outcomes.into_iter().filter_map(Result::err).collect(),
        };

        tracing::debug!(
            handlers = report.handlers_invoked,
            failures = report.failures.len(),
            "event dispatched"
        );
        report
    }

    /// Returns the number of handlers subscribed to an event type.
    pub async fn handler_count(&self, event_type: &EventType) -> usize {
        self.handlers
            .read()
            .await
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Returns true if at least one handler is subscribed to an event type.
    pub async fn has_handlers(&self, event_type: &EventType) -> bool {
        self.handler_count(event_type).await > 0
    }

    /// Returns the event types that currently have subscribers.
    pub async fn event_types(&self) -> Vec<EventType> {
        self.handlers.read().await.keys().cloned().collect()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish_non_exhaustive()
    }
}

/// Runs one handler inside its own failure boundary.
async fn dispatch(handler: &dyn EventHandler, event: &DomainEvent) -> Result<(), HandlerFailure> {
    let outcome = AssertUnwindSafe(async { handler.handle(event).await })
        .catch_unwind()
        .await;

    let kind = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(error)) => {
            tracing::error!(handler = handler.name(), error = %error, "event handler failed");
            metrics::counter!("event_bus_handler_failures_total").increment(1);
            FailureKind::Error(error.to_string())
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(handler = handler.name(), panic = %reason, "event handler panicked");
            metrics::counter!("event_bus_handler_panics_total").increment(1);
            FailureKind::Panic(reason)
        }
    };

    Err(HandlerFailure {
        handler: handler.name().to_string(),
        kind,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl CountingHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        fn name(&self) -> &str {
            "CountingHandler"
        }

        async fn handle(&self, _event: &DomainEvent) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sent_event() -> DomainEvent {
        DomainEvent::new("b-1", EventType::BudgetSent, HashMap::new())
    }

    #[tokio::test]
    async fn test_subscribe_creates_entry() {
        let bus = EventBus::new();
        let handler = CountingHandler::new();

        assert!(bus.subscribe(EventType::BudgetSent, handler).await);
        assert_eq!(bus.handler_count(&EventType::BudgetSent).await, 1);
        assert!(bus.has_handlers(&EventType::BudgetSent).await);
        assert!(!bus.has_handlers(&EventType::BudgetApproved).await);
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_empty() {
        let bus = EventBus::new();
        let report = bus.publish(&sent_event()).await;

        assert_eq!(report.handlers_invoked, 0);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_publish_only_reaches_matching_type() {
        let bus = EventBus::new();
        let sent = CountingHandler::new();
        let approved = CountingHandler::new();
        bus.subscribe(EventType::BudgetSent, sent.clone()).await;
        bus.subscribe(EventType::BudgetApproved, approved.clone()).await;

        let report = bus.publish(&sent_event()).await;

        assert_eq!(report.handlers_invoked, 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(sent.calls(), 1);
        assert_eq!(approved.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_last_handler_removes_type() {
        let bus = EventBus::new();
        let handler = CountingHandler::new();
        let handle: Arc<dyn EventHandler> = handler.clone();
        bus.subscribe(EventType::BudgetSent, handle.clone()).await;

        assert!(bus.unsubscribe(&EventType::BudgetSent, &handle).await);
        assert!(bus.event_types().await.is_empty());

        bus.publish(&sent_event()).await;
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_keeps_remaining_handlers() {
        let bus = EventBus::new();
        let first: Arc<dyn EventHandler> = CountingHandler::new();
        let second = CountingHandler::new();
        bus.subscribe(EventType::BudgetSent, first.clone()).await;
        bus.subscribe(EventType::BudgetSent, second.clone()).await;

        assert!(bus.unsubscribe(&EventType::BudgetSent, &first).await);
        assert_eq!(bus.handler_count(&EventType::BudgetSent).await, 1);

        bus.publish(&sent_event()).await;
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_handler_is_noop() {
        let bus = EventBus::new();
        let registered: Arc<dyn EventHandler> = CountingHandler::new();
        let stranger: Arc<dyn EventHandler> = CountingHandler::new();
        bus.subscribe(EventType::BudgetSent, registered).await;

        assert!(!bus.unsubscribe(&EventType::BudgetSent, &stranger).await);
        assert!(!bus.unsubscribe(&EventType::BudgetRejected, &stranger).await);
        assert_eq!(bus.handler_count(&EventType::BudgetSent).await, 1);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(payload.as_ref()), "kaboom");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
