//! Budget event saga.
//!
//! This crate provides the handler that reacts to budget lifecycle events by
//! keeping the related service order in sync and notifying the client:
//! 1. Resolve the budget
//! 2. Update the service order status
//! 3. Resolve the client
//! 4. Send the notification matching the event
//!
//! Steps run in order within one event. Failures are logged and contained;
//! completed steps are not rolled back.

pub mod error;
pub mod handler;
pub mod services;

pub use error::SagaError;
pub use handler::{
    BudgetEventHandler, HANDLER_EVENT_TYPE, HandleOutcome, SYSTEM_ACTOR, subscribed_event_types,
};
pub use services::{
    BudgetLookup, Client, ClientLookup, InMemoryClientDirectory, InMemoryNotificationService,
    InMemoryServiceOrderService, Notification, NotificationService, RepositoryBudgetLookup,
    ServiceOrderStatus, ServiceOrderStatusUpdater, StatusUpdate,
};
