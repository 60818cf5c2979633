//! In-process domain event bus.
//!
//! This crate provides:
//! - `DomainEvent`, the immutable record of something that happened to an aggregate
//! - `EventHandler`, the trait subscribers implement
//! - `EventBus`, a registry that fans each published event out to every handler
//!   subscribed to its type, isolating handler failures from one another

pub mod bus;
pub mod error;
pub mod event;
pub mod handler;
#[cfg(feature = "test-util")]
pub mod testing;

pub use bus::{EventBus, PublishReport};
pub use error::{FailureKind, HandlerError, HandlerFailure};
pub use event::{DomainEvent, DomainEventBuilder, EventId, EventType, Version};
pub use handler::EventHandler;
