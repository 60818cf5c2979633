//! Configuration, telemetry and wiring for the budget workflow.
//!
//! Builds one explicitly owned event bus, subscribes the budget event
//! handler to it and hands out the budget service that publishes on it.

pub mod config;
pub mod error;
pub mod telemetry;
mod workshop;

pub use config::{Config, LogFormat};
pub use error::AppError;
pub use workshop::{Workshop, WorkshopHandler};
