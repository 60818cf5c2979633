//! Identifier types shared across the workshop crates.

mod types;

pub use types::{BudgetId, ClientId, ServiceOrderId};
