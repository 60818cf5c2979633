//! Collaborator traits and in-memory implementations used by the budget saga.

pub mod budget;
pub mod client;
pub mod notification;
pub mod service_order;

pub use budget::{BudgetLookup, RepositoryBudgetLookup};
pub use client::{Client, ClientLookup, InMemoryClientDirectory};
pub use notification::{InMemoryNotificationService, Notification, NotificationService};
pub use service_order::{
    InMemoryServiceOrderService, ServiceOrderStatus, ServiceOrderStatusUpdater, StatusUpdate,
};
