//! Database Models

pub mod menu_item;
pub mod order;
pub mod serde_helpers;

// Re-exports
pub use menu_item::{MenuItem, MenuItemCreate, MenuItemUpdate};
pub use order::{MenuItemRef, Order, OrderStatus, Selection};
