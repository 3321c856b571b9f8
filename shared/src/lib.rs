//! Shared types for the lunch ordering service
//!
//! Cross-crate types used by the server and by clients: the unified error
//! system, normalized user shapes, category price tables, and business-week
//! date math.

pub mod error;
pub mod models;
pub mod week;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use models::{Child, MenuItemKind, PriceTable, User, UserCategory};
