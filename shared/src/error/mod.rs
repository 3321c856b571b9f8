//! Unified error system
//!
//! - [`ErrorCode`]: standardized numeric error codes for all error types
//! - [`AppError`]: rich error type with codes, messages, and details
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Menu errors
//! - 2xxx: Order errors
//! - 3xxx: Payment errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::validation("Missing lunch selections")
//!     .with_detail("missing_days", vec!["2025-03-12"]);
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiErrorBody, ApiResponse, AppError, AppResult};
