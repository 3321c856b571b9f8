//! Unified error codes for the lunch ordering service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Menu errors
//! - 2xxx: Order errors
//! - 3xxx: Payment errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Menu ====================
    /// Week has no menu items
    MenuWeekEmpty = 1001,
    /// Menu item code already used within the week
    MenuCodeTaken = 1002,
    /// Default sides already applied to the target day(s)
    SidesAlreadyApplied = 1003,
    /// No default side catalog configured
    DefaultSidesMissing = 1004,
    /// Duplication target week already has items
    DuplicateTargetOccupied = 1005,
    /// Nothing to publish (no active items in the week)
    NothingToPublish = 1006,

    // ==================== 2xxx: Order ====================
    /// Order not found
    OrderNotFound = 2001,
    /// User already has an active order for the week
    DuplicateActiveOrder = 2002,
    /// Order is not in a resumable state
    OrderNotResumable = 2003,
    /// Illegal order status transition
    InvalidTransition = 2004,
    /// No selections provided
    EmptySelection = 2005,
    /// Past the weekly ordering cutoff
    OrderingClosed = 2006,
    /// Guardian user has no registered children
    NoChildrenRegistered = 2007,
    /// Week identifier is not a Monday anchor
    InvalidWeekAnchor = 2008,
    /// Computed order total is not positive
    InvalidTotal = 2009,

    // ==================== 3xxx: Payment ====================
    /// Payment intent creation failed
    PaymentCreateFailed = 3001,
    /// Payment could not be verified as paid
    PaymentNotVerified = 3002,
    /// Order has no payment intent attached
    PaymentMissingIntent = 3003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Upstream service unreachable or timed out
    TransportError = 9003,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::MenuWeekEmpty => "No menu items for this week",
            Self::MenuCodeTaken => "Menu item code already used this week",
            Self::SidesAlreadyApplied => "Default sides already exist for the target day",
            Self::DefaultSidesMissing => "No default side dishes configured",
            Self::DuplicateTargetOccupied => "Target week already has menu items",
            Self::NothingToPublish => "Week has no active items to publish",

            Self::OrderNotFound => "Order not found",
            Self::DuplicateActiveOrder => "An active order already exists for this week",
            Self::OrderNotResumable => "Order is not in a resumable state",
            Self::InvalidTransition => "Illegal order status transition",
            Self::EmptySelection => "No selections provided",
            Self::OrderingClosed => "Ordering for this week is closed",
            Self::NoChildrenRegistered => "No children registered for this account",
            Self::InvalidWeekAnchor => "Week identifier must be a Monday",
            Self::InvalidTotal => "Order total must be positive",

            Self::PaymentCreateFailed => "Could not start the payment",
            Self::PaymentNotVerified => "Payment could not be verified",
            Self::PaymentMissingIntent => "Order has no payment attached",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::TransportError => "Upstream service unavailable",
        }
    }

    /// HTTP status code mapping
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::EmptySelection
            | Self::InvalidWeekAnchor
            | Self::InvalidTotal => StatusCode::BAD_REQUEST,

            Self::NotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists
            | Self::MenuCodeTaken
            | Self::SidesAlreadyApplied
            | Self::DuplicateTargetOccupied
            | Self::DuplicateActiveOrder
            | Self::InvalidTransition => StatusCode::CONFLICT,

            Self::MenuWeekEmpty
            | Self::DefaultSidesMissing
            | Self::NothingToPublish
            | Self::OrderNotResumable
            | Self::OrderingClosed
            | Self::NoChildrenRegistered
            | Self::PaymentMissingIntent
            | Self::PaymentNotVerified => StatusCode::UNPROCESSABLE_ENTITY,

            Self::PaymentCreateFailed | Self::TransportError => StatusCode::BAD_GATEWAY,

            Self::Unknown | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", *self as u16)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error for unrecognized numeric codes during deserialization
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            1001 => Self::MenuWeekEmpty,
            1002 => Self::MenuCodeTaken,
            1003 => Self::SidesAlreadyApplied,
            1004 => Self::DefaultSidesMissing,
            1005 => Self::DuplicateTargetOccupied,
            1006 => Self::NothingToPublish,
            2001 => Self::OrderNotFound,
            2002 => Self::DuplicateActiveOrder,
            2003 => Self::OrderNotResumable,
            2004 => Self::InvalidTransition,
            2005 => Self::EmptySelection,
            2006 => Self::OrderingClosed,
            2007 => Self::NoChildrenRegistered,
            2008 => Self::InvalidWeekAnchor,
            2009 => Self::InvalidTotal,
            3001 => Self::PaymentCreateFailed,
            3002 => Self::PaymentNotVerified,
            3003 => Self::PaymentMissingIntent,
            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::TransportError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
