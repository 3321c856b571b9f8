//! Utility Module

pub mod logger;

/// Current epoch time in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
