//! Order Model

use super::serde_helpers;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::{Child, UserCategory};
use surrealdb::RecordId;

/// Order lifecycle status
///
/// ```text
/// pending --> processing_payment --> paid
///    |               |
///    +---------------+--> cancelled
/// ```
///
/// `paid` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    ProcessingPayment,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// Statuses counting against the one-active-order-per-week rule
    pub const ACTIVE: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::ProcessingPayment,
        OrderStatus::Paid,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Whether the state machine permits moving to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::ProcessingPayment)
                | (Self::Pending, Self::Cancelled)
                | (Self::ProcessingPayment, Self::Paid)
                | (Self::ProcessingPayment, Self::Cancelled)
        )
    }

    /// Wire form used in queries ("pending", "processing_payment", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ProcessingPayment => "processing_payment",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized snapshot of an ordered menu item
///
/// Embedded so totals stay reproducible after later menu edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItemRef {
    /// Full record id string ("menu:xyz")
    pub id: String,
    pub code: String,
    pub description: String,
    /// Override price at order time; None means the category default applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// One day's choice: lunch and/or side, optionally for a specific child
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub date: NaiveDate,
    /// Day name snapshot ("Lunes".."Viernes")
    pub day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<Child>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch: Option<MenuItemRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<MenuItemRef>,
}

/// One user's priced commitment for one week
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_category: UserCategory,
    pub week_start: NaiveDate,
    pub line_items: Vec<Selection>,
    /// Computed at creation from line_items and user_category; immutable after
    pub total: f64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    pub updated_at: i64,
}

impl Order {
    /// String form of the record id ("orders:xyz"), empty when unsaved
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}
