//! Menu Item Model

use super::serde_helpers;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::models::MenuItemKind;
use surrealdb::RecordId;

/// A sellable item for one calendar date
///
/// Visible to end users iff `active && published`; admin views ignore
/// `published`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Business code, unique within (week_start, kind)
    pub code: String,
    pub description: String,
    pub kind: MenuItemKind,
    /// Calendar day this item is served
    pub date: NaiveDate,
    /// Day name snapshot ("Lunes".."Viernes")
    pub day: String,
    /// Monday of the item's week, denormalized for range queries
    pub week_start: NaiveDate,
    /// Override price; None or non-positive means the category default applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub active: bool,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MenuItem {
    /// Whether end users can see and order this item
    pub fn is_visible(&self) -> bool {
        self.active && self.published
    }

    /// String form of the record id ("menu:xyz"), empty when unsaved
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Create payload for a single menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub code: String,
    pub description: String,
    pub kind: MenuItemKind,
    pub date: NaiveDate,
    pub price: Option<f64>,
    pub active: Option<bool>,
}

/// Patch payload for a menu item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
    pub published: Option<bool>,
}
