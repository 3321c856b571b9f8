//! Normalized user shapes
//!
//! Inbound payloads historically carried the user under several field-name
//! variants. The API boundary builds a [`User`] once; everything past the
//! boundary consumes only this shape.

use serde::{Deserialize, Serialize};

/// Pricing category of the ordering user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserCategory {
    /// Parent/guardian ordering for registered children
    Guardian,
    /// Staff member ordering for themselves
    Staff,
}

impl std::fmt::Display for UserCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guardian => write!(f, "guardian"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

/// A child registered under a guardian account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Child {
    pub id: String,
    pub name: String,
}

/// Normalized user value object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub category: UserCategory,
    #[serde(default)]
    pub children: Vec<Child>,
}

impl User {
    /// Whether the user carries enough identity to place an order
    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Find a registered child by id
    pub fn child(&self, child_id: &str) -> Option<&Child> {
        self.children.iter().find(|c| c.id == child_id)
    }
}
