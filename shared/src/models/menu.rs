//! Menu item kind

use serde::{Deserialize, Serialize};

/// What a menu item is sold as
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    Lunch,
    Side,
}

impl std::fmt::Display for MenuItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lunch => write!(f, "lunch"),
            Self::Side => write!(f, "side"),
        }
    }
}
