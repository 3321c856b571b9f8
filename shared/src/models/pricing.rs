//! Category price table
//!
//! Most weeks are priced entirely from the per-category defaults; individual
//! menu items may carry an override price. Resolution order: item override
//! when set and positive, category default otherwise.

use super::menu::MenuItemKind;
use super::user::UserCategory;
use serde::{Deserialize, Serialize};

/// Flat per-category default prices, in currency units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    pub guardian_lunch: f64,
    pub staff_lunch: f64,
    pub guardian_side: f64,
    pub staff_side: f64,
    /// ISO 4217 currency code passed to the payment gateway
    pub currency: String,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            guardian_lunch: 4500.0,
            staff_lunch: 4875.0,
            guardian_side: 900.0,
            staff_side: 1100.0,
            currency: "CLP".to_string(),
        }
    }
}

impl PriceTable {
    /// The category default for a given item kind
    pub fn default_for(&self, kind: MenuItemKind, category: UserCategory) -> f64 {
        match (kind, category) {
            (MenuItemKind::Lunch, UserCategory::Guardian) => self.guardian_lunch,
            (MenuItemKind::Lunch, UserCategory::Staff) => self.staff_lunch,
            (MenuItemKind::Side, UserCategory::Guardian) => self.guardian_side,
            (MenuItemKind::Side, UserCategory::Staff) => self.staff_side,
        }
    }

    /// Resolve the effective price of an item for a user category
    ///
    /// An absent or non-positive override falls back to the category default.
    pub fn resolve(
        &self,
        kind: MenuItemKind,
        category: UserCategory,
        override_price: Option<f64>,
    ) -> f64 {
        match override_price {
            Some(p) if p > 0.0 => p,
            _ => self.default_for(kind, category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriceTable {
        PriceTable {
            guardian_lunch: 4500.0,
            staff_lunch: 4875.0,
            guardian_side: 900.0,
            staff_side: 1100.0,
            currency: "CLP".into(),
        }
    }

    #[test]
    fn positive_override_wins_for_every_category() {
        let t = table();
        for category in [UserCategory::Guardian, UserCategory::Staff] {
            let p = t.resolve(MenuItemKind::Lunch, category, Some(5200.0));
            assert_eq!(p, 5200.0);
        }
    }

    #[test]
    fn absent_or_non_positive_override_falls_back() {
        let t = table();
        assert_eq!(t.resolve(MenuItemKind::Lunch, UserCategory::Staff, None), 4875.0);
        assert_eq!(
            t.resolve(MenuItemKind::Lunch, UserCategory::Guardian, Some(0.0)),
            4500.0
        );
        assert_eq!(
            t.resolve(MenuItemKind::Side, UserCategory::Staff, Some(-10.0)),
            1100.0
        );
    }
}
