//! Order total arithmetic using rust_decimal for precision
//!
//! All sums are computed as `Decimal` internally, rounded half-up to 2
//! decimal places, then converted back to `f64` for storage/serialization.

use crate::db::models::Selection;
use rust_decimal::prelude::*;
use shared::models::{MenuItemKind, PriceTable, UserCategory};

const DECIMAL_PLACES: u32 = 2;

fn dec(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Sum the category prices of every selected lunch and side
///
/// Pure function: used at order-creation time and for display summaries.
pub fn compute_total(
    selections: &[Selection],
    category: UserCategory,
    prices: &PriceTable,
) -> f64 {
    let mut total = Decimal::ZERO;
    for selection in selections {
        if let Some(lunch) = &selection.lunch {
            total += dec(prices.resolve(MenuItemKind::Lunch, category, lunch.price));
        }
        if let Some(side) = &selection.side {
            total += dec(prices.resolve(MenuItemKind::Side, category, side.price));
        }
    }
    total
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MenuItemRef;
    use chrono::NaiveDate;

    fn prices() -> PriceTable {
        PriceTable {
            guardian_lunch: 4500.0,
            staff_lunch: 4875.0,
            guardian_side: 900.0,
            staff_side: 1100.0,
            currency: "CLP".into(),
        }
    }

    fn item_ref(code: &str, price: Option<f64>) -> MenuItemRef {
        MenuItemRef {
            id: format!("menu:{code}"),
            code: code.to_string(),
            description: code.to_string(),
            price,
        }
    }

    fn lunch_only(date: NaiveDate) -> Selection {
        Selection {
            date,
            day: "Lunes".into(),
            child: None,
            lunch: Some(item_ref("A1", None)),
            side: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn staff_week_of_default_lunches() {
        let selections: Vec<Selection> = (10..15).map(|d| lunch_only(day(d))).collect();
        let total = compute_total(&selections, UserCategory::Staff, &prices());
        assert_eq!(total, 24375.0);
    }

    #[test]
    fn override_prices_and_sides_are_summed() {
        let selections = vec![Selection {
            date: day(10),
            day: "Lunes".into(),
            child: None,
            lunch: Some(item_ref("A1", Some(5200.0))),
            side: Some(item_ref("S1", None)),
        }];
        let total = compute_total(&selections, UserCategory::Guardian, &prices());
        assert_eq!(total, 5200.0 + 900.0);
    }

    #[test]
    fn total_is_pure() {
        let selections: Vec<Selection> = (10..13).map(|d| lunch_only(day(d))).collect();
        let a = compute_total(&selections, UserCategory::Guardian, &prices());
        let b = compute_total(&selections, UserCategory::Guardian, &prices());
        assert_eq!(a, b);
        assert_eq!(a, 3.0 * 4500.0);
    }

    #[test]
    fn empty_selection_totals_zero() {
        assert_eq!(compute_total(&[], UserCategory::Staff, &prices()), 0.0);
    }
}
