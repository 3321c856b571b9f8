//! Selection validation business rules
//!
//! Pure functions over already-transformed selections. Blocking errors stop
//! the order before any write; warnings are surfaced but do not block.

use crate::db::models::Selection;
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{User, UserCategory};

/// Validation outcome
#[derive(Debug, Clone, Default, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Work days with no lunch selection
    pub missing_days: Vec<NaiveDate>,
}

/// Apply the weekly-order business rules
///
/// - every work day needs a lunch: for guardians across at least one child,
///   for staff exactly one
/// - at least one selection must exist
/// - a lunch without a side is a warning, not an error
/// - a closed ordering window blocks regardless of completeness
/// - a guardian with no registered children cannot order at all
pub fn validate(
    selections: &[Selection],
    work_days: &[NaiveDate],
    ordering_allowed: bool,
    user: &User,
) -> Validation {
    let mut v = Validation::default();

    if !ordering_allowed {
        v.errors
            .push("Ordering for this week is closed (Wednesday 13:00 cutoff)".to_string());
    }

    if selections.is_empty() {
        v.errors.push("No selections provided".to_string());
    }

    if user.category == UserCategory::Guardian && user.children.is_empty() {
        v.errors
            .push("No children registered for this account".to_string());
    }

    for day in work_days {
        let lunches = selections
            .iter()
            .filter(|s| s.date == *day && s.lunch.is_some())
            .count();
        match (user.category, lunches) {
            (_, 0) => v.missing_days.push(*day),
            (UserCategory::Staff, n) if n > 1 => v.errors.push(format!(
                "Multiple lunches selected for {day}; staff orders take one per day"
            )),
            _ => {}
        }
    }

    if !v.missing_days.is_empty() && !selections.is_empty() {
        let days = v
            .missing_days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        v.errors.push(format!("Missing lunch selection for: {days}"));
    }

    for selection in selections {
        if selection.lunch.is_some() && selection.side.is_none() {
            v.warnings
                .push(format!("No side dish selected for {}", selection.date));
        }
    }

    v.is_valid = v.errors.is_empty();
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MenuItemRef;
    use shared::models::Child;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn week() -> Vec<NaiveDate> {
        (10..15).map(day).collect()
    }

    fn lunch_ref(d: u32) -> MenuItemRef {
        MenuItemRef {
            id: format!("menu:l{d}"),
            code: format!("A{d}"),
            description: "Almuerzo".into(),
            price: None,
        }
    }

    fn side_ref(d: u32) -> MenuItemRef {
        MenuItemRef {
            id: format!("menu:s{d}"),
            code: format!("S{d}"),
            description: "Ensalada".into(),
            price: None,
        }
    }

    fn selection(d: u32, child: Option<Child>, with_side: bool) -> Selection {
        Selection {
            date: day(d),
            day: "".into(),
            child,
            lunch: Some(lunch_ref(d)),
            side: with_side.then(|| side_ref(d)),
        }
    }

    fn guardian() -> User {
        User {
            id: "u1".into(),
            name: "Ana Rojas".into(),
            email: "ana@example.com".into(),
            category: UserCategory::Guardian,
            children: vec![Child {
                id: "c1".into(),
                name: "Pedro".into(),
            }],
        }
    }

    fn staff() -> User {
        User {
            id: "u2".into(),
            name: "Jorge Soto".into(),
            email: "jorge@example.com".into(),
            category: UserCategory::Staff,
            children: vec![],
        }
    }

    #[test]
    fn guardian_full_week_is_valid() {
        let child = guardian().children[0].clone();
        let selections: Vec<Selection> = (10..15)
            .map(|d| selection(d, Some(child.clone()), true))
            .collect();
        let v = validate(&selections, &week(), true, &guardian());
        assert!(v.is_valid);
        assert!(v.missing_days.is_empty());
        assert!(v.errors.is_empty());
    }

    #[test]
    fn guardian_missing_wednesday() {
        let child = guardian().children[0].clone();
        let selections: Vec<Selection> = [10u32, 11, 13, 14]
            .iter()
            .map(|d| selection(*d, Some(child.clone()), true))
            .collect();
        let v = validate(&selections, &week(), true, &guardian());
        assert!(!v.is_valid);
        assert_eq!(v.missing_days, vec![day(12)]);
    }

    #[test]
    fn staff_week_without_sides_warns_only() {
        let selections: Vec<Selection> = (10..15).map(|d| selection(d, None, false)).collect();
        let v = validate(&selections, &week(), true, &staff());
        assert!(v.is_valid);
        assert_eq!(v.warnings.len(), 5);
        assert!(v.errors.is_empty());
    }

    #[test]
    fn staff_double_lunch_on_one_day_blocks() {
        let mut selections: Vec<Selection> = (10..15).map(|d| selection(d, None, true)).collect();
        selections.push(selection(12, None, true));
        let v = validate(&selections, &week(), true, &staff());
        assert!(!v.is_valid);
        assert!(v.errors.iter().any(|e| e.contains("Multiple lunches")));
    }

    #[test]
    fn closed_window_blocks_a_complete_order() {
        let selections: Vec<Selection> = (10..15).map(|d| selection(d, None, true)).collect();
        let v = validate(&selections, &week(), false, &staff());
        assert!(!v.is_valid);
        assert!(v.errors.iter().any(|e| e.contains("closed")));
    }

    #[test]
    fn guardian_without_children_blocks_distinctly() {
        let mut user = guardian();
        user.children.clear();
        let selections: Vec<Selection> = (10..15).map(|d| selection(d, None, true)).collect();
        let v = validate(&selections, &week(), true, &user);
        assert!(!v.is_valid);
        assert!(
            v.errors
                .iter()
                .any(|e| e.contains("No children registered"))
        );
    }

    #[test]
    fn empty_selection_blocks() {
        let v = validate(&[], &week(), true, &staff());
        assert!(!v.is_valid);
        assert!(v.errors.iter().any(|e| e.contains("No selections")));
        // every work day is also reported missing
        assert_eq!(v.missing_days.len(), 5);
    }
}
