//! Order Store - persistence and arithmetic for orders
//!
//! Owns the order state machine; knows nothing about menu content beyond
//! what is embedded in each [`Selection`].

use super::{money, validate};
use crate::db::models::{Order, OrderStatus, Selection};
use crate::db::repository::{OrderRepository, RepoError, TransitionFields};
use crate::utils::now_millis;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{PriceTable, User, UserCategory};
use shared::week;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Illegal transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound(_) => AppError::with_message(ErrorCode::OrderNotFound, message),
            StoreError::InvalidTransition { .. } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
            }
            StoreError::Repo(e) => e.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-day order counts for the kitchen
#[derive(Debug, Clone, Serialize)]
pub struct DayOrderSummary {
    pub date: NaiveDate,
    pub day: String,
    pub lunches: usize,
    pub sides: usize,
}

/// Aggregated week order figures (admin dashboard)
#[derive(Debug, Clone, Serialize)]
pub struct WeekOrderSummary {
    pub week_start: NaiveDate,
    pub orders: usize,
    pub paid_orders: usize,
    pub days: Vec<DayOrderSummary>,
}

/// Order store service
#[derive(Clone)]
pub struct OrderStore {
    repo: OrderRepository,
}

impl OrderStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: OrderRepository::new(db),
        }
    }

    /// The user's order in {pending, processing_payment, paid} for a week
    pub async fn active_order(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> StoreResult<Option<Order>> {
        Ok(self.repo.find_active(user_id, week_start).await?)
    }

    pub async fn find(&self, order_id: &str) -> StoreResult<Order> {
        self.repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))
    }

    /// Insert a new order as `pending`, stamping creation time
    pub async fn create(&self, mut order: Order) -> StoreResult<Order> {
        let now = now_millis();
        order.id = None;
        order.status = OrderStatus::Pending;
        order.payment_id = None;
        order.paid_at = None;
        order.created_at = now;
        order.updated_at = now;
        Ok(self.repo.create(order).await?)
    }

    /// Apply a legality-checked status change plus incidental fields
    ///
    /// Entering `paid` stamps `paid_at` when the caller did not.
    pub async fn transition(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        mut fields: TransitionFields,
    ) -> StoreResult<Order> {
        let order = self.find(order_id).await?;
        if !order.status.can_transition_to(new_status) {
            return Err(StoreError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }
        if new_status == OrderStatus::Paid && fields.paid_at.is_none() {
            fields.paid_at = Some(now_millis());
        }

        let id = order
            .id
            .as_ref()
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        let updated = self.repo.transition(id, new_status, fields).await?;
        tracing::info!(
            order_id = %order_id,
            from = %order.status,
            to = %new_status,
            "Order status transition"
        );
        Ok(updated)
    }

    pub async fn orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        Ok(self.repo.list_for_user(user_id).await?)
    }

    pub async fn orders_for_week(&self, week_start: NaiveDate) -> StoreResult<Vec<Order>> {
        Ok(self.repo.list_for_week(week_start).await?)
    }

    /// Per-day lunch/side counts across non-cancelled orders of a week
    pub async fn week_summary(&self, week_start: NaiveDate) -> StoreResult<WeekOrderSummary> {
        let orders = self.repo.list_for_week(week_start).await?;
        Ok(summarize(week_start, &orders))
    }

    /// Pure total computation, delegated to [`money::compute_total`]
    pub fn compute_total(
        &self,
        selections: &[Selection],
        category: UserCategory,
        prices: &PriceTable,
    ) -> f64 {
        money::compute_total(selections, category, prices)
    }

    /// Pure rule validation, delegated to [`validate::validate`]
    pub fn validate(
        &self,
        selections: &[Selection],
        work_days: &[NaiveDate],
        ordering_allowed: bool,
        user: &User,
    ) -> validate::Validation {
        validate::validate(selections, work_days, ordering_allowed, user)
    }
}

fn summarize(week_start: NaiveDate, orders: &[Order]) -> WeekOrderSummary {
    let mut days: Vec<DayOrderSummary> = week::work_days(week_start)
        .into_iter()
        .map(|date| DayOrderSummary {
            date,
            day: week::day_name(date.weekday()).to_string(),
            lunches: 0,
            sides: 0,
        })
        .collect();

    let mut paid_orders = 0;
    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        if order.status == OrderStatus::Paid {
            paid_orders += 1;
        }
        for selection in &order.line_items {
            if let Some(day) = days.iter_mut().find(|d| d.date == selection.date) {
                if selection.lunch.is_some() {
                    day.lunches += 1;
                }
                if selection.side.is_some() {
                    day.sides += 1;
                }
            }
        }
    }

    WeekOrderSummary {
        week_start,
        orders: orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .count(),
        paid_orders,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::MenuItemRef;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn order(status: OrderStatus, dates: &[u32]) -> Order {
        Order {
            id: None,
            user_id: "u1".into(),
            user_name: "Ana".into(),
            user_email: "ana@example.com".into(),
            user_category: UserCategory::Guardian,
            week_start: day(10),
            line_items: dates
                .iter()
                .map(|d| Selection {
                    date: day(*d),
                    day: "".into(),
                    child: None,
                    lunch: Some(MenuItemRef {
                        id: "menu:a".into(),
                        code: "A1".into(),
                        description: "Almuerzo".into(),
                        price: None,
                    }),
                    side: None,
                })
                .collect(),
            total: 0.0,
            status,
            payment_id: None,
            created_at: 0,
            paid_at: None,
            updated_at: 0,
        }
    }

    #[test]
    fn summary_skips_cancelled_orders() {
        let orders = vec![
            order(OrderStatus::Paid, &[10, 11]),
            order(OrderStatus::Pending, &[10]),
            order(OrderStatus::Cancelled, &[10, 11, 12]),
        ];
        let summary = summarize(day(10), &orders);
        assert_eq!(summary.orders, 2);
        assert_eq!(summary.paid_orders, 1);
        assert_eq!(summary.days[0].lunches, 2);
        assert_eq!(summary.days[1].lunches, 1);
        assert_eq!(summary.days[2].lunches, 0);
    }
}
