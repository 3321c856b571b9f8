//! Order Repository
//!
//! Persistence only; state-machine legality lives in the order store.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderStatus};
use crate::utils::now_millis;
use chrono::NaiveDate;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const ORDER_TABLE: &str = "orders";

/// Incidental fields applied together with a status change
#[derive(Debug, Clone, Default)]
pub struct TransitionFields {
    pub payment_id: Option<String>,
    pub paid_at: Option<i64>,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// The user's non-terminal-or-paid order for a week, if any
    ///
    /// Backs the one-active-order-per-(user, week) check.
    pub async fn find_active(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE user_id = $user AND week_start = $week AND status IN ['pending', 'processing_payment', 'paid'] LIMIT 1",
            )
            .bind(("user", user_id.to_string()))
            .bind(("week", week_start))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let record_id: RecordId = id
            .parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid order id: {}", id)))?;
        let order: Option<Order> = self.base.db().select(record_id).await?;
        Ok(order)
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Apply a status change plus incidental fields
    pub async fn transition(
        &self,
        id: &RecordId,
        status: OrderStatus,
        fields: TransitionFields,
    ) -> RepoResult<Order> {
        let mut set_parts: Vec<&str> = vec!["status = $status", "updated_at = $now"];
        if fields.payment_id.is_some() {
            set_parts.push("payment_id = $payment_id");
        }
        if fields.paid_at.is_some() {
            set_parts.push("paid_at = $paid_at");
        }

        let query = format!("UPDATE $order SET {} RETURN AFTER", set_parts.join(", "));
        let mut q = self
            .base
            .db()
            .query(&query)
            .bind(("order", id.clone()))
            .bind(("status", status))
            .bind(("now", now_millis()));
        if let Some(v) = fields.payment_id {
            q = q.bind(("payment_id", v));
        }
        if let Some(v) = fields.paid_at {
            q = q.bind(("paid_at", v));
        }

        let orders: Vec<Order> = q.await?.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    pub async fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE user_id = $user ORDER BY created_at DESC")
            .bind(("user", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders of a week (admin listing)
    pub async fn list_for_week(&self, week_start: NaiveDate) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE week_start = $week ORDER BY created_at ASC")
            .bind(("week", week_start))
            .await?
            .take(0)?;
        Ok(orders)
    }
}
