//! Order API
//!
//! The order flow entry point plus order queries and the admin listings.
//! Inbound user payloads are normalized into [`User`] here, at the boundary;
//! nothing past this module sees the legacy field aliases.

use crate::core::ServerState;
use crate::db::models::Order;
use crate::orders::{ProcessReceipt, SelectionInput, WeekOrderSummary};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Child, User, UserCategory};
use shared::week;
use validator::Validate;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(process_order).get(list_user_orders))
        .route("/api/orders/active", get(active_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/retry-payment", post(retry_payment))
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route("/api/admin/orders/{week}", get(list_week))
        .route("/api/admin/orders/{week}/summary", get(week_summary))
}

/// Inbound user shape, tolerant of legacy field aliases
#[derive(Debug, Deserialize, Validate)]
struct UserPayload {
    #[serde(alias = "uid", alias = "userId")]
    #[validate(length(min = 1, message = "user id is required"))]
    id: String,
    #[serde(default, alias = "displayName", alias = "fullName")]
    name: String,
    #[serde(alias = "mail", alias = "correo")]
    #[validate(email(message = "payer email is invalid"))]
    email: String,
    #[serde(alias = "userType", alias = "tipo")]
    category: UserCategory,
    #[serde(default, alias = "kids")]
    children: Vec<Child>,
}

impl UserPayload {
    fn normalize(self) -> User {
        User {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            category: self.category,
            children: self.children,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProcessOrderRequest {
    user: UserPayload,
    week_start: NaiveDate,
    items: Vec<SelectionInput>,
}

/// POST /api/orders - run the full order flow, returns the payment redirect
async fn process_order(
    State(state): State<ServerState>,
    Json(payload): Json<ProcessOrderRequest>,
) -> AppResult<Json<ProcessReceipt>> {
    payload
        .user
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let user = payload.user.normalize();

    let receipt = state
        .processor
        .process_order(&user, &payload.items, payload.week_start)
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
struct UserOrdersQuery {
    user_id: String,
}

/// GET /api/orders?user_id= - a user's order history, newest first
async fn list_user_orders(
    State(state): State<ServerState>,
    Query(query): Query<UserOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.orders_for_user(&query.user_id).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
struct ActiveOrderQuery {
    user_id: String,
    week_start: NaiveDate,
}

/// GET /api/orders/active?user_id=&week_start= - the one active order, if any
async fn active_order(
    State(state): State<ServerState>,
    Query(query): Query<ActiveOrderQuery>,
) -> AppResult<Json<Option<Order>>> {
    let order = state
        .orders
        .active_order(&query.user_id, query.week_start)
        .await?;
    Ok(Json(order))
}

/// GET /api/orders/:id
async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.orders.find(&id).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/retry-payment - resume the payment step of a pending order
async fn retry_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProcessReceipt>> {
    let receipt = state.processor.retry_payment(&id).await?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
struct CancelRequest {
    user_id: String,
}

/// POST /api/orders/:id/cancel - user-initiated cancellation
async fn cancel_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<Order>> {
    let order = state.processor.cancel_order(&id, &payload.user_id).await?;
    Ok(Json(order))
}

fn parse_anchor(week: NaiveDate) -> AppResult<NaiveDate> {
    if !week::is_week_anchor(week) {
        return Err(AppError::with_message(
            ErrorCode::InvalidWeekAnchor,
            format!("{week} is not a Monday week anchor"),
        ));
    }
    Ok(week)
}

/// GET /api/admin/orders/:week - all orders of a week
async fn list_week(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
) -> AppResult<Json<Vec<Order>>> {
    let week = parse_anchor(week)?;
    let orders = state.orders.orders_for_week(week).await?;
    Ok(Json(orders))
}

/// GET /api/admin/orders/:week/summary - per-day kitchen counts
async fn week_summary(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
) -> AppResult<Json<WeekOrderSummary>> {
    let week = parse_anchor(week)?;
    let summary = state.orders.week_summary(week).await?;
    Ok(Json(summary))
}
