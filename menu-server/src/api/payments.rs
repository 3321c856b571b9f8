//! Payment webhook API
//!
//! Out-of-band confirmation from the payment processor. Reported successes
//! are re-verified against the gateway before an order becomes `paid`.

use crate::core::ServerState;
use crate::db::models::Order;
use crate::orders::PaymentOutcome;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/payments/webhook", post(webhook))
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(alias = "orderId")]
    order_id: String,
    status: String,
}

fn parse_outcome(status: &str) -> AppResult<PaymentOutcome> {
    match status.to_ascii_lowercase().as_str() {
        "paid" | "approved" | "success" => Ok(PaymentOutcome::Paid),
        "rejected" | "cancelled" | "failed" | "failure" => Ok(PaymentOutcome::Rejected),
        other => Err(AppError::invalid(format!(
            "Unknown payment status: {other}"
        ))),
    }
}

/// POST /api/payments/webhook - processor-reported payment outcome
async fn webhook(
    State(state): State<ServerState>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<Order>> {
    let outcome = parse_outcome(&payload.status)?;
    let order = state
        .processor
        .confirm_payment(&payload.order_id, outcome)
        .await?;
    Ok(Json(order))
}
