//! Payment gateway boundary
//!
//! Opaque client to the external payment processor. Transport failures and
//! non-success statuses are normalized into [`GatewayError`] with a
//! human-readable message; raw transport errors never reach callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Gateway errors, already normalized for display
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Payment service unreachable: {0}")]
    Transport(String),

    #[error("Payment service rejected the request: {0}")]
    Rejected(String),

    #[error("Unexpected payment service response: {0}")]
    Malformed(String),
}

/// Payment intent creation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub payer_email: String,
    pub payer_name: String,
}

/// Gateway-side handle created to collect payment for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub payment_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
}

/// Boundary to the external payment processor
///
/// A trait so tests and offline environments can substitute fakes.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent; returns the processor handle and redirect URL
    async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, GatewayError>;

    /// True only if the processor reports the payment as paid
    ///
    /// Any transport failure is "not verified"; never assume success.
    async fn verify_payment(&self, payment_id: &str) -> bool;
}

/// HTTP implementation against the payment processor REST API
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/payment/create", self.base_url);
        let response = self
            .authorize(self.client.post(&url).json(&request))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                order_id = %request.order_id,
                status = %status,
                "Payment intent creation rejected"
            );
            return Err(GatewayError::Rejected(format!(
                "status {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        if intent.payment_id.is_empty() || intent.redirect_url.is_empty() {
            return Err(GatewayError::Malformed(
                "missing paymentId or redirectUrl".to_string(),
            ));
        }

        tracing::info!(
            order_id = %request.order_id,
            payment_id = %intent.payment_id,
            "Payment intent created"
        );
        Ok(intent)
    }

    async fn verify_payment(&self, payment_id: &str) -> bool {
        let url = format!("{}/payment/verify/{}", self.base_url, payment_id);
        let response = match self.authorize(self.client.get(&url)).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(payment_id = %payment_id, error = %e, "Payment verify unreachable");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                payment_id = %payment_id,
                status = %response.status(),
                "Payment verify returned non-success status"
            );
            return false;
        }

        match response.json::<VerifyResponse>().await {
            Ok(body) => body.status.eq_ignore_ascii_case("paid"),
            Err(e) => {
                tracing::warn!(payment_id = %payment_id, error = %e, "Payment verify body unreadable");
                false
            }
        }
    }
}
