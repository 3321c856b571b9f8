//! Order Processor - the user-facing order workflow
//!
//! Composes the menu catalog, the order store and the payment gateway into
//! one transaction: check availability, validate selections, persist the
//! order, request payment, return the redirect.
//!
//! # Flow
//!
//! ```text
//! process_order(user, items, week_start)
//!     ├─ 1. Preflight (identity, anchor, non-empty, one-active-order)
//!     ├─ 2. Availability (published view, admin fallback)
//!     ├─ 3. Transform (flat refs -> selections, defensive filtering)
//!     ├─ 4. Validate (blocking errors abort before any write)
//!     ├─ 5. Price (non-positive total aborts)
//!     ├─ 6. Persist (status = pending; durable from here on)
//!     ├─ 7. Payment intent (failure leaves the order pending, resumable)
//!     └─ 8. processing_payment + redirect URL
//! ```
//!
//! After step 6 a failure never deletes the order; the error carries the
//! partial order id so the caller can resume instead of re-entering the
//! whole flow.

use super::store::{OrderStore, StoreError};
use super::validate::Validation;
use crate::db::models::{MenuItem, MenuItemRef, Order, OrderStatus, Selection};
use crate::db::repository::TransitionFields;
use crate::services::menu_catalog::{CatalogError, MenuCatalog, WeekMenu};
use crate::services::payment::{PaymentGateway, PaymentRequest};
use crate::utils::now_millis;
use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{User, UserCategory};
use shared::week;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// Types
// =============================================================================

/// Caller's flat reference to one day's choice
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub child_id: Option<String>,
    #[serde(default)]
    pub lunch_id: Option<String>,
    #[serde(default)]
    pub side_id: Option<String>,
}

/// Which view of the week satisfied the availability check
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MenuSource {
    Published,
    Admin,
    None,
}

/// Two-tier availability lookup result
#[derive(Debug, Clone, Serialize)]
pub struct WeekAvailability {
    pub source: MenuSource,
    pub menu: WeekMenu,
}

/// Successful order handoff
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReceipt {
    pub order_id: String,
    pub payment_id: String,
    pub redirect_url: String,
}

/// Webhook-reported payment outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Rejected,
}

// =============================================================================
// Errors
// =============================================================================

/// Processor errors
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("User identity is incomplete")]
    MissingIdentity,

    #[error("{0} is not a Monday week anchor")]
    BadAnchor(NaiveDate),

    #[error("No selections provided")]
    EmptySelection,

    #[error("An active order already exists for week {week}")]
    DuplicateActive { week: NaiveDate, order_id: String },

    #[error("No menu available for week {0}")]
    NoMenu(NaiveDate),

    #[error("Order validation failed")]
    Invalid(Validation),

    #[error("Order total must be positive, got {0}")]
    BadTotal(f64),

    #[error("Payment intent creation failed: {message}")]
    Payment { order_id: String, message: String },

    #[error("Order {order_id} cannot resume payment from status {status}")]
    NotResumable {
        order_id: String,
        status: OrderStatus,
    },

    #[error("Order {0} has no payment attached")]
    MissingIntent(String),

    #[error("Payment {payment_id} could not be verified")]
    NotVerified {
        order_id: String,
        payment_id: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<ProcessError> for AppError {
    fn from(err: ProcessError) -> Self {
        let message = err.to_string();
        match err {
            ProcessError::MissingIdentity => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
            }
            ProcessError::BadAnchor(_) => {
                AppError::with_message(ErrorCode::InvalidWeekAnchor, message)
            }
            ProcessError::EmptySelection => {
                AppError::with_message(ErrorCode::EmptySelection, message)
            }
            ProcessError::DuplicateActive { order_id, .. } => {
                AppError::with_message(ErrorCode::DuplicateActiveOrder, message)
                    .with_detail("order_id", order_id)
            }
            ProcessError::NoMenu(_) => AppError::with_message(ErrorCode::MenuWeekEmpty, message),
            ProcessError::Invalid(validation) => {
                let mut err = AppError::with_message(
                    ErrorCode::ValidationFailed,
                    validation.errors.join("; "),
                );
                if let Ok(value) = serde_json::to_value(&validation) {
                    err = err.with_detail("validation", value);
                }
                err
            }
            ProcessError::BadTotal(_) => AppError::with_message(ErrorCode::InvalidTotal, message),
            ProcessError::Payment { order_id, .. } => {
                AppError::with_message(ErrorCode::PaymentCreateFailed, message)
                    .with_detail("order_id", order_id)
            }
            ProcessError::NotResumable { order_id, .. } => {
                AppError::with_message(ErrorCode::OrderNotResumable, message)
                    .with_detail("order_id", order_id)
            }
            ProcessError::MissingIntent(order_id) => {
                AppError::with_message(ErrorCode::PaymentMissingIntent, message)
                    .with_detail("order_id", order_id)
            }
            ProcessError::NotVerified {
                order_id,
                payment_id,
            } => AppError::with_message(ErrorCode::PaymentNotVerified, message)
                .with_detail("order_id", order_id)
                .with_detail("payment_id", payment_id),
            ProcessError::Store(e) => e.into(),
            ProcessError::Catalog(e) => e.into(),
        }
    }
}

pub type ProcessResult<T> = Result<T, ProcessError>;

// =============================================================================
// OrderProcessor
// =============================================================================

/// Order workflow orchestrator
#[derive(Clone)]
pub struct OrderProcessor {
    catalog: Arc<MenuCatalog>,
    store: OrderStore,
    gateway: Arc<dyn PaymentGateway>,
    tz: Tz,
}

impl OrderProcessor {
    pub fn new(
        catalog: Arc<MenuCatalog>,
        store: OrderStore,
        gateway: Arc<dyn PaymentGateway>,
        tz: Tz,
    ) -> Self {
        Self {
            catalog,
            store,
            gateway,
            tz,
        }
    }

    /// Two-tier availability lookup
    ///
    /// Prefer the published view; fall back to the admin view when it is
    /// empty. Publish is a two-phase admin operation and the phases are not
    /// transactional, so content present in administration is treated as
    /// proof of orderability even when the publish flag did not propagate.
    pub async fn week_availability(&self, week_start: NaiveDate) -> ProcessResult<WeekAvailability> {
        let published = self.catalog.published_week(week_start).await?;
        if !published.is_empty() {
            return Ok(WeekAvailability {
                source: MenuSource::Published,
                menu: published,
            });
        }

        let admin = self.catalog.admin_week(week_start).await?;
        if !admin.is_empty() {
            tracing::warn!(
                week = %week_start,
                "Serving week from admin view; published view is empty"
            );
            return Ok(WeekAvailability {
                source: MenuSource::Admin,
                menu: admin,
            });
        }

        Ok(WeekAvailability {
            source: MenuSource::None,
            menu: admin,
        })
    }

    /// The full user-facing order transaction
    pub async fn process_order(
        &self,
        user: &User,
        items: &[SelectionInput],
        week_start: NaiveDate,
    ) -> ProcessResult<ProcessReceipt> {
        // 1. Preflight
        if !user.has_identity() {
            return Err(ProcessError::MissingIdentity);
        }
        if items.is_empty() {
            return Err(ProcessError::EmptySelection);
        }
        if !week::is_week_anchor(week_start) {
            return Err(ProcessError::BadAnchor(week_start));
        }
        if let Some(existing) = self.store.active_order(&user.id, week_start).await? {
            return Err(ProcessError::DuplicateActive {
                week: week_start,
                order_id: existing.id_string(),
            });
        }

        // 2. Availability
        let availability = self.week_availability(week_start).await?;
        if availability.source == MenuSource::None {
            return Err(ProcessError::NoMenu(week_start));
        }

        // 3. Transform
        let selections = self.transform(user, items, week_start, &availability.menu);

        // 4. Validate
        let work_days = week::work_days(week_start);
        let ordering_allowed =
            week::ordering_allowed(week_start, chrono::Utc::now().with_timezone(&self.tz));
        let validation = self
            .store
            .validate(&selections, &work_days, ordering_allowed, user);
        if !validation.is_valid {
            return Err(ProcessError::Invalid(validation));
        }

        // 5. Price
        let total = self
            .store
            .compute_total(&selections, user.category, self.catalog.prices());
        if total <= 0.0 {
            return Err(ProcessError::BadTotal(total));
        }

        // 6. Persist: the order exists durably from here on
        let order = self
            .store
            .create(Order {
                id: None,
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                user_email: user.email.clone(),
                user_category: user.category,
                week_start,
                line_items: selections,
                total,
                status: OrderStatus::Pending,
                payment_id: None,
                created_at: 0,
                paid_at: None,
                updated_at: 0,
            })
            .await?;

        tracing::info!(
            order_id = %order.id_string(),
            user_id = %user.id,
            week = %week_start,
            total,
            source = ?availability.source,
            "Order persisted, requesting payment"
        );

        // 7-8. Payment intent and handoff
        self.request_payment(order).await
    }

    /// Resume the payment step for an order left `pending`
    ///
    /// No re-validation and no re-pricing: the order was already priced and
    /// persisted; only the gateway handoff is repeated.
    pub async fn retry_payment(&self, order_id: &str) -> ProcessResult<ProcessReceipt> {
        let order = self.store.find(order_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(ProcessError::NotResumable {
                order_id: order_id.to_string(),
                status: order.status,
            });
        }
        self.request_payment(order).await
    }

    /// Out-of-band payment confirmation (webhook or polled verify)
    ///
    /// A reported rejection cancels the order. A reported success is never
    /// trusted by itself: the gateway is asked to verify, and an unverifiable
    /// payment leaves the order in `processing_payment`.
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        outcome: PaymentOutcome,
    ) -> ProcessResult<Order> {
        let order = self.store.find(order_id).await?;

        match outcome {
            PaymentOutcome::Rejected => {
                if order.status == OrderStatus::Cancelled {
                    return Ok(order);
                }
                Ok(self
                    .store
                    .transition(order_id, OrderStatus::Cancelled, TransitionFields::default())
                    .await?)
            }
            PaymentOutcome::Paid => {
                // Idempotent re-entry for repeated webhook deliveries
                if order.status == OrderStatus::Paid {
                    return Ok(order);
                }
                let payment_id = order
                    .payment_id
                    .clone()
                    .ok_or_else(|| ProcessError::MissingIntent(order_id.to_string()))?;

                if !self.gateway.verify_payment(&payment_id).await {
                    return Err(ProcessError::NotVerified {
                        order_id: order_id.to_string(),
                        payment_id,
                    });
                }

                Ok(self
                    .store
                    .transition(
                        order_id,
                        OrderStatus::Paid,
                        TransitionFields {
                            payment_id: None,
                            paid_at: Some(now_millis()),
                        },
                    )
                    .await?)
            }
        }
    }

    /// User-initiated cancellation of a not-yet-paid order
    pub async fn cancel_order(&self, order_id: &str, user_id: &str) -> ProcessResult<Order> {
        let order = self.store.find(order_id).await?;
        if order.user_id != user_id {
            return Err(ProcessError::Store(StoreError::NotFound(
                order_id.to_string(),
            )));
        }
        if order.status == OrderStatus::Cancelled {
            return Ok(order);
        }
        Ok(self
            .store
            .transition(order_id, OrderStatus::Cancelled, TransitionFields::default())
            .await?)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Map flat item references into embedded selections
    ///
    /// Defensive filtering, logged but never fatal: items outside the target
    /// week, unknown menu references, and guardian selections without a
    /// resolvable child are dropped here and surface as validation gaps.
    fn transform(
        &self,
        user: &User,
        items: &[SelectionInput],
        week_start: NaiveDate,
        menu: &WeekMenu,
    ) -> Vec<Selection> {
        let index: HashMap<String, &MenuItem> = menu
            .items()
            .map(|item| (item.id_string(), item))
            .collect();
        let work_days = week::work_days(week_start);

        let mut selections = Vec::with_capacity(items.len());
        for input in items {
            if !work_days.contains(&input.date) {
                tracing::warn!(
                    date = %input.date,
                    week = %week_start,
                    "Dropping selection outside the target week"
                );
                continue;
            }

            let child = match user.category {
                UserCategory::Guardian => {
                    let Some(child) = input
                        .child_id
                        .as_deref()
                        .and_then(|id| user.child(id))
                        .cloned()
                    else {
                        tracing::warn!(
                            date = %input.date,
                            "Dropping guardian selection without a registered child"
                        );
                        continue;
                    };
                    Some(child)
                }
                UserCategory::Staff => None,
            };

            let lunch = self.resolve_ref(&index, input.lunch_id.as_deref(), input.date);
            let side = self.resolve_ref(&index, input.side_id.as_deref(), input.date);
            if lunch.is_none() && side.is_none() {
                continue;
            }

            selections.push(Selection {
                date: input.date,
                day: week::day_name(input.date.weekday()).to_string(),
                child,
                lunch,
                side,
            });
        }
        selections
    }

    fn resolve_ref(
        &self,
        index: &HashMap<String, &MenuItem>,
        id: Option<&str>,
        date: NaiveDate,
    ) -> Option<MenuItemRef> {
        let id = id?;
        match index.get(id) {
            Some(item) if item.date == date => Some(MenuItemRef {
                id: item.id_string(),
                code: item.code.clone(),
                description: item.description.clone(),
                price: item.price,
            }),
            Some(item) => {
                tracing::warn!(
                    item = %id,
                    expected = %date,
                    actual = %item.date,
                    "Dropping item reference dated for another day"
                );
                None
            }
            None => {
                tracing::warn!(item = %id, "Dropping unknown menu item reference");
                None
            }
        }
    }

    /// Steps 7-8: create the payment intent and hand off
    ///
    /// On gateway failure the order is left `pending` and the error carries
    /// the order id so the caller can retry without re-validating.
    async fn request_payment(&self, order: Order) -> ProcessResult<ProcessReceipt> {
        let order_id = order.id_string();
        let request = PaymentRequest {
            order_id: order_id.clone(),
            amount: order.total,
            currency: self.catalog.prices().currency.clone(),
            description: format!("Almuerzos semana {}", order.week_start),
            payer_email: order.user_email.clone(),
            payer_name: order.user_name.clone(),
        };

        let intent = match self.gateway.create_payment(request).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %e,
                    "Payment intent failed; order stays pending"
                );
                return Err(ProcessError::Payment {
                    order_id,
                    message: e.to_string(),
                });
            }
        };

        self.store
            .transition(
                &order_id,
                OrderStatus::ProcessingPayment,
                TransitionFields {
                    payment_id: Some(intent.payment_id.clone()),
                    paid_at: None,
                },
            )
            .await?;

        Ok(ProcessReceipt {
            order_id,
            payment_id: intent.payment_id,
            redirect_url: intent.redirect_url,
        })
    }
}
