//! API Route Module
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`menus`] - public availability + admin menu management
//! - [`orders`] - order flow, queries, admin listings
//! - [`payments`] - payment webhook

pub mod health;
pub mod menus;
pub mod orders;
pub mod payments;

use crate::core::ServerState;
use axum::Router;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(menus::router())
        .merge(orders::router())
        .merge(payments::router())
        .with_state(state)
}
