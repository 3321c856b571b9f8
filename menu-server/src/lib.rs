//! Menu Server - weekly lunch ordering service
//!
//! # Architecture
//!
//! Admins publish a weekly menu (lunches and side dishes, priced per user
//! category); users select items per day, optionally per child, and pay for
//! the week through an external payment processor.
//!
//! # Module structure
//!
//! ```text
//! menu-server/src/
//! ├── core/          # configuration, state, HTTP server
//! ├── db/            # embedded SurrealDB, models, repositories
//! ├── services/      # menu catalog, payment gateway boundary
//! ├── orders/        # validation, totals, order store, order processor
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, time helpers
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use crate::orders::{OrderProcessor, OrderStore};
pub use crate::services::{MenuCatalog, PaymentGateway};
pub use crate::utils::logger::init_logger;
