//! Service Module
//!
//! - [`MenuCatalog`]: weekly menu ownership (CRUD, publish, availability, prices)
//! - [`PaymentGateway`]: opaque boundary to the payment processor

pub mod menu_catalog;
pub mod payment;

pub use menu_catalog::{CatalogError, DayMenu, MenuCatalog, WeekMenu};
pub use payment::{GatewayError, HttpPaymentGateway, PaymentGateway, PaymentIntent, PaymentRequest};
