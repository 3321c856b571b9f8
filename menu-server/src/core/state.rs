//! Server state assembly

use super::config::Config;
use crate::db;
use crate::orders::{OrderProcessor, OrderStore};
use crate::services::menu_catalog::MenuCatalog;
use crate::services::payment::HttpPaymentGateway;
use shared::error::AppResult;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: Surreal<Db>,
    pub catalog: Arc<MenuCatalog>,
    pub orders: OrderStore,
    pub processor: OrderProcessor,
}

impl ServerState {
    /// Open the store and wire the services together
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let database = db::open(&config.db_path).await?;

        let catalog = Arc::new(MenuCatalog::new(
            database.clone(),
            config.prices.clone(),
            config.default_sides.clone(),
        ));
        let orders = OrderStore::new(database.clone());
        let gateway = Arc::new(HttpPaymentGateway::new(
            config.payment_base_url.clone(),
            config.payment_api_key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        ));
        let processor = OrderProcessor::new(
            catalog.clone(),
            orders.clone(),
            gateway,
            config.timezone,
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            db: database,
            catalog,
            orders,
            processor,
        })
    }
}
