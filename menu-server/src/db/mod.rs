//! Database Module
//!
//! Embedded SurrealDB handle and schema bootstrap.

pub mod models;
pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "comedor";
const DATABASE: &str = "main";

/// Open the on-disk store and apply schema definitions
pub async fn open(path: &str) -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
    init(&db).await?;
    tracing::info!(path = %path, "Database connection established");
    Ok(db)
}

/// Open an in-memory store (tests)
pub async fn open_memory() -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
    init(&db).await?;
    Ok(db)
}

async fn init(db: &Surreal<Db>) -> Result<(), AppError> {
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
    define_schema(db).await
}

/// Table and index definitions, idempotent on startup
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS menu SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_menu_week ON TABLE menu COLUMNS week_start;
        DEFINE INDEX IF NOT EXISTS idx_menu_code ON TABLE menu COLUMNS week_start, kind, code UNIQUE;

        DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_orders_user_week ON TABLE orders COLUMNS user_id, week_start;
        DEFINE INDEX IF NOT EXISTS idx_orders_week ON TABLE orders COLUMNS week_start;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let db = open_memory().await.unwrap();
        define_schema(&db).await.unwrap();
    }

    #[tokio::test]
    async fn opens_an_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let db = open(path.to_str().unwrap()).await.unwrap();
        drop(db);
    }
}
