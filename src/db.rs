use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

use crate::config::Config;
use crate::db_storage::{LeadStorage, PgLeadStorage};
use crate::memory_storage::MemoryLeadStorage;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        Self::connect(
            &config.database_url,
            config.db_max_connections,
            config.db_acquire_timeout,
        )
        .await
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: std::time::Duration,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        // Schema is migrated externally; just make sure the connection works
        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }
}

/// Opens the lead store selected by `DATABASE_URL`.
pub async fn connect_storage(config: &Config) -> anyhow::Result<Arc<dyn LeadStorage>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory lead storage; data is lost on restart");
        return Ok(Arc::new(MemoryLeadStorage::new()));
    }

    let db = Database::new(config).await?;
    tracing::info!("Database connection pool established");
    Ok(Arc::new(PgLeadStorage::new(db.pool)))
}
