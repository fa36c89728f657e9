//! PostgreSQL/PostGIS record store

pub mod config;
pub mod migrations;
pub mod sightings;

pub use config::{ConfigError, PoolConfig, PostgresConfig};
pub use migrations::{MigrationError, MigrationStatus};

use adoptindie_core::error::{AdoptError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Sighting store backed by a PostGIS `sightings` table
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open the pool and ping the server, without touching the schema
    pub async fn new(config: PostgresConfig) -> Result<Self> {
        config.validate().map_err(|e| AdoptError::ConfigInvalid {
            key: "database_url".to_string(),
            reason: e.to_string(),
        })?;

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout)
            .idle_timeout(config.pool.idle_timeout)
            .max_lifetime(config.pool.max_lifetime)
            .connect(&config.database_url)
            .await
            .map_err(|e| AdoptError::RecordStore(format!("Failed to connect to database: {}", e)))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| AdoptError::RecordStore(format!("Connection test failed: {}", e)))?;

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.pool.max_connections,
            "PostgreSQL connection pool ready"
        );

        Ok(Self { pool })
    }

    /// Open the pool, then migrate if `run_migrations` is set
    pub async fn connect(config: PostgresConfig) -> Result<Self> {
        let run_migrations = config.run_migrations;
        let store = Self::new(config).await?;
        if run_migrations {
            store.run_migrations().await?;
        }
        Ok(store)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        migrations::apply(&self.pool)
            .await
            .map_err(|e| AdoptError::RecordStore(e.to_string()))?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }

    pub async fn migration_status(&self) -> Result<Vec<MigrationStatus>> {
        migrations::status(&self.pool).await.map_err(|e| {
            AdoptError::RecordStore(format!("Failed to check migration status: {}", e))
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close every pooled connection; used on shutdown
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }
}
