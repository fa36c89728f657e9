//! Embedded schema migrations (`crates/adoptindie-store/migrations`)

use std::collections::HashSet;

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use thiserror::Error;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Apply(#[from] sqlx::migrate::MigrateError),

    #[error("Could not read applied migrations: {0}")]
    Query(#[from] sqlx::Error),
}

/// One embedded migration and whether the database has it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Apply every pending migration in version order
pub async fn apply(pool: &PgPool) -> Result<(), MigrationError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Status of every embedded migration
pub async fn status(pool: &PgPool) -> Result<Vec<MigrationStatus>, MigrationError> {
    let tracked: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations')::text").fetch_one(pool).await?;

    let applied: HashSet<i64> = if tracked.is_some() {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    Ok(statuses(&applied))
}

fn statuses(applied: &HashSet<i64>) -> Vec<MigrationStatus> {
    MIGRATOR
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect()
}
