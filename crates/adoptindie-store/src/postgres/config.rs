//! Connection settings for the PostGIS record store

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid pool size: {0}")]
    InvalidPool(String),
}

/// How to reach the database and how the pool behaves
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub pool: PoolConfig,
    /// Apply pending migrations right after connecting
    pub run_migrations: bool,
}

impl PostgresConfig {
    /// Accepts `postgres://` and `postgresql://` URLs only
    pub fn new(database_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            database_url: database_url.into().trim().to_string(),
            pool: PoolConfig::default(),
            run_migrations: true,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rest = self
            .database_url
            .strip_prefix("postgres://")
            .or_else(|| self.database_url.strip_prefix("postgresql://"))
            .ok_or_else(|| {
                ConfigError::InvalidUrl("expected a postgres:// or postgresql:// URL".to_string())
            })?;

        if rest.is_empty() || rest.starts_with('/') {
            return Err(ConfigError::InvalidUrl("missing host".to_string()));
        }

        self.pool.validate()
    }

    /// The URL with any password replaced, safe to log
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.database_url.split_once("://") else {
            return self.database_url.clone();
        };
        let Some((credentials, host)) = rest.rsplit_once('@') else {
            return self.database_url.clone();
        };

        match credentials.split_once(':') {
            Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
            None => self.database_url.clone(),
        }
    }
}

/// Pool sizing; defaults suit a single API instance on a small managed database
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidPool("max_connections must be at least 1".to_string()));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidPool(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }

        Ok(())
    }
}
