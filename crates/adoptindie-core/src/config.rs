use crate::error::{AdoptError, Result};
use crate::models::{DEFAULT_MAX_DISTANCE_M, DEFAULT_MAX_RESULTS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Origins allowed by CORS when nothing else is configured
pub const DEFAULT_CORS_ORIGINS: &[&str] =
    &["https://adoptindie.onrender.com", "http://localhost:5173"];

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BUCKET: &str = "bucket1";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5000/files";
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

/// Blob store backend, derived from which credentials are present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobBackend {
    Memory { public_base_url: String },
    Supabase { url: String, key: String },
}

/// Layered configuration for the AdoptIndie service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: ConfigValue<u16>,
    pub cors_origins: ConfigValue<Vec<String>>,
    pub storage: ConfigValue<StorageBackend>,
    pub database_url: ConfigValue<Option<String>>,
    pub supabase_url: ConfigValue<Option<String>>,
    pub supabase_key: ConfigValue<Option<String>>,
    pub bucket: ConfigValue<String>,
    pub public_base_url: ConfigValue<String>,
    pub default_max_distance_m: ConfigValue<f64>,
    pub max_results: ConfigValue<usize>,
    pub upload_max_bytes: ConfigValue<usize>,
}

impl ServiceConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let d = ConfigSource::Default;
        Self {
            port: ConfigValue::new(DEFAULT_PORT, d),
            cors_origins: ConfigValue::new(
                DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
                d,
            ),
            storage: ConfigValue::new(StorageBackend::Memory, d),
            database_url: ConfigValue::new(None, d),
            supabase_url: ConfigValue::new(None, d),
            supabase_key: ConfigValue::new(None, d),
            bucket: ConfigValue::new(DEFAULT_BUCKET.to_string(), d),
            public_base_url: ConfigValue::new(DEFAULT_PUBLIC_BASE_URL.to_string(), d),
            default_max_distance_m: ConfigValue::new(DEFAULT_MAX_DISTANCE_M, d),
            max_results: ConfigValue::new(DEFAULT_MAX_RESULTS, d),
            upload_max_bytes: ConfigValue::new(DEFAULT_UPLOAD_MAX_BYTES, d),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| AdoptError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| AdoptError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let f = ConfigSource::File;

        if let Some(port) = file_config.port {
            self.port.update(port, f);
        }
        if let Some(origins) = file_config.cors_origins {
            self.cors_origins.update(origins, f);
        }
        if let Some(storage) = file_config.storage {
            self.storage.update(storage, f);
        }
        if let Some(url) = file_config.database_url {
            self.database_url.update(Some(url), f);
        }

        if let Some(blob) = file_config.blob {
            if let Some(url) = blob.supabase_url {
                self.supabase_url.update(Some(url), f);
            }
            if let Some(key) = blob.supabase_key {
                self.supabase_key.update(Some(key), f);
            }
            if let Some(bucket) = blob.bucket {
                self.bucket.update(bucket, f);
            }
            if let Some(base) = blob.public_base_url {
                self.public_base_url.update(base, f);
            }
        }

        if let Some(nearby) = file_config.nearby {
            if let Some(meters) = nearby.default_max_distance_m {
                self.default_max_distance_m.update(meters, f);
            }
            if let Some(max) = nearby.max_results {
                self.max_results.update(max, f);
            }
        }

        if let Some(upload) = file_config.upload {
            if let Some(max) = upload.max_bytes {
                self.upload_max_bytes.update(max, f);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    ///
    /// Unparseable values are logged and skipped.
    pub fn load_from_env(mut self) -> Self {
        let e = ConfigSource::Environment;

        if let Some(port) = env_parsed::<u16>("PORT", "expected a port number") {
            self.port.update(port, e);
        }

        if let Ok(raw) = env::var("ADOPTINDIE_CORS_ORIGINS") {
            self.cors_origins.update(parse_origin_list(&raw), e);
        }

        if let Ok(raw) = env::var("ADOPTINDIE_STORAGE") {
            match parse_storage_backend(&raw) {
                Ok(storage) => self.storage.update(storage, e),
                Err(_) => tracing::warn!(
                    "Invalid ADOPTINDIE_STORAGE value '{}': expected memory or postgres",
                    raw
                ),
            }
        }

        if let Some(url) = env_non_empty("DATABASE_URL") {
            self.database_url.update(Some(url), e);
        }
        if let Some(url) = env_non_empty("SUPABASE_URL") {
            self.supabase_url.update(Some(url), e);
        }
        if let Some(key) = env_non_empty("SUPABASE_KEY") {
            self.supabase_key.update(Some(key), e);
        }
        if let Some(bucket) = env_non_empty("ADOPTINDIE_BUCKET") {
            self.bucket.update(bucket, e);
        }
        if let Some(base) = env_non_empty("ADOPTINDIE_PUBLIC_BASE_URL") {
            self.public_base_url.update(base, e);
        }

        if let Some(meters) =
            env_parsed::<f64>("ADOPTINDIE_DEFAULT_MAX_DISTANCE", "expected meters as a number")
        {
            self.default_max_distance_m.update(meters, e);
        }
        if let Some(max) = env_parsed::<usize>("ADOPTINDIE_MAX_RESULTS", "expected an integer") {
            self.max_results.update(max, e);
        }
        if let Some(max) =
            env_parsed::<usize>("ADOPTINDIE_UPLOAD_MAX_BYTES", "expected a byte count")
        {
            self.upload_max_bytes.update(max, e);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(port) = overrides.port {
            self.port.update(port, ConfigSource::Cli);
        }

        if let Some(storage) = overrides.storage {
            self.storage.update(storage, ConfigSource::Cli);
        }

        if let Some(url) = overrides.database_url {
            self.database_url.update(Some(url), ConfigSource::Cli);
        }
    }

    /// Record store backend in effect
    ///
    /// A database URL switches the default to PostgreSQL unless a backend
    /// was chosen explicitly.
    pub fn storage_backend(&self) -> StorageBackend {
        if self.storage.source == ConfigSource::Default && self.database_url.value.is_some() {
            StorageBackend::Postgres
        } else {
            self.storage.value
        }
    }

    /// Blob store backend in effect
    pub fn blob_backend(&self) -> BlobBackend {
        match (&self.supabase_url.value, &self.supabase_key.value) {
            (Some(url), Some(key)) => BlobBackend::Supabase {
                url: url.trim_end_matches('/').to_string(),
                key: key.clone(),
            },
            _ => BlobBackend::Memory {
                public_base_url: self.public_base_url.value.trim_end_matches('/').to_string(),
            },
        }
    }

    /// Server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port.value)
    }

    /// Check the combined configuration for contradictions
    pub fn validate(&self) -> Result<()> {
        if self.storage_backend() == StorageBackend::Postgres && self.database_url.value.is_none()
        {
            return Err(AdoptError::ConfigMissing { key: "database_url".to_string() });
        }

        if self.cors_origins.value.is_empty() {
            return Err(AdoptError::ConfigInvalid {
                key: "cors_origins".to_string(),
                reason: "at least one origin is required".to_string(),
            });
        }

        let meters = self.default_max_distance_m.value;
        if !meters.is_finite() || meters < 0.0 {
            return Err(AdoptError::ConfigInvalid {
                key: "nearby.default_max_distance_m".to_string(),
                reason: format!("must be a non-negative number, got {}", meters),
            });
        }

        if self.max_results.value == 0 {
            return Err(AdoptError::ConfigInvalid {
                key: "nearby.max_results".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.supabase_url.value.is_some() != self.supabase_key.value.is_some() {
            return Err(AdoptError::ConfigInvalid {
                key: "blob".to_string(),
                reason: "supabase_url and supabase_key must be set together".to_string(),
            });
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    ///
    /// Secrets are redacted.
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("port".to_string(), (self.port.value.to_string(), self.port.source));
        map.insert(
            "cors_origins".to_string(),
            (self.cors_origins.value.join(","), self.cors_origins.source),
        );
        map.insert(
            "storage".to_string(),
            (format!("{:?}", self.storage_backend()), self.storage.source),
        );
        map.insert(
            "database_url".to_string(),
            (redact(self.database_url.value.as_deref()), self.database_url.source),
        );
        map.insert(
            "supabase_url".to_string(),
            (
                self.supabase_url.value.clone().unwrap_or_else(|| "<unset>".to_string()),
                self.supabase_url.source,
            ),
        );
        map.insert(
            "supabase_key".to_string(),
            (redact(self.supabase_key.value.as_deref()), self.supabase_key.source),
        );
        map.insert("bucket".to_string(), (self.bucket.value.clone(), self.bucket.source));
        map.insert(
            "public_base_url".to_string(),
            (self.public_base_url.value.clone(), self.public_base_url.source),
        );
        map.insert(
            "default_max_distance_m".to_string(),
            (self.default_max_distance_m.value.to_string(), self.default_max_distance_m.source),
        );
        map.insert(
            "max_results".to_string(),
            (self.max_results.value.to_string(), self.max_results.source),
        );
        map.insert(
            "upload_max_bytes".to_string(),
            (self.upload_max_bytes.value.to_string(), self.upload_max_bytes.source),
        );

        map
    }
}

fn redact(value: Option<&str>) -> String {
    match value {
        Some(_) => "<redacted>".to_string(),
        None => "<unset>".to_string(),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str, expected: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': {}", key, raw, expected);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    port: Option<u16>,
    cors_origins: Option<Vec<String>>,
    storage: Option<StorageBackend>,
    database_url: Option<String>,
    blob: Option<BlobSection>,
    nearby: Option<NearbySection>,
    upload: Option<UploadSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct BlobSection {
    supabase_url: Option<String>,
    supabase_key: Option<String>,
    bucket: Option<String>,
    public_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct NearbySection {
    default_max_distance_m: Option<f64>,
    max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct UploadSection {
    max_bytes: Option<usize>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub port: Option<u16>,
    pub storage: Option<StorageBackend>,
    pub database_url: Option<String>,
}

/// Parse storage backend from string
pub fn parse_storage_backend(s: &str) -> Result<StorageBackend> {
    match s.trim().to_lowercase().as_str() {
        "memory" | "mem" => Ok(StorageBackend::Memory),
        "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
        _ => Err(AdoptError::ConfigInvalid {
            key: "storage".to_string(),
            reason: format!("Invalid storage backend: {}. Use memory or postgres", s),
        }),
    }
}

/// Parse a comma separated origin list, dropping blanks and trailing slashes
pub fn parse_origin_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::with_defaults();
        assert_eq!(config.port.value, 5000);
        assert_eq!(config.port.source, ConfigSource::Default);
        assert_eq!(config.storage_backend(), StorageBackend::Memory);
        assert_eq!(config.default_max_distance_m.value, 100_000.0);
        assert_eq!(config.cors_origins.value.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 8080
cors_origins = ["https://example.org"]
storage = "postgres"
database_url = "postgres://localhost/adoptindie"

[blob]
bucket = "dogs"

[nearby]
default_max_distance_m = 2500.0
max_results = 50
"#
        )
        .unwrap();

        let config = ServiceConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.port.value, 8080);
        assert_eq!(config.port.source, ConfigSource::File);
        assert_eq!(config.cors_origins.value, vec!["https://example.org".to_string()]);
        assert_eq!(config.storage_backend(), StorageBackend::Postgres);
        assert_eq!(config.bucket.value, "dogs");
        assert_eq!(config.default_max_distance_m.value, 2500.0);
        assert_eq!(config.max_results.value, 50);
        assert_eq!(config.upload_max_bytes.source, ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(ServiceConfig::with_defaults().load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_database_url_implies_postgres() {
        let mut config = ServiceConfig::with_defaults();
        config.database_url.update(Some("postgres://db/x".to_string()), ConfigSource::File);
        assert_eq!(config.storage_backend(), StorageBackend::Postgres);

        config.storage.update(StorageBackend::Memory, ConfigSource::Cli);
        assert_eq!(config.storage_backend(), StorageBackend::Memory);
    }

    #[test]
    fn test_validate_rejects_postgres_without_url() {
        let mut config = ServiceConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            storage: Some(StorageBackend::Postgres),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(AdoptError::ConfigMissing { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = ServiceConfig::with_defaults();
        config.max_results.update(0, ConfigSource::Cli);
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::with_defaults();
        config.default_max_distance_m.update(-5.0, ConfigSource::Cli);
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::with_defaults();
        config.supabase_url.update(Some("https://x.supabase.co".to_string()), ConfigSource::Cli);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blob_backend_selection() {
        let mut config = ServiceConfig::with_defaults();
        assert_eq!(
            config.blob_backend(),
            BlobBackend::Memory { public_base_url: "http://localhost:5000/files".to_string() }
        );

        config.supabase_url.update(Some("https://x.supabase.co/".to_string()), ConfigSource::File);
        config.supabase_key.update(Some("secret".to_string()), ConfigSource::File);
        assert_eq!(
            config.blob_backend(),
            BlobBackend::Supabase {
                url: "https://x.supabase.co".to_string(),
                key: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_parse_storage_backend() {
        assert_eq!(parse_storage_backend("memory").unwrap(), StorageBackend::Memory);
        assert_eq!(parse_storage_backend("PostgreSQL").unwrap(), StorageBackend::Postgres);
        assert!(parse_storage_backend("mongo").is_err());
    }

    #[test]
    fn test_parse_origin_list() {
        assert_eq!(
            parse_origin_list(" https://a.example/ , ,http://localhost:5173"),
            vec!["https://a.example".to_string(), "http://localhost:5173".to_string()]
        );
    }

    #[test]
    fn test_inspection_map_redacts_secrets() {
        let mut config = ServiceConfig::with_defaults();
        config.supabase_key.update(Some("service-role-key".to_string()), ConfigSource::Cli);
        let map = config.to_inspection_map();

        let (key, source) = &map["supabase_key"];
        assert_eq!(key, "<redacted>");
        assert_eq!(*source, ConfigSource::Cli);
        assert_eq!(map["database_url"].0, "<unset>");
        assert_eq!(map["port"].0, "5000");
    }
}
