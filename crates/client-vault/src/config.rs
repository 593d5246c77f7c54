//! Configuration loading and validation for the client-vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.
//! The resulting [`Config`] is built once and never mutated afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::FieldKey;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded 32-byte field encryption key. **Required.**
    ///
    /// Must stay the same for the lifetime of the data: rows sealed under a
    /// different key read back as unreadable.
    pub encryption_key: String,

    /// SQLite connection URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Upper bound on pooled database connections.
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Port the HTTP server listens on.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Comma-separated list of origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest `limit` a list call may request; larger values are clamped.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP endpoint for span export. Unset disables export.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://client-vault.db".into()
}
fn default_database_max_connections() -> u32 {
    5
}
fn default_http_port() -> u16 {
    8000
}
fn default_allowed_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".into()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_page_size() -> u32 {
    1000
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Decode the configured encryption key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not base64 of exactly 32 bytes.
    pub fn field_key(&self) -> Result<FieldKey> {
        FieldKey::from_base64(&self.encryption_key).context("ENCRYPTION_KEY is invalid")
    }

    /// The configured CORS origins, trimmed, empty entries dropped.
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// OTLP endpoint, treating an empty value as unset.
    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otel_exporter_otlp_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.encryption_key, "ENCRYPTION_KEY")?;
        ensure_non_empty(&self.database_url, "DATABASE_URL")?;
        self.field_key()?;

        if self.database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be > 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.max_page_size == 0 {
            anyhow::bail!("MAX_PAGE_SIZE must be > 0");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("http_port", &self.http_port)
            .field("allowed_origins", &self.allowed_origins)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_page_size", &self.max_page_size)
            .field("log_level", &self.log_level)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
