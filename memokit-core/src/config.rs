//! Configuration for memokit.
//!
//! Maps directly to `memokit.toml`. Every section and field is optional;
//! missing values fall back to the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MemokitError, Result};

/// Top-level memokit configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemokitConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Delayed number generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl MemokitConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `MemokitError::Config` if the TOML is invalid or fails
    /// [`MemokitConfig::validate`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| MemokitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject values no component can work with.
    ///
    /// # Errors
    /// Returns `MemokitError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.generator.count == 0 {
            return Err(MemokitError::Config("generator.count must be at least 1".into()));
        }
        if !self.generator.upper_bound.is_finite() || self.generator.upper_bound <= 0.0 {
            return Err(MemokitError::Config(format!(
                "generator.upper_bound must be a positive finite number, got {}",
                self.generator.upper_bound
            )));
        }
        if self.http.timeout_ms == 0 {
            return Err(MemokitError::Config("http.timeout_ms must be at least 1".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Delayed number generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// How many numbers one stream yields.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Pause before each number, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Exclusive upper bound of the generated values (lower bound is 0).
    #[serde(default = "default_upper_bound")]
    pub upper_bound: f64,
}

impl GeneratorConfig {
    /// The pause before each number.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            delay_ms: default_delay_ms(),
            upper_bound: default_upper_bound(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    /// The per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_count() -> usize { 10 }
fn default_delay_ms() -> u64 { 1000 }
fn default_upper_bound() -> f64 { 10.0 }
fn default_timeout_ms() -> u64 { 10_000 }
fn default_user_agent() -> String { format!("memokit/{}", env!("CARGO_PKG_VERSION")) }
