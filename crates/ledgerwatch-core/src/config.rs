//! Configuration management for LedgerWatch

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{AlertChannel, Explorer, Key};

/// Default number of concurrent explorer lookups
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Prefix for environment overrides, e.g. `LEDGERWATCH__MIN_VALUE=0.5`
const ENV_PREFIX: &str = "LEDGERWATCH";

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Explorer used for every lookup
    pub explorer: Explorer,

    /// Balances strictly below this value raise an alert
    pub min_value: f64,

    /// Keys to check, in report order
    #[serde(alias = "keys", default)]
    pub ltc_keys: Vec<Key>,

    /// Where alerts are sent
    pub email_alert: AlertChannel,

    /// Maximum lookups in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Which outcomes are compared against `min_value`
    #[serde(default)]
    pub alert_policy: AlertPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl RunConfig {
    /// Load the YAML file at `path`, then apply `LEDGERWATCH__*` overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Same as [`RunConfig::load`], reading overrides from `env` instead of
    /// the process environment when given
    pub fn load_from(
        path: impl AsRef<Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break every lookup
    pub fn validate(&self) -> Result<()> {
        self.explorer.validate()?;
        self.email_alert.validate()?;

        if !self.min_value.is_finite() {
            return Err(Error::config("min_value must be a finite number"));
        }

        if let Some(key) = self.ltc_keys.iter().find(|k| k.address.trim().is_empty()) {
            return Err(Error::config(format!(
                "key {:?} has an empty address",
                key.name
            )));
        }

        Ok(())
    }
}

/// How the evaluator treats keys without a determined balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Compare every key's numeric value, so failed and undetermined
    /// lookups alert against any positive threshold
    #[default]
    Numeric,
    /// Only compare keys whose balance was read from the page
    DeterminedOnly,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
