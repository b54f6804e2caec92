use anyhow::{anyhow, Context, Result};
use ::config::{Config, Environment, File};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime settings, layered as built-in defaults, then an optional
/// `technicals.{toml,json,yaml}` file, then `TECHNICALS_*` variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Directory holding `<SYMBOL>.json` quote files.
    pub data_dir: PathBuf,
    /// Window used when a request omits `startDate`.
    pub lookback_days: i64,
    /// IANA zone whose calendar date counts as "today".
    pub timezone: String,
    /// Filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub pretty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            lookback_days: 90,
            timezone: "America/New_York".to_string(),
            log_filter: "info".to_string(),
            pretty: false,
        }
    }
}

impl AppConfig {
    /// Loads settings. An explicit `path` must exist; otherwise `technicals.*`
    /// in the working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default("lookback_days", defaults.lookback_days)?
            .set_default("timezone", defaults.timezone)?
            .set_default("log_filter", defaults.log_filter)?
            .set_default("pretty", defaults.pretty)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("technicals").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("TECHNICALS"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown timezone '{}': {}", self.timezone, e))
    }
}
