//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/atelier/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/atelier/` (~/.config/atelier/)
//! - State/Logs: `$XDG_STATE_HOME/atelier/` (~/.local/state/atelier/)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Item pricing
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Billing and cost reconciliation
    #[serde(default)]
    pub finance: FinanceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How a fractional carousel price is rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselRounding {
    /// Keep the fractional price as computed
    #[default]
    Exact,
    Floor,
    Ceil,
    /// Round half away from zero
    Round,
}

impl CarouselRounding {
    /// Apply this rounding mode to a price.
    pub fn apply(self, price: f64) -> f64 {
        match self {
            CarouselRounding::Exact => price,
            CarouselRounding::Floor => price.floor(),
            CarouselRounding::Ceil => price.ceil(),
            CarouselRounding::Round => price.round(),
        }
    }
}

/// Pricing of design work items
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Flat price of a post, miniature or logo; a carousel costs this per two pages
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,

    /// Rounding applied to carousel prices
    #[serde(default)]
    pub carousel_rounding: CarouselRounding,

    /// Upper bound on items of one type in a single specification
    #[serde(default = "default_max_items_per_type")]
    pub max_items_per_type: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            unit_price: default_unit_price(),
            carousel_rounding: CarouselRounding::default(),
            max_items_per_type: default_max_items_per_type(),
        }
    }
}

fn default_unit_price() -> f64 {
    40.0
}

fn default_max_items_per_type() -> u32 {
    500
}

/// Rates used for billing-period aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceConfig {
    /// Per-video rate for operators without their own rate
    #[serde(default = "default_video_rate")]
    pub default_video_rate: f64,

    /// Unit rates applied to contracted monthly quotas
    #[serde(default)]
    pub quota_rates: QuotaRates,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            default_video_rate: default_video_rate(),
            quota_rates: QuotaRates::default(),
        }
    }
}

fn default_video_rate() -> f64 {
    50.0
}

/// Unit rate per quota category
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaRates {
    #[serde(default = "default_video_rate")]
    pub video: f64,
    #[serde(default = "default_unit_price")]
    pub post: f64,
    #[serde(default = "default_unit_price")]
    pub miniature: f64,
    #[serde(default = "default_unit_price")]
    pub logo: f64,
    #[serde(default = "default_unit_price")]
    pub thumbnail: f64,
}

impl Default for QuotaRates {
    fn default() -> Self {
        Self {
            video: default_video_rate(),
            post: default_unit_price(),
            miniature: default_unit_price(),
            logo: default_unit_price(),
            thumbnail: default_unit_price(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make prices or costs meaningless
    pub fn validate(&self) -> Result<()> {
        if !is_valid_amount(self.pricing.unit_price) {
            return Err(Error::Config(
                "pricing.unit_price must be a non-negative number".to_string(),
            ));
        }
        if self.pricing.max_items_per_type == 0 {
            return Err(Error::Config(
                "pricing.max_items_per_type must be at least 1".to_string(),
            ));
        }
        if !is_valid_amount(self.finance.default_video_rate) {
            return Err(Error::Config(
                "finance.default_video_rate must be a non-negative number".to_string(),
            ));
        }

        let rates = &self.finance.quota_rates;
        for (name, rate) in [
            ("video", rates.video),
            ("post", rates.post),
            ("miniature", rates.miniature),
            ("logo", rates.logo),
            ("thumbnail", rates.thumbnail),
        ] {
            if !is_valid_amount(rate) {
                return Err(Error::Config(format!(
                    "finance.quota_rates.{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/atelier/config.toml` (~/.config/atelier/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("atelier").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/atelier/` (~/.local/state/atelier/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("atelier")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/atelier/atelier.log` (~/.local/state/atelier/atelier.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("atelier.log")
    }

    /// Ensure XDG environment variables are set
    ///
    /// Sets XDG_STATE_HOME and XDG_CONFIG_HOME to their defaults when
    /// unset, so child processes and logs agree on the same locations.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
