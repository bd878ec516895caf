//! Till configuration
//!
//! Loaded from a YAML file. Every field is optional:
//!
//! ```yaml
//! currency: INR
//! tax_rate: 8%
//! low_stock_threshold: 10
//! fixtures_path: ./fixtures
//! catalog: demo
//! timezone: Asia/Kolkata
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use decimal_percentage::Percentage;
use jiff::tz::TimeZone;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    fixtures::Fixture,
    pricing::{PricingError, parse_currency, parse_rate},
    products::StockThresholds,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid currency or tax rate
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Unknown time zone
    #[error("Invalid time zone: {0}")]
    TimeZone(#[from] jiff::Error),
}

/// Till configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TillConfig {
    /// ISO currency code
    pub currency: String,

    /// Tax rate, as percent points ("8%") or a fraction ("0.08")
    pub tax_rate: String,

    /// Products with fewer units than this are low on stock
    pub low_stock_threshold: u32,

    /// Fixture base directory
    pub fixtures_path: PathBuf,

    /// Catalog fixture name under `<fixtures_path>/products/`
    pub catalog: String,

    /// IANA time zone for day boundaries; the system zone when absent
    pub timezone: Option<String>,
}

impl Default for TillConfig {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            tax_rate: "8%".to_string(),
            low_stock_threshold: 10,
            fixtures_path: PathBuf::from("./fixtures"),
            catalog: "demo".to_string(),
            timezone: None,
        }
    }
}

impl TillConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Parse configuration from YAML text. Values are validated eagerly.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is malformed or a value is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_norway::from_str(contents)?;

        config.currency()?;
        config.tax_rate()?;

        Ok(config)
    }

    /// Configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnknownCurrency`] for unsupported codes.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(parse_currency(&self.currency)?)
    }

    /// Configured tax rate.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidRate`] if the rate is malformed or negative.
    pub fn tax_rate(&self) -> Result<Percentage, ConfigError> {
        Ok(parse_rate(&self.tax_rate)?)
    }

    /// Stock thresholds.
    pub fn thresholds(&self) -> StockThresholds {
        StockThresholds {
            low_stock: self.low_stock_threshold,
        }
    }

    /// Fixture loader rooted at `fixtures_path`.
    pub fn fixture(&self) -> Fixture {
        Fixture::with_base_path(&self.fixtures_path)
    }

    /// Time zone for day boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TimeZone`] if the zone name is unknown.
    pub fn time_zone(&self) -> Result<TimeZone, ConfigError> {
        match self.timezone.as_deref() {
            None => Ok(TimeZone::system()),
            Some("UTC") => Ok(TimeZone::UTC),
            Some(name) => Ok(TimeZone::get(name)?),
        }
    }
}
