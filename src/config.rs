//! Process configuration read from the environment.
//!
//! | Variable                  | Default   |
//! |---------------------------|-----------|
//! | `PORT`                    | `8000`    |
//! | `LOG_FORMAT`              | `pretty`  |
//! | `CATALOG_PATH`            | unset: built-in price list |
//! | `COUPONS_PATH`            | unset: coupons unavailable |
//! | `PAYMENT_MODE`            | `sandbox` |
//! | `FREE_DELIVERY_THRESHOLD` | `35.00`   |
//! | `FLAT_DELIVERY_FEE`       | `5.00`    |
//! | `EXPRESS_SURCHARGE`       | `1.00`    |
//! | `SESSION_RETENTION_SECS`  | `900`     |

use crate::{
    pricing::{PricingConfig, PricingError},
    telemetry::LogFormat,
};
use rust_decimal::Decimal;
use std::{path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How payments are taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentMode {
    /// In-process sandbox processor
    #[default]
    Sandbox,
    /// No processor; payment endpoints report it as unavailable
    Disabled,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub log_format: LogFormat,
    pub catalog_path: Option<PathBuf>,
    pub coupons_path: Option<PathBuf>,
    pub payment_mode: PaymentMode,
    pub pricing: PricingConfig,
    /// How long paid or ended checkouts stay readable before eviction
    pub session_retention_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            log_format: LogFormat::default(),
            catalog_path: None,
            coupons_path: None,
            payment_mode: PaymentMode::default(),
            pricing: PricingConfig::default(),
            session_retention_secs: 900,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => parse("PORT", &value)?,
            None => defaults.port,
        };

        let payment_mode = match get("PAYMENT_MODE").as_deref().map(str::trim) {
            None => PaymentMode::Sandbox,
            Some(v) if v.eq_ignore_ascii_case("sandbox") => PaymentMode::Sandbox,
            Some(v) if v.eq_ignore_ascii_case("disabled") => PaymentMode::Disabled,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    var: "PAYMENT_MODE",
                    value: v.to_string(),
                })
            }
        };

        let amount = |var: &'static str, default: Decimal| -> Result<Decimal, ConfigError> {
            match get(var) {
                Some(value) => parse(var, &value),
                None => Ok(default),
            }
        };
        let pricing = PricingConfig::new(
            amount("FREE_DELIVERY_THRESHOLD", defaults.pricing.free_delivery_threshold)?,
            amount("FLAT_DELIVERY_FEE", defaults.pricing.flat_delivery_fee)?,
            amount("EXPRESS_SURCHARGE", defaults.pricing.express_surcharge)?,
        )?;

        let session_retention_secs = match get("SESSION_RETENTION_SECS") {
            Some(value) => parse("SESSION_RETENTION_SECS", &value)?,
            None => defaults.session_retention_secs,
        };

        Ok(Self {
            port,
            log_format: get("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            catalog_path: get("CATALOG_PATH").map(PathBuf::from),
            coupons_path: get("COUPONS_PATH").map(PathBuf::from),
            payment_mode,
            pricing,
            session_retention_secs,
        })
    }
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}
