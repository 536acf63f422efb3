//! Checkout configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable               | Meaning                                   | Default        |
//! |------------------------|-------------------------------------------|----------------|
//! | `TALLY_POLICY_PATH`    | JSON file holding a `PricingPolicy`       | built-in rules |
//! | `TALLY_DEFAULT_REGION` | Region used by `quote` without `--region` | none (×1.00)   |
//! | `TALLY_DEFAULT_TIER`   | Tier used by `quote` without `--tier`     | `BRONZE`       |

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tally_core::{CustomerTier, PolicyError, PricingEngine, PricingPolicy, Region};

/// Checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Pricing policy override file.
    pub policy_path: Option<PathBuf>,

    /// Region assumed when none is given.
    pub default_region: Option<Region>,

    /// Tier assumed when none is given.
    pub default_tier: CustomerTier,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(CheckoutConfig {
            policy_path: present("TALLY_POLICY_PATH").map(PathBuf::from),

            default_region: present("TALLY_DEFAULT_REGION")
                .map(|v| parse_region(&v).ok_or_else(|| invalid("TALLY_DEFAULT_REGION")))
                .transpose()?,

            default_tier: present("TALLY_DEFAULT_TIER")
                .map(|v| parse_tier(&v).ok_or_else(|| invalid("TALLY_DEFAULT_TIER")))
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Reads the configured policy, or the built-in one if none is set.
    pub fn pricing_policy(&self) -> Result<PricingPolicy, ConfigError> {
        let Some(path) = &self.policy_path else {
            return Ok(PricingPolicy::default());
        };

        let raw = fs::read_to_string(path).map_err(|e| ConfigError::PolicyFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::PolicyFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Builds an engine from the configured policy.
    pub fn engine(&self) -> Result<PricingEngine, ConfigError> {
        Ok(PricingEngine::new(self.pricing_policy()?)?)
    }
}

/// Parses a region code such as `north` or `NORTHEAST`.
///
/// Unknown codes are rejected here even though the engine would price
/// them at ×1.00: a typo in configuration should not pass silently.
pub fn parse_region(value: &str) -> Option<Region> {
    parse_code(value).filter(|r| *r != Region::Unrecognized)
}

/// Parses a tier code such as `gold` or `SILVER`.
pub fn parse_tier(value: &str) -> Option<CustomerTier> {
    parse_code(value).filter(|t| *t != CustomerTier::Unrecognized)
}

fn parse_code<T: DeserializeOwned>(value: &str) -> Option<T> {
    let code = value.trim().to_ascii_uppercase();
    serde_json::from_value(serde_json::Value::String(code)).ok()
}

fn invalid(key: &str) -> ConfigError {
    ConfigError::InvalidValue(key.to_string())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot load policy file {path}: {reason}")]
    PolicyFile { path: String, reason: String },

    #[error("Invalid pricing policy: {0}")]
    Policy(#[from] PolicyError),
}
