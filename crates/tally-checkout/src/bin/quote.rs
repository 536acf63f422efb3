//! # Quote
//!
//! Prices a cart snapshot from the command line.
//!
//! ## Usage
//! ```bash
//! # Price a cart with the configured defaults
//! cargo run -p tally-checkout --bin quote -- cart.json
//!
//! # Pick region and tier explicitly
//! cargo run -p tally-checkout --bin quote -- cart.json --region south --tier silver
//!
//! # Use a custom pricing policy
//! cargo run -p tally-checkout --bin quote -- cart.json --policy ./policy.json
//! ```
//!
//! The full `PriceQuote` is printed to stdout as JSON; logs go to stderr.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use tally_checkout::config::{parse_region, parse_tier};
use tally_checkout::telemetry::init_tracing;
use tally_checkout::CheckoutConfig;
use tally_core::Cart;
use tracing::{error, info};

const USAGE: &str = "\
Tally cart quote

Usage: quote <CART_JSON> [OPTIONS]

Options:
  -r, --region <REGION>  SOUTHEAST, SOUTH, NORTHEAST, MIDWEST or NORTH
  -t, --tier <TIER>      GOLD, SILVER or BRONZE
  -p, --policy <PATH>    Pricing policy JSON (overrides TALLY_POLICY_PATH)
  -h, --help             Show this help message";

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "quote failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let (cart_path, config) = match parse_args(&args, CheckoutConfig::load()?)? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Quote { cart_path, config } => (cart_path, config),
    };

    let engine = config.engine()?;
    let cart: Cart = serde_json::from_str(&fs::read_to_string(&cart_path)?)?;

    info!(
        cart = %cart_path.display(),
        lines = cart.lines.len(),
        region = ?config.default_region,
        tier = ?config.default_tier,
        "pricing cart"
    );

    let quote = engine.quote(Some(&cart), config.default_region, config.default_tier)?;
    println!("{}", serde_json::to_string_pretty(&quote)?);

    Ok(())
}

/// What the command line asked for.
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Quote {
        cart_path: PathBuf,
        config: CheckoutConfig,
    },
}

#[derive(Debug, PartialEq, thiserror::Error)]
enum ArgsError {
    #[error("{0} needs a value")]
    MissingValue(&'static str),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("unexpected argument: {0}")]
    Unexpected(String),

    #[error("missing cart file (see --help)")]
    MissingCart,
}

/// Applies command-line flags on top of the environment configuration.
fn parse_args(args: &[String], mut config: CheckoutConfig) -> Result<Command, ArgsError> {
    let mut cart_path: Option<PathBuf> = None;
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--region" | "-r" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--region"))?;
                let region = parse_region(value).ok_or_else(|| ArgsError::InvalidValue {
                    flag: "--region",
                    value: value.clone(),
                })?;
                config.default_region = Some(region);
            }
            "--tier" | "-t" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--tier"))?;
                config.default_tier = parse_tier(value).ok_or_else(|| ArgsError::InvalidValue {
                    flag: "--tier",
                    value: value.clone(),
                })?;
            }
            "--policy" | "-p" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--policy"))?;
                config.policy_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with('-') || cart_path.is_some() => {
                return Err(ArgsError::Unexpected(other.to_string()));
            }
            other => cart_path = Some(PathBuf::from(other)),
        }
    }

    let cart_path = cart_path.ok_or(ArgsError::MissingCart)?;
    Ok(Command::Quote { cart_path, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{CustomerTier, Region};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn parse(raw: &[&str]) -> Result<Command, ArgsError> {
        parse_args(&args(raw), CheckoutConfig::default())
    }

    #[test]
    fn test_cart_path_with_defaults() {
        assert_eq!(
            parse(&["cart.json"]).unwrap(),
            Command::Quote {
                cart_path: PathBuf::from("cart.json"),
                config: CheckoutConfig::default(),
            }
        );
    }

    #[test]
    fn test_flags_override_config() {
        let base = CheckoutConfig {
            default_region: Some(Region::North),
            ..CheckoutConfig::default()
        };
        let command = parse_args(
            &args(&["-r", "south", "cart.json", "--tier", "GOLD", "-p", "policy.json"]),
            base,
        )
        .unwrap();

        let Command::Quote { cart_path, config } = command else {
            panic!("expected a quote command");
        };
        assert_eq!(cart_path, PathBuf::from("cart.json"));
        assert_eq!(config.default_region, Some(Region::South));
        assert_eq!(config.default_tier, CustomerTier::Gold);
        assert_eq!(config.policy_path, Some(PathBuf::from("policy.json")));
    }

    #[test]
    fn test_help_wins() {
        assert_eq!(parse(&["cart.json", "--help"]).unwrap(), Command::Help);
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_argument_errors() {
        assert_eq!(parse(&[]).unwrap_err(), ArgsError::MissingCart);
        assert_eq!(
            parse(&["cart.json", "--region"]).unwrap_err(),
            ArgsError::MissingValue("--region")
        );
        assert_eq!(
            parse(&["cart.json", "--tier", "platinum"]).unwrap_err(),
            ArgsError::InvalidValue {
                flag: "--tier",
                value: "platinum".to_string()
            }
        );
        assert_eq!(
            parse(&["cart.json", "--region", "atlantis"]).unwrap_err(),
            ArgsError::InvalidValue {
                flag: "--region",
                value: "atlantis".to_string()
            }
        );
        assert_eq!(
            parse(&["a.json", "b.json"]).unwrap_err(),
            ArgsError::Unexpected("b.json".to_string())
        );
        assert_eq!(
            parse(&["cart.json", "--verbose"]).unwrap_err(),
            ArgsError::Unexpected("--verbose".to_string())
        );
    }
}
