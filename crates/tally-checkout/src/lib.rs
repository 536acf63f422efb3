//! # tally-checkout
//!
//! The purchase workflow around the tally pricing engine.
//!
//! This crate provides:
//! - `CheckoutService` for running a purchase end to end
//! - Collaborator traits (`CustomerDirectory`, `CartStore`, `StockGateway`,
//!   `PaymentGateway`) for the systems a purchase talks to
//! - `CheckoutConfig` for environment-driven configuration
//! - `CheckoutError` for typed error handling
//! - The `quote` binary for pricing a cart file from the shell
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally_checkout::{CheckoutConfig, CheckoutService};
//!
//! let config = CheckoutConfig::load()?;
//! let service = CheckoutService::new(
//!     config.engine()?,
//!     Arc::new(customers),
//!     Arc::new(carts),
//!     Arc::new(stock),
//!     Arc::new(payments),
//! );
//!
//! let receipt = service.finalize_purchase("cart-1", "cust-1")?;
//! println!("charged {} ({})", receipt.total, receipt.transaction_id);
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod service;
pub mod telemetry;

// Re-exports for convenience
pub use config::{CheckoutConfig, ConfigError};
pub use error::{CheckoutError, CheckoutResult, GatewayError};
pub use gateway::{
    Authorization, Availability, CartStore, Customer, CustomerDirectory, PaymentGateway,
    StockDeduction, StockGateway, StockRequest,
};
pub use service::{CheckoutService, PurchaseReceipt};
