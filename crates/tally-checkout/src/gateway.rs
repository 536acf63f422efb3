//! # Collaborator Traits
//!
//! The external systems a purchase talks to, as traits.
//!
//! ```text
//!                       ┌──────────────────┐
//!                       │ CheckoutService  │
//!                       └────────┬─────────┘
//!        ┌───────────────┬───────┴───────┬─────────────────┐
//!        ▼               ▼               ▼                 ▼
//! ┌──────────────┐ ┌───────────┐ ┌──────────────┐ ┌────────────────┐
//! │CustomerDirec-│ │ CartStore │ │ StockGateway │ │ PaymentGateway │
//! │tory          │ │           │ │ check/deduct │ │ authorize/     │
//! │              │ │           │ │              │ │ cancel         │
//! └──────────────┘ └───────────┘ └──────────────┘ └────────────────┘
//! ```
//!
//! All calls are synchronous. Implementations that need async I/O should
//! block on their own runtime; the pricing core never waits on anything.

use serde::{Deserialize, Serialize};
use tally_core::{Cart, CustomerTier, Money, Region};

use crate::error::GatewayError;

// =============================================================================
// Data Transfer Types
// =============================================================================

/// The customer placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Delivery region; `None` when the address has no known region.
    pub region: Option<Region>,
    pub tier: CustomerTier,
}

/// Units of one product the order needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Answer to an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
}

/// Answer to a stock deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDeduction {
    pub success: bool,
}

/// Answer to a payment authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub authorized: bool,
    pub transaction_id: Option<String>,
}

// =============================================================================
// Traits
// =============================================================================

/// Looks customers up by ID.
pub trait CustomerDirectory: Send + Sync {
    fn find_customer(&self, customer_id: &str) -> Result<Option<Customer>, GatewayError>;
}

/// Loads a customer's cart.
pub trait CartStore: Send + Sync {
    fn find_cart(&self, cart_id: &str, customer: &Customer) -> Result<Option<Cart>, GatewayError>;
}

/// Inventory service.
pub trait StockGateway: Send + Sync {
    /// Checks that every request can be fulfilled.
    fn check_availability(&self, requests: &[StockRequest]) -> Result<Availability, GatewayError>;

    /// Removes the requested units from stock.
    fn deduct(&self, requests: &[StockRequest]) -> Result<StockDeduction, GatewayError>;
}

/// Payment provider.
pub trait PaymentGateway: Send + Sync {
    /// Authorizes a charge of `amount` for the customer.
    fn authorize(&self, customer_id: &str, amount: Money) -> Result<Authorization, GatewayError>;

    /// Voids an earlier authorization.
    fn cancel(&self, customer_id: &str, transaction_id: &str) -> Result<(), GatewayError>;

    /// Provider name, for logs.
    fn provider_name(&self) -> &'static str {
        "payments"
    }
}
