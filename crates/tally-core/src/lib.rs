//! # tally-core: Pure Pricing Logic for Tally
//!
//! This crate computes what a customer pays at checkout: merchandise after
//! volume and cart-value discounts, plus freight after weight bands, fragile
//! handling, regional multipliers and loyalty benefits. It contains no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 tally-checkout (orchestration)                  │   │
//! │  │   customer ──► cart ──► stock check ──► PRICE ──► pay ──► deduct│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ compute_total / quote                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │validation│ │ discount │ │ shipping │ │  policy  │          │   │
//! │  │   │ lines    │ │ subtotal │ │ weight   │ │ tables   │          │   │
//! │  │   │ checks   │ │ type/val │ │ freight  │ │ defaults │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Cart snapshot types (Product, CartLine, Cart, Region, CustomerTier)
//! - [`money`] - Exact decimal `Money` and `Rate`
//! - [`policy`] - Discount, freight, region and loyalty tables
//! - [`validation`] - Cart line checks
//! - [`discount`] - Subtotal, type and value discounts
//! - [`shipping`] - Billable weight and freight
//! - [`engine`] - `PricingEngine` tying the stages together
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same cart, region and tier always give the same total
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Exact Money**: decimals throughout, rounded twice at most (cubic
//!    weight to 4 places, total to 2 places, both half-up)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use tally_core::{Cart, CartLine, CustomerTier, Money, PricingEngine, Product, ProductType, Region};
//!
//! let book = Product::new("book-42", Money::new(dec!(10.00)), dec!(1.00), ProductType::Book)
//!     .with_dimensions(dec!(10), dec!(10), dec!(10));
//! let cart = Cart::with_lines("cart-1", [CartLine::new(book, 8)]);
//!
//! let total = PricingEngine::default()
//!     .compute_total(Some(&cart), Some(Region::Southeast), CustomerTier::Bronze)
//!     .unwrap();
//!
//! // 80.00 − 15% volume discount + 8 kg × 2/kg freight
//! assert_eq!(total.to_string(), "84.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod engine;
pub mod error;
pub mod money;
pub mod policy;
pub mod shipping;
pub mod types;
pub mod validation;

#[cfg(test)]
mod properties;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use engine::{PriceQuote, PricingEngine};
pub use error::{LineDefect, PolicyError, PricingError, PricingResult};
pub use money::{Money, Rate};
pub use policy::PricingPolicy;
pub use types::*;
