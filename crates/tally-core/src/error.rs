//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── PricingError     - Cart rejected by the engine                    │
//! │  │   ├── LineDefect   - Which rule the offending line broke            │
//! │  │   └── AmountOverflow - Aggregate exceeds the Decimal range          │
//! │  └── PolicyError      - Malformed pricing tables                       │
//! │                                                                         │
//! │  tally-checkout errors (separate crate)                                │
//! │  ├── CheckoutError    - Workflow failures (stock, payment, lookup)     │
//! │  └── ConfigError      - Environment / policy file problems             │
//! │                                                                         │
//! │  Flow: PricingError → CheckoutError → caller                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (line index, field, value)
//! 3. Errors are enum variants, never String
//! 4. The first offending line aborts pricing; violations are not aggregated

use std::fmt;

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors raised by the pricing engine.
///
/// Empty and absent carts are valid and price to zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A cart line is unusable for pricing.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart
    ///  ├── line 0  ✓
    ///  ├── line 1  ✗ quantity = 0
    ///  │     │
    ///  │     ▼
    ///  │   InvalidCartLine { line: 1, defect: NonPositiveQuantity }
    ///  └── line 2  (never inspected)
    /// ```
    #[error("Invalid cart line {line}: {defect}")]
    InvalidCartLine { line: usize, defect: LineDefect },

    /// Every line is valid on its own, but an aggregate (subtotal, weight,
    /// freight) exceeds the range of `Decimal`.
    #[error("Cart is too large to price: {stage} overflowed")]
    AmountOverflow { stage: &'static str },
}

impl PricingError {
    /// Returns the defect of the offending line, if a single line is at fault.
    pub fn defect(&self) -> Option<LineDefect> {
        match self {
            PricingError::InvalidCartLine { defect, .. } => Some(*defect),
            PricingError::AmountOverflow { .. } => None,
        }
    }
}

/// The rule a cart line violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineDefect {
    /// The line entry itself or its product reference is absent.
    MissingProduct,
    /// Quantity is zero or negative.
    NonPositiveQuantity,
    /// Unit price is absent or negative.
    InvalidPrice,
    /// Physical weight is absent or negative.
    InvalidWeight,
    /// Price × quantity or weight × quantity does not fit in a `Decimal`.
    OutOfRange,
}

impl fmt::Display for LineDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LineDefect::MissingProduct => "line or product is missing",
            LineDefect::NonPositiveQuantity => "quantity must be greater than zero",
            LineDefect::InvalidPrice => "price is missing or negative",
            LineDefect::InvalidWeight => "weight is missing or negative",
            LineDefect::OutOfRange => "line amount or weight is too large to price",
        };
        f.write_str(msg)
    }
}

// =============================================================================
// Policy Error
// =============================================================================

/// A pricing policy that cannot be used.
///
/// Raised by [`crate::policy::PricingPolicy::validate`], which runs whenever an
/// engine is built from a policy that did not come from `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A tier table is not strictly ordered.
    #[error("{table} must be strictly ordered by threshold")]
    Unordered { table: &'static str },

    /// A fractional rate lies outside 0..=1.
    #[error("{table} rate {rate} must be between 0 and 1")]
    RateOutOfRange { table: &'static str, rate: String },

    /// An amount that must not be negative is negative.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: String },

    /// The cubic divisor must be strictly positive.
    #[error("cubic divisor must be positive (got {0})")]
    NonPositiveDivisor(String),

    /// The freight band table must end with exactly one open-ended band.
    #[error("freight bands must end with exactly one open-ended band")]
    MissingOpenBand,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with PricingError.
pub type PricingResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
