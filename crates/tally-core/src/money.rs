//! # Money Module
//!
//! Provides the `Money` and `Rate` types for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Why not integer cents either?                                          │
//! │    17.85 × 0.5 = 8.925 → must survive until the final rounding,        │
//! │    otherwise 100.00 + 8.925 rounds differently than 100.00 + 8.93      │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Exact base-10 arithmetic at every stage, rounded exactly once       │
//! │    (half-up, 2 places) when the total leaves the engine                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal_macros::dec;
//! use tally_core::money::{Money, Rate};
//!
//! let price = Money::new(dec!(10.00));
//! let line = price.multiply_quantity(8).unwrap_or_default(); // 80.00
//! let discount = line.apply_rate(Rate::new(dec!(0.15)));    // 12.00
//! assert_eq!((line - discount).amount(), dec!(68.00));
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// =============================================================================
// Rounding
// =============================================================================

/// Rounds half away from zero to `dp` places and pins the scale to `dp`.
///
/// This is the only rounding mode the pricing pipeline uses. For the
/// non-negative values the engine produces it is plain "round half up".
///
/// ```rust
/// use rust_decimal_macros::dec;
/// use tally_core::money::round_half_up;
///
/// assert_eq!(round_half_up(dec!(108.925), 2).to_string(), "108.93");
/// assert_eq!(round_half_up(dec!(84), 2).to_string(), "84.00");
/// ```
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount held as an exact decimal.
///
/// ## Design Decisions
/// - **Decimal, not f64**: no binary representation error
/// - **Unrounded by default**: intermediate values keep full precision
/// - **Signed**: discounts are computed as amounts and subtracted
///
/// ## Where Money is Used
/// ```text
/// Product.unit_price ──► line total ──► subtotal ──► discounts ──┐
///                                                                 ├──► total
/// FreightBand.rate_per_kg ──► base freight ──► region ──► loyalty ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money value from an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies a unit amount by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::new(dec!(2.99));
    /// assert_eq!(unit_price.multiply_quantity(3), Some(Money::new(dec!(8.97))));
    /// assert_eq!(unit_price.multiply_quantity(i64::MAX).map(|m| m.is_zero()), Some(false));
    /// ```
    ///
    /// Returns `None` if the product does not fit in a `Decimal`.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns the share of this amount given by `rate`, without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tally_core::money::{Money, Rate};
    ///
    /// let freight = Money::new(dec!(17.85));
    /// assert_eq!(freight.apply_rate(Rate::new(dec!(0.5))).amount(), dec!(8.925));
    /// ```
    #[inline]
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money(self.0 * rate.fraction())
    }

    /// Scales the amount by an arbitrary factor (e.g. a regional multiplier).
    ///
    /// Returns `None` on overflow.
    #[inline]
    pub fn scale(&self, factor: Decimal) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Rounds half-up to `dp` decimal places.
    #[inline]
    pub fn round_half_up(&self, dp: u32) -> Money {
        Money(round_half_up(self.0, dp))
    }

    /// Converts to integer cents after half-up rounding.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    pub fn to_cents(&self) -> Option<i64> {
        (round_half_up(self.0, 2) * Decimal::ONE_HUNDRED).to_i64()
    }
}

/// Display shows the exact decimal; callers format currency themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A fractional rate: `0.05` is 5%, `1` is the whole amount.
///
/// Used for discount percentages and for the share of freight a loyalty
/// tier actually pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// Creates a rate from a fraction (0.10 = 10%).
    #[inline]
    pub const fn new(fraction: Decimal) -> Self {
        Rate(fraction)
    }

    /// Creates a rate from whole percentage points.
    ///
    /// ```rust
    /// use rust_decimal_macros::dec;
    /// use tally_core::money::Rate;
    ///
    /// assert_eq!(Rate::from_percent(15).fraction(), dec!(0.15));
    /// ```
    pub fn from_percent(points: u32) -> Self {
        Rate(Decimal::new(i64::from(points), 2))
    }

    /// The 0% rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(Decimal::ZERO)
    }

    /// The 100% rate.
    #[inline]
    pub const fn full() -> Self {
        Rate(Decimal::ONE)
    }

    /// Returns the rate as a fraction.
    #[inline]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the rate lies within 0..=1.
    pub fn is_proportion(&self) -> bool {
        self.0 >= Decimal::ZERO && self.0 <= Decimal::ONE
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

/// Display shows the rate as a percentage (for logs only).
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
