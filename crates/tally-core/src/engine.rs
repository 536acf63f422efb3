//! # Pricing Engine
//!
//! Runs the six pricing stages in order and rounds once at the end.
//!
//! ## Stage Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. validate_cart          fail fast on the first bad line             │
//! │  2. subtotal               Σ price × qty                               │
//! │  3. type discount          per ProductType volume tiers                │
//! │  4. value discount         on (2 − 3), exclusive thresholds            │
//! │  5. shipping               weight band, minimum, fragile, region       │
//! │  6. loyalty + rounding     tier share of freight, total → 2dp half-up  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! `PricingEngine` holds only its immutable policy. It is `Send + Sync` and a
//! single instance can price carts from any number of threads at once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discount::{self, TypeDiscount};
use crate::error::{PolicyError, PricingError, PricingResult};
use crate::money::Money;
use crate::policy::PricingPolicy;
use crate::shipping;
use crate::types::{Cart, CustomerTier, Region};
use crate::validation::validate_cart;

/// Decimal places of the final total.
pub const TOTAL_DP: u32 = 2;

// =============================================================================
// Price Quote
// =============================================================================

/// Every intermediate value of one pricing run.
///
/// Only `total` is rounded; everything else is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub subtotal: Money,
    pub type_discounts: Vec<TypeDiscount>,
    pub type_discount: Money,
    pub value_discount: Money,
    /// Subtotal after both discounts.
    pub merchandise: Money,
    pub total_weight_kg: Decimal,
    /// Weight-based freight after the minimum-fee clamp.
    pub base_freight: Money,
    pub fragility_surcharge: Money,
    /// (base + fragility) × region multiplier.
    pub regional_freight: Money,
    /// Freight after the loyalty share.
    pub freight: Money,
    /// merchandise + freight, rounded half-up to 2 places.
    pub total: Money,
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// Computes checkout totals under a [`PricingPolicy`].
///
/// ## Example
/// ```rust
/// use rust_decimal_macros::dec;
/// use tally_core::{Cart, CartLine, CustomerTier, Money, PricingEngine, Product, ProductType, Region};
///
/// let engine = PricingEngine::default();
///
/// let lamp = Product::new("lamp", Money::new(dec!(100.00)), dec!(6.00), ProductType::Furniture)
///     .with_dimensions(dec!(10), dec!(10), dec!(10))
///     .fragile(true);
/// let cart = Cart::with_lines("c1", [CartLine::new(lamp, 1)]);
///
/// let total = engine
///     .compute_total(Some(&cart), Some(Region::South), CustomerTier::Silver)
///     .unwrap();
/// assert_eq!(total.to_string(), "108.93");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    policy: PricingPolicy,
}

impl PricingEngine {
    /// Creates an engine after checking the policy's tables.
    pub fn new(policy: PricingPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(PricingEngine { policy })
    }

    /// The policy this engine prices with.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Computes the amount to charge for a cart.
    ///
    /// ## Errors
    /// - [`PricingError::InvalidCartLine`] for the first line that breaks a
    ///   line invariant
    /// - [`PricingError::AmountOverflow`] when an aggregate leaves the range
    ///   of `Decimal`
    ///
    /// Absent and empty carts are not errors; they total `0.00`.
    pub fn compute_total(
        &self,
        cart: Option<&Cart>,
        region: Option<Region>,
        tier: CustomerTier,
    ) -> PricingResult<Money> {
        self.quote(cart, region, tier).map(|quote| quote.total)
    }

    /// Computes the total together with every intermediate value.
    pub fn quote(
        &self,
        cart: Option<&Cart>,
        region: Option<Region>,
        tier: CustomerTier,
    ) -> PricingResult<PriceQuote> {
        let policy = &self.policy;

        // 1. Validation
        validate_cart(cart)?;

        // 2-4. Merchandise
        let subtotal = discount::subtotal(cart).ok_or_else(|| overflow("subtotal"))?;
        let type_discounts =
            discount::type_discounts(cart, policy).ok_or_else(|| overflow("type discount"))?;
        let type_discount: Money = type_discounts.iter().map(|t| t.discount).sum();
        let after_type = subtotal - type_discount;
        let value_discount = discount::value_discount(after_type, policy);
        let merchandise = after_type - value_discount;

        debug!(
            %subtotal,
            %type_discount,
            %value_discount,
            %merchandise,
            "merchandise priced"
        );

        // 5. Shipping
        let total_weight_kg =
            shipping::total_weight(cart, policy).ok_or_else(|| overflow("weight"))?;
        let base_freight =
            shipping::base_freight(total_weight_kg, policy).ok_or_else(|| overflow("freight"))?;
        let fragility_surcharge = shipping::fragility_surcharge(cart, policy)
            .ok_or_else(|| overflow("fragility surcharge"))?;
        let regional_freight = base_freight
            .checked_add(fragility_surcharge)
            .and_then(|freight| shipping::regional_freight(freight, region, policy))
            .ok_or_else(|| overflow("freight"))?;

        // 6. Loyalty and rounding
        let freight = shipping::loyalty_freight(regional_freight, tier, policy);
        let total = merchandise
            .checked_add(freight)
            .ok_or_else(|| overflow("total"))?
            .round_half_up(TOTAL_DP);

        debug!(
            %total_weight_kg,
            %base_freight,
            %fragility_surcharge,
            ?region,
            ?tier,
            %freight,
            %total,
            "freight priced"
        );

        Ok(PriceQuote {
            subtotal,
            type_discounts,
            type_discount,
            value_discount,
            merchandise,
            total_weight_kg,
            base_freight,
            fragility_surcharge,
            regional_freight,
            freight,
            total,
        })
    }
}

fn overflow(stage: &'static str) -> PricingError {
    PricingError::AmountOverflow { stage }
}

// =============================================================================
// Unit Tests
// =============================================================================
