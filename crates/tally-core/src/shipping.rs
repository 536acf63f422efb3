//! # Shipping Stages
//!
//! Freight is computed from the cart alone; merchandise discounts never
//! influence it.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  per line: billable kg = max(physical kg, round4(L×W×H / 6000))         │
//! │  total kg  = Σ billable kg × quantity                                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  base      = total kg × band rate                                       │
//! │              clamped up to 12 only when band rate > 0                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  + fragile = 5 × units of every fragile product (after the clamp)      │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  × region multiplier                                                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  × loyalty share (GOLD 0, SILVER 0.5, BRONZE 1)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The clamp sees weight-based freight only. Adding the fragile surcharge
//! first would change totals for light fragile shipments.

use rust_decimal::Decimal;

use crate::money::{round_half_up, Money};
use crate::policy::PricingPolicy;
use crate::types::{Cart, CustomerTier, Dimensions, Product, Region};

/// Decimal places kept on cubic weight before it is compared.
pub const CUBIC_WEIGHT_DP: u32 = 4;

// =============================================================================
// Weight
// =============================================================================

/// Volumetric weight of a package, rounded half-up to 4 places.
///
/// ```rust
/// use rust_decimal_macros::dec;
/// use tally_core::shipping::cubic_weight;
/// use tally_core::Dimensions;
///
/// let dims = Dimensions::new(dec!(10), dec!(10), dec!(10));
/// assert_eq!(cubic_weight(&dims, dec!(6000)), Some(dec!(0.1667)));
/// ```
///
/// Returns `None` if the volume or the quotient overflows.
pub fn cubic_weight(dimensions: &Dimensions, divisor: Decimal) -> Option<Decimal> {
    let weight = dimensions.volume()?.checked_div(divisor)?;
    Some(round_half_up(weight, CUBIC_WEIGHT_DP))
}

/// The greater of physical and cubic weight for one unit of a product.
pub fn billable_weight(product: &Product, divisor: Decimal) -> Option<Decimal> {
    let physical = product.weight_kg.unwrap_or(Decimal::ZERO);
    Some(physical.max(cubic_weight(&product.dimensions, divisor)?))
}

/// Σ billable weight × quantity over every line.
pub fn total_weight(cart: Option<&Cart>, policy: &PricingPolicy) -> Option<Decimal> {
    cart.into_iter()
        .flat_map(Cart::present_lines)
        .filter_map(|line| line.product.as_ref().map(|p| (p, line.quantity)))
        .try_fold(Decimal::ZERO, |acc, (product, quantity)| {
            let line_weight = billable_weight(product, policy.cubic_divisor)?
                .checked_mul(Decimal::from(quantity))?;
            acc.checked_add(line_weight)
        })
}

// =============================================================================
// Freight
// =============================================================================

/// Weight-based freight, before surcharges.
///
/// ## Rules
/// - Rate comes from the band containing `total_weight_kg`
/// - A non-zero rate never yields less than the minimum fee
/// - A zero rate yields zero; the minimum does not apply
pub fn base_freight(total_weight_kg: Decimal, policy: &PricingPolicy) -> Option<Money> {
    let rate = policy.freight_rate(total_weight_kg);
    if rate.is_zero() {
        return Some(Money::zero());
    }

    let freight = rate.scale(total_weight_kg)?;
    Some(freight.max(policy.minimum_freight))
}

/// Handling fee for every fragile unit in the cart.
pub fn fragility_surcharge(cart: Option<&Cart>, policy: &PricingPolicy) -> Option<Money> {
    cart.into_iter()
        .flat_map(Cart::present_lines)
        .filter(|line| line.product.as_ref().is_some_and(|p| p.fragile))
        .try_fold(Money::zero(), |acc, line| {
            acc.checked_add(policy.fragile_fee_per_item.multiply_quantity(line.quantity)?)
        })
}

/// Applies the regional multiplier.
pub fn regional_freight(
    freight: Money,
    region: Option<Region>,
    policy: &PricingPolicy,
) -> Option<Money> {
    freight.scale(policy.region_multiplier(region))
}

/// Applies the loyalty tier's share of freight.
pub fn loyalty_freight(freight: Money, tier: CustomerTier, policy: &PricingPolicy) -> Money {
    freight.apply_rate(policy.shipping_share(tier))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartLine, ProductType};
    use rust_decimal_macros::dec;

    fn parcel(weight: Decimal) -> Product {
        Product::new("parcel", Money::new(dec!(10)), weight, ProductType::Furniture)
            .with_dimensions(dec!(10), dec!(10), dec!(10))
    }

    #[test]
    fn test_cubic_weight_rounds_to_four_places() {
        let dims = Dimensions::new(dec!(200), dec!(200), dec!(200));
        assert_eq!(cubic_weight(&dims, dec!(6000)), Some(dec!(1333.3333)));

        let dims = Dimensions::new(dec!(1), dec!(1), dec!(0.9999));
        assert_eq!(cubic_weight(&dims, dec!(6000)), Some(dec!(0.0002)));

        assert_eq!(cubic_weight(&Dimensions::default(), dec!(6000)), Some(dec!(0)));
    }

    #[test]
    fn test_billable_weight_takes_the_larger() {
        let heavy = parcel(dec!(2));
        assert_eq!(billable_weight(&heavy, dec!(6000)), Some(dec!(2)));

        let bulky = parcel(dec!(1)).with_dimensions(dec!(60), dec!(50), dec!(40));
        assert_eq!(billable_weight(&bulky, dec!(6000)), Some(dec!(20)));
    }

    #[test]
    fn test_total_weight_multiplies_by_quantity() {
        let cart = Cart::with_lines(
            "c",
            [
                CartLine::new(parcel(dec!(1.5)), 3),
                CartLine::new(parcel(dec!(0.1)), 2),
            ],
        );
        let policy = PricingPolicy::default();
        // 0.1 kg loses to the 0.1667 cubic weight
        assert_eq!(total_weight(Some(&cart), &policy), Some(dec!(4.8334)));
        assert_eq!(total_weight(None, &policy), Some(dec!(0)));
    }

    #[test]
    fn test_base_freight_bands() {
        let policy = PricingPolicy::default();
        let cases = [
            (dec!(0), dec!(0)),
            (dec!(5), dec!(0)),
            (dec!(5.01), dec!(12)),
            (dec!(6), dec!(12)),
            (dec!(8), dec!(16)),
            (dec!(10), dec!(20)),
            (dec!(10.5), dec!(42)),
            (dec!(50), dec!(200)),
            (dec!(50.01), dec!(350.07)),
        ];
        for (weight, expected) in cases {
            assert_eq!(
                base_freight(weight, &policy),
                Some(Money::new(expected)),
                "weight = {weight}"
            );
        }
    }

    #[test]
    fn test_minimum_fee_clamps_exactly_to_twelve() {
        let policy = PricingPolicy::default();
        // 5.5 kg × 2 = 11 → 12
        assert_eq!(base_freight(dec!(5.5), &policy), Some(Money::new(dec!(12))));
    }

    #[test]
    fn test_fragility_surcharge_per_unit() {
        let cart = Cart::with_lines(
            "c",
            [
                CartLine::new(parcel(dec!(1)).fragile(true), 3),
                CartLine::new(parcel(dec!(1)), 4),
                CartLine::new(parcel(dec!(1)).fragile(true), 1),
            ],
        );
        let policy = PricingPolicy::default();
        assert_eq!(fragility_surcharge(Some(&cart), &policy), Some(Money::new(dec!(20))));
        assert_eq!(fragility_surcharge(None, &policy), Some(Money::zero()));
    }

    #[test]
    fn test_weight_overflow_is_reported() {
        let policy = PricingPolicy::default();
        let cart = Cart::with_lines("c", [CartLine::new(parcel(dec!(100000000000)), i64::MAX)]);
        assert_eq!(total_weight(Some(&cart), &policy), None);

        let bulky = parcel(dec!(1)).with_dimensions(Decimal::MAX, dec!(1), dec!(1));
        assert_eq!(billable_weight(&bulky, dec!(0.5)), None);

        assert_eq!(base_freight(Decimal::MAX, &policy), None);
    }

    #[test]
    fn test_regional_multipliers() {
        let policy = PricingPolicy::default();
        let freight = Money::new(dec!(100));
        let cases = [
            (Some(Region::Southeast), dec!(100)),
            (Some(Region::South), dec!(105)),
            (Some(Region::Northeast), dec!(110)),
            (Some(Region::Midwest), dec!(120)),
            (Some(Region::North), dec!(130)),
            (Some(Region::Unrecognized), dec!(100)),
            (None, dec!(100)),
        ];
        for (region, expected) in cases {
            assert_eq!(
                regional_freight(freight, region, &policy),
                Some(Money::new(expected)),
                "region = {region:?}"
            );
        }
    }

    #[test]
    fn test_loyalty_shares() {
        let policy = PricingPolicy::default();
        let freight = Money::new(dec!(17.85));
        assert!(loyalty_freight(freight, CustomerTier::Gold, &policy).is_zero());
        assert_eq!(
            loyalty_freight(freight, CustomerTier::Silver, &policy).amount(),
            dec!(8.925)
        );
        assert_eq!(loyalty_freight(freight, CustomerTier::Bronze, &policy), freight);
        assert_eq!(loyalty_freight(freight, CustomerTier::Unrecognized, &policy), freight);
    }
}
