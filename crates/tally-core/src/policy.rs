//! # Pricing Policy
//!
//! Every number the engine uses, expressed as ordered lookup tables.
//!
//! ## Default Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Volume tiers (per product type, by total units)                        │
//! │    units <  3 → 0%    3..=4 → 5%    5..=7 → 10%    >= 8 → 15%          │
//! │                                                                         │
//! │  Value tiers (on subtotal after volume discount, exclusive)             │
//! │    > 500 → 10%        > 1000 → 20%                                      │
//! │                                                                         │
//! │  Freight bands (total billable kg, inclusive upper bound)               │
//! │    [0,5] → 0/kg   (5,10] → 2/kg   (10,50] → 4/kg   (50,∞) → 7/kg       │
//! │    minimum 12 when rate > 0 · fragile +5/unit · cubic divisor 6000      │
//! │                                                                         │
//! │  Region multipliers                                                     │
//! │    SOUTHEAST 1.00  SOUTH 1.05  NORTHEAST 1.10  MIDWEST 1.20  NORTH 1.30 │
//! │                                                                         │
//! │  Loyalty share of freight                                               │
//! │    GOLD 0   SILVER 0.5   BRONZE 1                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tables are data, not `if` chains: each boundary is a single row that a
//! test can point at. Policies serialize to JSON so a deployment can ship
//! its own (see `tally-checkout`'s `TALLY_POLICY_PATH`).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::money::{Money, Rate};
use crate::types::{CustomerTier, Region};

// =============================================================================
// Table Rows
// =============================================================================

/// Volume discount applied once a product type reaches `min_quantity` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeTier {
    pub min_quantity: i64,
    pub rate: Rate,
}

/// Cart-value discount applied when the subtotal is strictly above `above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTier {
    pub above: Money,
    pub rate: Rate,
}

/// Per-kilogram freight rate for weights up to and including `up_to_kg`.
///
/// `up_to_kg: None` is the open-ended top band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreightBand {
    pub up_to_kg: Option<Decimal>,
    pub rate_per_kg: Money,
}

impl FreightBand {
    /// Whether `weight` falls at or below this band's upper bound.
    #[inline]
    pub fn covers(&self, weight: Decimal) -> bool {
        self.up_to_kg.map_or(true, |limit| weight <= limit)
    }
}

// =============================================================================
// Pricing Policy
// =============================================================================

/// The complete set of pricing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Ascending by `min_quantity`.
    pub volume_tiers: Vec<VolumeTier>,

    /// Ascending by `above`.
    pub value_tiers: Vec<ValueTier>,

    /// Ascending by `up_to_kg`, last band open-ended.
    pub freight_bands: Vec<FreightBand>,

    /// Floor for weight-based freight whenever the band rate is non-zero.
    pub minimum_freight: Money,

    /// Handling surcharge per fragile unit.
    pub fragile_fee_per_item: Money,

    /// Volumetric divisor: cubic kg = cm³ / divisor.
    pub cubic_divisor: Decimal,

    /// Freight multiplier per region. Missing regions use 1.
    pub region_multipliers: BTreeMap<Region, Decimal>,

    /// Share of freight charged per tier. Missing tiers pay in full.
    pub loyalty_shipping_share: BTreeMap<CustomerTier, Rate>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            volume_tiers: vec![
                VolumeTier { min_quantity: 3, rate: Rate::from_percent(5) },
                VolumeTier { min_quantity: 5, rate: Rate::from_percent(10) },
                VolumeTier { min_quantity: 8, rate: Rate::from_percent(15) },
            ],
            value_tiers: vec![
                ValueTier { above: Money::new(dec!(500)), rate: Rate::from_percent(10) },
                ValueTier { above: Money::new(dec!(1000)), rate: Rate::from_percent(20) },
            ],
            freight_bands: vec![
                FreightBand { up_to_kg: Some(dec!(5)), rate_per_kg: Money::new(dec!(0)) },
                FreightBand { up_to_kg: Some(dec!(10)), rate_per_kg: Money::new(dec!(2)) },
                FreightBand { up_to_kg: Some(dec!(50)), rate_per_kg: Money::new(dec!(4)) },
                FreightBand { up_to_kg: None, rate_per_kg: Money::new(dec!(7)) },
            ],
            minimum_freight: Money::new(dec!(12)),
            fragile_fee_per_item: Money::new(dec!(5)),
            cubic_divisor: dec!(6000),
            region_multipliers: BTreeMap::from([
                (Region::Southeast, dec!(1.00)),
                (Region::South, dec!(1.05)),
                (Region::Northeast, dec!(1.10)),
                (Region::Midwest, dec!(1.20)),
                (Region::North, dec!(1.30)),
            ]),
            loyalty_shipping_share: BTreeMap::from([
                (CustomerTier::Gold, Rate::zero()),
                (CustomerTier::Silver, Rate::new(dec!(0.5))),
                (CustomerTier::Bronze, Rate::full()),
            ]),
        }
    }
}

impl PricingPolicy {
    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Volume discount rate for `units` of one product type.
    pub fn volume_rate(&self, units: i64) -> Rate {
        self.volume_tiers
            .iter()
            .rev()
            .find(|tier| units >= tier.min_quantity)
            .map_or(Rate::zero(), |tier| tier.rate)
    }

    /// Cart-value discount rate for a subtotal.
    pub fn value_rate(&self, subtotal: Money) -> Rate {
        self.value_tiers
            .iter()
            .rev()
            .find(|tier| subtotal > tier.above)
            .map_or(Rate::zero(), |tier| tier.rate)
    }

    /// Per-kg freight rate for a total billable weight.
    pub fn freight_rate(&self, weight_kg: Decimal) -> Money {
        self.freight_bands
            .iter()
            .find(|band| band.covers(weight_kg))
            .map_or(Money::zero(), |band| band.rate_per_kg)
    }

    /// Freight multiplier for a region; absent or unlisted regions use 1.
    pub fn region_multiplier(&self, region: Option<Region>) -> Decimal {
        region
            .and_then(|r| self.region_multipliers.get(&r))
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    /// Share of freight a tier pays; unlisted tiers pay everything.
    pub fn shipping_share(&self, tier: CustomerTier) -> Rate {
        self.loyalty_shipping_share
            .get(&tier)
            .copied()
            .unwrap_or(Rate::full())
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Checks that every table is well formed.
    ///
    /// ## Rules
    /// - Tier and band tables strictly ascending
    /// - Discount and loyalty rates within 0..=1
    /// - Freight rates, fees and multipliers not negative
    /// - Cubic divisor positive
    /// - Freight bands end with exactly one open band
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !self
            .volume_tiers
            .windows(2)
            .all(|w| w[0].min_quantity < w[1].min_quantity)
        {
            return Err(PolicyError::Unordered { table: "volume tiers" });
        }
        check_rates("volume tiers", self.volume_tiers.iter().map(|t| t.rate))?;

        if !self.value_tiers.windows(2).all(|w| w[0].above < w[1].above) {
            return Err(PolicyError::Unordered { table: "value tiers" });
        }
        check_rates("value tiers", self.value_tiers.iter().map(|t| t.rate))?;

        self.validate_freight_bands()?;

        check_non_negative("minimum freight", self.minimum_freight.amount())?;
        check_non_negative("fragile fee", self.fragile_fee_per_item.amount())?;
        if self.cubic_divisor <= Decimal::ZERO {
            return Err(PolicyError::NonPositiveDivisor(self.cubic_divisor.to_string()));
        }
        for multiplier in self.region_multipliers.values() {
            check_non_negative("region multiplier", *multiplier)?;
        }
        check_rates("loyalty shares", self.loyalty_shipping_share.values().copied())?;

        Ok(())
    }

    fn validate_freight_bands(&self) -> Result<(), PolicyError> {
        let (open, bounded): (Vec<&FreightBand>, Vec<&FreightBand>) = self
            .freight_bands
            .iter()
            .partition(|band| band.up_to_kg.is_none());

        if open.len() != 1 || self.freight_bands.last().and_then(|b| b.up_to_kg).is_some() {
            return Err(PolicyError::MissingOpenBand);
        }
        if !bounded.windows(2).all(|w| w[0].up_to_kg < w[1].up_to_kg) {
            return Err(PolicyError::Unordered { table: "freight bands" });
        }
        for band in &self.freight_bands {
            check_non_negative("freight rate", band.rate_per_kg.amount())?;
        }
        Ok(())
    }
}

fn check_rates(table: &'static str, rates: impl Iterator<Item = Rate>) -> Result<(), PolicyError> {
    for rate in rates {
        if !rate.is_proportion() {
            return Err(PolicyError::RateOutOfRange {
                table,
                rate: rate.fraction().to_string(),
            });
        }
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: Decimal) -> Result<(), PolicyError> {
    if value < Decimal::ZERO {
        return Err(PolicyError::Negative {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
