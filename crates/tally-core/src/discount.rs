//! # Merchandise Stages
//!
//! Subtotal, per-type volume discount, and cart-value discount.
//!
//! ```text
//! lines ──► subtotal ──► − type discount ──► − value discount ──► merchandise
//!              │               │                   │
//!              │        grouped by ProductType     on the post-type subtotal,
//!              │        in one pass (BTreeMap)     exclusive thresholds
//!              └── exact, never rounded
//! ```
//!
//! All functions here assume the cart already passed
//! [`validate_cart`](crate::validation::validate_cart). Sums are checked;
//! `None` means the cart is too large to price.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};
use crate::policy::PricingPolicy;
use crate::types::{Cart, ProductType};

// =============================================================================
// Subtotal
// =============================================================================

/// Σ unit price × quantity over every line. Zero for an absent cart.
///
/// Returns `None` if the sum overflows.
pub fn subtotal(cart: Option<&Cart>) -> Option<Money> {
    priced_lines(cart).try_fold(Money::zero(), |acc, (price, quantity)| {
        acc.checked_add(price.multiply_quantity(quantity)?)
    })
}

fn priced_lines(cart: Option<&Cart>) -> impl Iterator<Item = (Money, i64)> + '_ {
    cart.into_iter()
        .flat_map(Cart::present_lines)
        .filter_map(|line| Some((line.product.as_ref()?.unit_price?, line.quantity)))
}

// =============================================================================
// Type-Based Discount
// =============================================================================

/// Units and value of one product type across the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeGroup {
    pub units: i64,
    pub subtotal: Money,
}

/// The volume discount earned by one product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDiscount {
    pub product_type: ProductType,
    pub units: i64,
    pub subtotal: Money,
    pub rate: Rate,
    pub discount: Money,
}

/// Accumulates units and value per product type in a single pass.
///
/// Lines sharing a type collapse into one entry, so splitting a line in two
/// or reordering lines never changes the result. Unit counts saturate at
/// `i64::MAX`, far above the top volume tier. Returns `None` if a type's
/// value overflows.
pub fn group_by_type(cart: Option<&Cart>) -> Option<BTreeMap<ProductType, TypeGroup>> {
    let mut groups: BTreeMap<ProductType, TypeGroup> = BTreeMap::new();

    for line in cart.into_iter().flat_map(Cart::present_lines) {
        let Some(product) = line.product.as_ref() else {
            continue;
        };
        let group = groups.entry(product.product_type).or_default();
        group.units = group.units.saturating_add(line.quantity);
        if let Some(price) = product.unit_price {
            group.subtotal = group
                .subtotal
                .checked_add(price.multiply_quantity(line.quantity)?)?;
        }
    }

    Some(groups)
}

/// Volume discount per product type present in the cart.
pub fn type_discounts(cart: Option<&Cart>, policy: &PricingPolicy) -> Option<Vec<TypeDiscount>> {
    let discounts = group_by_type(cart)?
        .into_iter()
        .map(|(product_type, group)| {
            let rate = policy.volume_rate(group.units);
            TypeDiscount {
                product_type,
                units: group.units,
                subtotal: group.subtotal,
                rate,
                discount: group.subtotal.apply_rate(rate),
            }
        })
        .collect();
    Some(discounts)
}

/// Total volume discount across all product types.
///
/// ## Example
/// ```rust
/// use rust_decimal_macros::dec;
/// use tally_core::discount::type_discount;
/// use tally_core::{Cart, CartLine, Money, PricingPolicy, Product, ProductType};
///
/// let book = Product::new("book", Money::new(dec!(10.00)), dec!(1), ProductType::Book);
/// let cart = Cart::with_lines("c1", [CartLine::new(book, 8)]);
///
/// // 8 books → 15% of 80.00
/// let discount = type_discount(Some(&cart), &PricingPolicy::default());
/// assert_eq!(discount, Some(Money::new(dec!(12.00))));
/// ```
pub fn type_discount(cart: Option<&Cart>, policy: &PricingPolicy) -> Option<Money> {
    type_discounts(cart, policy)?
        .iter()
        .try_fold(Money::zero(), |acc, t| acc.checked_add(t.discount))
}

// =============================================================================
// Value-Based Discount
// =============================================================================

/// Cart-value discount on the subtotal left after volume discounts.
pub fn value_discount(subtotal_after_type: Money, policy: &PricingPolicy) -> Money {
    subtotal_after_type.apply_rate(policy.value_rate(subtotal_after_type))
}

// =============================================================================
// Unit Tests
// =============================================================================
