//! Property tests for invariants that must hold for every cart.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::discount::{subtotal, type_discount};
use crate::engine::PricingEngine;
use crate::error::LineDefect;
use crate::money::{round_half_up, Money};
use crate::policy::PricingPolicy;
use crate::types::{Cart, CartLine, CustomerTier, Product, ProductType, Region};
use crate::validation::validate_line;

const TYPES: [ProductType; 7] = [
    ProductType::Electronic,
    ProductType::Book,
    ProductType::Clothing,
    ProductType::Furniture,
    ProductType::Food,
    ProductType::Toy,
    ProductType::Sports,
];

fn arb_product() -> impl Strategy<Value = Product> {
    (
        0i64..200_000,  // price in cents
        0i64..30_000,   // weight in grams
        0i64..80,       // package side in cm
        0usize..TYPES.len(),
        any::<bool>(),
    )
        .prop_map(|(cents, grams, side, type_idx, fragile)| {
            let side = Decimal::from(side);
            Product::new(
                format!("sku-{type_idx}-{cents}"),
                Money::new(Decimal::new(cents, 2)),
                Decimal::new(grams, 3),
                TYPES[type_idx],
            )
            .with_dimensions(side, side, side)
            .fragile(fragile)
        })
}

fn arb_line() -> impl Strategy<Value = CartLine> {
    (arb_product(), 1i64..20).prop_map(|(product, qty)| CartLine::new(product, qty))
}

fn arb_cart() -> impl Strategy<Value = Cart> {
    prop::collection::vec(arb_line(), 0..8).prop_map(|lines| Cart::with_lines("prop", lines))
}

fn arb_region() -> impl Strategy<Value = Option<Region>> {
    prop_oneof![
        Just(None),
        Just(Some(Region::Unrecognized)),
        (0usize..Region::ALL.len()).prop_map(|i| Some(Region::ALL[i])),
    ]
}

fn arb_tier() -> impl Strategy<Value = CustomerTier> {
    prop_oneof![
        Just(CustomerTier::Gold),
        Just(CustomerTier::Silver),
        Just(CustomerTier::Bronze),
        Just(CustomerTier::Unrecognized),
    ]
}

proptest! {
    /// Raising one line's quantity never lowers the subtotal.
    #[test]
    fn subtotal_is_monotonic_in_quantity(
        cart in arb_cart(),
        pick in any::<prop::sample::Index>(),
        extra in 1i64..10,
    ) {
        prop_assume!(!cart.is_empty());
        let before = subtotal(Some(&cart)).unwrap();

        let mut bigger = cart.clone();
        let idx = pick.index(bigger.lines.len());
        if let Some(line) = bigger.lines[idx].as_mut() {
            line.quantity += extra;
        }

        prop_assert!(subtotal(Some(&bigger)).unwrap() >= before);
    }

    /// Line order does not affect the type discount or the total.
    #[test]
    fn pricing_ignores_line_order(cart in arb_cart(), region in arb_region(), tier in arb_tier()) {
        let policy = PricingPolicy::default();
        let mut reversed = cart.clone();
        reversed.lines.reverse();

        prop_assert_eq!(
            type_discount(Some(&cart), &policy),
            type_discount(Some(&reversed), &policy)
        );

        let engine = PricingEngine::default();
        prop_assert_eq!(
            engine.compute_total(Some(&cart), region, tier).unwrap(),
            engine.compute_total(Some(&reversed), region, tier).unwrap()
        );
    }

    /// Splitting one line into two lines of the same product changes nothing.
    #[test]
    fn type_discount_survives_line_split(
        product in arb_product(),
        qty in 2i64..30,
        cut in any::<prop::sample::Index>(),
        others in prop::collection::vec(arb_line(), 0..4),
    ) {
        let first = 1 + cut.index((qty - 1) as usize) as i64;

        let mut whole = Cart::with_lines("whole", others.clone());
        whole.push(CartLine::new(product.clone(), qty));

        let mut split = Cart::with_lines("split", others);
        split.push(CartLine::new(product.clone(), first));
        split.push(CartLine::new(product, qty - first));

        let policy = PricingPolicy::default();
        prop_assert_eq!(
            type_discount(Some(&whole), &policy),
            type_discount(Some(&split), &policy)
        );
    }

    /// GOLD customers pay exactly the merchandise amount.
    #[test]
    fn gold_never_pays_freight(cart in arb_cart(), region in arb_region()) {
        let quote = PricingEngine::default()
            .quote(Some(&cart), region, CustomerTier::Gold)
            .unwrap();
        prop_assert!(quote.freight.is_zero());
        prop_assert_eq!(quote.total.amount(), round_half_up(quote.merchandise.amount(), 2));
    }

    /// Totals are never negative and always carry two decimal places.
    #[test]
    fn total_is_non_negative_cents(cart in arb_cart(), region in arb_region(), tier in arb_tier()) {
        let total = PricingEngine::default()
            .compute_total(Some(&cart), region, tier)
            .unwrap();
        prop_assert!(!total.is_negative());
        prop_assert_eq!(total.amount().scale(), 2);
    }

    /// A zero quantity is rejected whatever else the line holds.
    #[test]
    fn zero_quantity_always_rejected(product in arb_product(), drop_price in any::<bool>()) {
        let mut product = product;
        if drop_price {
            product.unit_price = None;
        }
        prop_assert_eq!(
            validate_line(Some(&CartLine::new(product, 0))),
            Err(LineDefect::NonPositiveQuantity)
        );
    }
}
