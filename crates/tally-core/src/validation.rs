//! # Validation Module
//!
//! Cart validation, the first stage of pricing.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Validation                                    │
//! │                                                                         │
//! │  cart absent / lines empty ──────────────► Ok (prices to 0.00)         │
//! │                                                                         │
//! │  for each line, in order:                                              │
//! │    ├── entry or product missing? ──► MissingProduct                    │
//! │    ├── quantity <= 0?             ──► NonPositiveQuantity              │
//! │    ├── price missing or < 0?      ──► InvalidPrice                     │
//! │    ├── weight missing or < 0?     ──► InvalidWeight                    │
//! │    └── price, weight or volume                                         │
//! │        overflows a Decimal?       ──► OutOfRange                       │
//! │                                                                         │
//! │  First failure wins; nothing after it is inspected                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every later stage assumes these checks have passed. Dimensions are only
//! checked for overflow: they feed the cubic weight, which is compared against
//! the physical weight with `max`. Lines that pass here can still overflow in
//! aggregate; the engine reports that as
//! [`PricingError::AmountOverflow`](crate::PricingError::AmountOverflow).

use rust_decimal::Decimal;

use crate::error::{LineDefect, PricingError, PricingResult};
use crate::types::{Cart, CartLine};

/// Validates every line of a cart.
///
/// ## Example
/// ```rust
/// use rust_decimal_macros::dec;
/// use tally_core::validation::validate_cart;
/// use tally_core::{Cart, CartLine, LineDefect, Money, Product, ProductType};
///
/// assert!(validate_cart(None).is_ok());
///
/// let book = Product::new("book", Money::new(dec!(10)), dec!(1), ProductType::Book);
/// let cart = Cart::with_lines("c1", [CartLine::new(book, 0)]);
/// let err = validate_cart(Some(&cart)).unwrap_err();
/// assert_eq!(err.defect(), Some(LineDefect::NonPositiveQuantity));
/// ```
pub fn validate_cart(cart: Option<&Cart>) -> PricingResult<()> {
    let Some(cart) = cart else {
        return Ok(());
    };

    for (index, line) in cart.lines.iter().enumerate() {
        validate_line(line.as_ref()).map_err(|defect| PricingError::InvalidCartLine {
            line: index,
            defect,
        })?;
    }

    Ok(())
}

/// Checks a single line, returning the first rule it breaks.
///
/// The checks run in a fixed order so a line with several problems always
/// reports the same one.
pub fn validate_line(line: Option<&CartLine>) -> Result<(), LineDefect> {
    let line = line.ok_or(LineDefect::MissingProduct)?;
    let product = line.product.as_ref().ok_or(LineDefect::MissingProduct)?;

    if line.quantity <= 0 {
        return Err(LineDefect::NonPositiveQuantity);
    }

    let price = match product.unit_price {
        Some(price) if !price.is_negative() => price,
        _ => return Err(LineDefect::InvalidPrice),
    };

    let weight = match product.weight_kg {
        Some(weight) if weight >= Decimal::ZERO => weight,
        _ => return Err(LineDefect::InvalidWeight),
    };

    let quantity = Decimal::from(line.quantity);
    if price.multiply_quantity(line.quantity).is_none()
        || weight.checked_mul(quantity).is_none()
        || product.dimensions.volume().is_none()
    {
        return Err(LineDefect::OutOfRange);
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
