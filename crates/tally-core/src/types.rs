//! # Domain Types
//!
//! The cart snapshot the pricing engine reads, and the enumerations that
//! select its regional and loyalty rules.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cart       │   │    CartLine     │   │     Product     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  product ───────┼──►│  unit_price     │       │
//! │  │  lines          │   │  quantity       │   │  weight_kg      │       │
//! │  └─────────────────┘   └─────────────────┘   │  dimensions     │       │
//! │                                              │  product_type   │       │
//! │                                              │  fragile        │       │
//! │                                              └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Region      │   │  CustomerTier   │   │   ProductType   │       │
//! │  │  SOUTHEAST ...  │   │  GOLD SILVER    │   │  ELECTRONIC ... │       │
//! │  │  → multiplier   │   │  BRONZE → share │   │  → volume tiers │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Everything here is read-only input. The engine never mutates a cart; it
//! derives a single amount from what the caller hands over. Fields that an
//! upstream system may fail to fill in (`unit_price`, `weight_kg`, the product
//! itself) are `Option` so validation can reject them explicitly instead of
//! failing at deserialization time.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::money::Money;

// =============================================================================
// Product Type
// =============================================================================

/// Product category. Volume discounts are computed per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Electronic,
    Book,
    Clothing,
    Furniture,
    Food,
    Toy,
    Sports,
}

// =============================================================================
// Dimensions
// =============================================================================

/// Package dimensions in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
}

impl Dimensions {
    pub fn new(length: Decimal, width: Decimal, height: Decimal) -> Self {
        Dimensions {
            length,
            width,
            height,
        }
    }

    /// Length × width × height, in cubic centimetres.
    ///
    /// Returns `None` if the product does not fit in a `Decimal`.
    #[inline]
    pub fn volume(&self) -> Option<Decimal> {
        self.length.checked_mul(self.width)?.checked_mul(self.height)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as it stood when the cart was snapshotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Business identifier, used for stock requests.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Unit price. `None` means the catalog had no price.
    pub unit_price: Option<Money>,

    /// Physical weight in kilograms. `None` means the catalog had no weight.
    pub weight_kg: Option<Decimal>,

    /// Package dimensions used for cubic weight.
    #[serde(default)]
    pub dimensions: Dimensions,

    /// Category used to group lines for volume discounts.
    pub product_type: ProductType,

    /// Fragile items carry a per-unit handling surcharge.
    #[serde(default)]
    pub fragile: bool,
}

impl Product {
    /// Creates a fully specified product.
    pub fn new(
        id: impl Into<String>,
        unit_price: Money,
        weight_kg: Decimal,
        product_type: ProductType,
    ) -> Self {
        Product {
            id: id.into(),
            name: String::new(),
            unit_price: Some(unit_price),
            weight_kg: Some(weight_kg),
            dimensions: Dimensions::default(),
            product_type,
            fragile: false,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the package dimensions.
    pub fn with_dimensions(mut self, length: Decimal, width: Decimal, height: Decimal) -> Self {
        self.dimensions = Dimensions::new(length, width, height);
        self
    }

    /// Marks the product as fragile (or not).
    pub fn fragile(mut self, fragile: bool) -> Self {
        self.fragile = fragile;
        self
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product and how many of it the customer is buying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product. `None` is rejected by validation.
    pub product: Option<Product>,

    /// Units ordered. Must be strictly positive.
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product: Product, quantity: i64) -> Self {
        CartLine {
            product: Some(product),
            quantity,
        }
    }

    /// Line total (unit price × quantity), if the line has a priced product
    /// and the product fits in a `Decimal`.
    pub fn line_total(&self) -> Option<Money> {
        self.product
            .as_ref()
            .and_then(|p| p.unit_price)
            .and_then(|price| price.multiply_quantity(self.quantity))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart snapshot.
///
/// ## Invariants
/// - Line order never affects the price
/// - Absent and empty line lists are equivalent (total is zero)
/// - A `null` entry inside the list is kept so validation can reject it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Cart identifier assigned by the cart store.
    #[serde(default)]
    pub id: String,

    /// Lines in insertion order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lines: Vec<Option<CartLine>>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(id: impl Into<String>) -> Self {
        Cart {
            id: id.into(),
            lines: Vec::new(),
        }
    }

    /// Creates a cart from fully formed lines.
    pub fn with_lines(id: impl Into<String>, lines: impl IntoIterator<Item = CartLine>) -> Self {
        Cart {
            id: id.into(),
            lines: lines.into_iter().map(Some).collect(),
        }
    }

    /// Appends a line.
    pub fn push(&mut self, line: CartLine) {
        self.lines.push(Some(line));
    }

    /// Checks if the cart has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over present lines, skipping `null` entries.
    ///
    /// Pricing stages only run after validation has ruled out `null`
    /// entries, so for them this visits every line exactly once.
    pub fn present_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().flatten()
    }
}

/// Treats a JSON `null` line list as an empty one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Option<CartLine>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Option<CartLine>>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Region
// =============================================================================

/// Delivery region. Selects the regional freight multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Southeast,
    South,
    Northeast,
    Midwest,
    North,
    /// Any region code this build does not know. Priced like no region.
    #[serde(other)]
    Unrecognized,
}

impl Region {
    /// Every named region, for table-driven tests and policy defaults.
    pub const ALL: [Region; 5] = [
        Region::Southeast,
        Region::South,
        Region::Northeast,
        Region::Midwest,
        Region::North,
    ];
}

// =============================================================================
// Customer Tier
// =============================================================================

/// Loyalty tier. Selects the share of freight the customer pays.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerTier {
    Gold,
    Silver,
    #[default]
    Bronze,
    /// Any tier code this build does not know. Pays full freight.
    #[serde(other)]
    Unrecognized,
}

impl CustomerTier {
    pub const ALL: [CustomerTier; 3] = [CustomerTier::Gold, CustomerTier::Silver, CustomerTier::Bronze];
}

// =============================================================================
// Unit Tests
// =============================================================================
