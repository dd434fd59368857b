//! Scalar types shared across the order book: sides, identifiers,
//! fixed-point prices and quantities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an order, assigned by the submitting client.
pub type OrderId = u64;

/// Fixed-point price scaled by [`PRICE_SCALE`]: `10500` represents 105.00.
///
/// Signed so that negative spreads remain representable.
pub type Price = i64;

/// Order quantity. Always greater than zero while an order rests.
pub type Quantity = u64;

/// Number of fixed-point units per whole currency unit.
pub const PRICE_SCALE: i64 = 100;

/// Which side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A bid: willing to buy at or below the order price.
    Buy,
    /// An ask: willing to sell at or above the order price.
    Sell,
}

impl Side {
    /// Returns the opposite side of the book.
    #[inline]
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}
