//! Market-data events emitted by the book.
//!
//! Listeners run synchronously on the thread that performed the
//! mutation. It is assumed the listener knows which book it observes,
//! so events do not carry the symbol. Implementations must be
//! non-blocking and must not re-enter the engine.

use super::types::{Price, Quantity, Side};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Top-of-book (L1) change: emitted whenever the best bid or best ask
/// moves as the result of an add, cancel, modify, or match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuoteChangedEvent {
    /// Best bid price after the change, if any bid rests.
    pub best_bid: Option<Price>,
    /// Best ask price after the change, if any ask rests.
    pub best_ask: Option<Price>,
}

/// Aggregate depth (L2) change for a single price level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DepthChangedEvent {
    /// The side of the changed level.
    pub side: Side,
    /// Price of the changed level.
    pub price: Price,
    /// Remaining total quantity at the level; zero means the level is
    /// gone.
    pub quantity: Quantity,
}

/// A thread-safe listener for L1 quote changes.
pub type QuoteListener = Arc<dyn Fn(QuoteChangedEvent) + Send + Sync>;

/// A thread-safe listener for per-level depth changes.
pub type DepthListener = Arc<dyn Fn(DepthChangedEvent) + Send + Sync>;
