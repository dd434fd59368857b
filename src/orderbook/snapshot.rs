//! Point-in-time views of the book: aggregate depth and engine stats.
//!
//! These back read-only surfaces (book/quote/stats endpoints, market
//! data snapshots) and are built from lock-free map iteration plus the
//! per-level aggregate reads; a snapshot taken under concurrent
//! mutation is internally consistent per level but not across levels.

use super::book::OrderBook;
use super::types::{Price, Quantity, Side};
use crate::utils::current_time_millis;
use serde::Serialize;

/// Aggregate state of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    /// The level's price.
    pub price: Price,
    /// Total resting quantity at this price.
    pub quantity: Quantity,
    /// Number of resting orders at this price.
    pub orders: usize,
}

/// Aggregated L2 view of both sides of the book.
///
/// Bids are sorted descending and asks ascending, best price first on
/// each side.
#[derive(Debug, Clone, Serialize)]
pub struct DepthSnapshot {
    /// Symbol of the book this snapshot was taken from.
    pub symbol: String,
    /// Wall-clock capture time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Bid levels, best (highest) first.
    pub bids: Vec<DepthLevel>,
    /// Ask levels, best (lowest) first.
    pub asks: Vec<DepthLevel>,
}

impl DepthSnapshot {
    /// Serializes the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Operational counters for monitoring and the stats surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BookStats {
    /// Total slots in the order pool.
    pub pool_capacity: usize,
    /// Slots currently free.
    pub pool_available: usize,
    /// Slots currently on loan (resting plus in-flight).
    pub pool_in_use: usize,
    /// Orders currently resting in the book.
    pub resting_orders: usize,
    /// Number of bid price levels.
    pub bid_levels: usize,
    /// Number of ask price levels.
    pub ask_levels: usize,
    /// Price of the last execution, if any trade has occurred.
    pub last_trade_price: Option<Price>,
}

impl OrderBook {
    /// Captures up to `depth` levels of aggregate depth per side.
    ///
    /// Pass `usize::MAX` for the full book. Levels that are empty or
    /// mid-reclamation are skipped.
    pub fn depth_snapshot(&self, depth: usize) -> DepthSnapshot {
        let collect = |side: Side| {
            let map = self.side_map(side);
            let entries: Box<dyn Iterator<Item = _>> = match side {
                // Best (highest) bid first.
                Side::Buy => Box::new(map.iter().rev()),
                // Best (lowest) ask first.
                Side::Sell => Box::new(map.iter()),
            };
            entries
                .map(|entry| {
                    let level = entry.value();
                    let queue = level.lock();
                    DepthLevel {
                        price: level.price(),
                        quantity: queue.total_quantity(),
                        orders: queue.len(),
                    }
                })
                .filter(|level| level.quantity > 0)
                .take(depth)
                .collect::<Vec<_>>()
        };

        DepthSnapshot {
            symbol: self.symbol.clone(),
            timestamp: current_time_millis(),
            bids: collect(Side::Buy),
            asks: collect(Side::Sell),
        }
    }

    /// Current operational counters.
    pub fn stats(&self) -> BookStats {
        BookStats {
            pool_capacity: self.pool.capacity(),
            pool_available: self.pool.available(),
            pool_in_use: self.pool.in_use(),
            resting_orders: self.index.len(),
            bid_levels: self.bids.len(),
            ask_levels: self.asks.len(),
            last_trade_price: self.last_trade_price(),
        }
    }
}
