//! Trade executions produced by the matching engine.

use super::types::{OrderId, Price, Quantity};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// One execution between a buy order and a sell order.
///
/// Trades are immutable facts: once a trade appears in the vector
/// returned by `process_order`, it is committed and never rolled back.
/// The price is always the resting order's price: the aggressor gets
/// price improvement, the resting side keeps its quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trade {
    /// Unique identifier of this execution.
    pub trade_id: Uuid,
    /// Id of the buy-side order.
    pub buy_order_id: OrderId,
    /// Id of the sell-side order.
    pub sell_order_id: OrderId,
    /// Execution price (the resting order's price).
    pub price: Price,
    /// Executed quantity, always greater than zero.
    pub quantity: Quantity,
    /// Monotonic timestamp in nanoseconds since engine start.
    pub timestamp: u64,
}

/// Generator of sequential, namespaced trade ids.
///
/// A v4 namespace is drawn once per engine; each trade id is the v5
/// hash of a monotonically increasing counter within that namespace,
/// so ids are unique, cheap to produce, and stable to reproduce from
/// the sequence number.
pub struct TradeIdGenerator {
    namespace: Uuid,
    counter: AtomicU64,
}

impl TradeIdGenerator {
    /// Creates a generator with a fresh random namespace.
    pub fn new() -> Self {
        Self {
            namespace: Uuid::new_v4(),
            counter: AtomicU64::new(0),
        }
    }

    /// Next unique trade id.
    pub fn next(&self) -> Uuid {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        Uuid::new_v5(&self.namespace, &seq.to_le_bytes())
    }
}

impl Default for TradeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback invoked synchronously for every trade, from the thread that
/// produced it. Implementations must be non-blocking and must not
/// re-enter the engine.
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;
