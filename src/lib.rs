//! # Concurrent CLOB Matching Engine
//!
//! An in-memory central limit order book with price-time priority
//! matching, built for high-frequency workloads: hundreds of thousands
//! of operations per second, sub-millisecond tails, and zero heap
//! allocation on the steady-state data path.
//!
//! ## Architecture
//!
//! - **Order pool**: every order lives in one preallocated slab; slots
//!   are borrowed on arrival and recycled on fill or cancel, so the hot
//!   path never allocates.
//! - **Intrusive price levels**: the FIFO queue at each price reuses
//!   the order records themselves as list nodes (slot-index links into
//!   the arena), giving O(1) append, head consumption, and interior
//!   removal for cancels.
//! - **Lock-free sorted sides**: bids and asks are concurrent skip
//!   lists from price to level, so matching at distinct prices and
//!   top-of-book reads proceed in parallel; each level has its own
//!   lock, and emptied levels are reclaimed with a tombstone plus
//!   value-conditional entry removal to close the lost-update race
//!   against concurrent inserts.
//! - **O(1) cancellation**: a concurrent id index locates the resting
//!   record; the claim happens under the owning level's lock, so a
//!   cancel racing a fill on the same order has exactly one winner.
//!
//! ## Example
//!
//! ```
//! use clob_rs::{MatchingEngine, OrderBook, Side};
//! use std::sync::Arc;
//!
//! let book = Arc::new(OrderBook::new("BTC/USD"));
//! let engine = MatchingEngine::new(book.clone());
//!
//! engine.process_order(1, Side::Sell, 10_500, 100).unwrap();
//! let trades = engine.process_order(2, Side::Buy, 10_500, 40).unwrap();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].price, 10_500);
//! assert_eq!(book.best_ask(), Some(10_500));
//! assert!(engine.cancel_order(1));
//! ```
//!
//! ## Concurrency model
//!
//! All public engine operations are safe from any number of threads.
//! Effects on the book are serializable; callers that need submission
//! order to equal the serialization order must serialize upstream.
//! Lock hierarchy: map-structural lock, then one level lock at a time,
//! then the pool and index leaves, so cancellation must never
//! be invoked from inside a market-data callback.

pub mod orderbook;

pub mod prelude;
mod utils;

pub use orderbook::{
    BookStats, DEFAULT_POOL_CAPACITY, DepthChangedEvent, DepthLevel, DepthListener, DepthSnapshot,
    MatchingEngine, OrderBook, OrderBookError, OrderId, OrderLevel, OrderPool, OrderRecord,
    PRICE_SCALE, Price, Quantity, QuoteChangedEvent, QuoteListener, RestingOrder, Side, Trade,
    TradeIdGenerator, TradeListener,
};
pub use orderbook::wire::{self, RawMessage, WIRE_MESSAGE_SIZE, WireError, WireMessage};
pub use utils::{current_time_millis, monotonic_nanos};
