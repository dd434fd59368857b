//! Prelude module that re-exports the commonly used types.
//!
//! ```rust
//! use clob_rs::prelude::*;
//! ```

// Core book and engine types
pub use crate::orderbook::{MatchingEngine, OrderBook, OrderBookError, RestingOrder};

// Pool and level building blocks
pub use crate::orderbook::{DEFAULT_POOL_CAPACITY, OrderLevel, OrderPool, OrderRecord};

// Trade and market-data types
pub use crate::orderbook::{
    DepthChangedEvent, DepthListener, QuoteChangedEvent, QuoteListener, Trade, TradeListener,
};

// Snapshot types
pub use crate::orderbook::{BookStats, DepthLevel, DepthSnapshot};

// Scalar vocabulary
pub use crate::orderbook::{OrderId, PRICE_SCALE, Price, Quantity, Side};

// Wire codec
pub use crate::orderbook::wire::{RawMessage, WIRE_MESSAGE_SIZE, WireError, WireMessage};
