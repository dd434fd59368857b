//! Core OrderBook implementation: the two sorted sides, the order-id
//! index, and the structural insert/remove primitives the matching
//! engine builds on.

use super::events::{DepthChangedEvent, DepthListener, QuoteChangedEvent, QuoteListener};
use super::index::OrderIndex;
use super::level::OrderLevel;
use super::pool::OrderPool;
use super::trade::{Trade, TradeListener};
use super::types::{OrderId, Price, Quantity, Side};
use crossbeam::atomic::AtomicCell;
use crossbeam_skiplist::SkipMap;
use crossbeam_skiplist::map::Entry;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::trace;

/// A read-only view of a resting order, as returned by
/// [`OrderBook::find_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestingOrder {
    /// The order's id.
    pub order_id: OrderId,
    /// Side the order rests on.
    pub side: Side,
    /// Limit price.
    pub price: Price,
    /// Remaining quantity at the time of the read.
    pub quantity: Quantity,
}

/// The two-sided limit order book.
///
/// Both sides are concurrent ordered maps (skip lists) from price to an
/// [`OrderLevel`]. Keys are ascending on both sides: the best ask (the
/// minimum) is the front of `asks`, the best bid (the maximum) is the
/// back of `bids`, which realizes the asks-ascending / bids-descending
/// reading order without a reversed key type.
///
/// Structural changes to the maps (creating a level, dropping an
/// emptied one) bump a monotonic version stamp under a structural write
/// lock; `best_bid`/`best_ask` read optimistically against the stamp
/// and fall back to one retry under the shared read lock.
pub struct OrderBook {
    /// The symbol or identifier for this order book.
    pub(super) symbol: String,

    /// Bid side price levels (buy orders). Best bid is the last entry.
    pub(super) bids: SkipMap<Price, Arc<OrderLevel>>,

    /// Ask side price levels (sell orders). Best ask is the first entry.
    pub(super) asks: SkipMap<Price, Arc<OrderLevel>>,

    /// Order id to (slot, price, side) for O(1) cancellation.
    pub(super) index: OrderIndex,

    /// The record arena every order in this book is loaned from.
    pub(super) pool: Arc<OrderPool>,

    /// Monotonic stamp, bumped on every level creation or removal.
    version: AtomicU64,

    /// Held for writing around structural map changes; the read side is
    /// the fallback path of the optimistic quote reads.
    structure: RwLock<()>,

    /// The last price at which a trade occurred.
    pub(super) last_trade_price: AtomicCell<Price>,

    /// Flag indicating if there was a trade.
    pub(super) has_traded: AtomicBool,

    /// Listens to every trade produced against this book.
    pub trade_listener: Option<TradeListener>,

    /// Listens to best bid/ask (L1) changes.
    pub quote_listener: Option<QuoteListener>,

    /// Listens to per-level aggregate depth (L2) changes.
    pub depth_listener: Option<DepthListener>,
}

impl OrderBook {
    /// Creates a new order book for the given symbol with the default
    /// pool capacity.
    pub fn new(symbol: &str) -> Self {
        Self::with_pool(symbol, Arc::new(OrderPool::new()))
    }

    /// Creates a new order book with a pool of `capacity` slots.
    pub fn with_pool_capacity(symbol: &str, capacity: usize) -> Self {
        Self::with_pool(symbol, Arc::new(OrderPool::with_capacity(capacity)))
    }

    /// Creates a new order book backed by an existing pool.
    pub fn with_pool(symbol: &str, pool: Arc<OrderPool>) -> Self {
        Self {
            symbol: symbol.to_string(),
            bids: SkipMap::new(),
            asks: SkipMap::new(),
            index: OrderIndex::new(),
            pool,
            version: AtomicU64::new(0),
            structure: RwLock::new(()),
            last_trade_price: AtomicCell::new(0),
            has_traded: AtomicBool::new(false),
            trade_listener: None,
            quote_listener: None,
            depth_listener: None,
        }
    }

    /// Get the symbol of this order book.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The pool backing this book.
    pub fn pool(&self) -> &Arc<OrderPool> {
        &self.pool
    }

    /// Set a trade listener for this order book.
    pub fn set_trade_listener(&mut self, listener: TradeListener) {
        self.trade_listener = Some(listener);
    }

    /// Set a best bid/ask change listener for this order book.
    pub fn set_quote_listener(&mut self, listener: QuoteListener) {
        self.quote_listener = Some(listener);
    }

    /// Set a per-level depth change listener for this order book.
    pub fn set_depth_listener(&mut self, listener: DepthListener) {
        self.depth_listener = Some(listener);
    }

    /// Get the best bid price, if any.
    ///
    /// Optimistic read: the back of the bid map is read without a lock
    /// and validated against the structure version stamp; on a
    /// concurrent structural change the read retries once under the
    /// shared read lock. The result may lag concurrent mutation but is
    /// never a torn value.
    pub fn best_bid(&self) -> Option<Price> {
        let stamp = self.version.load(Ordering::Acquire);
        // SkipMap maintains sorted order, best bid (highest price) is last.
        let best = self.bids.back().map(|entry| *entry.key());
        if self.version.load(Ordering::Acquire) == stamp {
            return best;
        }
        let _read = self.structure.read();
        self.bids.back().map(|entry| *entry.key())
    }

    /// Get the best ask price, if any.
    ///
    /// Same read protocol as [`Self::best_bid`].
    pub fn best_ask(&self) -> Option<Price> {
        let stamp = self.version.load(Ordering::Acquire);
        // SkipMap maintains sorted order, best ask (lowest price) is first.
        let best = self.asks.front().map(|entry| *entry.key());
        if self.version.load(Ordering::Acquire) == stamp {
            return best;
        }
        let _read = self.structure.read();
        self.asks.front().map(|entry| *entry.key())
    }

    /// Both best prices in one call.
    pub fn quote(&self) -> (Option<Price>, Option<Price>) {
        (self.best_bid(), self.best_ask())
    }

    /// Get the spread (best ask - best bid), if both sides are present.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Get the mid price (average of best bid and best ask).
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid as f64 + ask as f64) / 2.0),
            _ => None,
        }
    }

    /// Get the last trade price, if any trade has occurred.
    pub fn last_trade_price(&self) -> Option<Price> {
        if self.has_traded.load(Ordering::Relaxed) {
            Some(self.last_trade_price.load())
        } else {
            None
        }
    }

    /// Number of price levels currently mapped on `side`.
    pub fn level_count(&self, side: Side) -> usize {
        self.side_map(side).len()
    }

    /// Number of orders currently resting in the book.
    pub fn resting_orders(&self) -> usize {
        self.index.len()
    }

    /// O(1) lookup of a resting order through the index.
    ///
    /// Returns `None` when the id is not resting (never accepted, fully
    /// filled, or cancelled). The quantity is read under the owning
    /// level's lock and may be stale by the time the caller acts on it.
    pub fn find_order(&self, order_id: OrderId) -> Option<RestingOrder> {
        loop {
            let (slot, price, side) = self.index.get(order_id)?;
            let Some(entry) = self.side_map(side).get(&price) else {
                // The level vanished under us; the index will have
                // caught up by the next attempt.
                continue;
            };
            let level = entry.value();
            let queue = level.lock();
            if queue.is_removed() {
                continue;
            }
            if self.index.get(order_id) != Some((slot, price, side)) {
                continue;
            }
            let quantity = self.pool.record(slot).quantity;
            return Some(RestingOrder {
                order_id,
                side,
                price,
                quantity,
            });
        }
    }

    /// The sorted level map for one side.
    pub(super) fn side_map(&self, side: Side) -> &SkipMap<Price, Arc<OrderLevel>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Returns the entry for the level at `price` on `side`, creating
    /// it if absent.
    ///
    /// Creation happens under the structural write lock and bumps the
    /// version stamp, so that level creation and the first insertion
    /// into it form one observable step per key for quote readers.
    /// The returned level may already be tombstoned; callers check
    /// under the level lock and retry.
    pub(super) fn level_entry_for_insert(
        &self,
        side: Side,
        price: Price,
    ) -> Entry<'_, Price, Arc<OrderLevel>> {
        let map = self.side_map(side);
        if let Some(entry) = map.get(&price) {
            return entry;
        }
        let _write = self.structure.write();
        let entry = map.get_or_insert_with(price, || Arc::new(OrderLevel::new(price, side)));
        self.version.fetch_add(1, Ordering::Release);
        entry
    }

    /// Drops a level entry from its map, value-conditionally.
    ///
    /// `Entry::remove` unlinks exactly the node the caller observed: if
    /// the key has since been re-occupied by a fresh level, that level
    /// is untouched. This is the remove half of the lost-update defense
    /// around empty-level reclamation.
    pub(super) fn drop_level_entry(&self, entry: &Entry<'_, Price, Arc<OrderLevel>>) {
        let _write = self.structure.write();
        if entry.remove() {
            self.version.fetch_add(1, Ordering::Release);
        }
    }

    /// Links a loaned record into the book: appends it to the level at
    /// its price (creating or refreshing the level as needed) and
    /// registers it in the index.
    ///
    /// The caller owns the loan on `slot` and has fully initialized the
    /// record. On return the record rests in the book and the level
    /// owns the loan.
    pub(super) fn insert_resting(&self, slot: u32) {
        let (order_id, side, price) = {
            let record = self.pool.record(slot);
            (record.order_id, record.side, record.price)
        };

        loop {
            let entry = self.level_entry_for_insert(side, price);
            let level = entry.value();
            let mut queue = level.lock();
            if queue.is_removed() {
                // Lost the race against reclamation: this instance is
                // dead. Clear the stale entry (if still ours) and build
                // a fresh level.
                drop(queue);
                self.drop_level_entry(&entry);
                continue;
            }
            queue.push_back(&self.pool, slot);
            self.index.put(order_id, slot, price, side);
            let level_quantity = queue.total_quantity();
            drop(queue);

            trace!(
                "order {} resting {} at {} (level total {})",
                order_id, side, price, level_quantity
            );
            self.notify_depth(side, price, level_quantity);
            return;
        }
    }

    /// Unlinks the resting order `order_id` from the book and returns
    /// its slot to the pool.
    ///
    /// Returns the (side, price, remaining quantity) of the removed
    /// record, or `None` when the id was not resting, including when a
    /// concurrent match consumed it first. Exactly one of a racing
    /// cancel and fill wins.
    ///
    /// The caller must not hold any level lock.
    pub(super) fn remove_resting(&self, order_id: OrderId) -> Option<(Side, Price, Quantity)> {
        let slot = self.take_resting(order_id)?;
        let (side, price, quantity) = {
            let record = self.pool.record(slot);
            (record.side, record.price, record.quantity)
        };
        self.pool.release(slot);
        Some((side, price, quantity))
    }

    /// Claims the resting order `order_id` back out of the book without
    /// releasing its slot: the loan transfers to the caller.
    ///
    /// This is the shared claim step of cancellation and of the
    /// crossed-residue reclaim in `process_order`. Returns `None` when
    /// the id was not resting.
    ///
    /// The caller must not hold any level lock.
    pub(super) fn take_resting(&self, order_id: OrderId) -> Option<u32> {
        loop {
            let (slot, price, side) = self.index.get(order_id)?;
            let Some(entry) = self.side_map(side).get(&price) else {
                // Level already reclaimed; the record was consumed or
                // moved. Re-read the index.
                continue;
            };
            let level = entry.value();
            let mut queue = level.lock();
            if queue.is_removed() {
                continue;
            }
            // Claim under the level lock. Index membership is mutated
            // only under the owning level's lock, so success here
            // proves the record rests in this very level instance.
            if !self.index.remove_if_location(order_id, (slot, price, side)) {
                continue;
            }

            queue.unlink(&self.pool, slot);

            let emptied = queue.is_empty();
            if emptied {
                queue.set_removed();
            }
            let level_quantity = queue.total_quantity();
            drop(queue);

            if emptied {
                self.drop_level_entry(&entry);
            }
            self.notify_depth(side, price, level_quantity);
            return Some(slot);
        }
    }

    /// Records a trade against the book state and notifies the trade
    /// listener.
    pub(super) fn record_trade(&self, trade: &Trade) {
        self.last_trade_price.store(trade.price);
        self.has_traded.store(true, Ordering::Relaxed);
        if let Some(listener) = &self.trade_listener {
            listener(trade);
        }
    }

    /// Emits an L2 depth change for one level.
    pub(super) fn notify_depth(&self, side: Side, price: Price, quantity: Quantity) {
        if let Some(listener) = &self.depth_listener {
            listener(DepthChangedEvent {
                side,
                price,
                quantity,
            });
        }
    }

    /// Emits an L1 quote change if the top of book moved relative to
    /// `before`.
    pub(super) fn notify_quote_if_changed(&self, before: (Option<Price>, Option<Price>)) {
        if let Some(listener) = &self.quote_listener {
            let after = self.quote();
            if after != before {
                listener(QuoteChangedEvent {
                    best_bid: after.0,
                    best_ask: after.1,
                });
            }
        }
    }
}
