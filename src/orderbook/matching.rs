//! Contains the core matching loop of the engine.
//!
//! An incoming order sweeps the opposite side of the book best price
//! first. Each crossing level is consumed head-first under its own
//! lock, so matching at distinct prices proceeds in parallel and FIFO
//! order within a price is enforced by the lock alone.

use super::book::OrderBook;
use super::trade::{Trade, TradeIdGenerator};
use super::types::{Price, Side};
use crate::utils::monotonic_nanos;
use std::sync::Arc;

/// The matching engine: accepts, matches, cancels, and modifies orders
/// against one [`OrderBook`] under price-time priority.
///
/// All operations are safe to call concurrently from any number of
/// threads. Effects on the book are serializable; submission order
/// across threads is not guaranteed to equal the serialization order.
pub struct MatchingEngine {
    pub(super) book: Arc<OrderBook>,
    pub(super) trade_ids: TradeIdGenerator,
}

/// True when an incoming order at `limit` crosses the best opposite
/// price: a buy crosses at or above the best ask, a sell at or below
/// the best bid.
#[inline]
pub(super) fn crosses(side: Side, limit: Price, best_opposite: Price) -> bool {
    match side {
        Side::Buy => limit >= best_opposite,
        Side::Sell => limit <= best_opposite,
    }
}

impl MatchingEngine {
    /// Creates an engine over the given book.
    pub fn new(book: Arc<OrderBook>) -> Self {
        Self {
            book,
            trade_ids: TradeIdGenerator::new(),
        }
    }

    /// The book this engine matches against.
    pub fn book(&self) -> &Arc<OrderBook> {
        &self.book
    }

    /// Matches the in-flight record at `slot` against the opposite side
    /// of the book, appending one [`Trade`] per fill.
    ///
    /// Consumption follows price-time priority: best opposite level
    /// first, oldest resting order first within a level, and every
    /// execution prints at the resting order's price. Fully filled
    /// resting records are detached, unregistered, and returned to the
    /// pool while the level lock is still held (the pool lock is a
    /// leaf, so that nesting is safe). A level that empties is
    /// tombstoned under its lock and its map entry dropped afterwards.
    ///
    /// On return the record's quantity holds the unmatched residue; the
    /// caller decides whether to rest it or return the slot.
    pub(super) fn match_incoming(&self, slot: u32, trades: &mut Vec<Trade>) {
        let book = &*self.book;
        let pool = &*book.pool;

        let (order_id, side, limit_price, mut remaining) = {
            let record = pool.record(slot);
            (record.order_id, record.side, record.price, record.quantity)
        };
        let opposite = book.side_map(side.opposite());

        while remaining > 0 {
            // Best opposite level: lowest ask for a buy, highest bid
            // for a sell.
            let Some(entry) = (match side {
                Side::Buy => opposite.front(),
                Side::Sell => opposite.back(),
            }) else {
                break;
            };
            let best_price = *entry.key();
            if !crosses(side, limit_price, best_price) {
                break;
            }

            let level = entry.value();
            let mut queue = level.lock();
            if queue.is_removed() {
                // Reclaimed between the map read and the lock: drop the
                // stale entry (no-op if already gone) and rescan.
                drop(queue);
                book.drop_level_entry(&entry);
                continue;
            }

            while remaining > 0 {
                let Some(resting_slot) = queue.peek_first() else {
                    break;
                };
                let (resting_id, resting_price, resting_quantity) = {
                    let resting = pool.record(resting_slot);
                    (resting.order_id, resting.price, resting.quantity)
                };

                let fill = remaining.min(resting_quantity);
                let (buy_order_id, sell_order_id) = match side {
                    Side::Buy => (order_id, resting_id),
                    Side::Sell => (resting_id, order_id),
                };
                trades.push(Trade {
                    trade_id: self.trade_ids.next(),
                    buy_order_id,
                    sell_order_id,
                    // The resting price wins: price improvement for the
                    // aggressor, quote kept for the maker.
                    price: resting_price,
                    quantity: fill,
                    timestamp: monotonic_nanos(),
                });

                remaining -= fill;
                queue.fill(pool, resting_slot, fill);

                if pool.record(resting_slot).quantity == 0 {
                    queue.poll_first(pool);
                    book.index.remove(resting_id);
                    pool.release(resting_slot);
                }
            }

            let emptied = queue.is_empty();
            if emptied {
                // Tombstone before releasing the lock so a concurrent
                // inserter holding this instance cannot slip an order
                // into a level that is about to leave the map.
                queue.set_removed();
            }
            let level_quantity = queue.total_quantity();
            drop(queue);

            if emptied {
                book.drop_level_entry(&entry);
            }
            book.notify_depth(side.opposite(), best_price, level_quantity);
        }

        pool.record_mut(slot).quantity = remaining;
    }
}
