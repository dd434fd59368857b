//! Public engine operations: accept, cancel, and modify orders.

use super::error::OrderBookError;
use super::matching::MatchingEngine;
use super::trade::Trade;
use super::types::{OrderId, Price, Quantity, Side};
use tracing::{trace, warn};

impl MatchingEngine {
    /// Accepts a limit order: matches it against the opposite side and
    /// rests any unmatched residue.
    ///
    /// Returns every trade produced by this call, in increasing
    /// (price, time) priority order of the consumed resting orders.
    /// Trades in the returned vector are committed facts and are never
    /// rolled back, even by a later error.
    ///
    /// # Errors
    /// - [`OrderBookError::InvalidQuantity`] when `quantity` is zero.
    /// - [`OrderBookError::DuplicateOrderId`] when an order with this
    ///   id already rests in the book.
    /// - [`OrderBookError::PoolExhausted`] when no slot is free; the
    ///   order is rejected with no side effects.
    pub fn process_order(
        &self,
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Result<Vec<Trade>, OrderBookError> {
        if quantity == 0 {
            warn!("rejected order {}: zero quantity", order_id);
            return Err(OrderBookError::InvalidQuantity { order_id, quantity });
        }
        if self.book.index.contains(order_id) {
            warn!("rejected order {}: id already resting", order_id);
            return Err(OrderBookError::DuplicateOrderId { order_id });
        }

        let quote_before = self.book.quote();
        let slot = self.book.pool.borrow()?;
        {
            let record = self.book.pool.record_mut(slot);
            record.order_id = order_id;
            record.side = side;
            record.price = price;
            record.quantity = quantity;
        }
        trace!("processing order {} {} {}@{}", order_id, side, quantity, price);

        let mut trades = Vec::new();
        let mut slot = slot;
        let remaining = loop {
            self.match_incoming(slot, &mut trades);

            let remaining = self.book.pool.record(slot).quantity;
            if remaining == 0 {
                self.book.pool.release(slot);
                break 0;
            }
            self.book.insert_resting(slot);

            // A crossing opposite order may have arrived between the
            // final scan and the insert. Reclaim the residue and keep
            // matching, so the book never rests crossed or locked.
            let crossed = match side {
                Side::Buy => self.book.best_ask().is_some_and(|ask| price >= ask),
                Side::Sell => self.book.best_bid().is_some_and(|bid| price <= bid),
            };
            if !crossed {
                break remaining;
            }
            match self.book.take_resting(order_id) {
                Some(reclaimed) => slot = reclaimed,
                // A concurrent fill or cancel got there first; the
                // residue is no longer ours to move.
                None => break remaining,
            }
        };

        for trade in &trades {
            self.book.record_trade(trade);
        }
        self.book.notify_quote_if_changed(quote_before);

        trace!(
            "order {} done: {} trades, {} resting",
            order_id,
            trades.len(),
            remaining
        );
        Ok(trades)
    }

    /// Cancels the resting order `order_id`.
    ///
    /// Returns `true` when the residue was removed from the book,
    /// `false` when the id was not resting (never accepted, already
    /// fully filled, or already cancelled). A cancel racing a fill on
    /// the same order resolves to exactly one winner.
    ///
    /// Must not be called while holding any level lock.
    pub fn cancel_order(&self, order_id: OrderId) -> bool {
        let quote_before = self.book.quote();
        match self.book.remove_resting(order_id) {
            Some((side, price, quantity)) => {
                trace!("cancelled order {} {} {}@{}", order_id, side, quantity, price);
                self.book.notify_quote_if_changed(quote_before);
                true
            }
            None => {
                trace!("cancel of {}: not resting", order_id);
                false
            }
        }
    }

    /// Replaces the resting order `order_id` with a fresh submission at
    /// `new_price`/`new_quantity`.
    ///
    /// Semantically cancel-then-resubmit under the same id: time
    /// priority is always lost, even when price and quantity are
    /// unchanged, and interleaved orders from other threads may execute
    /// in between. When the cancel finds nothing to remove, no new
    /// order is inserted and the result is an empty trade list.
    ///
    /// # Errors
    /// Same as [`Self::process_order`] for the resubmission leg. The
    /// cancel leg has already happened when such an error is returned.
    pub fn modify_order(
        &self,
        order_id: OrderId,
        side: Side,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<Vec<Trade>, OrderBookError> {
        if !self.cancel_order(order_id) {
            return Ok(Vec::new());
        }
        trace!(
            "modify {}: resubmitting {} {}@{}",
            order_id, side, new_quantity, new_price
        );
        self.process_order(order_id, side, new_price, new_quantity)
    }
}
