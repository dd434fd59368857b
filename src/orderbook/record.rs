//! The fixed-width order record stored in the pool arena.

use super::types::{OrderId, Price, Quantity, Side};

/// Sentinel slot index meaning "no link".
pub(crate) const NIL_SLOT: u32 = u32::MAX;

/// A single resting or in-flight order.
///
/// Records are slab-owned by the [`OrderPool`](super::pool::OrderPool)
/// and double as the nodes of the per-price FIFO queue: `next` and
/// `prev` are slot indices into the same arena, so unlinking a record
/// is O(1) from its slot alone and no per-node allocation ever happens.
///
/// A record that is not linked into a level has both links set to
/// [`NIL_SLOT`].
#[derive(Debug, Clone, Copy)]
pub struct OrderRecord {
    /// Client-assigned order identifier.
    pub order_id: OrderId,
    /// Side of the book this order rests on.
    pub side: Side,
    /// Limit price, fixed-point.
    pub price: Price,
    /// Remaining quantity. Greater than zero while resting.
    pub quantity: Quantity,
    /// Slot index of the next (younger) record at the same price.
    pub(crate) next: u32,
    /// Slot index of the previous (older) record at the same price.
    pub(crate) prev: u32,
}

impl OrderRecord {
    /// An empty, unlinked record. This is the state of every slot in a
    /// freshly constructed pool and the state `reset` restores.
    pub(crate) const fn vacant() -> Self {
        Self {
            order_id: 0,
            side: Side::Buy,
            price: 0,
            quantity: 0,
            next: NIL_SLOT,
            prev: NIL_SLOT,
        }
    }

    /// Zeroes all fields and clears both links.
    ///
    /// Called by the pool before a slot is republished as free, so a
    /// later borrower can never observe stale intrusive pointers.
    pub(crate) fn reset(&mut self) {
        *self = Self::vacant();
    }

    /// True when the record is not linked into any level.
    #[inline]
    pub(crate) fn is_unlinked(&self) -> bool {
        self.next == NIL_SLOT && self.prev == NIL_SLOT
    }
}
