//! A single price level: FIFO queue of resting orders at one price.
//!
//! The queue is intrusive: records in the pool arena are the nodes,
//! linked by slot index, so appending, detaching the head, and
//! removing an arbitrary record (the cancel path) are all O(1) and
//! allocation-free. All list state lives behind one mutex per level,
//! which is what lets distinct prices match and cancel in parallel.

use super::pool::OrderPool;
use super::record::NIL_SLOT;
use super::types::{Price, Quantity, Side};
use parking_lot::{Mutex, MutexGuard};

/// One price level of the book.
///
/// Price and side are fixed at construction; everything mutable sits in
/// the [`LevelQueue`] behind the lock. Once the queue's `removed`
/// tombstone is set this instance is dead: it accepts no further
/// insertions and a later order at the same price creates a fresh
/// level.
pub struct OrderLevel {
    price: Price,
    side: Side,
    queue: Mutex<LevelQueue>,
}

/// The lock-protected state of an [`OrderLevel`].
pub struct LevelQueue {
    /// Oldest resting order, consumed first. [`NIL_SLOT`] when empty.
    head: u32,
    /// Youngest resting order, insertion point. [`NIL_SLOT`] when empty.
    tail: u32,
    /// Number of resting orders.
    size: usize,
    /// Sum of remaining quantities, maintained incrementally.
    total_quantity: Quantity,
    /// Tombstone. Set under the lock the instant the level empties
    /// during matching or cancellation, before the map entry is
    /// dropped, so a racing inserter that still holds this instance
    /// knows to create a fresh level instead.
    removed: bool,
}

impl OrderLevel {
    /// Creates an empty, live level.
    pub fn new(price: Price, side: Side) -> Self {
        Self {
            price,
            side,
            queue: Mutex::new(LevelQueue {
                head: NIL_SLOT,
                tail: NIL_SLOT,
                size: 0,
                total_quantity: 0,
                removed: false,
            }),
        }
    }

    /// The price shared by every order in this level.
    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// The side shared by every order in this level.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Acquires the level lock. The guard is the only path to the
    /// mutable queue operations; dropping it releases the lock.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, LevelQueue> {
        self.queue.lock()
    }

    /// Number of resting orders. Takes the lock.
    pub fn size(&self) -> usize {
        self.queue.lock().size
    }

    /// True when no orders rest here. Takes the lock.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Sum of remaining quantities. Takes the lock.
    pub fn total_quantity(&self) -> Quantity {
        self.queue.lock().total_quantity
    }

    /// True once the tombstone is set. Takes the lock.
    pub fn is_removed(&self) -> bool {
        self.queue.lock().removed
    }
}

impl LevelQueue {
    /// True when no orders rest here.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of resting orders.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Sum of remaining quantities at this level.
    #[inline]
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// True once the tombstone is set.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Sets the tombstone. Only legal on an empty queue.
    pub fn set_removed(&mut self) {
        assert!(
            self.is_empty(),
            "tombstoned a level that still holds {} orders",
            self.size
        );
        self.removed = true;
    }

    /// Slot of the oldest resting order, if any.
    #[inline]
    pub fn peek_first(&self) -> Option<u32> {
        (self.head != NIL_SLOT).then_some(self.head)
    }

    /// Appends `slot` at the tail (youngest position).
    ///
    /// The record must already carry its price and quantity and must be
    /// unlinked. Insertion into a tombstoned instance is a logic error
    /// and aborts; callers check `is_removed` under this same lock and
    /// retry against a fresh level instead.
    pub fn push_back(&mut self, pool: &OrderPool, slot: u32) {
        assert!(!self.removed, "insertion into a tombstoned level");

        let qty = {
            let record = pool.record_mut(slot);
            debug_assert!(record.is_unlinked());
            record.prev = self.tail;
            record.next = NIL_SLOT;
            record.quantity
        };

        if self.tail == NIL_SLOT {
            self.head = slot;
        } else {
            pool.record_mut(self.tail).next = slot;
        }
        self.tail = slot;

        self.size += 1;
        self.total_quantity = self
            .total_quantity
            .checked_add(qty)
            .expect("level quantity overflow");
    }

    /// Detaches and returns the oldest resting order, if any.
    pub fn poll_first(&mut self, pool: &OrderPool) -> Option<u32> {
        let slot = self.peek_first()?;
        self.unlink(pool, slot);
        Some(slot)
    }

    /// Unlinks `slot` from anywhere in the queue in O(1).
    ///
    /// The record's links are cleared and the level aggregates are
    /// reduced by its remaining quantity. The slot itself stays on loan;
    /// returning it to the pool is the caller's job.
    pub fn unlink(&mut self, pool: &OrderPool, slot: u32) {
        let (prev, next, qty) = {
            let record = pool.record(slot);
            (record.prev, record.next, record.quantity)
        };

        if prev == NIL_SLOT {
            debug_assert_eq!(self.head, slot);
            self.head = next;
        } else {
            pool.record_mut(prev).next = next;
        }
        if next == NIL_SLOT {
            debug_assert_eq!(self.tail, slot);
            self.tail = prev;
        } else {
            pool.record_mut(next).prev = prev;
        }

        {
            let record = pool.record_mut(slot);
            record.next = NIL_SLOT;
            record.prev = NIL_SLOT;
        }

        self.size = self
            .size
            .checked_sub(1)
            .expect("level size underflow: unlink of a non-member record");
        self.total_quantity = self
            .total_quantity
            .checked_sub(qty)
            .expect("level quantity underflow");
    }

    /// Executes `amount` against the record at `slot`, reducing both
    /// its remaining quantity and the level aggregate.
    ///
    /// `amount` must be positive and no larger than the record's
    /// remaining quantity; anything else means the matching loop has
    /// lost track of quantities and aborts.
    pub fn fill(&mut self, pool: &OrderPool, slot: u32, amount: Quantity) {
        let record = pool.record_mut(slot);
        assert!(
            amount > 0 && amount <= record.quantity,
            "fill of {amount} against remaining {}",
            record.quantity
        );
        record.quantity -= amount;
        self.total_quantity = self
            .total_quantity
            .checked_sub(amount)
            .expect("level quantity underflow");
    }
}
