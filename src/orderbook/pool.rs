//! Preallocated recycler of order record slots.
//!
//! All [`OrderRecord`]s live in one fixed slab allocated at
//! construction; the matching engine borrows slots on order arrival and
//! returns them on full fill or cancel, so the steady-state data path
//! performs no heap allocation at all.

use super::error::OrderBookError;
use super::record::OrderRecord;
use parking_lot::Mutex;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default number of preallocated order slots.
pub const DEFAULT_POOL_CAPACITY: usize = 100_000;

/// A bounded LIFO recycler of [`OrderRecord`] slots.
///
/// The free list is a stack of slot indices behind a single mutex, so
/// `borrow` and `release` are O(1) and a just-released slot is the
/// first to be handed out again (warm in cache). Per-slot loan flags
/// detect double-return and foreign-slot return, which are treated as
/// memory-safety loss and abort the process.
///
/// # Access contract
///
/// Every slot outside the free list is "on loan" to exactly one owner:
/// either the single engine operation that borrowed it, or the
/// [`OrderLevel`](super::level::OrderLevel) it rests in. A loaned
/// record is read or mutated only by its owner; for resting records
/// that means only under the owning level's lock. The accessors below
/// rely on this discipline instead of per-slot locks.
pub struct OrderPool {
    /// The record arena. Slot `i` backs the record with index `i`.
    slots: Box<[UnsafeCell<OrderRecord>]>,

    /// Loan flag per slot: true while the slot is outside the free list.
    loaned: Box<[AtomicBool]>,

    /// Stack of free slot indices. The top of the stack is the most
    /// recently released slot.
    free: Mutex<Vec<u32>>,
}

// SAFETY: slot access follows the loan discipline documented above; the
// free-list mutex and loan flags provide the synchronization edges.
unsafe impl Send for OrderPool {}
unsafe impl Sync for OrderPool {}

impl OrderPool {
    /// Creates a pool with [`DEFAULT_POOL_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Creates a pool with `capacity` preallocated slots.
    ///
    /// # Panics
    /// Panics if `capacity` is 0 or does not fit a `u32` slot index
    /// (one value is reserved as the nil sentinel).
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be greater than 0");
        assert!(
            capacity < u32::MAX as usize,
            "pool capacity must fit in a u32 slot index"
        );

        let slots: Box<[UnsafeCell<OrderRecord>]> = (0..capacity)
            .map(|_| UnsafeCell::new(OrderRecord::vacant()))
            .collect();
        let loaned: Box<[AtomicBool]> =
            (0..capacity).map(|_| AtomicBool::new(false)).collect();
        // LIFO: slot 0 ends up on top and is borrowed first.
        let free: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            loaned,
            free: Mutex::new(free),
        }
    }

    /// Borrows a free slot.
    ///
    /// The returned record is vacant (all fields zeroed, links nil) and
    /// exclusively owned by the caller until it is either linked into a
    /// level or released back.
    ///
    /// # Errors
    /// Returns [`OrderBookError::PoolExhausted`] when every slot is on
    /// loan.
    pub fn borrow(&self) -> Result<u32, OrderBookError> {
        let slot = {
            let mut free = self.free.lock();
            match free.pop() {
                Some(slot) => slot,
                None => {
                    return Err(OrderBookError::PoolExhausted {
                        capacity: self.capacity(),
                    });
                }
            }
        };

        if self.loaned[slot as usize].swap(true, Ordering::AcqRel) {
            panic!("order pool corrupted: slot {slot} was free while on loan");
        }
        Ok(slot)
    }

    /// Returns a loaned slot to the pool.
    ///
    /// The record is zeroed and unlinked before the slot is republished
    /// as free, so a later borrower never sees stale intrusive links.
    /// The caller must have removed the record from its level first.
    ///
    /// # Panics
    /// Panics on double-return, on a slot index that does not belong to
    /// this pool, and if the free list would exceed capacity. All three
    /// mean the loan invariant is gone and are not recoverable.
    pub fn release(&self, slot: u32) {
        let idx = slot as usize;
        assert!(
            idx < self.slots.len(),
            "order pool: returned foreign slot {slot} (capacity {})",
            self.slots.len()
        );
        if !self.loaned[idx].swap(false, Ordering::AcqRel) {
            panic!("order pool: double return of slot {slot}");
        }

        self.record_mut(slot).reset();

        let mut free = self.free.lock();
        assert!(
            free.len() < self.slots.len(),
            "order pool overflow: more returns than borrows"
        );
        free.push(slot);
    }

    /// Number of slots currently free.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Number of slots currently on loan.
    pub fn in_use(&self) -> usize {
        self.capacity() - self.available()
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Shared access to a loaned record.
    ///
    /// The caller must own the loan per the access contract; for a
    /// resting record that means holding its level's lock.
    #[inline]
    pub(crate) fn record(&self, slot: u32) -> &OrderRecord {
        debug_assert!(self.loaned[slot as usize].load(Ordering::Relaxed));
        // SAFETY: the loan discipline rules out concurrent mutation
        // outside the owner.
        unsafe { &*self.slots[slot as usize].get() }
    }

    /// Exclusive access to a loaned record.
    ///
    /// Same contract as [`Self::record`]; additionally no other
    /// reference to this slot may be live.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn record_mut(&self, slot: u32) -> &mut OrderRecord {
        debug_assert!((slot as usize) < self.slots.len());
        // SAFETY: exclusive ownership per the loan discipline.
        unsafe { &mut *self.slots[slot as usize].get() }
    }
}

impl Default for OrderPool {
    fn default() -> Self {
        Self::new()
    }
}
