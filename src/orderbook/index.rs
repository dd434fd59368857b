//! Order-id index: O(1) location of resting orders for the cancel path.

use super::types::{OrderId, Price, Side};
use dashmap::DashMap;

/// Where a resting order lives: its pool slot and the (price, side)
/// of the level holding it.
pub type OrderLocation = (u32, Price, Side);

/// Concurrent map from order id to the location of the resting record.
///
/// An id is present iff its record currently rests in some level of the
/// book: entries are inserted under the lock of the level the record
/// joins and removed under the lock of the level it leaves, which makes
/// the level lock the linearization point for membership. The stored
/// (price, side) lets the cancel path find the owning level without
/// touching the record itself.
pub struct OrderIndex {
    locations: DashMap<OrderId, OrderLocation>,
}

impl OrderIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
        }
    }

    /// Registers `order_id` as resting at `slot` in the level at
    /// (`price`, `side`).
    pub fn put(&self, order_id: OrderId, slot: u32, price: Price, side: Side) {
        self.locations.insert(order_id, (slot, price, side));
    }

    /// Location of the resting record for `order_id`, if it rests.
    pub fn get(&self, order_id: OrderId) -> Option<OrderLocation> {
        self.locations.get(&order_id).map(|entry| *entry.value())
    }

    /// Unregisters `order_id` unconditionally.
    pub fn remove(&self, order_id: OrderId) -> Option<OrderLocation> {
        self.locations.remove(&order_id).map(|(_, loc)| loc)
    }

    /// Unregisters `order_id` only while it still maps to exactly
    /// `location`.
    ///
    /// This is the claim step of cancellation: it fails when a
    /// concurrent fill (or an earlier cancel) already consumed the
    /// record, or when the id has since been resubmitted and now rests
    /// elsewhere.
    pub fn remove_if_location(&self, order_id: OrderId, location: OrderLocation) -> bool {
        self.locations
            .remove_if(&order_id, |_, current| *current == location)
            .is_some()
    }

    /// True when `order_id` currently rests in the book.
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.locations.contains_key(&order_id)
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when no orders rest.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for OrderIndex {
    fn default() -> Self {
        Self::new()
    }
}
