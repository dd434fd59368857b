//! Order book error types

use super::types::{OrderId, Quantity};
use std::fmt;

/// Errors surfaced to callers of the book and matching engine.
///
/// Only recoverable conditions appear here. "Not found" outcomes
/// (cancelling an unknown id) are ordinary return values, and invariant
/// violations (double-returned slots, quantity underflow) abort the
/// process because they indicate loss of memory safety.
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Every slot in the order pool is on loan; the order is rejected
    /// without side effects.
    PoolExhausted {
        /// Configured pool capacity.
        capacity: usize,
    },

    /// The submitted quantity was zero.
    InvalidQuantity {
        /// The offending order id.
        order_id: OrderId,
        /// The rejected quantity.
        quantity: Quantity,
    },

    /// An order with this id is already resting in the book.
    DuplicateOrderId {
        /// The offending order id.
        order_id: OrderId,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::PoolExhausted { capacity } => {
                write!(f, "order pool exhausted: all {capacity} slots on loan")
            }
            OrderBookError::InvalidQuantity { order_id, quantity } => {
                write!(
                    f,
                    "invalid quantity {quantity} for order {order_id}: must be greater than zero"
                )
            }
            OrderBookError::DuplicateOrderId { order_id } => {
                write!(f, "order {order_id} is already resting in the book")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
