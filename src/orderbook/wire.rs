//! Fixed-width binary wire codec for alternate transports.
//!
//! Every message is exactly 32 bytes, little-endian, with a one-byte
//! type tag and a one-byte side:
//!
//! | Offset | Size | Field    | Notes                                  |
//! |-------:|-----:|----------|----------------------------------------|
//! | 0      | 1    | type     | `'A'` add, `'C'` cancel, `'M'` modify, `'E'` execute |
//! | 1      | 1    | side     | `'B'` or `'S'` (ignored for `'C'`)     |
//! | 2      | 8    | order_id | u64                                    |
//! | 10     | 8    | price    | i64 fixed-point                        |
//! | 18     | 8    | quantity | u64                                    |
//! | 26     | 6    | padding  | zero-filled                            |
//!
//! The raw view type is zero-copy in both directions; [`decode`]
//! validates the tag, side, and quantity so malformed input never
//! reaches the engine.

use super::types::{OrderId, Price, Quantity, Side};
use std::fmt;
use zerocopy::byteorder::little_endian::{I64 as I64le, U64 as U64le};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of every wire message in bytes.
pub const WIRE_MESSAGE_SIZE: usize = 32;

const TYPE_ADD: u8 = b'A';
const TYPE_CANCEL: u8 = b'C';
const TYPE_MODIFY: u8 = b'M';
const TYPE_EXECUTE: u8 = b'E';

const SIDE_BUY: u8 = b'B';
const SIDE_SELL: u8 = b'S';

/// Raw 32-byte wire message.
///
/// All multi-byte fields are little-endian and unaligned, so a message
/// can be read in place from any byte offset of a receive buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct RawMessage {
    pub msg_type: u8,
    pub side: u8,
    pub order_id: U64le,
    pub price: I64le,
    pub quantity: U64le,
    pub padding: [u8; 6],
}

impl RawMessage {
    fn new(msg_type: u8, side: u8, order_id: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            msg_type,
            side,
            order_id: U64le::new(order_id),
            price: I64le::new(price),
            quantity: U64le::new(quantity),
            padding: [0; 6],
        }
    }

    /// The message as its 32 wire bytes (zero-copy).
    pub fn as_bytes(&self) -> &[u8] {
        IntoBytes::as_bytes(self)
    }
}

/// A validated, decoded wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMessage {
    /// Submit a new limit order.
    Add {
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    /// Cancel a resting order.
    Cancel { order_id: OrderId },
    /// Replace a resting order (cancel-then-resubmit semantics).
    Modify {
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    /// An execution report published by the engine.
    Execute {
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
}

impl WireMessage {
    /// Encodes this message into its raw 32-byte form.
    pub fn encode(&self) -> RawMessage {
        match *self {
            WireMessage::Add {
                order_id,
                side,
                price,
                quantity,
            } => RawMessage::new(TYPE_ADD, side_to_byte(side), order_id, price, quantity),
            WireMessage::Cancel { order_id } => {
                RawMessage::new(TYPE_CANCEL, SIDE_BUY, order_id, 0, 0)
            }
            WireMessage::Modify {
                order_id,
                side,
                price,
                quantity,
            } => RawMessage::new(TYPE_MODIFY, side_to_byte(side), order_id, price, quantity),
            WireMessage::Execute {
                order_id,
                side,
                price,
                quantity,
            } => RawMessage::new(TYPE_EXECUTE, side_to_byte(side), order_id, price, quantity),
        }
    }
}

/// Decodes and validates one 32-byte wire message.
///
/// # Errors
/// Rejects buffers of the wrong length, unknown type tags, unknown side
/// bytes (except on cancels, where the side is ignored), and zero
/// quantities on add/modify/execute.
pub fn decode(bytes: &[u8]) -> Result<WireMessage, WireError> {
    let raw = RawMessage::read_from_bytes(bytes)
        .map_err(|_| WireError::UnexpectedLength { len: bytes.len() })?;

    let order_id = raw.order_id.get();
    let price = raw.price.get();
    let quantity = raw.quantity.get();

    match raw.msg_type {
        TYPE_CANCEL => Ok(WireMessage::Cancel { order_id }),
        TYPE_ADD | TYPE_MODIFY | TYPE_EXECUTE => {
            let side = byte_to_side(raw.side)?;
            if quantity == 0 {
                return Err(WireError::ZeroQuantity { order_id });
            }
            Ok(match raw.msg_type {
                TYPE_ADD => WireMessage::Add {
                    order_id,
                    side,
                    price,
                    quantity,
                },
                TYPE_MODIFY => WireMessage::Modify {
                    order_id,
                    side,
                    price,
                    quantity,
                },
                _ => WireMessage::Execute {
                    order_id,
                    side,
                    price,
                    quantity,
                },
            })
        }
        other => Err(WireError::UnknownMessageType(other)),
    }
}

#[inline]
fn side_to_byte(side: Side) -> u8 {
    match side {
        Side::Buy => SIDE_BUY,
        Side::Sell => SIDE_SELL,
    }
}

#[inline]
fn byte_to_side(byte: u8) -> Result<Side, WireError> {
    match byte {
        SIDE_BUY => Ok(Side::Buy),
        SIDE_SELL => Ok(Side::Sell),
        other => Err(WireError::UnknownSide(other)),
    }
}

/// Errors produced while decoding wire messages.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// The buffer was not exactly [`WIRE_MESSAGE_SIZE`] bytes.
    UnexpectedLength {
        /// Actual buffer length.
        len: usize,
    },
    /// The type tag was none of `'A'`, `'C'`, `'M'`, `'E'`.
    UnknownMessageType(u8),
    /// The side byte was neither `'B'` nor `'S'`.
    UnknownSide(u8),
    /// Add/modify/execute carried a zero quantity.
    ZeroQuantity {
        /// The order id in the rejected message.
        order_id: OrderId,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::UnexpectedLength { len } => {
                write!(f, "wire message must be {WIRE_MESSAGE_SIZE} bytes, got {len}")
            }
            WireError::UnknownMessageType(tag) => {
                write!(f, "unknown wire message type 0x{tag:02x}")
            }
            WireError::UnknownSide(byte) => write!(f, "unknown wire side byte 0x{byte:02x}"),
            WireError::ZeroQuantity { order_id } => {
                write!(f, "wire message for order {order_id} carries zero quantity")
            }
        }
    }
}

impl std::error::Error for WireError {}
