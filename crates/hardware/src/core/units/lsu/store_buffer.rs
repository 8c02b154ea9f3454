//! One-entry store buffer.
//!
//! A buffered store retires into this slot and becomes memory-visible later, when the
//! background drain is granted by the arbiter. The slot is a tagged variant so that
//! illegal combinations (draining while empty, two entries) cannot be represented:
//! 1. **Empty:** No store is pending.
//! 2. **Occupied:** A store is held but no drain request has been left outstanding.
//! 3. **Draining:** A drain request was asserted and lost arbitration; it must be re-asserted
//!    until granted.

use crate::common::data::{DecodedMemOp, MemoryRequest, RequesterId, word_address};

/// A buffered store: word-aligned address, lane-aligned data, byte mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreBufferEntry {
    /// Word-aligned address.
    pub address: u32,
    /// Lane-aligned data.
    pub data: u32,
    /// Byte-enable mask.
    pub mask: u8,
}

impl StoreBufferEntry {
    /// Captures a decoded store.
    pub const fn from_op(op: &DecodedMemOp) -> Self {
        Self {
            address: word_address(op.address),
            data: op.store_data,
            mask: op.byte_mask,
        }
    }

    /// The write request that drains this entry.
    pub const fn drain_request(&self, requester: RequesterId) -> MemoryRequest {
        MemoryRequest::write(requester, self.address, self.data, self.mask)
    }
}

/// Store buffer slot state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBuffer {
    /// No store pending.
    #[default]
    Empty,
    /// Store held, not yet sent.
    Occupied(StoreBufferEntry),
    /// Store whose drain request is outstanding at the arbiter.
    Draining(StoreBufferEntry),
}

impl StoreBuffer {
    /// Returns `true` if no store is held.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The held store, in either non-empty state.
    #[inline]
    pub const fn entry(&self) -> Option<&StoreBufferEntry> {
        match self {
            Self::Empty => None,
            Self::Occupied(e) | Self::Draining(e) => Some(e),
        }
    }

    /// Returns `true` if a held store targets the word containing `addr`.
    #[inline]
    pub fn holds_word(&self, addr: u32) -> bool {
        self.entry().is_some_and(|e| e.address == word_address(addr))
    }

    /// State after a drain request was asserted this cycle.
    ///
    /// Acknowledged drains empty the slot; unacknowledged ones stay outstanding.
    #[inline]
    pub const fn after_drain(self, acked: bool) -> Self {
        match self {
            Self::Occupied(e) | Self::Draining(e) => {
                if acked {
                    Self::Empty
                } else {
                    Self::Draining(e)
                }
            }
            Self::Empty => Self::Empty,
        }
    }
}
