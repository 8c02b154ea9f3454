//! Memory Transaction Types.
//!
//! This module defines the values exchanged along the shared-memory path each cycle:
//! 1. **Access Size:** Byte, half-word, and word granularity with lane and mask helpers.
//! 2. **Decoded Operations:** The bundle the decode side hands to a load/store unit.
//! 3. **Requests:** Word-aligned requests presented to the arbiter, tagged by requester.

use std::fmt;

use super::constants::{BYTE_OFFSET_MASK, FULL_MASK, WORD_ALIGN_MASK};

/// Width of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AccessSize {
    /// 8-bit access.
    Byte,
    /// 16-bit access.
    Half,
    /// 32-bit access.
    #[default]
    Word,
}

impl AccessSize {
    /// Returns the number of bytes covered by an access of this size.
    #[inline]
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Returns the byte-enable mask for this size at lane 0.
    #[inline]
    pub const fn lane_mask(self) -> u8 {
        match self {
            Self::Byte => 0b0001,
            Self::Half => 0b0011,
            Self::Word => FULL_MASK,
        }
    }

    /// Returns `true` if `addr` is naturally aligned for this size.
    #[inline]
    pub const fn is_aligned(self, addr: u32) -> bool {
        addr % self.bytes() == 0
    }
}

/// Returns the word-aligned form of `addr`.
#[inline]
pub const fn word_address(addr: u32) -> u32 {
    addr & WORD_ALIGN_MASK
}

/// Returns the byte lane (0..=3) that `addr` selects within its word.
#[inline]
pub const fn byte_lane(addr: u32) -> u32 {
    addr & BYTE_OFFSET_MASK
}

/// Which of a core's two memory ports a request comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    /// Load/store port driven by the core's load/store unit.
    Data,
    /// Instruction fetch port.
    Instruction,
}

/// Identity of one arbiter input: a core index plus the port on that core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequesterId {
    /// Core index, starting at 0.
    pub core: usize,
    /// Port on that core.
    pub port: Port,
}

impl RequesterId {
    /// Data port of `core`.
    pub const fn data(core: usize) -> Self {
        Self {
            core,
            port: Port::Data,
        }
    }

    /// Instruction port of `core`.
    pub const fn instruction(core: usize) -> Self {
        Self {
            core,
            port: Port::Instruction,
        }
    }

    /// Fixed-priority rank; lower wins.
    ///
    /// Every data port outranks every instruction port; within a port class the
    /// lower core index wins.
    #[inline]
    pub const fn priority(self) -> (u8, usize) {
        let class = match self.port {
            Port::Data => 0,
            Port::Instruction => 1,
        };
        (class, self.core)
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Port::Data => write!(f, "core{}-data", self.core),
            Port::Instruction => write!(f, "core{}-instr", self.core),
        }
    }
}

/// A single request presented to the arbiter for one cycle.
///
/// Requests are transient: an unserved requester re-asserts on a later cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRequest {
    /// Word-aligned byte address.
    pub address: u32,
    /// Lane-aligned write data (ignored for reads).
    pub write_data: u32,
    /// Byte-enable mask (bit `n` enables lane `n`).
    pub mask: u8,
    /// `true` for a write, `false` for a read.
    pub is_write: bool,
    /// Who is asking.
    pub requester: RequesterId,
}

impl MemoryRequest {
    /// Builds a full-word read of the word containing `addr`.
    pub const fn read(requester: RequesterId, addr: u32) -> Self {
        Self {
            address: word_address(addr),
            write_data: 0,
            mask: FULL_MASK,
            is_write: false,
            requester,
        }
    }

    /// Builds a masked write of lane-aligned `data` to the word containing `addr`.
    pub const fn write(requester: RequesterId, addr: u32, data: u32, mask: u8) -> Self {
        Self {
            address: word_address(addr),
            write_data: data,
            mask: mask & FULL_MASK,
            is_write: true,
            requester,
        }
    }
}

/// What a decoded memory operation asks the load/store unit to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemOpKind {
    /// Load into `rd`, zero-extending when `unsigned` is set.
    Load {
        /// Zero-extend instead of sign-extend.
        unsigned: bool,
        /// Destination register index (0..=31).
        rd: u8,
    },
    /// Store of the bundle's lane-aligned data under its byte mask.
    Store,
    /// Memory-ordering fence.
    Fence,
}

/// Decoded memory operation, produced once per cycle by the decode side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedMemOp {
    /// Operation kind.
    pub kind: MemOpKind,
    /// Effective byte address.
    pub address: u32,
    /// Store data already shifted into the lane selected by `address`.
    pub store_data: u32,
    /// Byte-enable mask already shifted into the lane selected by `address`.
    pub byte_mask: u8,
    /// Access width.
    pub size: AccessSize,
}

impl DecodedMemOp {
    /// Builds a load of `size` from `address` into `rd`.
    pub const fn load(address: u32, size: AccessSize, unsigned: bool, rd: u8) -> Self {
        Self {
            kind: MemOpKind::Load { unsigned, rd },
            address,
            store_data: 0,
            byte_mask: size.lane_mask() << byte_lane(address),
            size,
        }
    }

    /// Builds a store of the low `size` bytes of `value` to `address`.
    ///
    /// The value is rotated into the addressed lane and the mask shifted to match,
    /// which is the form the memory port expects.
    pub const fn store(address: u32, value: u32, size: AccessSize) -> Self {
        let lane = byte_lane(address);
        Self {
            kind: MemOpKind::Store,
            address,
            store_data: value.rotate_left(8 * lane),
            byte_mask: (size.lane_mask() << lane) & FULL_MASK,
            size,
        }
    }

    /// Builds a fence.
    pub const fn fence() -> Self {
        Self {
            kind: MemOpKind::Fence,
            address: 0,
            store_data: 0,
            byte_mask: 0,
            size: AccessSize::Word,
        }
    }

    /// Returns `true` for loads.
    #[inline]
    pub const fn is_load(&self) -> bool {
        matches!(self.kind, MemOpKind::Load { .. })
    }

    /// Returns `true` for stores.
    #[inline]
    pub const fn is_store(&self) -> bool {
        matches!(self.kind, MemOpKind::Store)
    }

    /// Word-aligned address of the access.
    #[inline]
    pub const fn word(&self) -> u32 {
        word_address(self.address)
    }
}
