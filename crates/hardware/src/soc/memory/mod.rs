//! Shared Memory.
//!
//! This module implements the single word-addressed memory every core shares. It provides:
//! 1. **Mirrored Addressing:** Only `log2(W)` address bits above the word offset are decoded,
//!    so the whole 32-bit space aliases onto `W` words.
//! 2. **Port Access:** One arbitrated access per cycle; reads are latched and become visible
//!    on the following cycle, writes update only the enabled byte lanes.
//! 3. **Backdoor Access:** Untimed word reads and writes for image loading and inspection.

use crate::common::constants::{FULL_MASK, WORD_SHIFT};
use crate::common::data::MemoryRequest;
use crate::common::error::ConfigError;

/// Word-addressable storage with mirrored addressing.
///
/// The word count `W` is a power of two, so `(addr >> 2) & (W - 1)` is always in range.
#[derive(Debug, Clone)]
pub struct SharedMemory {
    words: Vec<u32>,
    index_mask: usize,
    read_data: u32,
}

impl SharedMemory {
    /// Creates a zero-filled memory of `words` words.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MemorySize`] if `words` is not a non-zero power of two.
    pub fn new(words: usize) -> Result<Self, ConfigError> {
        if !words.is_power_of_two() {
            let kb = u32::try_from(words / 256).unwrap_or(u32::MAX);
            return Err(ConfigError::MemorySize(kb));
        }
        Ok(Self {
            words: vec![0; words],
            index_mask: words - 1,
            read_data: 0,
        })
    }

    /// Number of words of storage.
    #[inline]
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    /// Storage index selected by a byte address.
    ///
    /// Address `a` maps to `(a >> 2) & (W - 1)`; higher bits are ignored.
    #[inline]
    pub const fn index_of(&self, addr: u32) -> usize {
        ((addr >> WORD_SHIFT) as usize) & self.index_mask
    }

    /// Performs one port access.
    ///
    /// A read latches the addressed word into the read-data register; the value is
    /// observed on the next cycle through [`SharedMemory::read_data`]. A write replaces
    /// only the bytes enabled by `req.mask` and leaves the read-data register alone.
    pub fn access(&mut self, req: &MemoryRequest) {
        let idx = self.index_of(req.address);
        if req.is_write {
            self.words[idx] = merge_masked(self.words[idx], req.write_data, req.mask);
        } else {
            self.read_data = self.words[idx];
        }
    }

    /// Word latched by the most recent read.
    #[inline]
    pub const fn read_data(&self) -> u32 {
        self.read_data
    }

    /// Clears the read-data register. Storage is untouched.
    pub fn reset_port(&mut self) {
        self.read_data = 0;
    }

    /// Untimed read of the word containing `addr`.
    #[inline]
    pub fn peek(&self, addr: u32) -> u32 {
        self.words[self.index_of(addr)]
    }

    /// Untimed read of the byte at `addr`.
    pub fn peek_byte(&self, addr: u32) -> u8 {
        (self.peek(addr) >> (8 * (addr & 3))) as u8
    }

    /// Untimed full-word write to the word containing `addr`.
    #[inline]
    pub fn poke(&mut self, addr: u32, value: u32) {
        let idx = self.index_of(addr);
        self.words[idx] = value;
    }

    /// Untimed masked write to the word containing `addr`.
    pub fn poke_masked(&mut self, addr: u32, value: u32, mask: u8) {
        let idx = self.index_of(addr);
        self.words[idx] = merge_masked(self.words[idx], value, mask);
    }

    /// Read-only view of the whole storage array.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

/// Replaces the bytes of `old` selected by `mask` with the matching bytes of `new`.
#[inline]
pub const fn merge_masked(old: u32, new: u32, mask: u8) -> u32 {
    let mut keep = 0u32;
    let mut lane = 0;
    while lane < 4 {
        if mask & FULL_MASK & (1 << lane) != 0 {
            keep |= 0xFF << (8 * lane);
        }
        lane += 1;
    }
    (old & !keep) | (new & keep)
}
