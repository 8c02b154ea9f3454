//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Word Geometry:** Word size, byte-lane count, and the word-offset shift.
//! 2. **Memory Sizing:** Words per kilobyte of shared memory.
//! 3. **Register File:** Register count and the hardwired-zero register.

/// Size of one memory word in bytes (RV32).
pub const WORD_BYTES: u32 = 4;

/// Number of address bits that select a byte within a word.
pub const WORD_SHIFT: u32 = 2;

/// Mask for the byte offset of an address within its word.
pub const BYTE_OFFSET_MASK: u32 = WORD_BYTES - 1;

/// Mask that clears the byte offset, yielding a word-aligned address.
pub const WORD_ALIGN_MASK: u32 = !BYTE_OFFSET_MASK;

/// Byte-enable mask covering all four lanes of a word.
pub const FULL_MASK: u8 = 0b1111;

/// Number of 32-bit words in one kilobyte of shared memory.
pub const WORDS_PER_KB: usize = 256;

/// Number of integer registers.
pub const REG_COUNT: usize = 32;

/// Index of the hardwired-zero register.
pub const REG_ZERO: u8 = 0;
