//! Sub-word load alignment.
//!
//! Memory always returns one aligned word. The requested byte or half-word is brought
//! into the low lane by rotating the word right by `address mod 4` bytes, then zero- or
//! sign-extended. Word loads skip the rotation.

use crate::common::data::{AccessSize, byte_lane};

/// Extracts and extends the value a load of `size` at `address` reads from `word`.
///
/// # Arguments
///
/// * `word` - Aligned word returned by memory.
/// * `address` - Byte address of the load.
/// * `size` - Access width.
/// * `unsigned` - Zero-extend when set, sign-extend otherwise.
///
/// # Returns
///
/// The 32-bit register value.
#[inline]
pub const fn align_load(word: u32, address: u32, size: AccessSize, unsigned: bool) -> u32 {
    match size {
        AccessSize::Word => word,
        AccessSize::Half => {
            let v = word.rotate_right(8 * byte_lane(address)) as u16;
            if unsigned { v as u32 } else { v as i16 as i32 as u32 }
        }
        AccessSize::Byte => {
            let v = word.rotate_right(8 * byte_lane(address)) as u8;
            if unsigned { v as u32 } else { v as i8 as i32 as u32 }
        }
    }
}
