//! Sub-word load alignment properties.

use proptest::prelude::*;

use rvsmp_core::common::data::{AccessSize, DecodedMemOp};
use rvsmp_core::core::units::lsu::lane::align_load;
use rvsmp_core::soc::memory::merge_masked;

proptest! {
    /// A byte stored at any lane reads back through `lbu`/`lb` unchanged.
    #[test]
    fn byte_store_then_load_round_trips(word in any::<u32>(), addr in any::<u32>(), value in any::<u8>()) {
        let store = DecodedMemOp::store(addr, u32::from(value), AccessSize::Byte);
        let merged = merge_masked(word, store.store_data, store.byte_mask);
        prop_assert_eq!(align_load(merged, addr, AccessSize::Byte, true), u32::from(value));
        prop_assert_eq!(align_load(merged, addr, AccessSize::Byte, false), value as i8 as i32 as u32);
    }

    #[test]
    fn aligned_half_store_then_load_round_trips(word in any::<u32>(), addr in any::<u32>(), value in any::<u16>()) {
        let addr = addr & !1;
        let store = DecodedMemOp::store(addr, u32::from(value), AccessSize::Half);
        let merged = merge_masked(word, store.store_data, store.byte_mask);
        prop_assert_eq!(align_load(merged, addr, AccessSize::Half, true), u32::from(value));
    }
}

#[test]
fn load_mask_covers_the_addressed_lanes() {
    assert_eq!(DecodedMemOp::load(0x102, AccessSize::Half, false, 1).byte_mask, 0b1100);
    assert_eq!(DecodedMemOp::load(0x101, AccessSize::Byte, true, 1).byte_mask, 0b0010);
    assert_eq!(DecodedMemOp::load(0x100, AccessSize::Word, false, 1).byte_mask, 0b1111);
}
