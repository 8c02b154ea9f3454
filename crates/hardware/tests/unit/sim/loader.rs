//! ELF image loading tests.

use std::io::Write;

use pretty_assertions::assert_eq;

use rvsmp_core::common::error::LoadError;
use rvsmp_core::sim::loader::{load_elf, load_elf_file};
use rvsmp_core::soc::memory::SharedMemory;

use crate::common::builder::elf::ElfBuilder;

fn memory_filled(fill: u32) -> SharedMemory {
    let mut mem = SharedMemory::new(2048).unwrap();
    for word in 0..2048u32 {
        mem.poke(word * 4, fill);
    }
    mem
}

#[test]
fn file_bytes_then_zeroed_bss() {
    let file_bytes = [1u8, 2, 3, 4, 5, 6];
    let image = ElfBuilder::new()
        .entry(0x100)
        .segment_full(0x100, 0, &file_bytes, 16)
        .build();
    let mut mem = memory_filled(0xFFFF_FFFF);

    let summary = load_elf(&image, &mut mem).unwrap();
    assert_eq!(summary.entry, 0x100);
    assert_eq!(summary.segments, 1);
    assert_eq!(summary.bytes_loaded, 6);
    assert_eq!(summary.bytes_zeroed, 10);

    for (i, b) in file_bytes.iter().enumerate() {
        assert_eq!(mem.peek_byte(0x100 + i as u32), *b);
    }
    for addr in 0x106..0x110 {
        assert_eq!(mem.peek_byte(addr), 0, "byte {addr:#x}");
    }
    // Past p_memsz nothing is touched.
    assert_eq!(mem.peek(0x110), 0xFFFF_FFFF);
    assert_eq!(mem.peek(0xFC), 0xFFFF_FFFF);
}

#[test]
fn oversized_bss_zeroes_each_mirrored_word_once() {
    // A BSS far larger than memory wraps around and clears everything, file bytes included.
    let image = ElfBuilder::new()
        .segment_full(0x100, 0, &[1, 2, 3, 4], u32::MAX)
        .build();
    let mut mem = memory_filled(0xFFFF_FFFF);

    let summary = load_elf(&image, &mut mem).unwrap();
    assert_eq!(summary.bytes_zeroed, u64::from(u32::MAX - 4));
    assert!(mem.words().iter().all(|&w| w == 0));
}

#[test]
fn unaligned_segment_keeps_neighbouring_bytes() {
    let image = ElfBuilder::new().segment(0x201, &[0xAA, 0xBB]).build();
    let mut mem = memory_filled(0x1111_1111);
    let _ = load_elf(&image, &mut mem).unwrap();
    assert_eq!(mem.peek_byte(0x200), 0x11);
    assert_eq!(mem.peek_byte(0x201), 0xAA);
    assert_eq!(mem.peek_byte(0x202), 0xBB);
    // The rest of the last partial word is padded with zeros.
    assert_eq!(mem.peek_byte(0x203), 0x00);
    assert_eq!(mem.peek(0x204), 0x1111_1111);
}

#[test]
fn physical_address_wins_when_non_zero() {
    let image = ElfBuilder::new()
        .segment_full(0x8000_0000, 0x40, &[9, 9, 9, 9], 4)
        .build();
    let mut mem = SharedMemory::new(2048).unwrap();
    let _ = load_elf(&image, &mut mem).unwrap();
    assert_eq!(mem.peek(0x40), 0x0909_0909);
}

#[test]
fn only_pt_load_segments_are_copied() {
    let image = ElfBuilder::new()
        .note(0x80, &[7, 7, 7, 7])
        .segment(0x0, &[1, 0, 0, 0])
        .build();
    let mut mem = SharedMemory::new(2048).unwrap();
    let summary = load_elf(&image, &mut mem).unwrap();
    assert_eq!(summary.segments, 1);
    assert_eq!(mem.peek(0x80), 0);
    assert_eq!(mem.peek(0x0), 1);
}

#[test]
fn segments_wrap_through_the_mirror() {
    let image = ElfBuilder::new().code(0x2000, &[0x1234_5678]).build();
    let mut mem = SharedMemory::new(2048).unwrap();
    let _ = load_elf(&image, &mut mem).unwrap();
    assert_eq!(mem.peek(0x0), 0x1234_5678);
}

#[test]
fn header_problems_are_reported_precisely() {
    let mut mem = SharedMemory::new(2048).unwrap();
    let one = ElfBuilder::new().segment(0, &[1]);

    let err = load_elf(&one.clone().class(2).build(), &mut mem).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedClass(2)), "{err}");

    let err = load_elf(&one.clone().data_encoding(2).build(), &mut mem).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedEndianness(2)), "{err}");

    let err = load_elf(&one.phentsize(40).build(), &mut mem).unwrap_err();
    assert!(
        matches!(err, LoadError::ProgramHeaderSize { found: 40, expected: 32 }),
        "{err}"
    );
}

#[test]
fn segment_problems_are_reported_precisely() {
    let mut mem = SharedMemory::new(2048).unwrap();

    let shrunk = ElfBuilder::new().segment_full(0, 0, &[1, 2, 3, 4], 2).build();
    let err = load_elf(&shrunk, &mut mem).unwrap_err();
    assert!(matches!(err, LoadError::SegmentSize { index: 0, filesz: 4, memsz: 2 }), "{err}");

    let mut cut = ElfBuilder::new().segment(0, &[0u8; 64]).build();
    cut.truncate(cut.len() - 8);
    let err = load_elf(&cut, &mut mem).unwrap_err();
    assert!(matches!(err, LoadError::SegmentData { index: 0, .. }), "{err}");
}

#[test]
fn load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&ElfBuilder::new().code(0x10, &[0xABCD_EF01]).build())
        .unwrap();
    file.flush().unwrap();

    let mut mem = SharedMemory::new(2048).unwrap();
    let summary = load_elf_file(file.path(), &mut mem).unwrap();
    assert_eq!(summary.bytes_loaded, 4);
    assert_eq!(mem.peek(0x10), 0xABCD_EF01);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut mem = SharedMemory::new(2048).unwrap();
    let err = load_elf_file(&dir.path().join("absent.elf"), &mut mem).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("absent.elf"));
}
