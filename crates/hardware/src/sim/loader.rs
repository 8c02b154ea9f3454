//! ELF32 Program Loader.
//!
//! This module places a little-endian ELF32 executable into shared memory through the
//! backdoor port. It performs:
//! 1. **Validation:** Magic, class, byte order and program-header entry size are checked
//!    up front so each failure gets a precise [`LoadError`].
//! 2. **Segment copy:** Every `PT_LOAD` segment's file bytes are written at `p_paddr`
//!    (or `p_vaddr` when `p_paddr` is zero); the tail of the last partial word is zeroed.
//! 3. **BSS fill:** The range `[p_filesz, p_memsz)` of each segment is zeroed.
//!
//! Addresses wrap through the memory's mirrored decoding, exactly as the cores see them.

use std::path::Path;

use object::elf::{ELFCLASS32, ELFDATA2LSB, ELFMAG, FileHeader32, PT_LOAD, ProgramHeader32};
use object::read::elf::{FileHeader, ProgramHeader};
use object::LittleEndian;
use tracing::debug;

use crate::common::constants::WORD_BYTES;
use crate::common::data::byte_lane;
use crate::common::error::LoadError;
use crate::soc::memory::SharedMemory;

/// Size of an ELF32 file header.
const EHDR_SIZE: usize = 52;

/// Size of an ELF32 program header.
const PHDR_SIZE: u16 = size_of::<ProgramHeader32<LittleEndian>>() as u16;

/// Offsets into `e_ident`.
const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;

/// What a successful load placed in memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageSummary {
    /// `e_entry` from the file header.
    pub entry: u32,
    /// Number of `PT_LOAD` segments loaded.
    pub segments: usize,
    /// File bytes copied.
    pub bytes_loaded: u64,
    /// Bytes zeroed for BSS.
    pub bytes_zeroed: u64,
}

/// Reads `path` and loads it with [`load_elf`].
///
/// # Errors
///
/// [`LoadError::Io`] if the file cannot be read, otherwise as [`load_elf`].
pub fn load_elf_file(path: &Path, memory: &mut SharedMemory) -> Result<ImageSummary, LoadError> {
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_elf(&data, memory)
}

/// Loads every `PT_LOAD` segment of an ELF32 little-endian image into `memory`.
///
/// # Arguments
///
/// * `data` - The whole image file.
/// * `memory` - Destination, written through the untimed backdoor.
///
/// # Returns
///
/// Entry point and load counts.
///
/// # Errors
///
/// Returns a [`LoadError`] describing the first problem found. Segments before the
/// failing one may already have been written.
pub fn load_elf(data: &[u8], memory: &mut SharedMemory) -> Result<ImageSummary, LoadError> {
    check_ident(data)?;

    let header = FileHeader32::<LittleEndian>::parse(data)?;
    let endian = header.endian()?;
    let phentsize = header.e_phentsize(endian);
    if phentsize != PHDR_SIZE {
        return Err(LoadError::ProgramHeaderSize {
            found: phentsize,
            expected: PHDR_SIZE,
        });
    }

    let mut summary = ImageSummary {
        entry: header.e_entry(endian),
        ..ImageSummary::default()
    };

    for (index, ph) in header.program_headers(endian, data)?.iter().enumerate() {
        if ph.p_type(endian) != PT_LOAD {
            continue;
        }
        let paddr = ph.p_paddr(endian);
        let base = if paddr != 0 { paddr } else { ph.p_vaddr(endian) };
        let filesz = ph.p_filesz(endian);
        let memsz = ph.p_memsz(endian);
        if memsz < filesz {
            return Err(LoadError::SegmentSize {
                index,
                filesz,
                memsz,
            });
        }
        let bytes = ph.data(endian, data).map_err(|()| LoadError::SegmentData {
            index,
            offset: ph.p_offset(endian),
            size: filesz,
        })?;

        write_bytes(memory, base, bytes);
        let end = base.wrapping_add(filesz);
        let pad = (WORD_BYTES - byte_lane(end)) % WORD_BYTES;
        zero_range(memory, end, pad);
        zero_range(memory, end, (memsz - filesz).min(mirror_span(memory)));

        debug!(index, base, filesz, memsz, "loaded segment");
        summary.segments += 1;
        summary.bytes_loaded += u64::from(filesz);
        summary.bytes_zeroed += u64::from(memsz - filesz);
    }
    Ok(summary)
}

fn check_ident(data: &[u8]) -> Result<(), LoadError> {
    if data.len() < EHDR_SIZE {
        return Err(LoadError::Truncated(data.len()));
    }
    if data[..ELFMAG.len()] != ELFMAG {
        return Err(LoadError::BadMagic);
    }
    if data[EI_CLASS] != ELFCLASS32 {
        return Err(LoadError::UnsupportedClass(data[EI_CLASS]));
    }
    if data[EI_DATA] != ELFDATA2LSB {
        return Err(LoadError::UnsupportedEndianness(data[EI_DATA]));
    }
    Ok(())
}

/// Writes `bytes` starting at `addr`, one masked word at a time.
fn write_bytes(memory: &mut SharedMemory, addr: u32, bytes: &[u8]) {
    let mut addr = addr;
    let mut rest = bytes;
    while !rest.is_empty() {
        let lane = byte_lane(addr) as usize;
        let n = (WORD_BYTES as usize - lane).min(rest.len());
        let mut word = [0u8; 4];
        word[lane..lane + n].copy_from_slice(&rest[..n]);
        memory.poke_masked(addr, u32::from_le_bytes(word), lane_mask(lane, n));
        addr = addr.wrapping_add(n as u32);
        rest = &rest[n..];
    }
}

/// Bytes after which addresses alias; zeroing more than this revisits the same words.
fn mirror_span(memory: &SharedMemory) -> u32 {
    u32::try_from(memory.len_words() * WORD_BYTES as usize).unwrap_or(u32::MAX)
}

/// Zeroes `len` bytes starting at `addr`.
fn zero_range(memory: &mut SharedMemory, addr: u32, len: u32) {
    let mut addr = addr;
    let mut left = len;
    while left > 0 {
        let lane = byte_lane(addr);
        let n = (WORD_BYTES - lane).min(left);
        memory.poke_masked(addr, 0, lane_mask(lane as usize, n as usize));
        addr = addr.wrapping_add(n);
        left -= n;
    }
}

/// Byte-enable mask for `n` bytes starting at `lane`.
const fn lane_mask(lane: usize, n: usize) -> u8 {
    (((1u16 << n) - 1) << lane) as u8
}
