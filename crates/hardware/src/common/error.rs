//! Error definitions.
//!
//! This module defines the error types reported by the simulator. It provides:
//! 1. **Image Errors:** Failures while reading or validating an ELF32 program image.
//! 2. **Configuration Errors:** Invalid settings rejected before a run begins.
//! 3. **Simulation Errors:** Driver-level failures that wrap the two above plus host I/O.
//!
//! Running out of cycles is not an error; see [`crate::sim::RunOutcome`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a program image into shared memory.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read from disk.
    #[error("failed to open ELF '{path}': {source}")]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying host error.
        #[source]
        source: io::Error,
    },

    /// The file is shorter than an ELF identification block.
    #[error("failed to read ELF header: file is {0} bytes")]
    Truncated(usize),

    /// The first four bytes are not `\x7fELF`.
    #[error("not an ELF file")]
    BadMagic,

    /// `EI_CLASS` is not `ELFCLASS32`.
    #[error("unsupported ELF class {0} (need 32-bit)")]
    UnsupportedClass(u8),

    /// `EI_DATA` is not `ELFDATA2LSB`.
    #[error("unsupported ELF endianness {0} (need little-endian)")]
    UnsupportedEndianness(u8),

    /// `e_phentsize` does not match the ELF32 program-header size.
    #[error("unexpected program header size {found} (expected {expected})")]
    ProgramHeaderSize {
        /// Size recorded in the file header.
        found: u16,
        /// Size of an `Elf32_Phdr`.
        expected: u16,
    },

    /// A `PT_LOAD` segment's file range lies outside the image.
    #[error("failed to read segment {index} data (offset {offset:#x}, size {size:#x})")]
    SegmentData {
        /// Program-header index.
        index: usize,
        /// `p_offset` of the segment.
        offset: u32,
        /// `p_filesz` of the segment.
        size: u32,
    },

    /// A segment declares fewer memory bytes than file bytes.
    #[error("segment {index} has p_memsz {memsz:#x} smaller than p_filesz {filesz:#x}")]
    SegmentSize {
        /// Program-header index.
        index: usize,
        /// `p_filesz` of the segment.
        filesz: u32,
        /// `p_memsz` of the segment.
        memsz: u32,
    },

    /// The ELF parser rejected the header or program-header table.
    #[error("malformed ELF: {0}")]
    Parse(#[from] object::Error),
}

/// Invalid configuration, rejected before any cycle is simulated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The ordering name is not one of the four supported configurations.
    #[error(
        "unknown memory ordering '{0}' (expected one of: no-buffer, buffered-strict, buffered-bypass, buffered-fence-nop)"
    )]
    UnknownOrdering(String),

    /// The memory size does not give a power-of-two word count.
    #[error("memory size of {0} KB is not a non-zero power of two")]
    MemorySize(u32),

    /// The system needs at least one core.
    #[error("core count must be at least 1")]
    NoCores,

    /// A `--log` category outside `{all, reg, mem, trap}`.
    #[error("unknown log category '{0}' (expected all, reg, mem or trap)")]
    UnknownLogCategory(String),

    /// A numeric argument could not be parsed.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// The configuration file is not valid JSON for [`crate::config::Config`].
    #[error("invalid configuration: {0}")]
    Json(String),
}

/// Failure during a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Program image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Waveform output failed.
    #[error("waveform output failed: {0}")]
    Waveform(#[source] io::Error),

    /// Commit-log output failed.
    #[error("commit log output failed: {0}")]
    CommitLog(#[source] io::Error),

    /// A host file could not be opened or read.
    #[error("failed to access '{path}': {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying host error.
        #[source]
        source: io::Error,
    },
}
