//! Shared-memory RV32 multi-core system simulator library.
//!
//! This crate models the memory path of a small multi-core RISC-V system, cycle by cycle:
//! 1. **Core:** A hart interface with a multi-cycle RV32I reference hart, and the
//!    load/store unit in each of its four ordering configurations.
//! 2. **SoC:** The fixed-priority arbiter and the mirrored shared memory.
//! 3. **ISA:** RV32I decoding and the machine-mode CSR subset.
//! 4. **Simulation:** ELF loading, the reset/run driver, the commit log, waveforms and
//!    statistics.

/// Common types and constants (requests, access sizes, errors).
pub mod common;
/// Simulator configuration (defaults, ordering models, JSON config structures).
pub mod config;
/// Hart interface, reference hart and load/store unit.
pub mod core;
/// Instruction set (RV32I decode, privileged encodings).
pub mod isa;
/// Image loader, simulation driver, commit log and waveform output.
pub mod sim;
/// System-on-chip (builder, arbiter, shared memory).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Simulation driver; owns the system and its observers.
pub use crate::sim::Simulator;
/// Top-level system (cores, arbiter, shared memory); construct with `System::new`.
pub use crate::soc::System;
