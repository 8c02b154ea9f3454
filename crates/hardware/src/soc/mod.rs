//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components shared by every core: the memory arbiter,
//! the shared memory behind it, and the `System` that wires them to the cores.

/// System construction and per-cycle evaluation.
pub mod builder;

/// Fixed-priority memory arbiter.
pub mod interconnect;

/// Shared memory with mirrored addressing.
pub mod memory;

pub use builder::{Core, CoreTick, System, TickReport};
