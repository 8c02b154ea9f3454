//! Execution units and functional components.
//!
//! Each core owns one load/store unit driving its data port.

/// Load/Store Unit for memory access operations.
pub mod lsu;
