//! Simulation driver tests.

/// ELF image loading.
pub mod loader;
/// Reset, run and tohost detection.
pub mod simulator;
