//! Core-side tests.

/// Sub-word load alignment properties.
pub mod lane;
/// Reference hart running real programs.
pub mod reference_hart;
