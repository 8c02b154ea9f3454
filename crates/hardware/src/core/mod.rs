//! Per-core components.
//!
//! This module contains everything instantiated once per core: the hart that fetches
//! and executes instructions, and the execution units that sit between the hart and
//! the shared-memory arbiter.

/// Hart interface and the reference RV32I hart.
pub mod hart;

/// Execution units (load/store unit).
pub mod units;

pub use self::hart::{Hart, HartActivity, HartInput, ReferenceHart, TrapPulse};
pub use self::units::lsu::{LoadStoreUnit, LsuOutput, StallReason};
