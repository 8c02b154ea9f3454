//! Common utilities and types used throughout the shared-memory simulator.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Constants:** Word geometry, memory sizing, and register-file constants.
//! 2. **Transactions:** Access sizes, decoded memory operations, and arbiter requests.
//! 3. **Error Handling:** Image, configuration, and simulation error types.

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory transaction type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::{AccessSize, DecodedMemOp, MemOpKind, MemoryRequest, Port, RequesterId};
pub use error::{ConfigError, LoadError, SimError};
