//! Builders for test inputs.

/// RV32I instruction encoding.
pub mod instruction;
