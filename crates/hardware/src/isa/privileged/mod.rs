//! Privileged Architecture Definitions.
//!
//! Defines the machine-mode subset of the RISC-V Privileged Specification used by the
//! reference hart.
//!
//! # Modules
//!
//! - `cause`: Exception cause codes.
//! - `csr`: CSR addresses.
//! - `opcodes`: System instruction encodings (ECALL, EBREAK, MRET, WFI, CSR*).

/// Exception cause code definitions.
pub mod cause;

/// Machine-mode CSR addresses.
pub mod csr;

/// System instruction encodings.
pub mod opcodes;
