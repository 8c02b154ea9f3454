//! RV32I Base Integer Instruction Set.
//!
//! # Modules
//!
//! - `opcodes`: Major opcodes (bits 6-0).
//! - `funct3`: Minor function codes (bits 14-12).
//! - `funct7`: Function codes distinguishing alternate encodings (bits 31-25).

/// Major opcodes.
pub mod opcodes;

/// funct3 codes.
pub mod funct3;

/// funct7 codes.
pub mod funct7;
