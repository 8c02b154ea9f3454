//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the encodings and decoder used by the reference hart, organized by
//! RISC-V specification chapter.
//!
//! # Modules
//!
//! * `rv32i`: Base Integer Instruction Set (32-bit).
//! * `privileged`: Machine-mode CSRs, trap causes, and system instructions.
//! * `decode`: Translation of a 32-bit encoding into an [`decode::Instruction`].

/// Instruction decoding into a typed instruction.
pub mod decode;

/// Instruction field extraction.
pub mod instruction;

/// Privileged architecture definitions (CSRs, traps, system instructions).
pub mod privileged;

/// Base integer instruction set (32-bit RISC-V core instructions).
pub mod rv32i;
