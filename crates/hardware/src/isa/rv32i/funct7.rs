//! RISC-V Base Integer (I) Function Codes (funct7).

/// Default encoding (ADD, SRL, SRLI).
pub const DEFAULT: u32 = 0b000_0000;

/// Alternate encoding (SUB, SRA, SRAI).
pub const ALT: u32 = 0b010_0000;
