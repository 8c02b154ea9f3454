//! RISC-V Trap Cause Codes.
//!
//! Exception codes written to `mcause`. Interrupts are not modeled, so the most
//! significant bit is always clear.

/// Exception definitions (MSB = 0).
pub mod exception {
    /// Instruction address misaligned (0).
    pub const INSTRUCTION_ADDRESS_MISALIGNED: u32 = 0;
    /// Illegal instruction (2).
    pub const ILLEGAL_INSTRUCTION: u32 = 2;
    /// Breakpoint (3).
    pub const BREAKPOINT: u32 = 3;
    /// Load address misaligned (4).
    pub const LOAD_ADDRESS_MISALIGNED: u32 = 4;
    /// Store/AMO address misaligned (6).
    pub const STORE_ADDRESS_MISALIGNED: u32 = 6;
    /// Environment call from M-mode (11).
    pub const ENVIRONMENT_CALL_FROM_M_MODE: u32 = 11;
}
