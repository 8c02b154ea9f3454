//! Instruction encoding utilities.
//!
//! Provides bit extraction for the fixed fields of a 32-bit RISC-V instruction.

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for a 5-bit register index field.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;
/// Bit mask for extracting the CSR address field (bits 20-31).
pub const CSR_MASK: u32 = 0xFFF;

/// Field accessors for an encoded instruction.
pub trait InstructionBits {
    /// Extracts the opcode field (bits 0-6).
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    ///
    /// Register 0 (x0) is hardwired to zero and writes are ignored.
    fn rd(&self) -> u8;

    /// Extracts the first source register field (bits 15-19).
    fn rs1(&self) -> u8;

    /// Extracts the second source register field (bits 20-24).
    ///
    /// Also the shift amount of immediate shifts.
    fn rs2(&self) -> u8;

    /// Extracts the funct3 field (bits 12-14).
    fn funct3(&self) -> u32;

    /// Extracts the funct7 field (bits 25-31).
    fn funct7(&self) -> u32;

    /// Extracts the CSR address field (bits 20-31).
    fn csr(&self) -> u16;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> u8 {
        ((self >> 7) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rs1(&self) -> u8 {
        ((self >> 15) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rs2(&self) -> u8 {
        ((self >> 20) & REG_MASK) as u8
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn csr(&self) -> u16 {
        ((self >> 20) & CSR_MASK) as u16
    }
}
