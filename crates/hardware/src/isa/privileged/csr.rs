//! Machine-mode CSR addresses.

/// Machine status register.
pub const MSTATUS: u16 = 0x300;
/// Machine ISA register.
pub const MISA: u16 = 0x301;
/// Machine interrupt enable register.
pub const MIE: u16 = 0x304;
/// Machine trap vector base address register.
pub const MTVEC: u16 = 0x305;
/// Machine scratch register.
pub const MSCRATCH: u16 = 0x340;
/// Machine exception program counter.
pub const MEPC: u16 = 0x341;
/// Machine cause register.
pub const MCAUSE: u16 = 0x342;
/// Machine trap value register.
pub const MTVAL: u16 = 0x343;
/// Machine interrupt pending register.
pub const MIP: u16 = 0x344;
/// Machine cycle counter (low half).
pub const MCYCLE: u16 = 0xB00;
/// Machine retired-instruction counter (low half).
pub const MINSTRET: u16 = 0xB02;
/// User-visible cycle counter (low half).
pub const CYCLE: u16 = 0xC00;
/// User-visible retired-instruction counter (low half).
pub const INSTRET: u16 = 0xC02;
/// Machine hardware thread ID.
pub const MHARTID: u16 = 0xF14;

/// `misa` value for RV32I: MXL=1 in bits 31:30 and the `I` extension bit.
pub const MISA_RV32I: u32 = (1 << 30) | (1 << 8);
