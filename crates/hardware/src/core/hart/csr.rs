//! Control and Status Register (CSR) storage.
//!
//! This module implements the machine-mode CSR file of the reference hart. It provides:
//! 1. **Register Storage:** The `Csrs` struct holding the writable machine registers.
//! 2. **Counters:** `mcycle` and `minstret`, visible through their user aliases.
//! 3. **Access Logic:** Read and write by address; unknown addresses are rejected so the
//!    caller can raise an illegal-instruction trap.

use crate::isa::privileged::csr::{
    CYCLE, INSTRET, MCAUSE, MCYCLE, MEPC, MHARTID, MIE, MINSTRET, MIP, MISA, MISA_RV32I,
    MSCRATCH, MSTATUS, MTVAL, MTVEC,
};

/// Machine-mode CSR file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csrs {
    /// Machine status register.
    pub mstatus: u32,
    /// Machine ISA register.
    pub misa: u32,
    /// Machine interrupt enable.
    pub mie: u32,
    /// Machine trap vector base address.
    pub mtvec: u32,
    /// Machine scratch register.
    pub mscratch: u32,
    /// Machine exception program counter.
    pub mepc: u32,
    /// Machine trap cause.
    pub mcause: u32,
    /// Machine trap value.
    pub mtval: u32,
    /// Machine interrupt pending.
    pub mip: u32,
    /// Cycle counter.
    pub mcycle: u64,
    /// Retired-instruction counter.
    pub minstret: u64,
    /// Hart index (read-only).
    pub mhartid: u32,
}

impl Csrs {
    /// Reset values for hart `hartid`.
    pub const fn new(hartid: u32) -> Self {
        Self {
            mstatus: 0,
            misa: MISA_RV32I,
            mie: 0,
            mtvec: 0,
            mscratch: 0,
            mepc: 0,
            mcause: 0,
            mtval: 0,
            mip: 0,
            mcycle: 0,
            minstret: 0,
            mhartid: hartid,
        }
    }

    /// Reads a CSR, or `None` if `addr` is not implemented.
    pub const fn read(&self, addr: u16) -> Option<u32> {
        Some(match addr {
            MSTATUS => self.mstatus,
            MISA => self.misa,
            MIE => self.mie,
            MTVEC => self.mtvec,
            MSCRATCH => self.mscratch,
            MEPC => self.mepc,
            MCAUSE => self.mcause,
            MTVAL => self.mtval,
            MIP => self.mip,
            MCYCLE | CYCLE => self.mcycle as u32,
            MINSTRET | INSTRET => self.minstret as u32,
            MHARTID => self.mhartid,
            _ => return None,
        })
    }

    /// Writes a CSR.
    ///
    /// Returns `false` if `addr` is not implemented or is read-only. `misa` is
    /// WARL and ignores writes.
    pub const fn write(&mut self, addr: u16, val: u32) -> bool {
        match addr {
            MSTATUS => self.mstatus = val,
            MISA => {}
            MIE => self.mie = val,
            MTVEC => self.mtvec = val & !0b11,
            MSCRATCH => self.mscratch = val,
            MEPC => self.mepc = val & !0b11,
            MCAUSE => self.mcause = val,
            MTVAL => self.mtval = val,
            MIP => self.mip = val,
            MCYCLE => self.mcycle = (self.mcycle & !0xFFFF_FFFF) | val as u64,
            MINSTRET => self.minstret = (self.minstret & !0xFFFF_FFFF) | val as u64,
            _ => return false,
        }
        true
    }
}
