//! Hart interface.
//!
//! A hart is everything on a core except the load/store unit: it fetches through the
//! core's instruction port, hands memory operations to the LSU, and reports what it
//! committed each cycle. It includes:
//! 1. **Interface:** The [`Hart`] trait the system drives once per rising edge.
//! 2. **Signals:** [`HartInput`] (fetch acknowledge and data, LSU outputs) and
//!    [`HartActivity`] (monitor PC, register write, trap pulse).
//! 3. **Reference Hart:** [`ReferenceHart`], a small multi-cycle RV32I implementation.
//! 4. **CSRs:** Machine-mode CSR storage used by the reference hart.

/// Machine-mode CSR file.
pub mod csr;

/// Multi-cycle RV32I reference hart.
pub mod reference;

use std::fmt;

pub use self::reference::ReferenceHart;
use crate::common::data::{DecodedMemOp, MemoryRequest};
use crate::core::units::lsu::LsuOutput;

/// Inputs delivered to a hart on a rising edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HartInput {
    /// The hart's instruction-port request was granted this cycle.
    pub fetch_ack: bool,
    /// Word routed to the instruction port this cycle.
    pub fetch_data: Option<u32>,
    /// Outputs of the core's load/store unit for this cycle.
    pub lsu: LsuOutput,
}

/// Trap pulse reported in the cycle a trap is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapPulse {
    /// The trap is a synchronous exception.
    pub exception: bool,
    /// Control transferred to the trap vector.
    pub trap_jump: bool,
    /// The trap is an interrupt.
    pub irq: bool,
    /// Value written to `mcause`.
    pub cause: u32,
}

/// What a hart did on one rising edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HartActivity {
    /// Raw monitor PC: the PC of the instruction currently owned by the hart.
    pub pc: u32,
    /// An instruction is being executed this cycle.
    pub instr_valid: bool,
    /// Architectural register write `(rd, value)`; never reported for `x0`.
    pub reg_write: Option<(u8, u32)>,
    /// Trap taken this cycle.
    pub trap: Option<TrapPulse>,
    /// An instruction retired this cycle.
    pub retired: bool,
}

/// A core's instruction side, driven by the system once per rising edge.
///
/// The two request accessors are pure: the system reads them, arbitrates, clocks the
/// LSU, and then calls [`Hart::clock`] with the results of that cycle.
pub trait Hart: fmt::Debug {
    /// Instruction-port request asserted this cycle.
    fn fetch_request(&self) -> Option<MemoryRequest>;

    /// Memory operation presented to the load/store unit this cycle.
    fn mem_op(&self) -> Option<DecodedMemOp>;

    /// Advances the hart by one rising edge.
    fn clock(&mut self, input: &HartInput) -> HartActivity;

    /// Returns the hart to its reset state, starting at `pc`.
    fn reset(&mut self, pc: u32);

    /// Current program counter.
    fn pc(&self) -> u32;
}
