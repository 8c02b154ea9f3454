//! Multi-cycle RV32I reference hart.
//!
//! Executes one instruction at a time through a small state machine:
//! 1. **Fetch:** Asserts a read on the instruction port until it is acknowledged.
//! 2. **Fetch Wait:** Receives the routed instruction word on the following cycle.
//! 3. **Execute:** Decodes and computes; traps are taken here.
//! 4. **Memory:** Presents the operation to the LSU until it reports ready.
//! 5. **Writeback:** Commits the register result one cycle after execute.
//!
//! The hart never issues a misaligned access: misaligned load and store targets raise
//! their address-misaligned exception in Execute.

use tracing::{debug, warn};

use super::csr::Csrs;
use super::{Hart, HartActivity, HartInput, TrapPulse};
use crate::common::constants::{REG_COUNT, REG_ZERO};
use crate::common::data::{DecodedMemOp, MemOpKind, MemoryRequest, RequesterId};
use crate::isa::decode::{CsrOp, CsrSource, Instruction, decode};
use crate::isa::privileged::cause::exception;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Fetch,
    FetchWait,
    Execute(u32),
    Memory { op: DecodedMemOp, next_pc: u32 },
    Writeback { rd: u8, value: u32, next_pc: u32 },
}

/// In-order, non-pipelined RV32I hart with a machine-mode CSR file.
#[derive(Clone, Debug)]
pub struct ReferenceHart {
    id: usize,
    regs: [u32; REG_COUNT],
    pc: u32,
    csrs: Csrs,
    stage: Stage,
}

impl ReferenceHart {
    /// Creates hart `id` in reset, starting at `reset_pc`.
    pub const fn new(id: usize, reset_pc: u32) -> Self {
        Self {
            id,
            regs: [0; REG_COUNT],
            pc: reset_pc,
            csrs: Csrs::new(id as u32),
            stage: Stage::Fetch,
        }
    }

    /// Value of integer register `idx`.
    pub fn reg(&self, idx: usize) -> u32 {
        self.regs.get(idx).copied().unwrap_or(0)
    }

    /// The CSR file.
    pub const fn csrs(&self) -> &Csrs {
        &self.csrs
    }

    fn read_reg(&self, idx: u8) -> u32 {
        self.regs[usize::from(idx)]
    }

    fn take_trap(&mut self, cause: u32, tval: u32, act: &mut HartActivity) {
        debug!(hart = self.id, pc = self.pc, cause, "trap");
        self.csrs.mepc = self.pc;
        self.csrs.mcause = cause;
        self.csrs.mtval = tval;
        self.pc = self.csrs.mtvec;
        self.stage = Stage::Fetch;
        act.trap = Some(TrapPulse {
            exception: true,
            trap_jump: true,
            irq: false,
            cause,
        });
    }

    /// Redirects to `target`, trapping if it is not word-aligned.
    fn jump(&mut self, target: u32, link: Option<u8>, act: &mut HartActivity) {
        if target & 0b11 != 0 {
            self.take_trap(exception::INSTRUCTION_ADDRESS_MISALIGNED, target, act);
            return;
        }
        let ret = self.pc.wrapping_add(4);
        match link {
            Some(rd) => {
                self.stage = Stage::Writeback {
                    rd,
                    value: ret,
                    next_pc: target,
                };
            }
            None => self.retire_at(target, act),
        }
    }

    fn retire_at(&mut self, next_pc: u32, act: &mut HartActivity) {
        self.pc = next_pc;
        self.stage = Stage::Fetch;
        self.csrs.minstret += 1;
        act.retired = true;
    }

    fn execute(&mut self, inst: u32, act: &mut HartActivity) {
        let pc = self.pc;
        let next = pc.wrapping_add(4);
        let writeback = |rd, value| Stage::Writeback {
            rd,
            value,
            next_pc: next,
        };

        match decode(inst) {
            Instruction::Lui { rd, imm } => self.stage = writeback(rd, imm),
            Instruction::Auipc { rd, imm } => self.stage = writeback(rd, pc.wrapping_add(imm)),
            Instruction::Jal { rd, offset } => {
                self.jump(pc.wrapping_add_signed(offset), Some(rd), act);
            }
            Instruction::Jalr { rd, rs1, offset } => {
                let target = self.read_reg(rs1).wrapping_add_signed(offset) & !1;
                self.jump(target, Some(rd), act);
            }
            Instruction::Branch {
                cond,
                rs1,
                rs2,
                offset,
            } => {
                if cond.taken(self.read_reg(rs1), self.read_reg(rs2)) {
                    self.jump(pc.wrapping_add_signed(offset), None, act);
                } else {
                    self.retire_at(next, act);
                }
            }
            Instruction::Load {
                rd,
                rs1,
                offset,
                size,
                unsigned,
            } => {
                let addr = self.read_reg(rs1).wrapping_add_signed(offset);
                if size.is_aligned(addr) {
                    self.stage = Stage::Memory {
                        op: DecodedMemOp::load(addr, size, unsigned, rd),
                        next_pc: next,
                    };
                } else {
                    self.take_trap(exception::LOAD_ADDRESS_MISALIGNED, addr, act);
                }
            }
            Instruction::Store {
                rs1,
                rs2,
                offset,
                size,
            } => {
                let addr = self.read_reg(rs1).wrapping_add_signed(offset);
                if size.is_aligned(addr) {
                    self.stage = Stage::Memory {
                        op: DecodedMemOp::store(addr, self.read_reg(rs2), size),
                        next_pc: next,
                    };
                } else {
                    self.take_trap(exception::STORE_ADDRESS_MISALIGNED, addr, act);
                }
            }
            Instruction::OpImm { op, rd, rs1, imm } => {
                self.stage = writeback(rd, op.apply(self.read_reg(rs1), imm as u32));
            }
            Instruction::Op { op, rd, rs1, rs2 } => {
                self.stage = writeback(rd, op.apply(self.read_reg(rs1), self.read_reg(rs2)));
            }
            Instruction::Fence => {
                self.stage = Stage::Memory {
                    op: DecodedMemOp::fence(),
                    next_pc: next,
                };
            }
            Instruction::Ecall => {
                self.take_trap(exception::ENVIRONMENT_CALL_FROM_M_MODE, 0, act);
            }
            Instruction::Ebreak => self.take_trap(exception::BREAKPOINT, pc, act),
            Instruction::Mret => self.retire_at(self.csrs.mepc, act),
            Instruction::Wfi => self.retire_at(next, act),
            Instruction::Csr { op, rd, src, csr } => {
                let operand = match src {
                    CsrSource::Reg(rs1) => self.read_reg(rs1),
                    CsrSource::Imm(imm) => imm,
                };
                let Some(old) = self.csrs.read(csr) else {
                    self.take_trap(exception::ILLEGAL_INSTRUCTION, inst, act);
                    return;
                };
                let new = match op {
                    CsrOp::Write => Some(operand),
                    CsrOp::Set => (operand != 0).then_some(old | operand),
                    CsrOp::Clear => (operand != 0).then_some(old & !operand),
                };
                if let Some(value) = new
                    && !self.csrs.write(csr, value)
                {
                    self.take_trap(exception::ILLEGAL_INSTRUCTION, inst, act);
                    return;
                }
                self.stage = writeback(rd, old);
            }
            Instruction::Illegal(raw) => {
                self.take_trap(exception::ILLEGAL_INSTRUCTION, raw, act);
            }
        }
    }
}

impl Hart for ReferenceHart {
    fn fetch_request(&self) -> Option<MemoryRequest> {
        matches!(self.stage, Stage::Fetch)
            .then(|| MemoryRequest::read(RequesterId::instruction(self.id), self.pc))
    }

    fn mem_op(&self) -> Option<DecodedMemOp> {
        match self.stage {
            Stage::Memory { op, .. } => Some(op),
            _ => None,
        }
    }

    fn clock(&mut self, input: &HartInput) -> HartActivity {
        self.csrs.mcycle += 1;
        let mut act = HartActivity {
            pc: self.pc,
            ..HartActivity::default()
        };

        match self.stage {
            Stage::Fetch => {
                if input.fetch_ack {
                    self.stage = Stage::FetchWait;
                }
            }
            Stage::FetchWait => match input.fetch_data {
                Some(word) => self.stage = Stage::Execute(word),
                None => {
                    warn!(hart = self.id, pc = self.pc, "fetch response missing; refetching");
                    self.stage = Stage::Fetch;
                }
            },
            Stage::Execute(inst) => {
                act.instr_valid = true;
                self.execute(inst, &mut act);
            }
            Stage::Memory { op, next_pc } => {
                if input.lsu.ready {
                    if let MemOpKind::Load { rd, .. } = op.kind
                        && input.lsu.write_back
                    {
                        self.regs[usize::from(rd)] = input.lsu.load_data;
                        act.reg_write = Some((rd, input.lsu.load_data));
                    }
                    self.retire_at(next_pc, &mut act);
                }
            }
            Stage::Writeback { rd, value, next_pc } => {
                if rd != REG_ZERO {
                    self.regs[usize::from(rd)] = value;
                    act.reg_write = Some((rd, value));
                }
                self.retire_at(next_pc, &mut act);
            }
        }
        act
    }

    fn reset(&mut self, pc: u32) {
        self.regs = [0; REG_COUNT];
        self.pc = pc;
        self.csrs = Csrs::new(self.id as u32);
        self.stage = Stage::Fetch;
    }

    fn pc(&self) -> u32 {
        self.pc
    }
}
