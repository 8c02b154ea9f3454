//! RISC-V Instruction Decoder.
//!
//! This module translates a 32-bit RV32I encoding (plus the machine-mode system
//! instructions) into an [`Instruction`]. It extracts register indices, selects the
//! operation from `funct3`/`funct7`, and sign-extends the immediate for each
//! instruction format (I, S, B, U, J). Encodings outside the supported subset decode
//! to [`Instruction::Illegal`].

use crate::common::data::AccessSize;
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// Register-register or register-immediate ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set if less than (signed).
    Slt,
    /// Set if less than (unsigned).
    Sltu,
    /// Bitwise exclusive or.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Bitwise or.
    Or,
    /// Bitwise and.
    And,
}

impl AluOp {
    /// Applies the operation to two 32-bit operands.
    ///
    /// Shift amounts use the low five bits of `b`.
    pub const fn apply(self, a: u32, b: u32) -> u32 {
        let shamt = b & 0x1F;
        match self {
            Self::Add => a.wrapping_add(b),
            Self::Sub => a.wrapping_sub(b),
            Self::Sll => a << shamt,
            Self::Slt => ((a as i32) < (b as i32)) as u32,
            Self::Sltu => (a < b) as u32,
            Self::Xor => a ^ b,
            Self::Srl => a >> shamt,
            Self::Sra => ((a as i32) >> shamt) as u32,
            Self::Or => a | b,
            Self::And => a & b,
        }
    }
}

/// Conditional branch comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchCond {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than (signed).
    Lt,
    /// Greater or equal (signed).
    Ge,
    /// Less than (unsigned).
    Ltu,
    /// Greater or equal (unsigned).
    Geu,
}

impl BranchCond {
    /// Returns `true` if the branch is taken for operands `a` and `b`.
    pub const fn taken(self, a: u32, b: u32) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => (a as i32) < (b as i32),
            Self::Ge => (a as i32) >= (b as i32),
            Self::Ltu => a < b,
            Self::Geu => a >= b,
        }
    }
}

/// CSR read-modify-write flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsrOp {
    /// Replace the CSR with the source.
    Write,
    /// Set the bits of the source in the CSR.
    Set,
    /// Clear the bits of the source in the CSR.
    Clear,
}

/// Source operand of a CSR instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsrSource {
    /// Value of register `rs1`.
    Reg(u8),
    /// Zero-extended 5-bit immediate.
    Imm(u32),
}

/// A decoded RV32I or machine-mode system instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Load upper immediate.
    Lui {
        /// Destination register.
        rd: u8,
        /// Immediate with the low 12 bits clear.
        imm: u32,
    },
    /// Add upper immediate to PC.
    Auipc {
        /// Destination register.
        rd: u8,
        /// Immediate with the low 12 bits clear.
        imm: u32,
    },
    /// Jump and link.
    Jal {
        /// Link register.
        rd: u8,
        /// PC-relative offset.
        offset: i32,
    },
    /// Jump and link register.
    Jalr {
        /// Link register.
        rd: u8,
        /// Base register.
        rs1: u8,
        /// Offset added to the base.
        offset: i32,
    },
    /// Conditional branch.
    Branch {
        /// Comparison.
        cond: BranchCond,
        /// First operand.
        rs1: u8,
        /// Second operand.
        rs2: u8,
        /// PC-relative offset.
        offset: i32,
    },
    /// Load from memory.
    Load {
        /// Destination register.
        rd: u8,
        /// Base register.
        rs1: u8,
        /// Offset added to the base.
        offset: i32,
        /// Access width.
        size: AccessSize,
        /// Zero-extend instead of sign-extend.
        unsigned: bool,
    },
    /// Store to memory.
    Store {
        /// Base register.
        rs1: u8,
        /// Data register.
        rs2: u8,
        /// Offset added to the base.
        offset: i32,
        /// Access width.
        size: AccessSize,
    },
    /// ALU operation with an immediate operand.
    OpImm {
        /// Operation.
        op: AluOp,
        /// Destination register.
        rd: u8,
        /// Source register.
        rs1: u8,
        /// Sign-extended immediate (shift amount for shifts).
        imm: i32,
    },
    /// ALU operation on two registers.
    Op {
        /// Operation.
        op: AluOp,
        /// Destination register.
        rd: u8,
        /// First source register.
        rs1: u8,
        /// Second source register.
        rs2: u8,
    },
    /// Memory-ordering fence (FENCE and FENCE.I).
    Fence,
    /// Environment call.
    Ecall,
    /// Breakpoint.
    Ebreak,
    /// Return from machine-mode trap.
    Mret,
    /// Wait for interrupt.
    Wfi,
    /// CSR access.
    Csr {
        /// Read-modify-write flavor.
        op: CsrOp,
        /// Destination register for the old value.
        rd: u8,
        /// Source operand.
        src: CsrSource,
        /// CSR address.
        csr: u16,
    },
    /// Encoding outside the supported subset.
    Illegal(u32),
}

/// Decodes a 32-bit instruction.
///
/// # Arguments
///
/// * `inst` - The 32-bit instruction encoding to decode
///
/// # Returns
///
/// The typed instruction, or [`Instruction::Illegal`] carrying the raw bits.
pub fn decode(inst: u32) -> Instruction {
    let rd = inst.rd();
    let rs1 = inst.rs1();
    let rs2 = inst.rs2();
    let f3 = inst.funct3();
    let f7 = inst.funct7();

    match inst.opcode() {
        opcodes::OP_LUI => Instruction::Lui {
            rd,
            imm: u_imm(inst),
        },
        opcodes::OP_AUIPC => Instruction::Auipc {
            rd,
            imm: u_imm(inst),
        },
        opcodes::OP_JAL => Instruction::Jal {
            rd,
            offset: j_imm(inst),
        },
        opcodes::OP_JALR if f3 == 0 => Instruction::Jalr {
            rd,
            rs1,
            offset: i_imm(inst),
        },
        opcodes::OP_BRANCH => branch_cond(f3).map_or(Instruction::Illegal(inst), |cond| {
            Instruction::Branch {
                cond,
                rs1,
                rs2,
                offset: b_imm(inst),
            }
        }),
        opcodes::OP_LOAD => {
            let (size, unsigned) = match f3 {
                funct3::LB => (AccessSize::Byte, false),
                funct3::LH => (AccessSize::Half, false),
                funct3::LW => (AccessSize::Word, false),
                funct3::LBU => (AccessSize::Byte, true),
                funct3::LHU => (AccessSize::Half, true),
                _ => return Instruction::Illegal(inst),
            };
            Instruction::Load {
                rd,
                rs1,
                offset: i_imm(inst),
                size,
                unsigned,
            }
        }
        opcodes::OP_STORE => {
            let size = match f3 {
                funct3::SB => AccessSize::Byte,
                funct3::SH => AccessSize::Half,
                funct3::SW => AccessSize::Word,
                _ => return Instruction::Illegal(inst),
            };
            Instruction::Store {
                rs1,
                rs2,
                offset: s_imm(inst),
                size,
            }
        }
        opcodes::OP_IMM => decode_op_imm(inst, rd, rs1, f3, f7),
        opcodes::OP_REG => alu_op(f3, f7).map_or(Instruction::Illegal(inst), |op| {
            Instruction::Op { op, rd, rs1, rs2 }
        }),
        opcodes::OP_MISC_MEM if matches!(f3, funct3::FENCE | funct3::FENCE_I) => {
            Instruction::Fence
        }
        opcodes::OP_SYSTEM => decode_system(inst, rd, rs1, f3),
        _ => Instruction::Illegal(inst),
    }
}

fn decode_op_imm(inst: u32, rd: u8, rs1: u8, f3: u32, f7: u32) -> Instruction {
    let op = match (f3, f7) {
        (funct3::ADD_SUB, _) => AluOp::Add,
        (funct3::SLT, _) => AluOp::Slt,
        (funct3::SLTU, _) => AluOp::Sltu,
        (funct3::XOR, _) => AluOp::Xor,
        (funct3::OR, _) => AluOp::Or,
        (funct3::AND, _) => AluOp::And,
        (funct3::SLL, funct7::DEFAULT) => AluOp::Sll,
        (funct3::SRL_SRA, funct7::DEFAULT) => AluOp::Srl,
        (funct3::SRL_SRA, funct7::ALT) => AluOp::Sra,
        _ => return Instruction::Illegal(inst),
    };
    let imm = match op {
        AluOp::Sll | AluOp::Srl | AluOp::Sra => i32::from(inst.rs2()),
        _ => i_imm(inst),
    };
    Instruction::OpImm { op, rd, rs1, imm }
}

fn decode_system(inst: u32, rd: u8, rs1: u8, f3: u32) -> Instruction {
    let (op, src) = match f3 {
        funct3::PRIV => {
            return match inst {
                sys::ECALL => Instruction::Ecall,
                sys::EBREAK => Instruction::Ebreak,
                sys::MRET => Instruction::Mret,
                sys::WFI => Instruction::Wfi,
                _ => Instruction::Illegal(inst),
            };
        }
        sys::CSRRW => (CsrOp::Write, CsrSource::Reg(rs1)),
        sys::CSRRS => (CsrOp::Set, CsrSource::Reg(rs1)),
        sys::CSRRC => (CsrOp::Clear, CsrSource::Reg(rs1)),
        sys::CSRRWI => (CsrOp::Write, CsrSource::Imm(u32::from(rs1))),
        sys::CSRRSI => (CsrOp::Set, CsrSource::Imm(u32::from(rs1))),
        sys::CSRRCI => (CsrOp::Clear, CsrSource::Imm(u32::from(rs1))),
        _ => return Instruction::Illegal(inst),
    };
    Instruction::Csr {
        op,
        rd,
        src,
        csr: inst.csr(),
    }
}

const fn branch_cond(f3: u32) -> Option<BranchCond> {
    match f3 {
        funct3::BEQ => Some(BranchCond::Eq),
        funct3::BNE => Some(BranchCond::Ne),
        funct3::BLT => Some(BranchCond::Lt),
        funct3::BGE => Some(BranchCond::Ge),
        funct3::BLTU => Some(BranchCond::Ltu),
        funct3::BGEU => Some(BranchCond::Geu),
        _ => None,
    }
}

const fn alu_op(f3: u32, f7: u32) -> Option<AluOp> {
    match (f3, f7) {
        (funct3::ADD_SUB, funct7::DEFAULT) => Some(AluOp::Add),
        (funct3::ADD_SUB, funct7::ALT) => Some(AluOp::Sub),
        (funct3::SLL, funct7::DEFAULT) => Some(AluOp::Sll),
        (funct3::SLT, funct7::DEFAULT) => Some(AluOp::Slt),
        (funct3::SLTU, funct7::DEFAULT) => Some(AluOp::Sltu),
        (funct3::XOR, funct7::DEFAULT) => Some(AluOp::Xor),
        (funct3::SRL_SRA, funct7::DEFAULT) => Some(AluOp::Srl),
        (funct3::SRL_SRA, funct7::ALT) => Some(AluOp::Sra),
        (funct3::OR, funct7::DEFAULT) => Some(AluOp::Or),
        (funct3::AND, funct7::DEFAULT) => Some(AluOp::And),
        _ => None,
    }
}

/// I-Type: `imm[11:0] | rs1 | funct3 | rd | opcode`.
const fn i_imm(inst: u32) -> i32 {
    (inst as i32) >> 20
}

/// S-Type: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`.
const fn s_imm(inst: u32) -> i32 {
    (((inst as i32) >> 25) << 5) | ((inst >> 7) & 0x1F) as i32
}

/// B-Type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`.
const fn b_imm(inst: u32) -> i32 {
    let sign = ((inst as i32) >> 31) << 12;
    let bit_11 = ((inst >> 7) & 0x1) << 11;
    let bits_10_5 = ((inst >> 25) & 0x3F) << 5;
    let bits_4_1 = ((inst >> 8) & 0xF) << 1;
    sign | (bit_11 | bits_10_5 | bits_4_1) as i32
}

/// U-Type: `imm[31:12] | rd | opcode`.
const fn u_imm(inst: u32) -> u32 {
    inst & 0xFFFF_F000
}

/// J-Type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`.
const fn j_imm(inst: u32) -> i32 {
    let sign = ((inst as i32) >> 31) << 20;
    let bits_19_12 = inst & 0x000F_F000;
    let bit_11 = ((inst >> 20) & 0x1) << 11;
    let bits_10_1 = ((inst >> 21) & 0x3FF) << 1;
    sign | (bits_19_12 | bit_11 | bits_10_1) as i32
}
