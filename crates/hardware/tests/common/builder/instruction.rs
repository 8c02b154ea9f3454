//! Fluent RV32I instruction encoder.

use rvsmp_core::isa::privileged::opcodes::{CSRRS, CSRRW, ECALL, MRET};
use rvsmp_core::isa::rv32i::funct3;
use rvsmp_core::isa::rv32i::funct7::{ALT, DEFAULT};
use rvsmp_core::isa::rv32i::opcodes::*;

#[derive(Clone, Copy, Debug, Default)]
pub struct InstructionBuilder {
    opcode: u32,
    rd: u32,
    funct3: u32,
    rs1: u32,
    rs2: u32,
    funct7: u32,
    imm: i32,
}

impl InstructionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opcode(mut self, op: u32) -> Self {
        self.opcode = op;
        self
    }

    pub fn rd(mut self, rd: u32) -> Self {
        self.rd = rd;
        self
    }

    pub fn rs1(mut self, rs1: u32) -> Self {
        self.rs1 = rs1;
        self
    }

    pub fn rs2(mut self, rs2: u32) -> Self {
        self.rs2 = rs2;
        self
    }

    pub fn funct3(mut self, funct3: u32) -> Self {
        self.funct3 = funct3;
        self
    }

    pub fn imm(mut self, imm: i32) -> Self {
        self.imm = imm;
        self
    }

    // --- Helpers for Common Instructions ---

    pub fn addi(self, rd: u32, rs1: u32, imm: i32) -> Self {
        self.opcode(OP_IMM).rd(rd).rs1(rs1).funct3(funct3::ADD_SUB).imm(imm)
    }

    pub fn add(self, rd: u32, rs1: u32, rs2: u32) -> Self {
        let mut b = self.opcode(OP_REG).rd(rd).rs1(rs1).rs2(rs2).funct3(funct3::ADD_SUB);
        b.funct7 = DEFAULT;
        b
    }

    pub fn sub(self, rd: u32, rs1: u32, rs2: u32) -> Self {
        let mut b = self.add(rd, rs1, rs2);
        b.funct7 = ALT;
        b
    }

    pub fn lui(self, rd: u32, imm20: u32) -> Self {
        self.opcode(OP_LUI).rd(rd).imm((imm20 << 12) as i32)
    }

    pub fn lw(self, rd: u32, rs1: u32, offset: i32) -> Self {
        self.opcode(OP_LOAD).rd(rd).rs1(rs1).funct3(funct3::LW).imm(offset)
    }

    pub fn lbu(self, rd: u32, rs1: u32, offset: i32) -> Self {
        self.opcode(OP_LOAD).rd(rd).rs1(rs1).funct3(funct3::LBU).imm(offset)
    }

    pub fn sw(self, rs2: u32, rs1: u32, offset: i32) -> Self {
        self.opcode(OP_STORE).rs1(rs1).rs2(rs2).funct3(funct3::SW).imm(offset)
    }

    pub fn sb(self, rs2: u32, rs1: u32, offset: i32) -> Self {
        self.opcode(OP_STORE).rs1(rs1).rs2(rs2).funct3(funct3::SB).imm(offset)
    }

    pub fn beq(self, rs1: u32, rs2: u32, offset: i32) -> Self {
        self.opcode(OP_BRANCH).rs1(rs1).rs2(rs2).funct3(funct3::BEQ).imm(offset)
    }

    pub fn bne(self, rs1: u32, rs2: u32, offset: i32) -> Self {
        self.opcode(OP_BRANCH).rs1(rs1).rs2(rs2).funct3(funct3::BNE).imm(offset)
    }

    pub fn jal(self, rd: u32, offset: i32) -> Self {
        self.opcode(OP_JAL).rd(rd).imm(offset)
    }

    pub fn fence(self) -> Self {
        // fence rw, rw
        self.opcode(OP_MISC_MEM).funct3(funct3::FENCE).imm(0x033)
    }

    pub fn csrrs(self, rd: u32, csr: u16, rs1: u32) -> Self {
        self.opcode(OP_SYSTEM).rd(rd).rs1(rs1).funct3(CSRRS).imm(i32::from(csr))
    }

    pub fn csrrw(self, rd: u32, csr: u16, rs1: u32) -> Self {
        self.opcode(OP_SYSTEM).rd(rd).rs1(rs1).funct3(CSRRW).imm(i32::from(csr))
    }

    pub fn build(self) -> u32 {
        let opcode = self.opcode & 0x7F;
        let rd = (self.rd & 0x1F) << 7;
        let funct3 = (self.funct3 & 0x7) << 12;
        let rs1 = (self.rs1 & 0x1F) << 15;
        let rs2 = (self.rs2 & 0x1F) << 20;
        let funct7 = (self.funct7 & 0x7F) << 25;
        let imm = self.imm as u32;

        match opcode {
            OP_REG => funct7 | rs2 | rs1 | funct3 | rd | opcode,
            OP_IMM | OP_LOAD | OP_JALR | OP_MISC_MEM | OP_SYSTEM => {
                ((imm & 0xFFF) << 20) | rs1 | funct3 | rd | opcode
            }
            OP_STORE => {
                let hi = ((imm >> 5) & 0x7F) << 25;
                let lo = (imm & 0x1F) << 7;
                hi | rs2 | rs1 | funct3 | lo | opcode
            }
            OP_BRANCH => {
                let b12 = ((imm >> 12) & 1) << 31;
                let b10_5 = ((imm >> 5) & 0x3F) << 25;
                let b4_1 = ((imm >> 1) & 0xF) << 8;
                let b11 = ((imm >> 11) & 1) << 7;
                b12 | b10_5 | rs2 | rs1 | funct3 | b4_1 | b11 | opcode
            }
            OP_LUI | OP_AUIPC => (imm & 0xFFFF_F000) | rd | opcode,
            OP_JAL => {
                let b20 = ((imm >> 20) & 1) << 31;
                let b10_1 = ((imm >> 1) & 0x3FF) << 21;
                let b11 = ((imm >> 11) & 1) << 20;
                let b19_12 = ((imm >> 12) & 0xFF) << 12;
                b20 | b10_1 | b11 | b19_12 | rd | opcode
            }
            _ => panic!("unsupported opcode {opcode:#x}"),
        }
    }
}

pub fn ecall() -> u32 {
    ECALL
}

pub fn mret() -> u32 {
    MRET
}

/// `jal x0, 0`: spin in place.
pub fn halt() -> u32 {
    InstructionBuilder::new().jal(0, 0).build()
}
