//! Harts that replay a fixed list of memory operations.
//!
//! A `ScriptedHart` never fetches. Each cycle it presents the operation at the head of its
//! script to the LSU and pops it once the LSU reports ready; completed loads come back as
//! register writes in the tick report, so tests can read results without downcasting.

use std::collections::VecDeque;

use rvsmp_core::common::data::DecodedMemOp;
use rvsmp_core::common::data::{AccessSize, MemoryRequest};
use rvsmp_core::core::{Hart, HartActivity, HartInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Present this operation until the LSU is ready.
    Mem(DecodedMemOp),
    /// Present nothing for one cycle.
    Idle,
}

impl Step {
    pub fn lw(addr: u32, rd: u8) -> Self {
        Self::Mem(DecodedMemOp::load(addr, AccessSize::Word, false, rd))
    }

    pub fn sw(addr: u32, value: u32) -> Self {
        Self::Mem(DecodedMemOp::store(addr, value, AccessSize::Word))
    }

    pub fn sb(addr: u32, value: u32) -> Self {
        Self::Mem(DecodedMemOp::store(addr, value, AccessSize::Byte))
    }

    pub fn fence() -> Self {
        Self::Mem(DecodedMemOp::fence())
    }
}

#[derive(Clone, Debug)]
pub struct ScriptedHart {
    script: VecDeque<Step>,
    pc: u32,
}

impl ScriptedHart {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            pc: 0,
        }
    }

    pub fn boxed(steps: impl IntoIterator<Item = Step>) -> Box<dyn Hart> {
        Box::new(Self::new(steps))
    }
}

impl Hart for ScriptedHart {
    fn fetch_request(&self) -> Option<MemoryRequest> {
        None
    }

    fn mem_op(&self) -> Option<DecodedMemOp> {
        match self.script.front() {
            Some(Step::Mem(op)) => Some(*op),
            _ => None,
        }
    }

    fn clock(&mut self, input: &HartInput) -> HartActivity {
        let mut act = HartActivity {
            pc: self.pc,
            ..HartActivity::default()
        };
        match self.script.front() {
            Some(Step::Idle) => {
                let _ = self.script.pop_front();
            }
            Some(Step::Mem(_)) if input.lsu.ready => {
                let _ = self.script.pop_front();
                if input.lsu.write_back {
                    act.reg_write = Some((input.lsu.rd, input.lsu.load_data));
                }
                act.retired = true;
                self.pc = self.pc.wrapping_add(4);
            }
            _ => {}
        }
        act
    }

    fn reset(&mut self, pc: u32) {
        self.pc = pc;
    }

    fn pc(&self) -> u32 {
        self.pc
    }
}

