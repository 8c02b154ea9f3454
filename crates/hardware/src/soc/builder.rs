//! System construction and top-level `System` type.
//!
//! This module builds the complete system from configuration. It performs:
//! 1. **Memory setup:** Creates the shared memory with the configured word count.
//! 2. **Core setup:** Pairs every hart with a load/store unit using the configured
//!    ordering model.
//! 3. **Clocking:** Evaluates one rising edge across the arbiter, every LSU and every
//!    hart, in a fixed order.

use tracing::debug;

use crate::common::data::{DecodedMemOp, MemoryRequest, RequesterId};
use crate::common::error::ConfigError;
use crate::config::SystemConfig;
use crate::core::hart::{Hart, HartActivity, HartInput, ReferenceHart};
use crate::core::units::lsu::{LoadStoreUnit, LsuOutput};
use crate::soc::interconnect::{ArbiterCycle, MemoryArbiter};
use crate::soc::memory::SharedMemory;

/// One core: a hart and the load/store unit on its data port.
#[derive(Debug)]
pub struct Core {
    index: usize,
    /// Instruction side.
    pub hart: Box<dyn Hart>,
    /// Data side.
    pub lsu: LoadStoreUnit,
}

impl Core {
    /// Core index, which is also its arbitration rank within a port class.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Per-core signals observed during one rising edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreTick {
    /// Memory operation presented to the LSU.
    pub mem_op: Option<DecodedMemOp>,
    /// Request asserted on the data port.
    pub data_request: Option<MemoryRequest>,
    /// Request asserted on the instruction port.
    pub fetch_request: Option<MemoryRequest>,
    /// LSU outputs.
    pub lsu: LsuOutput,
    /// Hart outputs.
    pub activity: HartActivity,
}

/// Everything that happened on one rising edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Cycle number of this edge, counted from construction.
    pub cycle: u64,
    /// Arbitration outcome.
    pub arbiter: ArbiterCycle,
    /// Per-core signals, indexed by core.
    pub cores: Vec<CoreTick>,
}

impl TickReport {
    /// Write granted on `core`'s data port this cycle.
    pub fn data_write(&self, core: usize) -> Option<&MemoryRequest> {
        self.arbiter
            .granted_write()
            .filter(|w| w.requester == RequesterId::data(core))
    }
}

/// Top-level system: cores, the arbiter, and the shared memory.
#[derive(Debug)]
pub struct System {
    cores: Vec<Core>,
    arbiter: MemoryArbiter,
    memory: SharedMemory,
    reset_pc: u32,
    cycle: u64,
}

impl System {
    /// Builds a system of [`ReferenceHart`]s from configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoCores`] for a zero core count and [`ConfigError::MemorySize`] for
    /// a memory size that is not a power of two.
    pub fn new(config: &SystemConfig) -> Result<Self, ConfigError> {
        let harts = (0..config.cores)
            .map(|id| Box::new(ReferenceHart::new(id, config.reset_pc)) as Box<dyn Hart>)
            .collect();
        Self::with_harts(config, harts)
    }

    /// Builds a system around caller-supplied harts; hart `i` becomes core `i`.
    ///
    /// The core count is the number of harts given; `config.cores` is ignored.
    ///
    /// # Arguments
    ///
    /// * `config` - Ordering model, memory size and reset PC.
    /// * `harts` - One hart per core, in core order.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoCores`] if `harts` is empty and [`ConfigError::MemorySize`] for
    /// a memory size that is not a power of two.
    pub fn with_harts(config: &SystemConfig, harts: Vec<Box<dyn Hart>>) -> Result<Self, ConfigError> {
        if harts.is_empty() {
            return Err(ConfigError::NoCores);
        }
        let memory = SharedMemory::new(config.memory_words()?)?;
        let lsu_config = config.ordering.lsu_config();
        let cores = harts
            .into_iter()
            .enumerate()
            .map(|(index, hart)| Core {
                index,
                hart,
                lsu: LoadStoreUnit::new(index, lsu_config),
            })
            .collect::<Vec<_>>();
        debug!(
            cores = cores.len(),
            ordering = %config.ordering,
            words = memory.len_words(),
            "system built"
        );
        Ok(Self {
            cores,
            arbiter: MemoryArbiter::new(),
            memory,
            reset_pc: config.reset_pc,
            cycle: 0,
        })
    }

    /// Number of cores.
    #[inline]
    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// The cores, in index order.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Shared memory.
    pub const fn memory(&self) -> &SharedMemory {
        &self.memory
    }

    /// Shared memory, for backdoor loading.
    pub const fn memory_mut(&mut self) -> &mut SharedMemory {
        &mut self.memory
    }

    /// The arbiter.
    pub const fn arbiter(&self) -> &MemoryArbiter {
        &self.arbiter
    }

    /// The arbiter, for enabling the grant trace.
    pub const fn arbiter_mut(&mut self) -> &mut MemoryArbiter {
        &mut self.arbiter
    }

    /// Rising edges evaluated so far.
    #[inline]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Puts every sequential element into its reset state.
    ///
    /// Memory contents survive; only the read-data register is cleared.
    pub fn reset(&mut self) {
        self.arbiter.reset();
        self.memory.reset_port();
        for core in &mut self.cores {
            core.lsu.reset();
            core.hart.reset(self.reset_pc);
        }
    }

    /// Evaluates one rising edge.
    ///
    /// Order of evaluation:
    /// 1. every LSU and hart computes the request it asserts from its current state;
    /// 2. the arbiter routes last cycle's read word, selects a winner and performs it;
    /// 3. every LSU is clocked with its acknowledge and routed data;
    /// 4. every hart is clocked with its fetch acknowledge, fetch data and LSU outputs.
    pub fn tick(&mut self) -> TickReport {
        let mut ticks = Vec::with_capacity(self.cores.len());
        let mut requests = Vec::with_capacity(2 * self.cores.len());
        for core in &self.cores {
            let mem_op = core.hart.mem_op();
            let data_request = core.lsu.request(mem_op.as_ref());
            let fetch_request = core.hart.fetch_request();
            requests.extend(data_request);
            requests.extend(fetch_request);
            ticks.push(CoreTick {
                mem_op,
                data_request,
                fetch_request,
                ..CoreTick::default()
            });
        }

        let arbiter = self.arbiter.cycle(&requests, &mut self.memory);

        for (core, tick) in self.cores.iter_mut().zip(ticks.iter_mut()) {
            let data = RequesterId::data(core.index);
            let instr = RequesterId::instruction(core.index);
            tick.lsu = core.lsu.clock(
                tick.mem_op.as_ref(),
                arbiter.acked(data),
                arbiter.read_data_for(data),
            );
            tick.activity = core.hart.clock(&HartInput {
                fetch_ack: arbiter.acked(instr),
                fetch_data: arbiter.read_data_for(instr),
                lsu: tick.lsu,
            });
        }

        let report = TickReport {
            cycle: self.cycle,
            arbiter,
            cores: ticks,
        };
        self.cycle += 1;
        report
    }
}
