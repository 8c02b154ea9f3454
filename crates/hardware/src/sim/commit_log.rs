//! Commit Event Log.
//!
//! This module produces the checker-facing text log sampled on every rising edge. It provides:
//! 1. **Events:** Register writes, data-port memory writes and trap pulses, rendered as
//!    `[REG]`, `[MEMW]` and `[TRAP]` lines.
//! 2. **PC Attribution:** A per-core pending PC captured while an instruction is valid and
//!    released when it retires or traps, so each line names the instruction that caused
//!    it rather than whatever the monitor PC shows by then. Drained stores are tagged
//!    with the PC of the store that filled the buffer.
//! 3. **Filtering:** Only the enabled categories are written.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::common::data::Port;
use crate::common::error::SimError;
use crate::config::LogCategories;
use crate::core::hart::TrapPulse;
use crate::soc::TickReport;

/// One logged event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitEvent {
    /// Architectural register write.
    Reg {
        /// Attributed PC.
        pc: u32,
        /// Destination register.
        rd: u8,
        /// Value written.
        value: u32,
    },
    /// Write granted on a data port.
    MemWrite {
        /// Attributed PC.
        pc: u32,
        /// Word-aligned address.
        addr: u32,
        /// Lane-aligned data.
        data: u32,
        /// Byte-enable mask.
        mask: u8,
    },
    /// Trap pulse.
    Trap {
        /// Attributed PC.
        pc: u32,
        /// Trap flags and cause.
        trap: TrapPulse,
    },
}

impl CommitEvent {
    /// Returns `true` if `categories` selects this event.
    pub const fn enabled_in(&self, categories: LogCategories) -> bool {
        match self {
            Self::Reg { .. } => categories.reg,
            Self::MemWrite { .. } => categories.mem,
            Self::Trap { .. } => categories.trap,
        }
    }
}

impl fmt::Display for CommitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Reg { pc, rd, value } => write!(f, "[REG] pc={pc:#x} x{rd} <= {value:#x}"),
            Self::MemWrite {
                pc,
                addr,
                data,
                mask,
            } => write!(
                f,
                "[MEMW] pc={pc:#x} addr={addr:#x} data={data:#x} mask={mask:#x}"
            ),
            Self::Trap { pc, trap } => write!(
                f,
                "[TRAP] pc={pc:#x} exception={} trap_jump={} irq={} cause={:#x}",
                u8::from(trap.exception),
                u8::from(trap.trap_jump),
                u8::from(trap.irq),
                trap.cause
            ),
        }
    }
}

/// PC attribution for one core.
///
/// The monitor PC may move on before an instruction's effects show up, so the PC of a
/// valid instruction is held until that instruction retires or traps. A store absorbed
/// into the store buffer keeps its PC until the buffered write drains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PcTracker {
    pending: Option<u32>,
    buffered: Option<u32>,
}

impl PcTracker {
    /// PC to tag this cycle's register writes and traps with, given the raw monitor PC.
    #[inline]
    pub fn commit_pc(&self, monitor_pc: u32) -> u32 {
        self.pending.unwrap_or(monitor_pc)
    }

    /// Records the PC of a store absorbed into the store buffer this cycle.
    #[inline]
    pub const fn absorb(&mut self, pc: u32) {
        self.buffered = Some(pc);
    }

    /// PC of the store drained this cycle, or `fallback` if none was recorded.
    #[inline]
    pub const fn drain_pc(&mut self, fallback: u32) -> u32 {
        match self.buffered.take() {
            Some(pc) => pc,
            None => fallback,
        }
    }

    /// Updates the pending PC after this cycle's events were tagged.
    ///
    /// A valid instruction captures the monitor PC if nothing is pending; an instruction
    /// that retires or traps releases it, including one that completes in the cycle it
    /// became valid.
    pub const fn advance(&mut self, completed: bool, instr_valid: bool, monitor_pc: u32) {
        if instr_valid && self.pending.is_none() {
            self.pending = Some(monitor_pc);
        }
        if completed {
            self.pending = None;
        }
    }

    /// Currently pending PC.
    #[inline]
    pub const fn pending(&self) -> Option<u32> {
        self.pending
    }
}

/// Writes commit events to a text sink.
pub struct CommitLogger {
    categories: LogCategories,
    sink: Box<dyn Write>,
    trackers: Vec<PcTracker>,
    tag_core: bool,
}

impl fmt::Debug for CommitLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitLogger")
            .field("categories", &self.categories)
            .field("trackers", &self.trackers)
            .finish_non_exhaustive()
    }
}

impl CommitLogger {
    /// Creates a logger for `cores` cores writing to `sink`.
    ///
    /// Lines get a ` core=N` suffix when `cores > 1`.
    pub fn new(categories: LogCategories, sink: Box<dyn Write>, cores: usize) -> Self {
        Self {
            categories,
            sink,
            trackers: vec![PcTracker::default(); cores],
            tag_core: cores > 1,
        }
    }

    /// Logger writing to standard output.
    pub fn stdout(categories: LogCategories, cores: usize) -> Self {
        Self::new(categories, Box::new(io::stdout()), cores)
    }

    /// Logger writing to a newly created file.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be created.
    pub fn to_file(categories: LogCategories, path: &Path, cores: usize) -> Result<Self, SimError> {
        let file = File::create(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(categories, Box::new(BufWriter::new(file)), cores))
    }

    /// Enabled categories.
    pub const fn categories(&self) -> LogCategories {
        self.categories
    }

    /// Derives this edge's events and advances PC attribution.
    ///
    /// Every event is returned regardless of the category filter, so attribution does not
    /// depend on which categories are logged.
    pub fn attribute(&mut self, tick: &TickReport) -> Vec<(usize, CommitEvent)> {
        let mut events = Vec::new();
        let data_write = tick
            .arbiter
            .granted_write()
            .filter(|w| w.requester.port == Port::Data);

        for (core, (tracker, ct)) in self.trackers.iter_mut().zip(&tick.cores).enumerate() {
            let act = &ct.activity;
            let pc = tracker.commit_pc(act.pc);

            if let Some((rd, value)) = act.reg_write {
                events.push((core, CommitEvent::Reg { pc, rd, value }));
            }
            if let Some(w) = data_write.filter(|w| w.requester.core == core) {
                let pc = if ct.lsu.drained { tracker.drain_pc(pc) } else { pc };
                events.push((
                    core,
                    CommitEvent::MemWrite {
                        pc,
                        addr: w.address,
                        data: w.write_data,
                        mask: w.mask,
                    },
                ));
            }
            if let Some(trap) = act.trap {
                events.push((core, CommitEvent::Trap { pc, trap }));
            }
            if ct.lsu.absorbed {
                tracker.absorb(pc);
            }
            tracker.advance(act.retired || act.trap.is_some(), act.instr_valid, act.pc);
        }
        events
    }

    /// Logs one rising edge.
    ///
    /// # Errors
    ///
    /// [`SimError::CommitLog`] if the sink fails.
    pub fn observe(&mut self, tick: &TickReport) -> Result<(), SimError> {
        for (core, event) in self.attribute(tick) {
            if !event.enabled_in(self.categories) {
                continue;
            }
            let written = if self.tag_core {
                writeln!(self.sink, "{event} core={core}")
            } else {
                writeln!(self.sink, "{event}")
            };
            written.map_err(SimError::CommitLog)?;
        }
        Ok(())
    }

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// [`SimError::CommitLog`] if the sink fails.
    pub fn flush(&mut self) -> Result<(), SimError> {
        self.sink.flush().map_err(SimError::CommitLog)
    }
}
