//! VCD Waveform Capture.
//!
//! This module dumps the shared-memory path as a Value Change Dump, one sample per
//! half clock. It records:
//! 1. **Clocking:** `clk` and the active-low `rstz`, like the RTL harness.
//! 2. **Arbiter:** Grant valid, winner, direction, address and denied count.
//! 3. **Per Core:** Monitor PC, instruction-valid, port requests and acknowledges, LSU
//!    ready, and the store-buffer state (0 empty, 1 occupied, 2 draining).
//!
//! Only signals whose value changed since the previous sample are written.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use vcd_ng::{IdCode, SimulationCommand, TimescaleUnit, Value, VecValue, Writer};

use crate::common::data::Port;
use crate::common::error::SimError;
use crate::core::units::lsu::store_buffer::StoreBuffer;
use crate::soc::{System, TickReport};

/// Name of the top-level scope.
const TOP_SCOPE: &str = "rvsmp";

/// A declared variable and its width.
#[derive(Clone, Copy, Debug)]
struct Signal {
    id: IdCode,
    width: u32,
}

#[derive(Clone, Copy, Debug)]
struct CoreSignals {
    pc: Signal,
    instr_valid: Signal,
    data_req: Signal,
    data_ack: Signal,
    fetch_req: Signal,
    fetch_ack: Signal,
    lsu_ready: Signal,
    sb_state: Signal,
}

#[derive(Clone, Debug)]
struct Layout {
    clk: Signal,
    rstz: Signal,
    grant_valid: Signal,
    grant_core: Signal,
    grant_instr: Signal,
    grant_write: Signal,
    grant_addr: Signal,
    denied: Signal,
    cores: Vec<CoreSignals>,
}

impl Layout {
    const TOP_SIGNALS: usize = 8;
    const CORE_SIGNALS: usize = 8;

    fn declare<W: Write>(w: &mut Writer<W>, cores: usize) -> io::Result<Self> {
        fn wire<W: Write>(w: &mut Writer<W>, width: u32, name: &str) -> io::Result<Signal> {
            Ok(Signal {
                id: w.add_wire(width, name)?,
                width,
            })
        }

        w.timescale(1, TimescaleUnit::NS)?;
        w.add_module(TOP_SCOPE)?;
        let mut layout = Self {
            clk: wire(w, 1, "clk")?,
            rstz: wire(w, 1, "rstz")?,
            grant_valid: wire(w, 1, "grant_valid")?,
            grant_core: wire(w, 8, "grant_core")?,
            grant_instr: wire(w, 1, "grant_instr")?,
            grant_write: wire(w, 1, "grant_write")?,
            grant_addr: wire(w, 32, "grant_addr")?,
            denied: wire(w, 8, "denied")?,
            cores: Vec::with_capacity(cores),
        };
        for core in 0..cores {
            w.add_module(&format!("core{core}"))?;
            layout.cores.push(CoreSignals {
                pc: wire(w, 32, "pc")?,
                instr_valid: wire(w, 1, "instr_valid")?,
                data_req: wire(w, 1, "data_req")?,
                data_ack: wire(w, 1, "data_ack")?,
                fetch_req: wire(w, 1, "fetch_req")?,
                fetch_ack: wire(w, 1, "fetch_ack")?,
                lsu_ready: wire(w, 1, "lsu_ready")?,
                sb_state: wire(w, 2, "sb_state")?,
            });
            w.upscope()?;
        }
        w.upscope()?;
        w.enddefinitions()?;
        Ok(layout)
    }

    fn signal_count(&self) -> usize {
        Self::TOP_SIGNALS + Self::CORE_SIGNALS * self.cores.len()
    }
}

/// Writes a VCD file for a running system.
pub struct WaveformWriter<W: Write> {
    writer: Writer<W>,
    layout: Layout,
    last: Vec<Option<u64>>,
    started: bool,
}

impl<W: Write> fmt::Debug for WaveformWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaveformWriter")
            .field("cores", &self.layout.cores.len())
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl WaveformWriter<BufWriter<File>> {
    /// Creates `path` and writes the VCD header for `cores` cores.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the file cannot be created, [`SimError::Waveform`] if the
    /// header cannot be written.
    pub fn create(path: &Path, cores: usize) -> Result<Self, SimError> {
        let file = File::create(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufWriter::new(file), cores)
    }
}

impl<W: Write> WaveformWriter<W> {
    /// Writes the VCD header for `cores` cores to `out`.
    ///
    /// # Errors
    ///
    /// [`SimError::Waveform`] if the header cannot be written.
    pub fn new(out: W, cores: usize) -> Result<Self, SimError> {
        let mut writer = Writer::new(out);
        let layout = Layout::declare(&mut writer, cores).map_err(SimError::Waveform)?;
        let last = vec![None; layout.signal_count()];
        Ok(Self {
            writer,
            layout,
            last,
            started: false,
        })
    }

    /// Dumps one half-clock sample at `time`.
    ///
    /// `report` is the most recent rising edge, or `None` while reset is held.
    ///
    /// # Errors
    ///
    /// [`SimError::Waveform`] if the file cannot be written.
    pub fn sample(
        &mut self,
        time: u64,
        clk: bool,
        in_reset: bool,
        system: &System,
        report: Option<&TickReport>,
    ) -> Result<(), SimError> {
        let l = &self.layout;
        let mut values = Vec::with_capacity(self.last.len());
        let grant = report.and_then(|r| r.arbiter.grant);
        values.push((l.clk, u64::from(clk)));
        values.push((l.rstz, u64::from(!in_reset)));
        values.push((l.grant_valid, u64::from(grant.is_some())));
        values.push((l.grant_core, grant.map_or(0, |g| g.requester.core as u64)));
        values.push((
            l.grant_instr,
            u64::from(grant.is_some_and(|g| g.requester.port == Port::Instruction)),
        ));
        values.push((l.grant_write, u64::from(grant.is_some_and(|g| g.is_write))));
        values.push((l.grant_addr, grant.map_or(0, |g| u64::from(g.address))));
        values.push((
            l.denied,
            report.map_or(0, |r| r.arbiter.denied as u64),
        ));

        for (index, (sig, core)) in l.cores.iter().zip(system.cores()).enumerate() {
            let tick = report.and_then(|r| r.cores.get(index)).copied().unwrap_or_default();
            let acked = |port| grant.is_some_and(|g| g.requester.core == index && g.requester.port == port);
            let sb = match core.lsu.store_buffer() {
                StoreBuffer::Empty => 0,
                StoreBuffer::Occupied(_) => 1,
                StoreBuffer::Draining(_) => 2,
            };
            values.push((sig.pc, u64::from(core.hart.pc())));
            values.push((sig.instr_valid, u64::from(tick.activity.instr_valid)));
            values.push((sig.data_req, u64::from(tick.data_request.is_some())));
            values.push((sig.data_ack, u64::from(acked(Port::Data))));
            values.push((sig.fetch_req, u64::from(tick.fetch_request.is_some())));
            values.push((sig.fetch_ack, u64::from(acked(Port::Instruction))));
            values.push((sig.lsu_ready, u64::from(tick.lsu.ready)));
            values.push((sig.sb_state, sb));
        }

        self.emit(time, &values).map_err(SimError::Waveform)
    }

    fn emit(&mut self, time: u64, values: &[(Signal, u64)]) -> io::Result<()> {
        self.writer.timestamp(time)?;
        if !self.started {
            self.writer.begin(SimulationCommand::Dumpvars)?;
        }
        for (slot, &(sig, value)) in values.iter().enumerate() {
            if self.last.get(slot).copied().flatten() == Some(value) {
                continue;
            }
            if let Some(last) = self.last.get_mut(slot) {
                *last = Some(value);
            }
            if sig.width == 1 {
                let bit = if value & 1 == 1 { Value::V1 } else { Value::V0 };
                self.writer.change_scalar(sig.id, bit)?;
            } else {
                let bits = (0..sig.width)
                    .rev()
                    .map(|b| if (value >> b) & 1 == 1 { Value::V1 } else { Value::V0 })
                    .collect::<Vec<_>>();
                self.writer.change_vector(sig.id, &VecValue::from(bits))?;
            }
        }
        if !self.started {
            self.writer.end()?;
            self.started = true;
        }
        Ok(())
    }

    /// Writes the closing timestamp and closes the dump.
    ///
    /// # Errors
    ///
    /// [`SimError::Waveform`] if the timestamp cannot be written.
    pub fn finish(mut self, time: u64) -> Result<(), SimError> {
        self.writer.timestamp(time).map_err(SimError::Waveform)
    }
}
