//! Simulation driver.
//!
//! The simulator owns the [`System`] together with everything that watches it: the commit
//! logger, the waveform writer and the statistics. Time advances one half clock at a time;
//! a rising edge evaluates the system (or resets it while reset is held) and every half
//! clock is sampled into the waveform.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tracing::{debug, info};

use crate::common::data::{MemoryRequest, Port, word_address};
use crate::common::error::SimError;
use crate::config::{Config, LogCategories, RunConfig};
use crate::sim::commit_log::CommitLogger;
use crate::sim::loader::{self, ImageSummary};
use crate::sim::waveform::WaveformWriter;
use crate::soc::{System, TickReport};
use crate::stats::SimStats;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The watched address received the pass value.
    ToHost {
        /// Watched address.
        address: u32,
        /// Value written.
        value: u32,
        /// Cycles run after reset release.
        cycle: u64,
        /// Half-clock edges since the simulator was created.
        tick: u64,
    },
    /// The cycle budget ran out first. Inconclusive, not an error.
    BudgetExhausted {
        /// Cycles run after reset release.
        cycles: u64,
        /// Half-clock edges since the simulator was created.
        tick: u64,
    },
}

impl RunOutcome {
    /// Returns `true` if the run ended on the pass write.
    pub const fn passed(&self) -> bool {
        matches!(self, Self::ToHost { .. })
    }

    /// Half-clock edge count at the end of the run.
    pub const fn tick(&self) -> u64 {
        match *self {
            Self::ToHost { tick, .. } | Self::BudgetExhausted { tick, .. } => tick,
        }
    }
}

/// Granted data-port write of `value` to the word containing `watch`, if this edge has one.
pub fn tohost_write(report: &TickReport, watch: u32, value: u32) -> Option<&MemoryRequest> {
    report.arbiter.granted_write().filter(|w| {
        w.requester.port == Port::Data
            && word_address(w.address) == word_address(watch)
            && w.write_data == value
    })
}

/// Top-level simulator: the system plus its observers.
#[derive(Debug)]
pub struct Simulator {
    system: System,
    run: RunConfig,
    logger: Option<CommitLogger>,
    waveform: Option<WaveformWriter<BufWriter<File>>>,
    stats: SimStats,
    image: Option<ImageSummary>,
    ticks: u64,
    clk: bool,
    in_reset: bool,
    last_report: Option<TickReport>,
}

impl Simulator {
    /// Wraps `system`; nothing is logged or traced until enabled.
    pub fn new(system: System, run: RunConfig) -> Self {
        Self {
            system,
            run,
            logger: None,
            waveform: None,
            stats: SimStats::default(),
            image: None,
            ticks: 0,
            clk: false,
            in_reset: false,
            last_report: None,
        }
    }

    /// Builds the system and opens the outputs named by `config`.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] if the configuration is invalid, or an I/O error opening the
    /// waveform or log file.
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        let system = System::new(&config.system)?;
        let mut sim = Self::new(system, config.run.clone());
        if let Some(vcd) = &config.trace.vcd {
            sim.start_trace(vcd)?;
        }
        if config.trace.log.any() {
            sim.enable_logging(config.trace.log, config.trace.log_file.as_deref())?;
        }
        Ok(sim)
    }

    /// Opens a VCD file at `path`; every following half clock is sampled.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or the header written.
    pub fn start_trace(&mut self, path: &Path) -> Result<(), SimError> {
        self.waveform = Some(WaveformWriter::create(path, self.system.core_count())?);
        debug!(path = %path.display(), "waveform opened");
        Ok(())
    }

    /// Logs commit events in `categories` to `path`, or stdout when `None`.
    ///
    /// # Errors
    ///
    /// [`SimError::Io`] if the log file cannot be created.
    pub fn enable_logging(&mut self, categories: LogCategories, path: Option<&Path>) -> Result<(), SimError> {
        let cores = self.system.core_count();
        let logger = match path {
            Some(p) => CommitLogger::to_file(categories, p, cores)?,
            None => CommitLogger::stdout(categories, cores),
        };
        self.set_logger(logger);
        Ok(())
    }

    /// Installs a commit logger with a caller-chosen sink.
    pub fn set_logger(&mut self, logger: CommitLogger) {
        self.logger = Some(logger);
    }

    /// Loads an ELF32 image from disk into shared memory.
    ///
    /// # Errors
    ///
    /// [`SimError::Load`] on any read or format problem.
    pub fn load(&mut self, path: &Path) -> Result<ImageSummary, SimError> {
        let summary = loader::load_elf_file(path, self.system.memory_mut())?;
        self.image = Some(summary);
        Ok(summary)
    }

    /// Loads an in-memory ELF32 image into shared memory.
    ///
    /// # Errors
    ///
    /// [`SimError::Load`] on any format problem.
    pub fn load_bytes(&mut self, data: &[u8]) -> Result<ImageSummary, SimError> {
        let summary = loader::load_elf(data, self.system.memory_mut())?;
        self.image = Some(summary);
        Ok(summary)
    }

    /// Asserts reset and clocks it for the configured number of cycles.
    ///
    /// Reset stays asserted until [`Self::release_reset`].
    ///
    /// # Errors
    ///
    /// Fails only if waveform output fails.
    pub fn hold_reset(&mut self) -> Result<(), SimError> {
        self.in_reset = true;
        self.last_report = None;
        self.system.reset();
        for _ in 0..self.run.reset_cycles {
            let _ = self.step()?;
        }
        debug!(cycles = self.run.reset_cycles, tick = self.ticks, "reset held");
        Ok(())
    }

    /// Deasserts reset; the next rising edge evaluates the system.
    pub fn release_reset(&mut self) {
        self.in_reset = false;
        debug!(tick = self.ticks, "reset released");
    }

    /// Holds then releases reset, for an image loaded beforehand.
    ///
    /// # Errors
    ///
    /// Fails only if waveform output fails.
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.hold_reset()?;
        self.release_reset();
        Ok(())
    }

    /// Asserts reset, loads `path` while reset is held, then releases.
    ///
    /// # Errors
    ///
    /// Image or waveform errors.
    pub fn reset_and_load(&mut self, path: &Path) -> Result<ImageSummary, SimError> {
        self.hold_reset()?;
        let summary = self.load(path)?;
        self.release_reset();
        Ok(summary)
    }

    /// Advances one half clock and samples the waveform.
    ///
    /// Returns the report of a rising edge evaluated out of reset.
    fn half_tick(&mut self) -> Result<Option<TickReport>, SimError> {
        self.clk = !self.clk;
        self.ticks += 1;

        let mut report = None;
        if self.clk {
            if self.in_reset {
                self.system.reset();
                self.last_report = None;
            } else {
                let tick = self.system.tick();
                self.stats.record(&tick);
                if let Some(logger) = &mut self.logger {
                    logger.observe(&tick)?;
                }
                self.last_report = Some(tick.clone());
                report = Some(tick);
            }
        }

        if let Some(wave) = &mut self.waveform {
            wave.sample(
                self.ticks,
                self.clk,
                self.in_reset,
                &self.system,
                self.last_report.as_ref(),
            )?;
        }
        Ok(report)
    }

    /// Advances one full clock: a rising then a falling edge.
    ///
    /// # Errors
    ///
    /// Commit-log or waveform output failures.
    pub fn step(&mut self) -> Result<Option<TickReport>, SimError> {
        let rising = self.half_tick()?;
        let _ = self.half_tick()?;
        Ok(rising)
    }

    /// Runs until the pass write to `tohost` or until the cycle budget is spent.
    ///
    /// # Errors
    ///
    /// Commit-log or waveform output failures.
    pub fn run(&mut self) -> Result<RunOutcome, SimError> {
        let watch = self.run.tohost;
        let pass = self.run.pass_value;
        for _ in 0..self.run.max_cycles {
            let Some(report) = self.step()? else {
                continue;
            };
            if let Some(addr) = watch
                && let Some(w) = tohost_write(&report, addr, pass)
            {
                let outcome = RunOutcome::ToHost {
                    address: addr,
                    value: w.write_data,
                    cycle: self.stats.cycles,
                    tick: self.ticks,
                };
                info!(address = w.address, value = w.write_data, tick = self.ticks, "tohost write");
                return Ok(outcome);
            }
        }
        info!(cycles = self.stats.cycles, tick = self.ticks, "cycle budget exhausted");
        Ok(RunOutcome::BudgetExhausted {
            cycles: self.stats.cycles,
            tick: self.ticks,
        })
    }

    /// Flushes the commit log, closes the waveform and returns the statistics.
    ///
    /// # Errors
    ///
    /// Output failures while flushing or closing.
    pub fn finish(mut self) -> Result<SimStats, SimError> {
        if let Some(logger) = &mut self.logger {
            logger.flush()?;
        }
        if let Some(wave) = self.waveform.take() {
            wave.finish(self.ticks)?;
        }
        Ok(self.stats)
    }

    /// The simulated system.
    pub const fn system(&self) -> &System {
        &self.system
    }

    /// The simulated system, for backdoor access.
    pub const fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    /// Statistics so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Run control in effect.
    pub const fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Summary of the last image loaded.
    pub const fn image(&self) -> Option<&ImageSummary> {
        self.image.as_ref()
    }

    /// Half-clock edges so far.
    #[inline]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns `true` while reset is asserted.
    #[inline]
    pub const fn in_reset(&self) -> bool {
        self.in_reset
    }
}
