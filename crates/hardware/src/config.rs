//! Configuration system for the shared-memory simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline values (core count, memory size, cycle budget, reset length).
//! 2. **Structures:** Hierarchical config for the system, the run, and trace output.
//! 3. **Ordering Models:** The four supported memory-ordering configurations and the
//!    load/store unit policy each one selects.
//!
//! Configuration is read from JSON (`Config::from_json`, `Config::from_file`) or built with
//! `Config::default()`; the CLI overrides individual fields from its flags.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::common::constants::WORDS_PER_KB;
use crate::common::error::{ConfigError, SimError};

/// Default configuration constants for the simulator.
mod defaults {
    /// Number of cores sharing the memory.
    pub const CORES: usize = 1;

    /// Shared memory size in kilobytes (2048 words).
    pub const MEM_KB: u32 = 8;

    /// Program counter every hart starts from after reset.
    pub const RESET_PC: u32 = 0;

    /// Cycle budget for a run.
    pub const MAX_CYCLES: u64 = 100_000;

    /// Cycles reset is held asserted before release.
    pub const RESET_CYCLES: u64 = 5;

    /// Value whose write to the watched address ends a run.
    pub const PASS_VALUE: u32 = 1;
}

/// Store-buffer policy knobs for a buffered load/store unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPolicy {
    /// Loads may go to memory while an older store is still buffered.
    pub allow_bypass: bool,
    /// With bypass enabled, a load to the buffered store's word waits for the drain.
    pub conflict_stall: bool,
    /// A fence waits for the buffer to drain; when clear the fence is a no-op.
    pub drain_on_fence: bool,
}

/// Load/store unit configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsuConfig {
    /// Every access goes straight to memory; stores complete on acknowledge.
    NoBuffer,
    /// Stores retire into a one-entry buffer that drains in the background.
    Buffered(BufferPolicy),
}

/// The four supported memory-ordering configurations.
///
/// Only these four are conformant; other combinations of [`BufferPolicy`] flags are not
/// reachable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingModel {
    /// No store buffer: per-core program order, global order by arbitration.
    #[default]
    NoBuffer,
    /// Store buffer without bypass: loads wait for the buffer to empty.
    BufferedStrict,
    /// Store buffer with bypass; loads to the buffered word wait for the drain.
    BufferedBypass,
    /// As `BufferedBypass`, but fences do not drain the buffer.
    ///
    /// Deliberately non-conformant; used to provoke ordering violations in tests.
    BufferedFenceNop,
}

impl OrderingModel {
    /// All supported configurations, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::NoBuffer,
        Self::BufferedStrict,
        Self::BufferedBypass,
        Self::BufferedFenceNop,
    ];

    /// Configuration name as accepted on the command line and in JSON.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoBuffer => "no-buffer",
            Self::BufferedStrict => "buffered-strict",
            Self::BufferedBypass => "buffered-bypass",
            Self::BufferedFenceNop => "buffered-fence-nop",
        }
    }

    /// Load/store unit configuration selected by this ordering model.
    pub const fn lsu_config(self) -> LsuConfig {
        match self {
            Self::NoBuffer => LsuConfig::NoBuffer,
            Self::BufferedStrict => LsuConfig::Buffered(BufferPolicy {
                allow_bypass: false,
                conflict_stall: true,
                drain_on_fence: true,
            }),
            Self::BufferedBypass => LsuConfig::Buffered(BufferPolicy {
                allow_bypass: true,
                conflict_stall: true,
                drain_on_fence: true,
            }),
            Self::BufferedFenceNop => LsuConfig::Buffered(BufferPolicy {
                allow_bypass: true,
                conflict_stall: true,
                drain_on_fence: false,
            }),
        }
    }
}

impl fmt::Display for OrderingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OrderingModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownOrdering(s.to_string()))
    }
}

/// Which commit-event categories the logger emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct LogCategories {
    /// Register write-back events.
    pub reg: bool,
    /// Memory write events.
    pub mem: bool,
    /// Trap, exception, and interrupt pulses.
    pub trap: bool,
}

impl LogCategories {
    /// Every category enabled.
    pub const ALL: Self = Self {
        reg: true,
        mem: true,
        trap: true,
    };

    /// Returns `true` if at least one category is enabled.
    pub const fn any(self) -> bool {
        self.reg || self.mem || self.trap
    }
}

impl FromStr for LogCategories {
    type Err = ConfigError;

    /// Parses a comma list drawn from `all`, `reg`, `mem`, `trap`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cats = Self::default();
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            match item {
                "all" => cats = Self::ALL,
                "reg" => cats.reg = true,
                "mem" => cats.mem = true,
                "trap" => cats.trap = true,
                other => return Err(ConfigError::UnknownLogCategory(other.to_string())),
            }
        }
        Ok(cats)
    }
}

impl TryFrom<String> for LogCategories {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use rvsmp_core::config::{Config, OrderingModel};
///
/// let config = Config::default();
/// assert_eq!(config.system.cores, 1);
/// assert_eq!(config.system.mem_kb, 8);
/// assert_eq!(config.system.ordering, OrderingModel::NoBuffer);
/// ```
///
/// ```
/// use rvsmp_core::config::{Config, OrderingModel};
///
/// let json = r#"{
///     "system": { "cores": 2, "ordering": "buffered-bypass", "mem_kb": 16 },
///     "run": { "max_cycles": 5000, "tohost": 4096 },
///     "trace": { "log": "reg,mem" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.system.ordering, OrderingModel::BufferedBypass);
/// assert_eq!(config.run.tohost, Some(0x1000));
/// assert!(config.trace.log.mem && !config.trace.log.trap);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Core count, ordering model and memory geometry.
    #[serde(default)]
    pub system: SystemConfig,
    /// Cycle budget, reset length and pass/fail watch.
    #[serde(default)]
    pub run: RunConfig,
    /// Commit log and waveform output.
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input (including an unknown ordering
    /// name) and any error reported by [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoCores`] for a zero core count and [`ConfigError::MemorySize`] when
    /// the memory would not hold a power-of-two number of words.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system.cores == 0 {
            return Err(ConfigError::NoCores);
        }
        let _ = self.system.memory_words()?;
        Ok(())
    }
}

/// System composition.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Number of cores (each with one instruction and one data port).
    #[serde(default = "SystemConfig::default_cores")]
    pub cores: usize,

    /// Memory-ordering configuration shared by every core's load/store unit.
    #[serde(default)]
    pub ordering: OrderingModel,

    /// Shared memory size in kilobytes; must be a power of two.
    #[serde(default = "SystemConfig::default_mem_kb")]
    pub mem_kb: u32,

    /// Program counter after reset.
    #[serde(default = "SystemConfig::default_reset_pc")]
    pub reset_pc: u32,
}

impl SystemConfig {
    fn default_cores() -> usize {
        defaults::CORES
    }

    fn default_mem_kb() -> u32 {
        defaults::MEM_KB
    }

    fn default_reset_pc() -> u32 {
        defaults::RESET_PC
    }

    /// Word count of the shared memory (`256 × mem_kb`).
    ///
    /// # Errors
    ///
    /// [`ConfigError::MemorySize`] unless the result is a non-zero power of two.
    pub fn memory_words(&self) -> Result<usize, ConfigError> {
        let words = WORDS_PER_KB * self.mem_kb as usize;
        if words.is_power_of_two() {
            Ok(words)
        } else {
            Err(ConfigError::MemorySize(self.mem_kb))
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            cores: defaults::CORES,
            ordering: OrderingModel::default(),
            mem_kb: defaults::MEM_KB,
            reset_pc: defaults::RESET_PC,
        }
    }
}

/// Run control.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Maximum number of full clock cycles to simulate.
    #[serde(default = "RunConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Cycles reset is held before release.
    #[serde(default = "RunConfig::default_reset_cycles")]
    pub reset_cycles: u64,

    /// Address watched for the pass/fail write; `None` disables the watch.
    #[serde(default)]
    pub tohost: Option<u32>,

    /// Value that must be written to `tohost` to end the run.
    #[serde(default = "RunConfig::default_pass_value")]
    pub pass_value: u32,
}

impl RunConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    fn default_reset_cycles() -> u64 {
        defaults::RESET_CYCLES
    }

    fn default_pass_value() -> u32 {
        defaults::PASS_VALUE
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            reset_cycles: defaults::RESET_CYCLES,
            tohost: None,
            pass_value: defaults::PASS_VALUE,
        }
    }
}

/// Diagnostic output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceConfig {
    /// Commit-event categories to log.
    #[serde(default)]
    pub log: LogCategories,

    /// Commit log destination; stdout when `None`.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// VCD waveform destination; no waveform when `None`.
    #[serde(default)]
    pub vcd: Option<PathBuf>,
}

/// Parses an unsigned number written in decimal or with a `0x`/`0o`/`0b` prefix.
///
/// # Errors
///
/// [`ConfigError::InvalidNumber`] if `s` is not a valid number in range.
pub fn parse_u32(s: &str) -> Result<u32, ConfigError> {
    let t = s.trim();
    let (digits, radix) = if let Some(h) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (h, 16)
    } else if let Some(o) = t.strip_prefix("0o") {
        (o, 8)
    } else if let Some(b) = t.strip_prefix("0b") {
        (b, 2)
    } else {
        (t, 10)
    };
    u32::from_str_radix(&digits.replace('_', ""), radix)
        .map_err(|_| ConfigError::InvalidNumber(s.to_string()))
}
