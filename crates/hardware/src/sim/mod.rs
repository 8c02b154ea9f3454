//! Simulation driving and observation.
//!
//! Loads program images, drives the system clock, and records what happens: the commit
//! log for the external checker and an optional VCD waveform.

pub mod commit_log;
pub mod loader;
pub mod simulator;
pub mod waveform;

pub use commit_log::{CommitEvent, CommitLogger, PcTracker};
pub use loader::{ImageSummary, load_elf, load_elf_file};
pub use simulator::{RunOutcome, Simulator, tohost_write};
pub use waveform::WaveformWriter;
