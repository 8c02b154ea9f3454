//! Shared-memory RV32 system simulator CLI.
//!
//! This binary runs one program image on the simulated system. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON file, then individual flags.
//! 2. **Run:** Reset, load the image, and clock until the tohost write or the cycle budget.
//! 3. **Report:** The tohost line, the final tick count and, on request, statistics.
//!
//! Exit codes: 0 when the run completes (pass write or budget exhausted), 1 for missing or
//! invalid arguments, 2 when the run itself fails.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use rvsmp_core::common::error::SimError;
use rvsmp_core::config::{Config, LogCategories, OrderingModel, parse_u32};
use rvsmp_core::sim::{RunOutcome, Simulator};
use rvsmp_core::soc::System;

#[derive(Parser, Debug)]
#[command(
    name = "rvsmp",
    author,
    version,
    about = "Cycle-level simulator of a shared-memory multi-core RV32 system",
    long_about = "Load an ELF32 image into shared memory, reset the system, and run it until the \
                  watched tohost address receives the pass value or the cycle budget runs out.\n\n\
                  Examples:\n  rvsmp test.elf --tohost 0x1000 --log all\n  \
                  rvsmp litmus.elf --cores 2 --ordering buffered-bypass --vcd out.vcd"
)]
struct Cli {
    /// ELF32 little-endian program image.
    image: PathBuf,

    /// JSON configuration file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a VCD waveform to this path.
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Cycle budget.
    #[arg(long, value_parser = parse_u64)]
    max_cycles: Option<u64>,

    /// Shared memory size in KB (power of two).
    #[arg(long, value_parser = parse_u32)]
    mem_kb: Option<u32>,

    /// Address whose pass-value write ends the run.
    #[arg(long, value_parser = parse_u32)]
    tohost: Option<u32>,

    /// Value that ends the run when written to the tohost address.
    #[arg(long, value_parser = parse_u32)]
    pass_value: Option<u32>,

    /// Commit-log categories: comma-separated subset of all, reg, mem, trap.
    #[arg(long)]
    log: Option<LogCategories>,

    /// Write the commit log here instead of stdout.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Memory ordering: no-buffer, buffered-strict, buffered-bypass or buffered-fence-nop.
    #[arg(long)]
    ordering: Option<OrderingModel>,

    /// Number of cores.
    #[arg(long)]
    cores: Option<usize>,

    /// Print statistics at the end; optionally only the named sections (summary, arbiter, lsu).
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    stats: Option<Vec<String>>,
}

/// Cycle counts may exceed `u32` when written in decimal.
fn parse_u64(s: &str) -> Result<u64, String> {
    s.trim()
        .parse::<u64>()
        .or_else(|_| parse_u32(s).map(u64::from))
        .map_err(|e| e.to_string())
}

/// Why a run did not complete.
#[derive(Debug)]
enum Failure {
    /// Arguments or configuration rejected before the run.
    Config(SimError),
    /// The run itself failed.
    Run(SimError),
}

impl Failure {
    const fn status(&self) -> u8 {
        match self {
            Self::Config(_) => 1,
            Self::Run(_) => 2,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) | Self::Run(e) => write!(f, "{e}"),
        }
    }
}

/// Exit status for an argument-parsing outcome: help and version exit cleanly.
fn parse_status(e: &clap::Error) -> u8 {
    if e.use_stderr() { 1 } else { 0 }
}

/// Exit status for a finished invocation.
fn status(result: &Result<(), Failure>) -> u8 {
    result.as_ref().map_or_else(Failure::status, |_| 0)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_status(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let result = execute(&cli);
    if let Err(e) = &result {
        eprintln!("Error: {e}");
    }
    ExitCode::from(status(&result))
}

/// Builds the configuration, then runs the image.
fn execute(cli: &Cli) -> Result<(), Failure> {
    let config = build_config(cli).map_err(Failure::Config)?;
    run(&cli.image, &config, cli.stats.as_deref()).map_err(Failure::Run)
}

/// Layers the flags over the defaults or the configuration file.
fn build_config(cli: &Cli) -> Result<Config, SimError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(cores) = cli.cores {
        config.system.cores = cores;
    }
    if let Some(ordering) = cli.ordering {
        config.system.ordering = ordering;
    }
    if let Some(kb) = cli.mem_kb {
        config.system.mem_kb = kb;
    }
    if let Some(n) = cli.max_cycles {
        config.run.max_cycles = n;
    }
    if cli.tohost.is_some() {
        config.run.tohost = cli.tohost;
    }
    if let Some(v) = cli.pass_value {
        config.run.pass_value = v;
    }
    if let Some(log) = cli.log {
        config.trace.log = log;
    }
    if cli.log_file.is_some() {
        config.trace.log_file.clone_from(&cli.log_file);
    }
    if cli.vcd.is_some() {
        config.trace.vcd.clone_from(&cli.vcd);
    }

    config.validate()?;
    debug!(?config, "configuration");
    Ok(config)
}

/// Builds the system, runs `image` on it and reports the outcome.
fn run(image: &Path, config: &Config, stats: Option<&[String]>) -> Result<(), SimError> {
    let system = System::new(&config.system)?;
    let mut sim = Simulator::new(system, config.run.clone());

    if let Some(vcd) = &config.trace.vcd {
        sim.start_trace(vcd)?;
    }
    let _ = sim.reset_and_load(image)?;
    if config.trace.log.any() {
        sim.enable_logging(config.trace.log, config.trace.log_file.as_deref())?;
    }

    let outcome = sim.run()?;
    if let RunOutcome::ToHost { address, value, tick, .. } = outcome {
        println!("TOHOST write detected at {address:#x} value={value:#x} at tick {tick}");
    }
    println!("Done. Ticks: {}", outcome.tick());

    let sim_stats = sim.finish()?;
    if let Some(sections) = stats {
        sim_stats.print_sections(sections);
    }
    Ok(())
}
