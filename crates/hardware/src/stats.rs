//! Simulation statistics collection and reporting.
//!
//! This module tracks what happened on the shared-memory path during a run. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived CPI.
//! 2. **Arbitration:** Grants per requester and denied requests.
//! 3. **Store buffer:** Absorbed stores, drains, and loads that bypassed a buffered store.
//! 4. **Stalls:** LSU stall cycles by reason.

use std::time::Instant;

use crate::common::data::Port;
use crate::core::units::lsu::StallReason;
use crate::soc::TickReport;

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"arbiter"`, `"lsu"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "arbiter", "lsu"];

/// Grant counts for one core's two ports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortGrants {
    /// Data-port grants (loads, stores and drains).
    pub data: u64,
    /// Instruction-port grants.
    pub fetch: u64,
}

/// LSU stall cycles by reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StallCounts {
    /// Waiting for acknowledge or load data.
    pub memory: u64,
    /// Store behind a buffered store.
    pub buffer_full: u64,
    /// Load behind a buffered store with bypass disabled.
    pub ordering: u64,
    /// Load to the buffered store's word.
    pub conflict: u64,
    /// Fence waiting for the buffer to drain.
    pub fence: u64,
}

impl StallCounts {
    /// Adds one cycle for `reason`.
    pub const fn add(&mut self, reason: StallReason) {
        match reason {
            StallReason::Memory => self.memory += 1,
            StallReason::BufferFull => self.buffer_full += 1,
            StallReason::Ordering => self.ordering += 1,
            StallReason::Conflict => self.conflict += 1,
            StallReason::Fence => self.fence += 1,
        }
    }

    /// Sum over all reasons.
    pub const fn total(&self) -> u64 {
        self.memory + self.buffer_full + self.ordering + self.conflict + self.fence
    }
}

/// Simulation statistics structure tracking all shared-memory path metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Rising edges evaluated after reset release.
    pub cycles: u64,
    /// Number of instructions retired, over all cores.
    pub instructions_retired: u64,
    /// Number of traps taken, over all cores.
    pub traps_taken: u64,

    /// Grants per core, indexed by core.
    pub grants: Vec<PortGrants>,
    /// Asserted requests that lost arbitration.
    pub denied: u64,
    /// Cycles with no request asserted.
    pub idle_cycles: u64,

    /// Stores absorbed into a store buffer.
    pub sb_absorbs: u64,
    /// Buffered stores written to memory.
    pub sb_drains: u64,
    /// Loads sent to memory ahead of an older buffered store.
    pub bypass_loads: u64,

    /// LSU stall cycles by reason, over all cores.
    pub stalls: StallCounts,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            traps_taken: 0,
            grants: Vec::new(),
            denied: 0,
            idle_cycles: 0,
            sb_absorbs: 0,
            sb_drains: 0,
            bypass_loads: 0,
            stalls: StallCounts::default(),
        }
    }
}

impl SimStats {
    /// Accumulates one rising edge.
    pub fn record(&mut self, tick: &TickReport) {
        self.cycles += 1;
        if self.grants.len() < tick.cores.len() {
            self.grants.resize(tick.cores.len(), PortGrants::default());
        }

        match tick.arbiter.grant {
            Some(grant) => {
                if let Some(slot) = self.grants.get_mut(grant.requester.core) {
                    match grant.requester.port {
                        Port::Data => slot.data += 1,
                        Port::Instruction => slot.fetch += 1,
                    }
                }
            }
            None => self.idle_cycles += 1,
        }
        self.denied += tick.arbiter.denied as u64;

        for core in &tick.cores {
            self.instructions_retired += u64::from(core.activity.retired);
            self.traps_taken += u64::from(core.activity.trap.is_some());
            self.sb_absorbs += u64::from(core.lsu.absorbed);
            self.sb_drains += u64::from(core.lsu.drained);
            self.bypass_loads += u64::from(core.lsu.bypassed);
            if let Some(reason) = core.lsu.stall {
                self.stalls.add(reason);
            }
        }
    }

    /// Total grants over all requesters.
    pub fn total_grants(&self) -> u64 {
        self.grants.iter().map(|g| g.data + g.fetch).sum()
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"arbiter"` or `"lsu"`.
    /// Pass an empty slice to print all sections (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let pct = |n: u64| (n as f64 / cyc) * 100.0;

        if want("summary") {
            let instr = self.instructions_retired.max(1) as f64;
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("SHARED-MEMORY SYSTEM SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", self.instructions_retired as f64 / cyc);
            println!("sim_cpi                  {:.4}", cyc / instr);
            println!("sim_traps                {}", self.traps_taken);
            println!("----------------------------------------------------------");
        }
        if want("arbiter") {
            println!("ARBITER");
            for (core, g) in self.grants.iter().enumerate() {
                println!(
                    "  core{core}.grants.data     {} ({:.2}%)",
                    g.data,
                    pct(g.data)
                );
                println!(
                    "  core{core}.grants.fetch    {} ({:.2}%)",
                    g.fetch,
                    pct(g.fetch)
                );
            }
            println!("  denied                 {}", self.denied);
            println!(
                "  idle                   {} ({:.2}%)",
                self.idle_cycles,
                pct(self.idle_cycles)
            );
            println!("----------------------------------------------------------");
        }
        if want("lsu") {
            println!("LOAD/STORE UNITS");
            println!("  sb.absorbs             {}", self.sb_absorbs);
            println!("  sb.drains              {}", self.sb_drains);
            println!("  loads.bypassed         {}", self.bypass_loads);
            let s = &self.stalls;
            for (name, n) in [
                ("stalls.memory", s.memory),
                ("stalls.buffer_full", s.buffer_full),
                ("stalls.ordering", s.ordering),
                ("stalls.conflict", s.conflict),
                ("stalls.fence", s.fence),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n));
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
