//! Driver tests: reset sequencing, tohost detection and the cycle budget.

use std::io::Write;

use pretty_assertions::assert_eq;

use rvsmp_core::Simulator;
use rvsmp_core::common::error::SimError;
use rvsmp_core::config::{Config, OrderingModel, RunConfig};
use rvsmp_core::sim::RunOutcome;
use rvsmp_core::soc::System;

use crate::common::builder::elf::ElfBuilder;
use crate::common::builder::instruction::{InstructionBuilder as I, halt};
use crate::common::harness::{TOHOST, TestContext, system_config};

fn write_value(value: i32) -> Vec<u32> {
    vec![
        I::new().lui(6, 1).build(),
        I::new().addi(5, 0, value).build(),
        I::new().sw(5, 6, 0).build(),
        halt(),
    ]
}

#[test]
fn pass_write_ends_the_run() {
    let mut ctx = TestContext::with_program(OrderingModel::NoBuffer, 1, &write_value(1));
    let outcome = ctx.run();
    match outcome {
        RunOutcome::ToHost {
            address,
            value,
            cycle,
            tick,
        } => {
            assert_eq!(address, TOHOST);
            assert_eq!(value, 1);
            // Reset was held for two cycles before the run started.
            assert_eq!(tick, 4 + 2 * cycle);
        }
        other => panic!("expected tohost, got {other:?}"),
    }
    assert_eq!(ctx.peek(TOHOST), 1);
}

#[test]
fn other_values_do_not_end_the_run() {
    let system = System::new(&system_config(OrderingModel::NoBuffer, 1)).unwrap();
    let mut sim = Simulator::new(
        system,
        RunConfig {
            max_cycles: 300,
            reset_cycles: 5,
            tohost: Some(TOHOST),
            pass_value: 1,
        },
    );
    sim.hold_reset().unwrap();
    let _ = sim.load_bytes(&ElfBuilder::new().code(0, &write_value(2)).build()).unwrap();
    sim.release_reset();

    let outcome = sim.run().unwrap();
    assert_eq!(outcome, RunOutcome::BudgetExhausted { cycles: 300, tick: 10 + 600 });
    assert!(!outcome.passed());
    assert_eq!(sim.system().memory().peek(TOHOST), 2);
}

#[test]
fn without_a_watch_the_budget_always_runs_out() {
    let system = System::new(&system_config(OrderingModel::NoBuffer, 1)).unwrap();
    let mut sim = Simulator::new(
        system,
        RunConfig {
            max_cycles: 50,
            tohost: None,
            ..RunConfig::default()
        },
    );
    sim.hold_reset().unwrap();
    let _ = sim.load_bytes(&ElfBuilder::new().code(0, &write_value(1)).build()).unwrap();
    sim.release_reset();
    assert!(matches!(sim.run().unwrap(), RunOutcome::BudgetExhausted { cycles: 50, .. }));
    let stats = sim.finish().unwrap();
    assert_eq!(stats.cycles, 50);
}

#[test]
fn reset_is_held_then_released() {
    let system = System::new(&system_config(OrderingModel::NoBuffer, 1)).unwrap();
    let mut sim = Simulator::new(system, RunConfig::default());
    sim.hold_reset().unwrap();
    assert!(sim.in_reset());
    assert_eq!(sim.ticks(), 10);
    assert_eq!(sim.step().unwrap(), None);
    assert_eq!(sim.stats().cycles, 0);

    sim.release_reset();
    let report = sim.step().unwrap().unwrap();
    assert!(report.cores[0].fetch_request.is_some_and(|r| r.address == 0));
    assert_eq!(sim.stats().cycles, 1);
}

#[test]
fn from_config_runs_an_image_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&ElfBuilder::new().code(0, &write_value(1)).build())
        .unwrap();
    file.flush().unwrap();

    let config = Config::from_json(
        r#"{ "system": { "ordering": "buffered-strict" }, "run": { "tohost": 4096, "max_cycles": 1000 } }"#,
    )
    .unwrap();
    let mut sim = Simulator::from_config(&config).unwrap();
    let summary = sim.reset_and_load(file.path()).unwrap();
    assert_eq!(summary.segments, 1);
    assert!(sim.image().is_some());

    assert!(sim.run().unwrap().passed());
    let stats = sim.finish().unwrap();
    assert!(stats.instructions_retired >= 3);
}

#[test]
fn bad_images_surface_as_load_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"not an elf at all, but long enough to hold an ELF header....")
        .unwrap();
    file.flush().unwrap();

    let mut sim = Simulator::from_config(&Config::default()).unwrap();
    let err = sim.reset_and_load(file.path()).unwrap_err();
    assert!(matches!(err, SimError::Load(_)), "{err}");
}
