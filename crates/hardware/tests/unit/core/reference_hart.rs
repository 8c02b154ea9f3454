//! Reference hart tests: small RV32I programs run on the full system.

use pretty_assertions::assert_eq;
use rstest::rstest;

use rvsmp_core::config::OrderingModel;
use rvsmp_core::isa::privileged::csr::{MCAUSE, MHARTID, MTVEC};

use crate::common::builder::instruction::{InstructionBuilder as I, ecall, halt};
use crate::common::harness::TestContext;

/// `lui x6, 1; addi x5, x0, 1; sw x5, 0(x6)`: write the pass value to 0x1000.
fn pass() -> [u32; 3] {
    [
        I::new().lui(6, 1).build(),
        I::new().addi(5, 0, 1).build(),
        I::new().sw(5, 6, 0).build(),
    ]
}

#[rstest]
fn straight_line_store_and_reload(
    #[values(
        OrderingModel::NoBuffer,
        OrderingModel::BufferedStrict,
        OrderingModel::BufferedBypass,
        OrderingModel::BufferedFenceNop
    )]
    ordering: OrderingModel,
) {
    let mut program = vec![
        I::new().addi(1, 0, 5).build(),
        I::new().addi(2, 0, 7).build(),
        I::new().add(3, 1, 2).build(),
        I::new().sw(3, 0, 0x200).build(),
        I::new().lw(4, 0, 0x200).build(),
        // Skip the pass write if the reload disagrees.
        I::new().bne(4, 3, 16).build(),
    ];
    program.extend(pass());
    program.push(halt());

    let mut ctx = TestContext::with_program(ordering, 1, &program);
    let outcome = ctx.run();
    assert!(outcome.passed(), "{outcome:?}");
    assert_eq!(ctx.peek(0x200), 12);
}

#[test]
fn counted_loop_sums_to_55() {
    let mut program = vec![
        I::new().addi(1, 0, 10).build(),
        I::new().addi(2, 0, 0).build(),
        I::new().add(2, 2, 1).build(),
        I::new().addi(1, 1, -1).build(),
        I::new().bne(1, 0, -8).build(),
        I::new().sw(2, 0, 0x204).build(),
    ];
    program.extend(pass());
    program.push(halt());

    let mut ctx = TestContext::with_program(OrderingModel::NoBuffer, 1, &program);
    assert!(ctx.run().passed());
    assert_eq!(ctx.peek(0x204), 55);
}

#[test]
fn byte_stores_merge_into_one_word() {
    let mut program = vec![
        I::new().addi(1, 0, 0x11).build(),
        I::new().addi(2, 0, 0x22).build(),
        I::new().sb(1, 0, 0x300).build(),
        I::new().sb(2, 0, 0x302).build(),
        I::new().lbu(3, 0, 0x302).build(),
        I::new().sw(3, 0, 0x304).build(),
    ];
    program.extend(pass());
    program.push(halt());

    let mut ctx = TestContext::with_program(OrderingModel::BufferedBypass, 1, &program);
    assert!(ctx.run().passed());
    assert_eq!(ctx.peek(0x300), 0x0022_0011);
    assert_eq!(ctx.peek(0x304), 0x22);
}

#[test]
fn ecall_traps_to_mtvec_with_cause_11() {
    const HANDLER: u32 = 0x40;
    let mut program = vec![
        I::new().addi(1, 0, HANDLER as i32).build(),
        I::new().csrrw(9, MTVEC, 1).build(),
        ecall(),
        halt(),
    ];
    program.resize((HANDLER / 4) as usize, 0);
    program.extend([
        I::new().csrrs(2, MCAUSE, 0).build(),
        I::new().sw(2, 0, 0x208).build(),
    ]);
    program.extend(pass());
    program.push(halt());

    let mut ctx = TestContext::with_program(OrderingModel::NoBuffer, 1, &program);
    assert!(ctx.run().passed());
    assert_eq!(ctx.peek(0x208), 11);
}

#[rstest]
fn two_harts_identify_themselves(
    #[values(
        OrderingModel::NoBuffer,
        OrderingModel::BufferedStrict,
        OrderingModel::BufferedBypass,
        OrderingModel::BufferedFenceNop
    )]
    ordering: OrderingModel,
) {
    let mut program = vec![
        I::new().csrrs(1, MHARTID, 0).build(),
        I::new().add(2, 1, 1).build(),
        I::new().add(2, 2, 2).build(),
        I::new().addi(3, 1, 100).build(),
        I::new().sw(3, 2, 0x300).build(),
        // Hart 1 parks; hart 0 waits for hart 1's word, then passes.
        I::new().bne(1, 0, 24).build(),
        I::new().lw(7, 0, 0x304).build(),
        I::new().beq(7, 0, -4).build(),
    ];
    program.extend(pass());
    program.push(halt());

    let mut ctx = TestContext::with_program(ordering, 2, &program);
    assert!(ctx.run().passed());
    assert_eq!(ctx.peek(0x300), 100);
    assert_eq!(ctx.peek(0x304), 101);
}
