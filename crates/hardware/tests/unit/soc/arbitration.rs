//! Fixed-priority arbitration tests.
//!
//! Verifies the grant order (data before instruction, lower core first), that losers get
//! no acknowledge, and that read data is routed to the winner one cycle later.

use pretty_assertions::assert_eq;
use rstest::rstest;

use rvsmp_core::common::data::{MemoryRequest, RequesterId};
use rvsmp_core::soc::interconnect::{MemoryArbiter, ReadResponse, select};
use rvsmp_core::soc::memory::SharedMemory;

fn mem() -> SharedMemory {
    SharedMemory::new(2048).unwrap()
}

#[test]
fn all_four_requesters_grant_only_core0_data() {
    let mut mem = mem();
    let mut arb = MemoryArbiter::new();
    let requests = [
        MemoryRequest::read(RequesterId::instruction(1), 0x30),
        MemoryRequest::read(RequesterId::instruction(0), 0x20),
        MemoryRequest::read(RequesterId::data(1), 0x10),
        MemoryRequest::read(RequesterId::data(0), 0x00),
    ];

    let cycle = arb.cycle(&requests, &mut mem);

    assert_eq!(cycle.grant.map(|g| g.requester), Some(RequesterId::data(0)));
    assert!(cycle.acked(RequesterId::data(0)));
    for loser in [
        RequesterId::data(1),
        RequesterId::instruction(0),
        RequesterId::instruction(1),
    ] {
        assert!(!cycle.acked(loser), "{loser} must not be acknowledged");
    }
    assert_eq!(cycle.denied, 3);
}

#[rstest]
#[case(&[RequesterId::instruction(0), RequesterId::data(3)], RequesterId::data(3))]
#[case(&[RequesterId::instruction(2), RequesterId::instruction(1)], RequesterId::instruction(1))]
#[case(&[RequesterId::data(2), RequesterId::data(1), RequesterId::instruction(0)], RequesterId::data(1))]
#[case(&[RequesterId::instruction(5)], RequesterId::instruction(5))]
fn select_is_fixed_priority(#[case] asserted: &[RequesterId], #[case] winner: RequesterId) {
    let requests = asserted
        .iter()
        .map(|&r| MemoryRequest::read(r, 0))
        .collect::<Vec<_>>();
    assert_eq!(select(&requests).map(|r| r.requester), Some(winner));
}

#[test]
fn read_data_arrives_the_following_cycle() {
    let mut mem = mem();
    mem.poke(0x40, 0xCAFE_F00D);
    let mut arb = MemoryArbiter::new();

    let first = arb.cycle(&[MemoryRequest::read(RequesterId::data(1), 0x40)], &mut mem);
    assert!(first.acked(RequesterId::data(1)));
    assert_eq!(first.response, None);

    let second = arb.cycle(&[], &mut mem);
    assert_eq!(
        second.response,
        Some(ReadResponse {
            requester: RequesterId::data(1),
            data: 0xCAFE_F00D,
        })
    );
    assert_eq!(second.read_data_for(RequesterId::data(1)), Some(0xCAFE_F00D));
    assert_eq!(second.read_data_for(RequesterId::data(0)), None);

    // Nothing was granted in the second cycle, so nothing is routed in the third.
    let third = arb.cycle(&[], &mut mem);
    assert_eq!(third.response, None);
}

#[test]
fn write_is_performed_in_the_grant_cycle_and_routes_nothing() {
    let mut mem = mem();
    let mut arb = MemoryArbiter::new();

    let cycle = arb.cycle(
        &[MemoryRequest::write(RequesterId::data(0), 0x8, 0x1234_5678, 0xF)],
        &mut mem,
    );
    assert!(cycle.granted_write().is_some());
    assert_eq!(mem.peek(0x8), 0x1234_5678);

    let next = arb.cycle(&[], &mut mem);
    assert_eq!(next.response, None);
}

#[test]
fn losers_are_not_queued() {
    let mut mem = mem();
    let mut arb = MemoryArbiter::new();
    let _ = arb.cycle(
        &[
            MemoryRequest::write(RequesterId::data(0), 0x0, 1, 0xF),
            MemoryRequest::write(RequesterId::data(1), 0x0, 2, 0xF),
        ],
        &mut mem,
    );
    // core1 did not re-assert, so its write never happens.
    let idle = arb.cycle(&[], &mut mem);
    assert_eq!(idle.grant, None);
    assert_eq!(mem.peek(0x0), 1);
}

#[test]
fn grant_trace_records_every_grant_in_order() {
    let mut mem = mem();
    let mut arb = MemoryArbiter::new();
    arb.set_trace(true);

    let _ = arb.cycle(&[MemoryRequest::read(RequesterId::instruction(0), 0)], &mut mem);
    let _ = arb.cycle(&[], &mut mem);
    let _ = arb.cycle(&[MemoryRequest::write(RequesterId::data(1), 4, 9, 0xF)], &mut mem);

    let trace = arb.grant_trace();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[0].cycle, 0);
    assert_eq!(trace[0].request.requester, RequesterId::instruction(0));
    assert_eq!(trace[1].cycle, 2);
    assert!(trace[1].request.is_write);
}

#[test]
fn reset_drops_the_outstanding_read() {
    let mut mem = mem();
    let mut arb = MemoryArbiter::new();
    let _ = arb.cycle(&[MemoryRequest::read(RequesterId::data(0), 0)], &mut mem);
    arb.reset();
    assert_eq!(arb.last_grant(), None);
    assert_eq!(arb.cycle(&[], &mut mem).response, None);
}
