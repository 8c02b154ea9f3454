//! Shared-memory arbiter.
//!
//! This module multiplexes every core's instruction and data ports onto the single
//! shared-memory port. It provides:
//! 1. **Selection:** A stateless fixed-priority choice over the requests asserted this cycle
//!    (data ports before instruction ports, lower core index first). There is no queueing and
//!    no fairness: a requester that loses simply re-asserts later.
//! 2. **Forwarding:** The winner's request is performed on [`SharedMemory`] and acknowledged
//!    in the same cycle.
//! 3. **Read Routing:** A read winner is remembered as `last_grant` for exactly one cycle so
//!    the word latched by memory can be steered back to it; writes clear `last_grant`.
//! 4. **Grant Trace:** Optional record of every grant, used to replay the global write order.

use tracing::trace;

use crate::common::data::{MemoryRequest, RequesterId};
use crate::soc::memory::SharedMemory;

/// Picks the winner among the requests asserted this cycle.
///
/// Pure function of its input: the winner is the request whose requester has the lowest
/// [`RequesterId::priority`]. Returns `None` when nothing is asserted.
pub fn select(requests: &[MemoryRequest]) -> Option<&MemoryRequest> {
    requests.iter().min_by_key(|r| r.requester.priority())
}

/// Steers the word latched by the previous cycle's read to the requester recorded in
/// `last_grant`.
pub const fn route(last_grant: Option<RequesterId>, read_data: u32) -> Option<ReadResponse> {
    match last_grant {
        Some(requester) => Some(ReadResponse {
            requester,
            data: read_data,
        }),
        None => None,
    }
}

/// Read data delivered to one requester, one cycle after its read was granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadResponse {
    /// Requester whose read produced this word.
    pub requester: RequesterId,
    /// The full aligned word.
    pub data: u32,
}

/// One entry of the grant trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrantRecord {
    /// Cycle number the grant happened in.
    pub cycle: u64,
    /// The granted request.
    pub request: MemoryRequest,
}

/// Outcome of one arbitrated cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArbiterCycle {
    /// Request granted this cycle; its requester receives the acknowledge pulse.
    pub grant: Option<MemoryRequest>,
    /// Word returned this cycle for the read granted in the previous cycle.
    pub response: Option<ReadResponse>,
    /// Number of asserted requests that were not granted.
    pub denied: usize,
}

impl ArbiterCycle {
    /// Returns `true` if `requester` receives the acknowledge pulse this cycle.
    #[inline]
    pub fn acked(&self, requester: RequesterId) -> bool {
        self.grant.is_some_and(|g| g.requester == requester)
    }

    /// Read data addressed to `requester` this cycle, if any.
    #[inline]
    pub fn read_data_for(&self, requester: RequesterId) -> Option<u32> {
        self.response
            .filter(|r| r.requester == requester)
            .map(|r| r.data)
    }

    /// Granted write, if the grant this cycle was a write.
    #[inline]
    pub fn granted_write(&self) -> Option<&MemoryRequest> {
        self.grant.as_ref().filter(|g| g.is_write)
    }
}

/// Fixed-priority arbiter in front of [`SharedMemory`].
///
/// The only state is the one-cycle `last_grant` used for read routing and the optional
/// grant trace; selection itself is [`select`].
#[derive(Debug, Default)]
pub struct MemoryArbiter {
    last_grant: Option<RequesterId>,
    cycle: u64,
    trace: Option<Vec<GrantRecord>>,
}

impl MemoryArbiter {
    /// Creates an arbiter with no outstanding read and tracing disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recording of every grant.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled.then(Vec::new);
    }

    /// Recorded grants, oldest first; empty when tracing is disabled.
    pub fn grant_trace(&self) -> &[GrantRecord] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// Requester whose read data will be routed on the next cycle.
    #[inline]
    pub const fn last_grant(&self) -> Option<RequesterId> {
        self.last_grant
    }

    /// Clears the outstanding read. The grant trace is kept.
    pub fn reset(&mut self) {
        self.last_grant = None;
    }

    /// Runs one cycle of arbitration against `memory`.
    ///
    /// Order of evaluation:
    /// 1. the word latched by last cycle's read is routed to `last_grant`;
    /// 2. the highest-priority asserted request is selected and performed on `memory`;
    /// 3. `last_grant` becomes the winner if it was a read, and `None` otherwise.
    ///
    /// # Arguments
    ///
    /// * `requests` - Every request asserted this cycle, in any order.
    /// * `memory` - The shared memory behind the port.
    ///
    /// # Returns
    ///
    /// The grant (if any), the routed read response (if any), and the denied count.
    pub fn cycle(&mut self, requests: &[MemoryRequest], memory: &mut SharedMemory) -> ArbiterCycle {
        let response = route(self.last_grant, memory.read_data());
        let grant = select(requests).copied();

        if let Some(req) = grant {
            memory.access(&req);
            trace!(
                cycle = self.cycle,
                winner = %req.requester,
                addr = req.address,
                write = req.is_write,
                "grant"
            );
            if let Some(log) = self.trace.as_mut() {
                log.push(GrantRecord {
                    cycle: self.cycle,
                    request: req,
                });
            }
        }
        self.last_grant = grant.filter(|g| !g.is_write).map(|g| g.requester);
        self.cycle += 1;

        ArbiterCycle {
            grant,
            response,
            denied: requests.len() - usize::from(grant.is_some()),
        }
    }
}
