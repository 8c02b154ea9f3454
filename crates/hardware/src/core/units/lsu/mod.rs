//! Load/Store Unit (LSU).
//!
//! One LSU sits between each core's decode side and its data port. Every cycle it turns the
//! current [`DecodedMemOp`] into at most one [`MemoryRequest`], applies the configured
//! ordering model, and reports whether the operation may retire. It includes:
//! - [`store_buffer`]: the one-entry store buffer as a tagged state.
//! - [`lane`]: sub-word alignment and extension of load data.
//!
//! The unit is evaluated in two phases per cycle so that the request can be arbitrated
//! before the unit learns whether it was acknowledged:
//! 1. [`LoadStoreUnit::request`] is a pure function of the unit's state and the operation.
//! 2. [`LoadStoreUnit::clock`] re-derives the same plan, applies the acknowledge and routed
//!    read data, and advances the state.

/// Sub-word load alignment.
pub mod lane;

/// One-entry store buffer.
pub mod store_buffer;

use tracing::warn;

use self::lane::align_load;
use self::store_buffer::{StoreBuffer, StoreBufferEntry};
use crate::common::constants::REG_ZERO;
use crate::common::data::{AccessSize, DecodedMemOp, MemOpKind, MemoryRequest, RequesterId};
use crate::config::{BufferPolicy, LsuConfig};

/// Why the unit did not report ready this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StallReason {
    /// Waiting for the arbiter to acknowledge, or for load data to return.
    Memory,
    /// A store arrived while the buffer still holds an older store.
    BufferFull,
    /// A load waits for the buffer to empty because bypass is disabled.
    Ordering,
    /// A bypassing load targets the buffered store's word.
    Conflict,
    /// A fence waits for the buffer to drain.
    Fence,
}

/// Outputs of one LSU cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LsuOutput {
    /// The operation presented this cycle has completed; upstream may advance.
    pub ready: bool,
    /// Aligned and extended load value (valid when `write_back` is set).
    pub load_data: u32,
    /// Register write-back enable for a completing load with a non-zero destination.
    pub write_back: bool,
    /// Destination register of the completing load.
    pub rd: u8,
    /// Reason the operation is still pending, when one was presented and not ready.
    pub stall: Option<StallReason>,
    /// A store was absorbed into the buffer this cycle.
    pub absorbed: bool,
    /// The buffered store was written to memory this cycle.
    pub drained: bool,
    /// A load was sent to memory ahead of an older buffered store this cycle.
    pub bypassed: bool,
}

/// A load whose request was acknowledged; its word arrives on the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingLoad {
    address: u32,
    size: AccessSize,
    unsigned: bool,
    rd: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Issue {
    Load,
    Store,
    Drain,
}

/// What the unit does in a cycle, before the acknowledge is known.
#[derive(Clone, Copy, Debug, Default)]
struct Plan {
    issue: Option<(Issue, MemoryRequest)>,
    absorb: bool,
    ready: bool,
    bypass: bool,
    stall: Option<StallReason>,
}

impl Plan {
    const fn issue(kind: Issue, req: MemoryRequest, stall: StallReason) -> Self {
        Self {
            issue: Some((kind, req)),
            absorb: false,
            ready: false,
            bypass: false,
            stall: Some(stall),
        }
    }

    /// Background drain (if any) while the operation waits for `stall`.
    const fn drain_and_wait(drain: Option<(Issue, MemoryRequest)>, stall: StallReason) -> Self {
        Self {
            issue: drain,
            absorb: false,
            ready: false,
            bypass: false,
            stall: Some(stall),
        }
    }

    /// Background drain (if any) while the operation completes without memory.
    const fn drain_and_ready(drain: Option<(Issue, MemoryRequest)>) -> Self {
        Self {
            issue: drain,
            absorb: false,
            ready: true,
            bypass: false,
            stall: None,
        }
    }
}

/// Per-core load/store unit with an optional one-entry store buffer.
#[derive(Debug, Clone)]
pub struct LoadStoreUnit {
    core: usize,
    config: LsuConfig,
    buffer: StoreBuffer,
    pending_load: Option<PendingLoad>,
}

impl LoadStoreUnit {
    /// Creates the unit for `core` with a fixed configuration.
    pub const fn new(core: usize, config: LsuConfig) -> Self {
        Self {
            core,
            config,
            buffer: StoreBuffer::Empty,
            pending_load: None,
        }
    }

    /// Configuration chosen at construction.
    #[inline]
    pub const fn config(&self) -> LsuConfig {
        self.config
    }

    /// Current store-buffer state.
    #[inline]
    pub const fn store_buffer(&self) -> &StoreBuffer {
        &self.buffer
    }

    /// Returns `true` if no store is buffered and no load is waiting for data.
    #[inline]
    pub const fn is_quiescent(&self) -> bool {
        self.buffer.is_empty() && self.pending_load.is_none()
    }

    /// Drops any buffered store and pending load.
    pub fn reset(&mut self) {
        self.buffer = StoreBuffer::Empty;
        self.pending_load = None;
    }

    /// Request the unit asserts this cycle for `op`, if any.
    ///
    /// Pure: calling it does not change the unit.
    pub fn request(&self, op: Option<&DecodedMemOp>) -> Option<MemoryRequest> {
        self.plan(op).issue.map(|(_, req)| req)
    }

    /// Advances the unit by one cycle.
    ///
    /// # Arguments
    ///
    /// * `op` - The same operation that was passed to [`LoadStoreUnit::request`] this cycle.
    /// * `ack` - The arbiter granted this unit's request this cycle.
    /// * `read_data` - Word routed to this unit's port this cycle (the answer to a read
    ///   acknowledged in the previous cycle).
    ///
    /// # Returns
    ///
    /// Ready, load data and write-back enable, plus the stall reason and buffer events.
    pub fn clock(&mut self, op: Option<&DecodedMemOp>, ack: bool, read_data: Option<u32>) -> LsuOutput {
        let plan = self.plan(op);
        let mut out = LsuOutput::default();

        if let Some(load) = self.pending_load.take() {
            let word = read_data.unwrap_or_else(|| {
                warn!(core = self.core, "load response missing; returning zero");
                0
            });
            out.ready = true;
            out.load_data = align_load(word, load.address, load.size, load.unsigned);
            out.rd = load.rd;
            out.write_back = load.rd != REG_ZERO;
        }

        match plan.issue {
            Some((Issue::Drain, _)) => {
                self.buffer = self.buffer.after_drain(ack);
                out.drained = ack;
            }
            Some((Issue::Load, _)) if ack => {
                if let Some(&DecodedMemOp {
                    kind: MemOpKind::Load { unsigned, rd },
                    address,
                    size,
                    ..
                }) = op
                {
                    self.pending_load = Some(PendingLoad {
                        address,
                        size,
                        unsigned,
                        rd,
                    });
                }
                out.bypassed = plan.bypass;
            }
            Some((Issue::Store, _)) if ack => out.ready = true,
            _ => {}
        }

        if plan.absorb
            && let Some(op) = op
        {
            self.buffer = StoreBuffer::Occupied(StoreBufferEntry::from_op(op));
            out.absorbed = true;
        }
        out.ready |= plan.ready;
        if op.is_some() && !out.ready {
            out.stall = plan.stall;
        }
        out
    }

    fn plan(&self, op: Option<&DecodedMemOp>) -> Plan {
        let me = RequesterId::data(self.core);
        let drain = self
            .buffer
            .entry()
            .map(|e| (Issue::Drain, e.drain_request(me)));

        // The word for an acknowledged load arrives this cycle; the port is free.
        if self.pending_load.is_some() {
            return Plan::drain_and_ready(drain);
        }
        let Some(op) = op else {
            return Plan {
                issue: drain,
                ..Plan::default()
            };
        };

        match self.config {
            LsuConfig::NoBuffer => match op.kind {
                MemOpKind::Load { .. } => Plan::issue(
                    Issue::Load,
                    MemoryRequest::read(me, op.address),
                    StallReason::Memory,
                ),
                MemOpKind::Store => Plan::issue(
                    Issue::Store,
                    MemoryRequest::write(me, op.address, op.store_data, op.byte_mask),
                    StallReason::Memory,
                ),
                MemOpKind::Fence => Plan::drain_and_ready(None),
            },
            LsuConfig::Buffered(policy) => self.plan_buffered(op, policy, drain),
        }
    }

    fn plan_buffered(
        &self,
        op: &DecodedMemOp,
        policy: BufferPolicy,
        drain: Option<(Issue, MemoryRequest)>,
    ) -> Plan {
        match op.kind {
            MemOpKind::Store => {
                if self.buffer.is_empty() {
                    Plan {
                        absorb: true,
                        ready: true,
                        ..Plan::default()
                    }
                } else {
                    Plan::drain_and_wait(drain, StallReason::BufferFull)
                }
            }
            MemOpKind::Fence => {
                if policy.drain_on_fence && !self.buffer.is_empty() {
                    Plan::drain_and_wait(drain, StallReason::Fence)
                } else {
                    Plan::drain_and_ready(drain)
                }
            }
            MemOpKind::Load { .. } => {
                let read = MemoryRequest::read(RequesterId::data(self.core), op.address);
                match self.buffer {
                    StoreBuffer::Empty => Plan::issue(Issue::Load, read, StallReason::Memory),
                    _ if !policy.allow_bypass => Plan::drain_and_wait(drain, StallReason::Ordering),
                    _ if policy.conflict_stall && self.buffer.holds_word(op.address) => {
                        Plan::drain_and_wait(drain, StallReason::Conflict)
                    }
                    // A drain that lost arbitration yields the port to the load and
                    // re-asserts once the load is acknowledged.
                    StoreBuffer::Occupied(_) | StoreBuffer::Draining(_) => Plan {
                        bypass: true,
                        ..Plan::issue(Issue::Load, read, StallReason::Memory)
                    },
                }
            }
        }
    }
}
