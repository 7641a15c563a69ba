//! Error types for the consensus core.

use lachesis_types::{EventId, Frame, ProcId, Seq};

/// Errors raised by the consensus state machine.
///
/// Every variant is fatal for the run: the simulator is a deterministic
/// verifier and retries nothing.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// No validators were configured.
    #[error("validator set must not be empty")]
    NoValidators,

    /// All configured stakes are zero.
    #[error("total stake must be positive")]
    ZeroTotalStake,

    /// A processor id is outside `[0, n)`.
    #[error("processor {0} is out of range (have {1} processors)")]
    UnknownProcessor(ProcId, usize),

    /// An event has a sequence number outside its producer's chain.
    #[error("event {0} has an out-of-range sequence number")]
    BadSequence(EventId),

    /// A non-genesis event lacks its self-parent link.
    #[error("event {0} is missing its self-parent link")]
    MissingSelfParent(EventId),

    /// A listed parent processor has no event in the producer's view.
    #[error("parent processor {parent} has no event in the view of processor {producer}")]
    MissingParentEvent { producer: ProcId, parent: ProcId },

    /// Two local views selected different roots of the same producer for
    /// the same frame.
    #[error(
        "new root selection {new} of frame {frame} diverges from processor {other}; \
         they have already selected root {existing}"
    )]
    RootDivergence {
        frame: Frame,
        new: EventId,
        existing: EventId,
        other: ProcId,
    },

    /// A view elected an atropos that contradicts the global chain.
    #[error("consensus is inconsistent for processor {pid} and event {atropos}")]
    InconsistentAtropos { pid: ProcId, atropos: EventId },

    /// A receive-to-sequence request could not reach the target.
    #[error(
        "want event ({sender}, {want}) in processor {receiver}; \
         sequence number is set to {reached}"
    )]
    ReceiveShortfall {
        receiver: ProcId,
        sender: ProcId,
        want: Seq,
        reached: Seq,
    },

    /// Writing a DAG or vector dump failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
