//! Identifier types for processors, events and frames.

use std::fmt;

/// Processor (validator) identifier, dense in `[0, n)` where `n` is the
/// number of processors fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcId(pub u32);

impl ProcId {
    /// Index into per-processor vectors.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence number of an event within its producer's chain.
///
/// Sequence numbers are unique per producer only. The value [`NO_SEQ`]
/// (−1) denotes "no event yet from this processor".
pub type Seq = i64;

/// Sentinel sequence number for "no event".
pub const NO_SEQ: Seq = -1;

/// Frame index partitioning the DAG into layers; frame 0 holds the
/// genesis events.
pub type Frame = usize;

/// Stake weight of a processor.
pub type Stake = u64;

/// An event is identified by its producer and its position in the
/// producer's chain. Two events of different producers may share a
/// sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId {
    /// Producer of the event.
    pub proc: ProcId,
    /// Position in the producer's chain, starting at 0.
    pub seq: Seq,
}

impl EventId {
    /// Create an event identifier.
    pub fn new(proc: ProcId, seq: Seq) -> Self {
        Self { proc, seq }
    }

    /// The previous event of the same producer, if any.
    ///
    /// Genesis events (sequence 0) have no self-parent.
    pub fn self_parent(self) -> Option<EventId> {
        if self.seq > 0 {
            Some(EventId::new(self.proc, self.seq - 1))
        } else {
            None
        }
    }

    /// Whether this is the first event of its producer.
    pub fn is_genesis(self) -> bool {
        self.seq <= 0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.proc, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_parent_links() {
        let e = EventId::new(ProcId(2), 5);
        assert_eq!(e.self_parent(), Some(EventId::new(ProcId(2), 4)));
        assert!(EventId::new(ProcId(0), 0).self_parent().is_none());
        assert!(EventId::new(ProcId(0), 0).is_genesis());
        assert!(!e.is_genesis());
    }

    #[test]
    fn ordering_is_producer_then_sequence() {
        let a = EventId::new(ProcId(0), 7);
        let b = EventId::new(ProcId(1), 0);
        let c = EventId::new(ProcId(1), 3);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_format() {
        assert_eq!(EventId::new(ProcId(1), 4).to_string(), "(1, 4)");
    }
}
