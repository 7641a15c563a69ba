//! Per-processor local view of the DAG and derived consensus state.

use std::collections::{BTreeSet, HashMap};

use lachesis_types::{EventId, Frame, ProcId, Seq, NO_SEQ};

/// The slice of global state as observed by one processor.
///
/// A view advances only through the ingress operations of its owner:
/// creating an event or receiving the next event of a peer. All other
/// fields are derived from the order in which events entered the view.
#[derive(Debug)]
pub struct LocalView {
    /// Highest known sequence per producer; `NO_SEQ` before the first
    /// event. The entry for the owner is the owner's own head.
    head_seq: Vec<Seq>,

    /// Frame assigned to each event observed in this view.
    frame_idx: HashMap<EventId, Frame>,

    /// Root events per frame, in ascending frame order.
    frame_roots: Vec<BTreeSet<EventId>>,

    /// Collected votes: frame → voting root → subject processor → vote.
    votes: HashMap<Frame, HashMap<EventId, HashMap<ProcId, bool>>>,

    /// Aggregated decisions: frame → subject processor → eligible.
    /// Processors absent from the map are still undecided.
    root_decision: HashMap<Frame, HashMap<ProcId, bool>>,

    /// Highest frame with an elected atropos, if any.
    last_decided: Option<Frame>,
}

impl LocalView {
    /// Create an empty view over `n` processors.
    pub fn new(n: usize) -> Self {
        Self {
            head_seq: vec![NO_SEQ; n],
            frame_idx: HashMap::new(),
            frame_roots: Vec::new(),
            votes: HashMap::new(),
            root_decision: HashMap::new(),
            last_decided: None,
        }
    }

    /// Highest known sequence of `producer` in this view.
    pub fn head_seq(&self, producer: ProcId) -> Seq {
        self.head_seq[producer.index()]
    }

    pub(crate) fn advance_head(&mut self, producer: ProcId) {
        self.head_seq[producer.index()] += 1;
    }

    /// Frame assigned to an event, if the view has observed it.
    pub fn frame_of(&self, event: EventId) -> Option<Frame> {
        self.frame_idx.get(&event).copied()
    }

    pub(crate) fn assign_frame(&mut self, event: EventId, frame: Frame) {
        self.frame_idx.insert(event, frame);
    }

    /// Root sets per frame, index 0 being the genesis frame.
    pub fn frame_roots(&self) -> &[BTreeSet<EventId>] {
        &self.frame_roots
    }

    /// Whether the event was recorded as a root of any frame.
    pub fn is_frame_root(&self, event: EventId) -> bool {
        self.frame_roots.iter().any(|roots| roots.contains(&event))
    }

    /// Append storage for `frame` if it is the next frame, then insert
    /// the root. Roots are only ever appended at the highest frame + 1.
    pub(crate) fn insert_root(&mut self, frame: Frame, event: EventId) {
        if frame >= self.frame_roots.len() {
            assert_eq!(
                frame,
                self.frame_roots.len(),
                "frame index calculation failed"
            );
            self.frame_roots.push(BTreeSet::new());
        }
        self.frame_roots[frame].insert(event);
    }

    /// The frame-`frame` root produced by `producer`, if recorded.
    pub fn root_of(&self, frame: Frame, producer: ProcId) -> Option<EventId> {
        self.frame_roots
            .get(frame)?
            .iter()
            .find(|root| root.proc == producer)
            .copied()
    }

    /// Highest decided frame, if any atropos was elected yet.
    pub fn last_decided_frame(&self) -> Option<Frame> {
        self.last_decided
    }

    /// The lowest frame without an elected atropos.
    pub fn next_undecided_frame(&self) -> Frame {
        self.last_decided.map_or(0, |f| f + 1)
    }

    pub(crate) fn mark_decided(&mut self, frame: Frame) {
        debug_assert!(self.last_decided.map_or(frame == 0, |f| frame == f + 1));
        self.last_decided = Some(frame);
        self.votes.remove(&frame);
        self.root_decision.remove(&frame);
    }

    /// A previously recorded vote, absent votes defaulting to "no".
    pub(crate) fn vote(&self, frame: Frame, root: EventId, subject: ProcId) -> bool {
        self.votes
            .get(&frame)
            .and_then(|by_root| by_root.get(&root))
            .and_then(|by_subject| by_subject.get(&subject))
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn set_vote(&mut self, frame: Frame, root: EventId, subject: ProcId, vote: bool) {
        self.votes
            .entry(frame)
            .or_default()
            .entry(root)
            .or_default()
            .insert(subject, vote);
    }

    /// The aggregated decision for `subject` at `frame`, if reached.
    pub(crate) fn decision(&self, frame: Frame, subject: ProcId) -> Option<bool> {
        self.root_decision.get(&frame)?.get(&subject).copied()
    }

    pub(crate) fn set_decision(&mut self, frame: Frame, subject: ProcId, eligible: bool) {
        self.root_decision
            .entry(frame)
            .or_default()
            .insert(subject, eligible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(p: u32, s: Seq) -> EventId {
        EventId::new(ProcId(p), s)
    }

    #[test]
    fn roots_are_appended_frame_by_frame() {
        let mut view = LocalView::new(2);
        view.insert_root(0, ev(0, 0));
        view.insert_root(0, ev(1, 0));
        view.insert_root(1, ev(0, 3));
        assert!(view.is_frame_root(ev(1, 0)));
        assert!(!view.is_frame_root(ev(1, 1)));
        assert_eq!(view.root_of(1, ProcId(0)), Some(ev(0, 3)));
        assert_eq!(view.root_of(1, ProcId(1)), None);
    }

    #[test]
    #[should_panic(expected = "frame index calculation failed")]
    fn root_insertion_cannot_skip_frames() {
        let mut view = LocalView::new(2);
        view.insert_root(1, ev(0, 1));
    }

    #[test]
    fn votes_default_to_no() {
        let mut view = LocalView::new(2);
        assert!(!view.vote(0, ev(0, 1), ProcId(1)));
        view.set_vote(0, ev(0, 1), ProcId(1), true);
        assert!(view.vote(0, ev(0, 1), ProcId(1)));
    }

    #[test]
    fn deciding_a_frame_clears_its_election_state() {
        let mut view = LocalView::new(2);
        view.set_vote(0, ev(0, 1), ProcId(0), true);
        view.set_decision(0, ProcId(0), true);
        assert_eq!(view.decision(0, ProcId(0)), Some(true));

        view.mark_decided(0);
        assert_eq!(view.last_decided_frame(), Some(0));
        assert_eq!(view.next_undecided_frame(), 1);
        assert_eq!(view.decision(0, ProcId(0)), None);
        assert!(!view.vote(0, ev(0, 1), ProcId(0)));
    }
}
