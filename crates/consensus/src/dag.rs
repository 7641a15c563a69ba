//! DAG store with incremental reachability summaries.
//!
//! Events, parent links and the downset/upset frontiers are global
//! observable facts: once an event exists it has identical structure in
//! every view that has received it, so a single store serves all views.

use std::collections::{BTreeSet, HashMap};

use lachesis_types::{EventId, EventVec, ValidatorSet, NO_SEQ};

/// Parent links and reachability frontiers for every event in the run.
#[derive(Debug)]
pub struct DagStore {
    num_processors: usize,

    /// Immediate parents per event.
    parents: HashMap<EventId, BTreeSet<EventId>>,

    /// Downset frontier per event: the highest reachable sequence per
    /// producer, including the event itself.
    downset: HashMap<EventId, EventVec>,

    /// Upset frontier per event: the lowest sequence per producer that
    /// reaches the event, including the event itself.
    upset: HashMap<EventId, EventVec>,
}

impl DagStore {
    /// Create an empty store for `n` processors.
    pub fn new(num_processors: usize) -> Self {
        Self {
            num_processors,
            parents: HashMap::new(),
            downset: HashMap::new(),
            upset: HashMap::new(),
        }
    }

    /// Whether the event has been recorded.
    pub fn contains(&self, event: EventId) -> bool {
        self.parents.contains_key(&event)
    }

    /// The recorded parent set of an event, if any.
    pub fn parent_set(&self, event: EventId) -> Option<&BTreeSet<EventId>> {
        self.parents.get(&event)
    }

    /// Iterate over the parents of an event (empty for unknown events
    /// and genesis events without parents).
    pub fn parents_of(&self, event: EventId) -> impl Iterator<Item = EventId> + '_ {
        self.parents.get(&event).into_iter().flatten().copied()
    }

    /// The downset frontier of a recorded event.
    pub fn downset(&self, event: EventId) -> Option<&EventVec> {
        self.downset.get(&event)
    }

    /// The upset frontier of a recorded event.
    pub fn upset(&self, event: EventId) -> Option<&EventVec> {
        self.upset.get(&event)
    }

    /// Iterate over all recorded events in unspecified order.
    pub fn events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.parents.keys().copied()
    }

    /// Record a new event with its parent set and update all
    /// reachability summaries.
    ///
    /// The downset of the new event is the elementwise max of its
    /// parents' downsets plus the self entry. The upsets of all
    /// ancestors gain an entry for the new producer where none exists
    /// yet; since the walk stops at the first ancestor that already has
    /// one, every recorded entry keeps the minimum sequence.
    pub fn record(&mut self, event: EventId, parent_set: BTreeSet<EventId>) {
        debug_assert!(!self.contains(event), "event recorded twice");

        let mut down = EventVec::new(self.num_processors);
        down.set(event.proc, event.seq);
        for &parent in &parent_set {
            self.update_upsets(event, parent);
            if let Some(parent_down) = self.downset.get(&parent) {
                down.join_max(parent_down);
            }
        }
        self.downset.insert(event, down);

        let mut up = EventVec::new(self.num_processors);
        up.set(event.proc, event.seq);
        self.upset.insert(event, up);

        self.parents.insert(event, parent_set);
    }

    /// Worklist walk adding `event` to the upsets of `parent` and its
    /// ancestors. A branch ends at the first ancestor that already has
    /// an entry for the producer: the earlier descent recorded a lower
    /// sequence number, and everything below it is already covered.
    fn update_upsets(&mut self, event: EventId, parent: EventId) {
        let mut work = vec![parent];
        while let Some(ancestor) = work.pop() {
            let Some(up) = self.upset.get_mut(&ancestor) else {
                continue;
            };
            if !up.contains(event.proc) {
                up.set(event.proc, event.seq);
                work.extend(self.parents.get(&ancestor).into_iter().flatten().copied());
            }
        }
    }

    /// The forkless-cause predicate: `a` sees `b` via at least a quorum
    /// of distinct producers' chains.
    ///
    /// Sums the stake of every producer `q` whose lowest sequence
    /// reaching `b` lies at or below `a`'s frontier for `q`.
    pub fn forkless_cause(&self, a: EventId, b: EventId, validators: &ValidatorSet) -> bool {
        let (Some(down_a), Some(up_b)) = (self.downset.get(&a), self.upset.get(&b)) else {
            return false;
        };

        let mut seen_stake = 0;
        for (pid, seq_b) in up_b.iter() {
            let seq_a = down_a.get(pid);
            if seq_a != NO_SEQ && seq_b <= seq_a {
                seen_stake += validators.stake(pid);
            }
        }
        seen_stake >= validators.quorum()
    }

    /// All ancestors of an event, the event excluded.
    pub fn ancestors(&self, event: EventId) -> BTreeSet<EventId> {
        let mut seen = BTreeSet::new();
        let mut work: Vec<EventId> = self.parents_of(event).collect();
        while let Some(a) = work.pop() {
            if seen.insert(a) {
                work.extend(self.parents_of(a));
            }
        }
        seen
    }
}
