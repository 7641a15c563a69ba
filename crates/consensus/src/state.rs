//! Lachesis consensus state machine.
//!
//! This module implements the per-participant decision procedure as a
//! synchronous, operation-driven model: ingress operations mutate the
//! DAG store and the head matrix, reachability summaries are updated
//! incrementally, the new event is frame-classified, and new roots feed
//! the voting, aggregation and atropos election pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};

use lachesis_types::{EventId, Frame, ProcId, Seq, Stake, ValidatorSet};
use tracing::{debug, info, warn};

use crate::dag::DagStore;
use crate::error::ConsensusError;
use crate::view::LocalView;

/// Ceiling on the legacy frame walk, relative to the self-parent frame.
/// Bounds pathological walks; the exact value is a protocol constant.
const LEGACY_FRAME_CEILING: Frame = 100;

/// The complete simulation state: one DAG shared by all local views,
/// one [`LocalView`] per processor, and the global atropos chain.
///
/// # Operation Flow
///
/// 1. **create_event / receive_event** → DAG store and head matrix update
/// 2. **Frame assignment** → the event is classified into a frame in the
///    observing view; a frame change along the self-parent chain makes
///    it a root
/// 3. **Voting & aggregation** → each new root votes on the previous
///    frame's roots and aggregates votes for older undecided frames
/// 4. **Atropos election** → decided frames elect their atropos in
///    stake-sorted order
/// 5. **Cross-view checks** → root and atropos selections are verified
///    against every other view after each step
pub struct LachesisState {
    validators: ValidatorSet,

    /// Selects the legacy frame walk instead of the standard assignment.
    legacy_frames: bool,

    /// Parent links and reachability frontiers, shared across views.
    dag: DagStore,

    /// One local view per processor.
    views: Vec<LocalView>,

    /// First atropos of the whole network, set by whichever view
    /// decides it first.
    first_atropos: Option<EventId>,

    /// Successor chain of atropos events, authoritative across views.
    atropos_chain: BTreeMap<EventId, EventId>,

    /// Most recent atropos elected by each view.
    head_atropos: Vec<Option<EventId>>,

    /// Transition step counter, incremented after every ingress op.
    step: u64,
}

impl std::fmt::Debug for LachesisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LachesisState")
            .field("processors", &self.validators.len())
            .field("quorum", &self.validators.quorum())
            .field("legacy_frames", &self.legacy_frames)
            .field("first_atropos", &self.first_atropos)
            .field("chain_len", &self.atropos_chain.len())
            .field("step", &self.step)
            .finish()
    }
}

impl LachesisState {
    /// Initialize a simulation over `stakes.len()` processors.
    ///
    /// Echoes the normative `N` record and emits one informational init
    /// record.
    pub fn new(stakes: Vec<Stake>, legacy_frames: bool) -> Result<Self, ConsensusError> {
        if stakes.is_empty() {
            return Err(ConsensusError::NoValidators);
        }
        if stakes.iter().sum::<Stake>() == 0 {
            return Err(ConsensusError::ZeroTotalStake);
        }

        let mut line = format!("N {}", stakes.len());
        for stake in &stakes {
            line.push_str(&format!(" {stake}"));
        }
        println!("{line}");

        let n = stakes.len();
        let validators = ValidatorSet::new(stakes);
        info!(
            processors = n,
            total_stake = validators.total_stake(),
            quorum = validators.quorum(),
            legacy_frames,
            "initialized consensus instance"
        );

        Ok(Self {
            validators,
            legacy_frames,
            dag: DagStore::new(n),
            views: (0..n).map(|_| LocalView::new(n)).collect(),
            first_atropos: None,
            atropos_chain: BTreeMap::new(),
            head_atropos: vec![None; n],
            step: 1,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Ingress
    // ═══════════════════════════════════════════════════════════════════

    /// Create a new event in processor `producer` on top of its current
    /// heads.
    ///
    /// The parent set is built from the producer's head of each listed
    /// parent processor; every listed processor must already have an
    /// event in the producer's view, and a non-genesis event must list
    /// its own producer.
    pub fn create_event(
        &mut self,
        producer: ProcId,
        parent_processors: &[ProcId],
    ) -> Result<EventId, ConsensusError> {
        self.check_procid(producer)?;

        let new_event = EventId::new(producer, self.views[producer.index()].head_seq(producer) + 1);

        let mut parent_set = BTreeSet::new();
        for &parent_proc in parent_processors {
            self.check_procid(parent_proc)?;
            let parent_seq = self.views[producer.index()].head_seq(parent_proc);
            if parent_seq < 0 {
                return Err(ConsensusError::MissingParentEvent {
                    producer,
                    parent: parent_proc,
                });
            }
            let parent = EventId::new(parent_proc, parent_seq);
            self.check_event(parent)?;
            parent_set.insert(parent);
        }
        if let Some(self_parent) = new_event.self_parent() {
            if !parent_set.contains(&self_parent) {
                return Err(ConsensusError::MissingSelfParent(new_event));
            }
        }

        self.dag.record(new_event, parent_set);
        self.views[producer.index()].advance_head(producer);

        // Normative stdout record; external tools replay these lines.
        let mut line = format!("C {producer}");
        for parent_proc in parent_processors {
            line.push_str(&format!(" {parent_proc}"));
        }
        println!("{line}");
        debug!(%producer, event = %new_event, "created event");

        self.check_event(new_event)?;
        self.update_frame_atropos(producer, new_event)?;
        self.step += 1;
        Ok(new_event)
    }

    /// Receive the next event of `sender` in the view of `receiver`.
    ///
    /// A no-op when the receiver is the sender or already has the
    /// sender's head. Missing ancestors are pulled first so the
    /// receiver's view stays closed under parents.
    pub fn receive_event(&mut self, receiver: ProcId, sender: ProcId) -> Result<(), ConsensusError> {
        self.check_procid(receiver)?;
        self.check_procid(sender)?;
        if receiver == sender {
            return Ok(());
        }

        let have = self.views[receiver.index()].head_seq(sender);
        if have >= self.views[sender.index()].head_seq(sender) {
            return Ok(());
        }

        let event = EventId::new(sender, have + 1);
        let parents: Vec<EventId> = self.dag.parents_of(event).collect();
        for parent in parents {
            while self.views[receiver.index()].head_seq(parent.proc) < parent.seq {
                self.receive_event(receiver, parent.proc)?;
            }
        }

        self.views[receiver.index()].advance_head(sender);
        self.check_event(event)?;
        println!("R {receiver} {sender}");
        debug!(%receiver, %sender, event = %event, "received event");

        self.update_frame_atropos(receiver, event)?;
        self.step += 1;
        Ok(())
    }

    /// Receive events of `sender` in the view of `receiver` until the
    /// receiver's head of the sender equals `seq`.
    ///
    /// Fails when the sender has nothing further to give before the
    /// target is reached, or when the receiver's head does not land
    /// exactly on the target.
    pub fn receive_until(
        &mut self,
        receiver: ProcId,
        sender: ProcId,
        seq: Seq,
    ) -> Result<(), ConsensusError> {
        self.check_procid(receiver)?;
        self.check_procid(sender)?;
        if receiver == sender {
            return Ok(());
        }

        while self.views[receiver.index()].head_seq(sender)
            < self.views[sender.index()].head_seq(sender)
            && self.views[receiver.index()].head_seq(sender) < seq
        {
            self.receive_event(receiver, sender)?;
        }

        let reached = self.views[receiver.index()].head_seq(sender);
        if reached != seq {
            println!("Want event ({sender}, {seq}) in processor {receiver}");
            println!("Sequence number is set to {reached}");
            return Err(ConsensusError::ReceiveShortfall {
                receiver,
                sender,
                want: seq,
                reached,
            });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Frame Assignment
    // ═══════════════════════════════════════════════════════════════════

    /// Run the frame-atropos pipeline for a newly observed event.
    fn update_frame_atropos(&mut self, pid: ProcId, event: EventId) -> Result<(), ConsensusError> {
        let is_new_root = if self.legacy_frames {
            self.update_frame_legacy(pid, event)?
        } else {
            self.update_frame(pid, event)?
        };
        if is_new_root {
            self.update_atropos(pid, event)?;
        }
        Ok(())
    }

    /// Standard frame assignment.
    ///
    /// The frame is the maximum parent frame, promoted by one when the
    /// event forklessly causes a quorum of that frame's roots. A frame
    /// change along the self-parent chain marks the event as a root.
    fn update_frame(&mut self, pid: ProcId, event: EventId) -> Result<bool, ConsensusError> {
        self.check_event(event)?;
        self.check_procid(pid)?;

        if event.is_genesis() {
            self.views[pid.index()].assign_frame(event, 0);
            self.insert_frame_root(pid, 0, event)?;
            return Ok(true);
        }

        let max_frame = self.max_parent_frame(pid, event);
        let mut result_frame = max_frame;
        if self.forkless_cause_on_quorum(pid, max_frame, event) {
            result_frame += 1;
        }
        self.views[pid.index()].assign_frame(event, result_frame);

        let self_parent = event
            .self_parent()
            .expect("non-genesis event has a self-parent");
        self.check_event(self_parent)?;
        let self_parent_frame = self.views[pid.index()].frame_of(self_parent).unwrap_or(0);
        debug_assert!(result_frame >= self_parent_frame);

        if result_frame != self_parent_frame {
            self.insert_frame_root(pid, result_frame, event)?;
            Ok(true)
        } else {
            debug_assert_eq!(
                max_frame, result_frame,
                "frame of new event must be the same as its max parent"
            );
            Ok(false)
        }
    }

    /// Legacy frame assignment.
    ///
    /// Walks upward from the self-parent frame while the event
    /// forklessly causes a quorum of each frame's roots, capped at
    /// [`LEGACY_FRAME_CEILING`] frames above the self-parent.
    fn update_frame_legacy(&mut self, pid: ProcId, event: EventId) -> Result<bool, ConsensusError> {
        self.check_event(event)?;
        self.check_procid(pid)?;

        if event.is_genesis() {
            self.views[pid.index()].assign_frame(event, 0);
            self.insert_frame_root(pid, 0, event)?;
            return Ok(true);
        }

        let self_parent = event
            .self_parent()
            .expect("non-genesis event has a self-parent");
        self.check_event(self_parent)?;
        let self_parent_frame = self.views[pid.index()].frame_of(self_parent).unwrap_or(0);
        let ceiling = self_parent_frame + LEGACY_FRAME_CEILING;

        let mut frame = self_parent_frame;
        while self.forkless_cause_on_quorum(pid, frame, event) && frame < ceiling {
            frame += 1;
        }
        self.views[pid.index()].assign_frame(event, frame);

        if frame > self_parent_frame {
            self.insert_frame_root(pid, frame, event)?;
            Ok(true)
        } else {
            debug_assert_eq!(
                frame, self_parent_frame,
                "frame of new event must be the same as its parent"
            );
            Ok(false)
        }
    }

    /// The maximum frame over the event's parents in view `pid`.
    fn max_parent_frame(&self, pid: ProcId, event: EventId) -> Frame {
        debug_assert!(
            self.dag.parent_set(event).is_some_and(|p| !p.is_empty()),
            "non-genesis event must have parents"
        );
        let view = &self.views[pid.index()];
        self.dag
            .parents_of(event)
            .map(|parent| view.frame_of(parent).unwrap_or(0))
            .max()
            .unwrap_or(0)
    }

    /// Whether `event` forklessly causes a quorum-weight set of the
    /// frame-`frame` roots known to view `pid`.
    fn forkless_cause_on_quorum(&self, pid: ProcId, frame: Frame, event: EventId) -> bool {
        let Some(roots) = self.views[pid.index()].frame_roots().get(frame) else {
            return false;
        };
        let mut caused_stake = 0;
        for &root in roots {
            if self.dag.forkless_cause(event, root, &self.validators) {
                caused_stake += self.validators.stake(root.proc);
            }
        }
        caused_stake >= self.validators.quorum()
    }

    /// Record a new root and immediately verify it against every other
    /// view (no two views may select different roots of the same
    /// producer for the same frame).
    fn insert_frame_root(
        &mut self,
        pid: ProcId,
        frame: Frame,
        event: EventId,
    ) -> Result<(), ConsensusError> {
        println!(";FR {} {} {} {}", pid, frame, event.proc, event.seq);
        debug!(view = %pid, frame, root = %event, "new frame root");
        self.views[pid.index()].insert_root(frame, event);
        self.check_root_consistency(frame, event)
    }

    /// Cross-view root consistency: a frame-`frame` root from the same
    /// producer must carry the same sequence number in every view.
    fn check_root_consistency(
        &self,
        frame: Frame,
        new_root: EventId,
    ) -> Result<(), ConsensusError> {
        for other in self.validators.ids() {
            let Some(roots) = self.views[other.index()].frame_roots().get(frame) else {
                continue;
            };
            for &root in roots {
                if root.proc == new_root.proc && root.seq != new_root.seq {
                    println!(
                        ";New root selection {new_root} of frame {frame} diverges from \
                         processor {other} (and maybe others); they have already selected \
                         root {root}"
                    );
                    warn!(
                        frame,
                        new = %new_root,
                        existing = %root,
                        diverging_view = %other,
                        "root selection diverges between views"
                    );
                    let _ = self.dump(new_root.proc, "failure.dot");
                    return Err(ConsensusError::RootDivergence {
                        frame,
                        new: new_root,
                        existing: root,
                        other,
                    });
                }
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Voting, Aggregation & Election
    // ═══════════════════════════════════════════════════════════════════

    /// Run the election pipeline for a freshly recorded root.
    fn update_atropos(&mut self, pid: ProcId, new_root: EventId) -> Result<(), ConsensusError> {
        let new_root_frame = self.views[pid.index()]
            .frame_of(new_root)
            .expect("new root has an assigned frame");
        if new_root_frame < self.views[pid.index()].next_undecided_frame() {
            return Ok(());
        }
        self.perform_voting(pid, new_root);
        self.perform_aggregation(pid, new_root);
        self.choose_atropos(pid)
    }

    /// A new root votes on every root of the previous frame: yes iff it
    /// forklessly causes that root.
    fn perform_voting(&mut self, pid: ProcId, new_root: EventId) {
        let new_root_frame = self.views[pid.index()]
            .frame_of(new_root)
            .expect("new root has an assigned frame");
        debug_assert!(
            self.views[pid.index()].next_undecided_frame() <= new_root_frame,
            "cannot vote on a decided frame"
        );

        let Some(frame) = new_root_frame.checked_sub(1) else {
            return;
        };
        let Some(roots) = self.views[pid.index()].frame_roots().get(frame) else {
            return;
        };

        let roots: Vec<EventId> = roots.iter().copied().collect();
        for root in roots {
            let caused = self.dag.forkless_cause(new_root, root, &self.validators);
            self.views[pid.index()].set_vote(frame, new_root, root.proc, caused);
        }
    }

    /// Aggregate votes for every undecided frame strictly below the new
    /// root's previous frame.
    ///
    /// For each undecided subject processor, the new root tallies the
    /// stake-weighted yes/no votes of the previous frame's roots it
    /// forklessly causes. A tie resolves as yes, which keeps
    /// aggregation deterministic and monotone. A quorum on either side
    /// decides the subject.
    fn perform_aggregation(&mut self, pid: ProcId, new_root: EventId) {
        let new_root_frame = self.views[pid.index()]
            .frame_of(new_root)
            .expect("new root has an assigned frame");
        let Some(end) = new_root_frame.checked_sub(1) else {
            return;
        };
        let start = self.views[pid.index()].next_undecided_frame();

        // The electors are the previous frame's roots the new root can
        // see; their cause predicate is frame-independent.
        let electors: Vec<(EventId, bool)> = self.views[pid.index()]
            .frame_roots()
            .get(end)
            .map(|roots| {
                roots
                    .iter()
                    .map(|&root| {
                        (
                            root,
                            self.dag.forkless_cause(new_root, root, &self.validators),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        for frame in start..end {
            debug_assert!(new_root_frame - frame > 1, "frame overlap error");
            for subject in self.validators.ids() {
                if self.views[pid.index()].decision(frame, subject).is_some() {
                    continue;
                }

                let mut yes_stake = 0;
                let mut no_stake = 0;
                for &(root, caused) in &electors {
                    if !caused {
                        continue;
                    }
                    if self.views[pid.index()].vote(frame, root, subject) {
                        yes_stake += self.validators.stake(root.proc);
                    } else {
                        no_stake += self.validators.stake(root.proc);
                    }
                }

                let outcome = yes_stake >= no_stake;
                self.views[pid.index()].set_vote(frame, new_root, subject, outcome);
                if yes_stake >= self.validators.quorum() || no_stake >= self.validators.quorum() {
                    self.views[pid.index()].set_decision(frame, subject, outcome);
                }
            }
        }
    }

    /// Elect the atropos of the lowest undecided frame, walking
    /// candidates in descending stake order.
    ///
    /// Stops as soon as an undecided candidate is met: a higher-stake
    /// candidate must be decided before lower-stake ones can be
    /// considered.
    fn choose_atropos(&mut self, pid: ProcId) -> Result<(), ConsensusError> {
        let frame = self.views[pid.index()].next_undecided_frame();
        let order: Vec<ProcId> = self.validators.by_descending_stake().to_vec();
        for candidate in order {
            match self.views[pid.index()].decision(frame, candidate) {
                None => return Ok(()),
                Some(false) => continue,
                Some(true) => {
                    let atropos = self.views[pid.index()]
                        .root_of(frame, candidate)
                        .expect("atropos decided but not found in frame");

                    self.check_atropos(pid, atropos)?;
                    println!(";Setting atropos {atropos} in processor {pid}");
                    info!(view = %pid, frame, atropos = %atropos, "atropos elected");

                    self.views[pid.index()].mark_decided(frame);
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Cross-View Atropos Consistency
    // ═══════════════════════════════════════════════════════════════════

    /// Verify a freshly elected atropos against the global chain and
    /// advance the view's head atropos.
    fn check_atropos(&mut self, pid: ProcId, atropos: EventId) -> Result<(), ConsensusError> {
        let consistent = match self.head_atropos[pid.index()] {
            None => self.check_first_atropos(atropos),
            Some(prev) => self.check_subsequent_atropos(prev, atropos),
        };
        if !consistent {
            self.dump_state();
            println!(";Consensus is inconsistent for processor {pid} and event {atropos}");
            warn!(view = %pid, atropos = %atropos, "atropos selection diverges between views");
            return Err(ConsensusError::InconsistentAtropos { pid, atropos });
        }
        self.head_atropos[pid.index()] = Some(atropos);
        Ok(())
    }

    /// Check a proposed first atropos of the network.
    ///
    /// The first view to decide sets it; every later view must agree.
    pub fn check_first_atropos(&mut self, atropos: EventId) -> bool {
        match self.first_atropos {
            Some(first) => first == atropos,
            None => {
                self.first_atropos = Some(atropos);
                true
            }
        }
    }

    /// Check a proposed successor of `prev` in the atropos chain.
    ///
    /// The first view to decide a successor records it; every later
    /// view must agree.
    pub fn check_subsequent_atropos(&mut self, prev: EventId, current: EventId) -> bool {
        match self.atropos_chain.get(&prev) {
            Some(&expected) => {
                if expected != current {
                    println!(";Expected atropos: {expected}");
                    return false;
                }
                true
            }
            None => {
                self.atropos_chain.insert(prev, current);
                true
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Assertions
    // ═══════════════════════════════════════════════════════════════════

    fn check_procid(&self, pid: ProcId) -> Result<(), ConsensusError> {
        if !self.validators.contains(pid) {
            return Err(ConsensusError::UnknownProcessor(pid, self.validators.len()));
        }
        Ok(())
    }

    /// Check that an event is semantically well-formed: a known
    /// processor, a sequence within the producer's chain, and the
    /// self-parent link present for non-genesis events.
    fn check_event(&self, event: EventId) -> Result<(), ConsensusError> {
        self.check_procid(event.proc)?;
        let head = self.views[event.proc.index()].head_seq(event.proc);
        if event.seq < 0 || event.seq > head {
            return Err(ConsensusError::BadSequence(event));
        }
        if let Some(self_parent) = event.self_parent() {
            let linked = self
                .dag
                .parent_set(event)
                .is_some_and(|parents| parents.contains(&self_parent));
            if !linked {
                return Err(ConsensusError::MissingSelfParent(event));
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Number of processors.
    pub fn num_processors(&self) -> usize {
        self.validators.len()
    }

    /// The validator set with stakes, quorum and election order.
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// The shared DAG store.
    pub fn dag(&self) -> &DagStore {
        &self.dag
    }

    /// The local view of a processor.
    ///
    /// # Panics
    ///
    /// Panics when `pid` is out of range.
    pub fn view(&self, pid: ProcId) -> &LocalView {
        &self.views[pid.index()]
    }

    /// Whether `event` was recorded as a frame root in view `pid`.
    pub fn is_frame_root(&self, pid: ProcId, event: EventId) -> bool {
        self.views[pid.index()].is_frame_root(event)
    }

    /// The frame assigned to `event` in view `pid`, if observed there.
    pub fn get_frame(&self, pid: ProcId, event: EventId) -> Option<Frame> {
        self.views[pid.index()].frame_of(event)
    }

    /// Whether `event` is the first atropos or appears anywhere in the
    /// atropos chain. The chain is global, so the answer is the same in
    /// every view.
    pub fn is_atropos(&self, pid: ProcId, event: EventId) -> bool {
        debug_assert!(self.validators.contains(pid));
        self.first_atropos == Some(event)
            || self.atropos_chain.contains_key(&event)
            || self.atropos_chain.values().any(|&next| next == event)
    }

    /// The first atropos of the network, if decided.
    pub fn first_atropos(&self) -> Option<EventId> {
        self.first_atropos
    }

    /// The atropos successor chain.
    pub fn atropos_chain(&self) -> &BTreeMap<EventId, EventId> {
        &self.atropos_chain
    }

    /// The global forkless-cause predicate.
    pub fn forkless_cause(&self, a: EventId, b: EventId) -> bool {
        self.dag.forkless_cause(a, b, &self.validators)
    }

    /// The current transition step.
    pub fn step(&self) -> u64 {
        self.step
    }

    // ═══════════════════════════════════════════════════════════════════
    // Dump Facility
    // ═══════════════════════════════════════════════════════════════════

    /// Write a DOT rendering of view `pid` to `<path>.g`.
    ///
    /// Nodes are annotated with their frame number; frame roots are
    /// colored red and atropos events green.
    pub fn dump(&self, pid: ProcId, path: &str) -> Result<(), ConsensusError> {
        self.check_procid(pid)?;
        let view = &self.views[pid.index()];
        let mut out = BufWriter::new(File::create(format!("{path}.g"))?);

        writeln!(out, "digraph G {{")?;
        for proc in self.validators.ids() {
            for seq in 0..=view.head_seq(proc) {
                let event = EventId::new(proc, seq);
                let frame = view.frame_of(event).unwrap_or(0);
                write!(
                    out,
                    "node_{proc}_{seq} [pos=\"{proc},{seq}\", label=\"{proc},{seq} f{frame}\""
                )?;
                if view.is_frame_root(event) {
                    if self.is_atropos(pid, event) {
                        write!(out, ", color=green")?;
                    } else {
                        write!(out, ", color=red")?;
                    }
                }
                writeln!(out, "]")?;
            }
        }
        for proc in self.validators.ids() {
            for seq in 0..=view.head_seq(proc) {
                for parent in self.dag.parents_of(EventId::new(proc, seq)) {
                    writeln!(
                        out,
                        "node_{}_{} -> node_{}_{}",
                        proc, seq, parent.proc, parent.seq
                    )?;
                }
            }
        }
        writeln!(out, "}}")?;
        Ok(())
    }

    /// Write the downset and upset frontiers of every event to
    /// `<path>.txt`.
    pub fn dump_vectors(&self, path: &str) -> Result<(), ConsensusError> {
        let mut out = BufWriter::new(File::create(format!("{path}.txt"))?);
        for proc in self.validators.ids() {
            for seq in 0..=self.views[proc.index()].head_seq(proc) {
                let event = EventId::new(proc, seq);
                writeln!(out, "Event ({proc},{seq}):")?;
                write!(out, "\t downset:")?;
                if let Some(down) = self.dag.downset(event) {
                    for (p, s) in down.iter() {
                        write!(out, "({p},{s}) ")?;
                    }
                }
                writeln!(out)?;
                write!(out, "\t upset:")?;
                if let Some(up) = self.dag.upset(event) {
                    for (p, s) in up.iter() {
                        write!(out, "({p},{s}) ")?;
                    }
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Print the head-sequence matrix of every view as comment lines.
    pub fn dump_state(&self) {
        for i in self.validators.ids() {
            println!(";View {i}");
            let mut line = String::from("\t");
            for j in self.validators.ids() {
                line.push_str(&format!(
                    "{} ({}) ",
                    self.views[i.index()].head_seq(j),
                    self.views[j.index()].head_seq(j)
                ));
            }
            println!("{line}");
        }
    }
}
