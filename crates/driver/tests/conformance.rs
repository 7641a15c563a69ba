//! Event-database conformance tests over synthesized SQLite fixtures.
//!
//! The positive fixture encodes a hand-verified three-processor run:
//! the recorded frames, root classifications and the atropos entry all
//! match what the algorithm computes, so the replay must pass in both
//! frame-assignment modes. The negative fixtures corrupt one recorded
//! fact each and must fail with the matching diagnostic.

use std::path::PathBuf;

use lachesis_consensus::ConsensusError;
use lachesis_driver::{DriverError, EventDbGenerator};
use lachesis_types::{EventId, ProcId};
use rusqlite::Connection;
use tempfile::TempDir;

const EPOCH: i64 = 76;

/// (EventId, ValidatorId, SequenceNumber, FrameId, parent event ids);
/// sequence and frame numbers are 1-based as in a recorded database.
type EventSpec = (i64, i64, i64, i64, &'static [i64]);

/// A three-processor epoch: genesis round, two follow-up rounds, and a
/// closing event that reaches frame 3 and elects the first atropos.
/// Validator ids are deliberately non-dense.
const EVENTS: &[EventSpec] = &[
    (1, 11, 1, 1, &[]),
    (2, 22, 1, 1, &[]),
    (3, 33, 1, 1, &[]),
    (4, 11, 2, 1, &[1, 2, 3]),
    (5, 22, 2, 1, &[4, 2, 3]),
    (6, 33, 2, 2, &[4, 5, 3]),
    (7, 11, 3, 2, &[4, 5, 6]),
    (8, 22, 3, 2, &[7, 5, 6]),
    (9, 33, 3, 2, &[7, 8, 6]),
    (10, 11, 4, 3, &[7, 8, 9]),
];

fn build_db(events: &[EventSpec], atropos: &[i64]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("epoch.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Validator(EpochId INTEGER, ValidatorId INTEGER, Weight INTEGER);
         CREATE TABLE Event(EventId INTEGER PRIMARY KEY, EpochId INTEGER, EventHash TEXT,
                            FrameId INTEGER, ValidatorId INTEGER, SequenceNumber INTEGER);
         CREATE TABLE Parent(EventId INTEGER, ParentId INTEGER);
         CREATE TABLE Atropos(AtroposId INTEGER);",
    )
    .unwrap();

    for validator in [11, 22, 33] {
        conn.execute(
            "INSERT INTO Validator(EpochId, ValidatorId, Weight) VALUES (?1, ?2, 1)",
            (EPOCH, validator),
        )
        .unwrap();
    }
    for &(event_id, validator_id, seq, frame, parents) in events {
        conn.execute(
            "INSERT INTO Event(EventId, EpochId, EventHash, FrameId, ValidatorId, SequenceNumber) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                event_id,
                EPOCH,
                format!("hash{event_id:04}"),
                frame,
                validator_id,
                seq,
            ),
        )
        .unwrap();
        for &parent_id in parents {
            conn.execute(
                "INSERT INTO Parent(EventId, ParentId) VALUES (?1, ?2)",
                (event_id, parent_id),
            )
            .unwrap();
        }
    }
    for &atropos_id in atropos {
        conn.execute("INSERT INTO Atropos(AtroposId) VALUES (?1)", [atropos_id])
            .unwrap();
    }
    (dir, path)
}

fn ev(p: u32, s: i64) -> EventId {
    EventId::new(ProcId(p), s)
}

#[test]
fn recorded_epoch_conforms_in_standard_mode() {
    let (_dir, path) = build_db(EVENTS, &[1]);
    let state = EventDbGenerator::new(false).run(&path, EPOCH).unwrap();

    assert_eq!(state.num_processors(), 3);
    assert_eq!(state.first_atropos(), Some(ev(0, 0)));
    assert_eq!(state.get_frame(ProcId(0), ev(0, 3)), Some(2));
    assert!(state.is_frame_root(ProcId(2), ev(2, 1)));
}

#[test]
fn recorded_epoch_conforms_in_legacy_mode() {
    let (_dir, path) = build_db(EVENTS, &[1]);
    let state = EventDbGenerator::new(true).run(&path, EPOCH).unwrap();
    assert_eq!(state.first_atropos(), Some(ev(0, 0)));
}

#[test]
fn frame_divergence_fails_the_replay() {
    // Claim the closing event stays in frame 2 when the algorithm
    // promotes it to frame 3.
    let mut events = EVENTS.to_vec();
    events[9].3 = 2;
    let (_dir, path) = build_db(&events, &[1]);

    let err = EventDbGenerator::new(false).run(&path, EPOCH).unwrap_err();
    assert!(matches!(
        err,
        DriverError::FrameMismatch {
            event,
            computed: Some(2),
            expected: 1,
        } if event == ev(0, 3)
    ));
    let _ = std::fs::remove_file("root_failure.g");
}

#[test]
fn atropos_divergence_fails_the_replay() {
    // The file nominates processor 1's genesis as the first atropos;
    // the election later settles on processor 0's.
    let (_dir, path) = build_db(EVENTS, &[2]);

    let err = EventDbGenerator::new(false).run(&path, EPOCH).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Consensus(ConsensusError::InconsistentAtropos { atropos, .. })
            if atropos == ev(0, 0)
    ));
}

#[test]
fn unresolvable_parents_fail_the_replay() {
    // Two events referencing each other can never both be processed.
    let events: Vec<EventSpec> = vec![(1, 11, 1, 1, &[2]), (2, 22, 1, 1, &[1])];
    let (_dir, path) = build_db(&events, &[]);

    let err = EventDbGenerator::new(false).run(&path, EPOCH).unwrap_err();
    assert!(matches!(err, DriverError::StalledParents(2)));
}

#[test]
fn unknown_validators_fail_the_replay() {
    let events: Vec<EventSpec> = vec![(1, 99, 1, 1, &[])];
    let (_dir, path) = build_db(&events, &[]);

    let err = EventDbGenerator::new(false).run(&path, EPOCH).unwrap_err();
    assert!(matches!(err, DriverError::UnknownValidator(99)));
}

#[test]
fn empty_epochs_fail_the_replay() {
    let (_dir, path) = build_db(EVENTS, &[1]);
    let err = EventDbGenerator::new(false).run(&path, 999).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Consensus(ConsensusError::NoValidators)
    ));
}
