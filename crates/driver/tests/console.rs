//! Console generator tests over in-memory command scripts.

use lachesis_consensus::ConsensusError;
use lachesis_driver::{DriverError, InputGenerator};
use lachesis_types::{EventId, ProcId};
use tracing_test::traced_test;

/// Three equal-stake processors driven through enough gossip rounds to
/// elect the first atropos in view 0.
const SCENARIO: &str = "\
; three equal-stake processors
N 3 1 1 1
C 0
C 1
C 2
R 1 0
R 2 0
R 0 1
R 2 1
R 0 2
R 1 2
C 0 0 1 2
R 1 0
R 2 0
C 1 0 1 2
R 0 1
R 2 1
C 2 0 1 2
R 0 2
R 1 2
C 0 0 1 2
R 1 0
R 2 0
C 1 0 1 2
R 0 1
R 2 1
C 2 0 1 2
R 0 2
R 1 2
C 0 0 1 2
";

fn ev(p: u32, s: i64) -> EventId {
    EventId::new(ProcId(p), s)
}

#[traced_test]
#[test]
fn full_script_elects_an_atropos() {
    let state = InputGenerator::new(false)
        .run(SCENARIO.as_bytes())
        .unwrap()
        .expect("script initializes an instance");

    assert_eq!(state.num_processors(), 3);
    assert_eq!(state.first_atropos(), Some(ev(0, 0)));
    assert_eq!(state.get_frame(ProcId(0), ev(0, 3)), Some(2));
    assert!(state.is_frame_root(ProcId(0), ev(2, 1)));
    assert!(!state.is_frame_root(ProcId(0), ev(0, 1)));
}

#[test]
fn legacy_mode_accepts_the_same_script() {
    let state = InputGenerator::new(true)
        .run(SCENARIO.as_bytes())
        .unwrap()
        .expect("script initializes an instance");
    assert_eq!(state.first_atropos(), Some(ev(0, 0)));
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let script = "; a comment\n\nN 2 1 1\n;another comment\nC 0\n";
    let state = InputGenerator::new(false).run(script.as_bytes()).unwrap();
    let state = state.unwrap();
    assert_eq!(state.view(ProcId(0)).head_seq(ProcId(0)), 0);
}

#[test]
fn empty_input_yields_no_instance() {
    let state = InputGenerator::new(false).run(&b""[..]).unwrap();
    assert!(state.is_none());
}

#[test]
fn unknown_commands_are_rejected() {
    let err = InputGenerator::new(false)
        .run(&b"N 2 1 1\nX 0 1\n"[..])
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::UnknownCommand { line: 2, .. }
    ));
}

#[test]
fn operations_before_init_are_rejected() {
    let err = InputGenerator::new(false).run(&b"C 0\n"[..]).unwrap_err();
    assert!(matches!(err, DriverError::NotInitialized { line: 1 }));

    let err = InputGenerator::new(false).run(&b"R 0 1\n"[..]).unwrap_err();
    assert!(matches!(err, DriverError::NotInitialized { line: 1 }));
}

#[test]
fn malformed_commands_are_rejected() {
    // The N command promises three stakes but delivers one.
    let err = InputGenerator::new(false).run(&b"N 3 1\n"[..]).unwrap_err();
    assert!(matches!(err, DriverError::MalformedCommand { line: 1, .. }));

    let err = InputGenerator::new(false)
        .run(&b"N 2 1 1\nR 0\n"[..])
        .unwrap_err();
    assert!(matches!(err, DriverError::MalformedCommand { line: 2, .. }));
}

#[test]
fn consensus_errors_propagate() {
    let err = InputGenerator::new(false)
        .run(&b"N 3 1 1 1\nC 5\n"[..])
        .unwrap_err();
    assert!(matches!(
        err,
        DriverError::Consensus(ConsensusError::UnknownProcessor(p, 3)) if p == ProcId(5)
    ));
}
