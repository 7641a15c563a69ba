//! Error types for the event-source adapters.

use lachesis_consensus::ConsensusError;
use lachesis_types::EventId;

/// Errors raised while driving the simulator from an external source.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A console line did not start with a known command.
    #[error("unknown command at line {line}: {text:?}")]
    UnknownCommand { line: usize, text: String },

    /// A console command was missing or carried malformed arguments.
    #[error("malformed {command:?} command at line {line}")]
    MalformedCommand { command: String, line: usize },

    /// A `C` or `R` command arrived before the `N` initialization.
    #[error("operation before N initialization at line {line}")]
    NotInitialized { line: usize },

    /// The event database references a validator missing from the epoch.
    #[error("cannot find validator {0}")]
    UnknownValidator(i64),

    /// No event of the epoch has all parents available.
    #[error("no processable event left; {0} events have unresolved parents")]
    StalledParents(usize),

    /// The computed frame disagrees with the event database.
    #[error(
        "frame number of event {event} is {computed:?} in algorithm; \
         event file expects frame number {expected}"
    )]
    FrameMismatch {
        event: EventId,
        computed: Option<usize>,
        expected: i64,
    },

    /// The root classification disagrees with the event database.
    #[error(
        "root classification of event {event} disagrees with the event file \
         (file says root: {expected_root})"
    )]
    RootMismatch { event: EventId, expected_root: bool },

    /// The event database lists an atropos the algorithm rejects.
    #[error("algorithm fails to classify event {atropos} as atropos")]
    AtroposMismatch { atropos: EventId },

    /// A consensus operation failed.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Reading the event database failed.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Reading the command stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
