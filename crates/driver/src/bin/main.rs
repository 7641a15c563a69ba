//! Lachesis conformance simulator CLI.
//!
//! # Example
//!
//! ```bash
//! # Drive the simulator from a console script
//! lachesis-sim input < script.txt
//!
//! # Replay epoch 76 of a recorded event database in legacy mode
//! lachesis-sim eventdb events.db 76 --legacy
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lachesis_driver::{EventDbGenerator, InputGenerator};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Lachesis conformance simulator.
///
/// Replays create/receive operation sequences through the consensus
/// core and verifies frames, roots and the atropos chain. Exits 0 on
/// success and 1 on any usage, runtime or conformance error.
#[derive(Parser, Debug)]
#[command(name = "lachesis-sim")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read create/receive operations from standard input
    Input {
        /// Use the legacy frame assignment
        #[arg(long)]
        legacy: bool,
    },
    /// Replay a recorded event database and verify conformance
    Eventdb {
        /// Path to the SQLite event database
        db: PathBuf,
        /// Epoch to replay
        epoch: i64,
        /// Use the legacy frame assignment
        #[arg(long)]
        legacy: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let failed = err.use_stderr();
            let _ = err.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                // --help and --version land here.
                ExitCode::SUCCESS
            };
        }
    };

    let result = match args.command {
        Command::Input { legacy } => InputGenerator::new(legacy)
            .run(io::stdin().lock())
            .map(|_| ()),
        Command::Eventdb { db, epoch, legacy } => {
            EventDbGenerator::new(legacy).run(&db, epoch).map(|_| ())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            eprintln!("lachesis-sim: {err}");
            ExitCode::FAILURE
        }
    }
}
