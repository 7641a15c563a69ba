//! Event-source adapters for the Lachesis conformance simulator.
//!
//! Two generators drive the consensus core:
//!
//! - [`InputGenerator`] reads a line-based command protocol (`N`, `C`,
//!   `R`) from any reader, typically standard input.
//! - [`EventDbGenerator`] replays a recorded SQLite event database and
//!   verifies that the locally computed frames, roots and atropos agree
//!   with the recorded values.
//!
//! Both own their I/O resources and call the core's operations
//! serially; the `lachesis-sim` binary dispatches between them.

mod console;
mod error;
mod eventdb;

pub use console::InputGenerator;
pub use error::DriverError;
pub use eventdb::EventDbGenerator;
