//! Console command generator.
//!
//! Line-based text protocol, one command per line, whitespace-separated
//! tokens. Lines beginning with `;` are comments. Commands:
//!
//! - `N n s0 s1 ... s(n-1)`: initialize `n` processors with their
//!   stakes; must precede every other command
//! - `C producer [parent_pid ...]`: create an event
//! - `R receiver sender`: receive the next event (single step)

use std::io::BufRead;
use std::str::FromStr;

use lachesis_consensus::LachesisState;
use lachesis_types::{ProcId, Stake};
use tracing::debug;

use crate::error::DriverError;

/// Generator reading operations from a command stream.
#[derive(Debug, Clone, Copy)]
pub struct InputGenerator {
    legacy: bool,
}

impl InputGenerator {
    /// Create a generator; `legacy` selects the legacy frame walk.
    pub fn new(legacy: bool) -> Self {
        Self { legacy }
    }

    /// Run the command stream to completion.
    ///
    /// Returns the final instance for inspection, or `None` when the
    /// stream contained no `N` command. Blank lines are skipped.
    pub fn run<R: BufRead>(&self, input: R) -> Result<Option<LachesisState>, DriverError> {
        let mut state: Option<LachesisState> = None;

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };
            if command.starts_with(';') {
                continue;
            }

            match command {
                "N" => {
                    let n: usize = parse_arg(tokens.next(), command, line_no)?;
                    let mut stakes: Vec<Stake> = Vec::with_capacity(n);
                    for _ in 0..n {
                        stakes.push(parse_arg(tokens.next(), command, line_no)?);
                    }
                    debug!(processors = n, legacy = self.legacy, "initializing from console");
                    state = Some(LachesisState::new(stakes, self.legacy)?);
                }
                "C" => {
                    let state = state
                        .as_mut()
                        .ok_or(DriverError::NotInitialized { line: line_no })?;
                    let producer = parse_proc(tokens.next(), command, line_no)?;
                    let mut parents = Vec::new();
                    for token in tokens {
                        parents.push(parse_proc(Some(token), command, line_no)?);
                    }
                    state.create_event(producer, &parents)?;
                }
                "R" => {
                    let state = state
                        .as_mut()
                        .ok_or(DriverError::NotInitialized { line: line_no })?;
                    let receiver = parse_proc(tokens.next(), command, line_no)?;
                    let sender = parse_proc(tokens.next(), command, line_no)?;
                    state.receive_event(receiver, sender)?;
                }
                _ => {
                    return Err(DriverError::UnknownCommand {
                        line: line_no,
                        text: line.clone(),
                    });
                }
            }
        }

        Ok(state)
    }
}

fn parse_arg<T: FromStr>(
    token: Option<&str>,
    command: &str,
    line: usize,
) -> Result<T, DriverError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| DriverError::MalformedCommand {
            command: command.to_string(),
            line,
        })
}

fn parse_proc(token: Option<&str>, command: &str, line: usize) -> Result<ProcId, DriverError> {
    parse_arg::<u32>(token, command, line).map(ProcId)
}
