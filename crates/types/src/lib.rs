//! Core types for the Lachesis conformance simulator.
//!
//! This crate provides the foundational types used throughout the
//! simulator:
//!
//! - **Identifiers**: [`ProcId`], [`Seq`], [`EventId`], [`Frame`], [`Stake`]
//! - **Reachability frontiers**: [`EventVec`], a per-processor sequence
//!   vector summarizing a downset or upset
//! - **Validator metadata**: [`ValidatorSet`], holding stakes, the quorum
//!   threshold and the stake-sorted election order
//!
//! # Design Philosophy
//!
//! This crate is self-contained and does not depend on any other workspace
//! crates, making it the foundation layer.

mod event_vec;
mod ids;
mod validator;

pub use event_vec::EventVec;
pub use ids::{EventId, Frame, ProcId, Seq, Stake, NO_SEQ};
pub use validator::ValidatorSet;
