//! Collector Domain Types
//!
//! This crate defines the data model of a Collector: a pooled treasury
//! whose members jointly decide, by signed ballot, whether to run a batch
//! of external actions.
//!
//! # Key Concepts
//!
//! - **Member**: an identity that paid the exact join stake. Never removed.
//! - **Proposal**: a record keyed by the content hash of its action batch.
//! - **Ballot**: an off-line signed `(proposal, support)` pair.
//! - **Event Journal**: append-only record of every committed effect.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime behaviour. Identifiers are
//! fixed-width byte newtypes that display and serialize as `0x` hex.

#![deny(unsafe_code)]

mod action;
mod amount;
mod ballot;
mod bytes;
mod config;
mod errors;
mod journal;
mod proposal;

pub use action::*;
pub use amount::*;
pub use ballot::*;
pub use bytes::*;
pub use config::*;
pub use errors::*;
pub use journal::*;
pub use proposal::*;
