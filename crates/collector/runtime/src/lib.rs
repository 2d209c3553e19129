//! Collector Runtime
//!
//! This crate runs a Collector: a pooled treasury whose members approve
//! batches of external actions by signed ballot.
//!
//! # Architecture
//!
//! The [`Collector`] is the main entry point. It composes one component per
//! concern, leaves first:
//!
//! - [`MembershipLedger`] - Exact-stake joins, no duplicates, no removals
//! - [`ProposalRegistry`] - Content-addressed, idempotent proposal records
//! - [`BallotAuthenticator`] - EIP-712 digest, signer recovery, replay guard
//! - [`Tally`] - Majority and quorum once the window has closed
//! - [`ExecutionEngine`] - All-or-nothing replay of a batch against a staged [`CallEnvironment`]
//!
//! Time comes from a [`Clock`]; assets are bought through an
//! [`NftMarketplace`].
//!
//! # Key Invariants
//!
//! 1. A failed call changes nothing and records nothing
//! 2. One member, one vote per proposal
//! 3. A proposal executes at most once, and only after its window closes
//! 4. Every committed effect appends to the event journal
//!
//! # Example
//!
//! ```rust
//! use collector_crypto::BallotSigner;
//! use collector_runtime::{Collector, ManualClock};
//! use collector_types::{Action, ActionBatch, Address, CollectorConfig, DescriptionHash, Wei};
//! use std::sync::Arc;
//!
//! let clock = ManualClock::starting_now();
//! let mut collector = Collector::new(
//!     CollectorConfig::default(),
//!     Address([0xee; 20]),
//!     Arc::new(clock.clone()),
//! )
//! .unwrap();
//!
//! let member = BallotSigner::random();
//! collector.become_member(member.address(), Wei::ether(1)).unwrap();
//!
//! let batch = ActionBatch::new(vec![Action::transfer(Address([0x77; 20]), Wei(1))]);
//! let desc = DescriptionHash::default();
//! let id = collector.propose(member.address(), &batch, &desc).unwrap();
//!
//! let ballot = member.sign_ballot(collector.domain(), id, 1).unwrap();
//! collector.cast_vote_by_sig(member.address(), &ballot).unwrap();
//!
//! clock.advance(chrono::Duration::days(4));
//! collector.execute(member.address(), &batch, &desc).unwrap();
//! assert!(collector.proposal(&id).unwrap().executed);
//! ```

#![deny(unsafe_code)]

pub mod ballot_authenticator;
pub mod clock;
pub mod collector;
pub mod execution_engine;
pub mod marketplace;
pub mod membership_ledger;
pub mod proposal_registry;
pub mod tally;

pub use ballot_authenticator::BallotAuthenticator;
pub use clock::{Clock, ClockError, ManualClock, SystemClock};
pub use collector::Collector;
pub use execution_engine::{CallEnvironment, ExecutionEngine};
pub use marketplace::{InMemoryMarketplace, MarketplaceError, NftMarketplace};
pub use membership_ledger::MembershipLedger;
pub use proposal_registry::ProposalRegistry;
pub use tally::{Tally, VerifiedVote};
