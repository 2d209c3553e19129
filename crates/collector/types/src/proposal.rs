//! Proposal records and their lifecycle
//!
//! A proposal is keyed by the content hash of its action batch. Records
//! are append-only: after creation only the vote counters, the voted set
//! and the `executed` flag ever change.

use crate::{Address, ProposalId, VoteType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of a proposal at a given instant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Voting window still open
    Active,
    /// Window closed without majority or quorum; terminal
    Defeated,
    /// Window closed with majority and quorum; awaiting execution
    Succeeded,
    /// Action batch has run; terminal
    Executed,
}

impl ProposalState {
    /// No further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalState::Defeated | ProposalState::Executed)
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProposalState::Active => "active",
            ProposalState::Defeated => "defeated",
            ProposalState::Succeeded => "succeeded",
            ProposalState::Executed => "executed",
        };
        write!(f, "{}", s)
    }
}

/// The stored record for one proposal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub proposer: Address,
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub executed: bool,
    /// Members who have already voted
    voters: BTreeSet<Address>,
}

impl ProposalRecord {
    pub fn new(
        id: ProposalId,
        proposer: Address,
        created_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            proposer,
            for_votes: 0,
            against_votes: 0,
            abstain_votes: 0,
            created_at,
            deadline,
            executed: false,
            voters: BTreeSet::new(),
        }
    }

    /// Voting is open up to and including the deadline
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.deadline
    }

    /// Whether `voter` has already voted
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    /// Record one unit of vote weight; returns false if `voter` already voted
    pub fn record_vote(&mut self, voter: Address, vote: VoteType) -> bool {
        if !self.voters.insert(voter) {
            return false;
        }
        match vote {
            VoteType::Against => self.against_votes += 1,
            VoteType::For => self.for_votes += 1,
            VoteType::Abstain => self.abstain_votes += 1,
        }
        true
    }

    /// Total participating vote weight
    pub fn votes_cast(&self) -> u64 {
        self.for_votes + self.against_votes + self.abstain_votes
    }

    /// Members who have voted, in address order
    pub fn voters(&self) -> impl Iterator<Item = &Address> {
        self.voters.iter()
    }

    /// Public read model of this record
    pub fn view(&self) -> ProposalView {
        ProposalView {
            id: self.id,
            proposer: self.proposer,
            for_votes: self.for_votes,
            against_votes: self.against_votes,
            abstain_votes: self.abstain_votes,
            executed: self.executed,
            created_at: self.created_at,
            deadline: self.deadline,
        }
    }
}

/// Public read model of a proposal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub proposer: Address,
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
    pub executed: bool,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_record() -> ProposalRecord {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ProposalRecord::new(
            ProposalId([1; 32]),
            Address([2; 20]),
            created,
            created + Duration::days(3),
        )
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = make_record();
        assert_eq!(record.votes_cast(), 0);
        assert!(!record.executed);
        assert_eq!(record.view().proposer, Address([2; 20]));
    }

    #[test]
    fn test_record_vote_counts_once_per_voter() {
        let mut record = make_record();
        assert!(record.record_vote(Address([3; 20]), VoteType::For));
        assert!(!record.record_vote(Address([3; 20]), VoteType::Against));
        assert!(record.record_vote(Address([4; 20]), VoteType::Abstain));

        assert_eq!(record.for_votes, 1);
        assert_eq!(record.against_votes, 0);
        assert_eq!(record.abstain_votes, 1);
        assert!(record.has_voted(&Address([3; 20])));
        assert_eq!(record.voters().count(), 2);
    }

    #[test]
    fn test_window_includes_deadline() {
        let record = make_record();
        assert!(record.is_open(record.deadline));
        assert!(!record.is_open(record.deadline + Duration::seconds(1)));
    }

    #[test]
    fn test_terminal_states() {
        assert!(ProposalState::Defeated.is_terminal());
        assert!(ProposalState::Executed.is_terminal());
        assert!(!ProposalState::Succeeded.is_terminal());
        assert!(!ProposalState::Active.is_terminal());
    }
}
