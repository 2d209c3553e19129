//! Tally & Outcome Evaluator
//!
//! A proposal succeeds once its window has closed, more members voted for
//! than against, and participation meets the quorum relative to the
//! membership at evaluation time.

use chrono::{DateTime, Utc};
use collector_types::{
    Address, CollectorError, CollectorResult, ProposalId, ProposalRecord, ProposalState,
    QuorumPolicy, VoteType,
};
use tracing::debug;

/// A ballot that has passed authentication
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifiedVote {
    /// Proposal the vote is for
    pub proposal_id: ProposalId,
    /// Recovered signer, already checked to be a member
    pub voter: Address,
    /// How the member voted
    pub support: VoteType,
}

/// Vote counting and outcome evaluation
#[derive(Clone, Copy, Debug)]
pub struct Tally {
    quorum: QuorumPolicy,
}

impl Tally {
    /// Tally applying `quorum`
    pub fn new(quorum: QuorumPolicy) -> Self {
        Self { quorum }
    }

    /// Quorum policy in force
    pub fn quorum(&self) -> QuorumPolicy {
        self.quorum
    }

    /// Add one unit of weight for `vote` to `record`
    pub fn count(record: &mut ProposalRecord, vote: &VerifiedVote) -> CollectorResult<()> {
        if !record.record_vote(vote.voter, vote.support) {
            return Err(CollectorError::AlreadyVoted {
                proposal_id: record.id,
                voter: vote.voter,
            });
        }
        debug!(
            proposal = %record.id,
            voter = %vote.voter,
            support = %vote.support,
            for_votes = record.for_votes,
            against_votes = record.against_votes,
            abstain_votes = record.abstain_votes,
            "Vote counted"
        );
        Ok(())
    }

    /// Strictly more votes for than against
    pub fn has_majority(record: &ProposalRecord) -> bool {
        record.for_votes > record.against_votes
    }

    /// Whether participation meets the quorum for `members`
    pub fn quorum_reached(&self, record: &ProposalRecord, members: u64) -> bool {
        self.quorum.is_met(record.votes_cast(), members)
    }

    /// Window closed, majority for, and quorum met
    pub fn succeeded(&self, record: &ProposalRecord, members: u64, now: DateTime<Utc>) -> bool {
        now > record.deadline && Self::has_majority(record) && self.quorum_reached(record, members)
    }

    /// Lifecycle state of `record` at `now`
    pub fn state(&self, record: &ProposalRecord, members: u64, now: DateTime<Utc>) -> ProposalState {
        if record.executed {
            ProposalState::Executed
        } else if record.is_open(now) {
            ProposalState::Active
        } else if self.succeeded(record, members, now) {
            ProposalState::Succeeded
        } else {
            ProposalState::Defeated
        }
    }
}
