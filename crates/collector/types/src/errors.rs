//! Error types for the Collector engine
//!
//! Every rejection is a named, expected outcome. A call that fails leaves
//! engine state exactly as it was.

use crate::{Address, ProposalId, Wei};
use chrono::{DateTime, Utc};

/// Errors that can occur in Collector operations
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Contribution must be exactly {required}, got {provided} (WRONG_CONTRIBUTION_AMOUNT)")]
    WrongContributionAmount { required: Wei, provided: Wei },

    #[error("Already a member: {0} (ALREADY_MEMBER)")]
    AlreadyMember(Address),

    #[error("Not a member: {0} (NOT_A_MEMBER)")]
    NotAMember(Address),

    #[error("Unknown proposal: {0} (UNKNOWN_PROPOSAL)")]
    UnknownProposal(ProposalId),

    #[error("Invalid signature: {0} (INVALID_SIGNATURE)")]
    InvalidSignature(String),

    #[error("{voter} already voted on proposal {proposal_id} (ALREADY_VOTED)")]
    AlreadyVoted {
        proposal_id: ProposalId,
        voter: Address,
    },

    #[error("Voting closed for proposal {proposal_id} at {deadline} (VOTING_CLOSED)")]
    VotingClosed {
        proposal_id: ProposalId,
        deadline: DateTime<Utc>,
    },

    #[error("Voting still open for proposal {proposal_id} until {deadline} (VOTING_OPEN)")]
    VotingOpen {
        proposal_id: ProposalId,
        deadline: DateTime<Utc>,
    },

    #[error("Invalid vote type: {0} (INVALID_VOTE_TYPE)")]
    InvalidVoteType(u8),

    #[error("Proposal has not succeeded: {0} (PROPOSAL_HAS_NOT_SUCCEEDED)")]
    ProposalHasNotSucceeded(ProposalId),

    #[error("Proposal already executed: {0} (ALREADY_EXECUTED)")]
    AlreadyExecuted(ProposalId),

    #[error("Parallel arrays differ in length: {0} (LENGTH_MISMATCH)")]
    LengthMismatch(String),

    #[error("Ballot {index} rejected: {source}")]
    BallotRejected {
        index: usize,
        #[source]
        source: Box<CollectorError>,
    },

    #[error("Action {index} failed: {reason} (ACTION_FAILED)")]
    ActionFailed { index: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CollectorError {
    /// Stable machine-readable code for the rejection
    pub fn code(&self) -> &'static str {
        match self {
            CollectorError::WrongContributionAmount { .. } => "WRONG_CONTRIBUTION_AMOUNT",
            CollectorError::AlreadyMember(_) => "ALREADY_MEMBER",
            CollectorError::NotAMember(_) => "NOT_A_MEMBER",
            CollectorError::UnknownProposal(_) => "UNKNOWN_PROPOSAL",
            CollectorError::InvalidSignature(_) => "INVALID_SIGNATURE",
            CollectorError::AlreadyVoted { .. } => "ALREADY_VOTED",
            CollectorError::VotingClosed { .. } => "VOTING_CLOSED",
            CollectorError::VotingOpen { .. } => "VOTING_OPEN",
            CollectorError::InvalidVoteType(_) => "INVALID_VOTE_TYPE",
            CollectorError::ProposalHasNotSucceeded(_) => "PROPOSAL_HAS_NOT_SUCCEEDED",
            CollectorError::AlreadyExecuted(_) => "ALREADY_EXECUTED",
            CollectorError::LengthMismatch(_) => "LENGTH_MISMATCH",
            CollectorError::BallotRejected { .. } => "BALLOT_REJECTED",
            CollectorError::ActionFailed { .. } => "ACTION_FAILED",
            CollectorError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// The underlying rejection, looking through batch wrappers
    pub fn root(&self) -> &CollectorError {
        match self {
            CollectorError::BallotRejected { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;
