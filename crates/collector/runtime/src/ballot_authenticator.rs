//! Ballot Authenticator - who signed a ballot, and may it count
//!
//! Ballots are signed off-line over an EIP-712 digest bound to this
//! deployment. Verification runs in a fixed order so each rejection is
//! separately observable:
//!
//! 1. signature recovery (`InvalidSignature`)
//! 2. signer membership (`NotAMember`)
//! 3. proposal existence (`UnknownProposal`)
//! 4. voting window (`VotingClosed`)
//! 5. replay (`AlreadyVoted`)
//! 6. support value (`InvalidVoteType`)

use chrono::{DateTime, Utc};
use collector_crypto::{recover_signer, Eip712Domain};
use collector_types::{
    Address, Ballot, CollectorError, CollectorResult, ProposalRecord, VoteType,
};

use crate::membership_ledger::MembershipLedger;
use crate::tally::VerifiedVote;

/// Turns signed ballots into verified votes for one signing domain
#[derive(Clone, Debug)]
pub struct BallotAuthenticator {
    domain: Eip712Domain,
}

impl BallotAuthenticator {
    /// Authenticator bound to `domain`
    pub fn new(domain: Eip712Domain) -> Self {
        Self { domain }
    }

    /// Domain ballots must be signed under
    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// The digest a member signs for `ballot`
    pub fn digest(&self, ballot: &Ballot) -> [u8; 32] {
        self.domain
            .ballot_digest(&ballot.proposal_id, ballot.support)
    }

    /// Recover the ballot's signer
    pub fn recover(&self, ballot: &Ballot) -> CollectorResult<Address> {
        recover_signer(&self.digest(ballot), &ballot.signature)
            .map_err(|e| CollectorError::InvalidSignature(e.to_string()))
    }

    /// Run every check against `record`, the current state of the ballot's
    /// proposal (`None` if it does not exist)
    pub fn verify(
        &self,
        ballot: &Ballot,
        members: &MembershipLedger,
        record: Option<&ProposalRecord>,
        now: DateTime<Utc>,
    ) -> CollectorResult<VerifiedVote> {
        let voter = self.recover(ballot)?;
        members.require_member(&voter)?;

        let record = record.ok_or(CollectorError::UnknownProposal(ballot.proposal_id))?;

        if !record.is_open(now) {
            return Err(CollectorError::VotingClosed {
                proposal_id: record.id,
                deadline: record.deadline,
            });
        }
        if record.has_voted(&voter) {
            return Err(CollectorError::AlreadyVoted {
                proposal_id: record.id,
                voter,
            });
        }
        let support = VoteType::try_from(ballot.support)?;

        Ok(VerifiedVote {
            proposal_id: record.id,
            voter,
            support,
        })
    }
}
