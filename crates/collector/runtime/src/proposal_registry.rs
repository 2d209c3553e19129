//! Proposal Registry - content-addressed proposal records
//!
//! Ids are `hash_proposal(batch, description_hash)`, so any party can
//! compute them independently. Proposing the same batch twice addresses
//! the existing record rather than resetting it.

use chrono::{DateTime, Duration, Utc};
use collector_crypto::hash_proposal;
use collector_types::{
    ActionBatch, Address, CollectorError, CollectorEvent, CollectorResult, DescriptionHash,
    EventJournal, ProposalId, ProposalRecord,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Proposal records keyed by content-derived id
#[derive(Clone, Debug)]
pub struct ProposalRegistry {
    proposals: HashMap<ProposalId, ProposalRecord>,
    voting_period: Duration,
}

impl ProposalRegistry {
    /// Empty registry opening `voting_period`-long windows
    pub fn new(voting_period: Duration) -> Self {
        Self {
            proposals: HashMap::new(),
            voting_period,
        }
    }

    /// Length of each voting window
    pub fn voting_period(&self) -> Duration {
        self.voting_period
    }

    /// Canonical id of a batch; pure
    pub fn hash(batch: &ActionBatch, description_hash: &DescriptionHash) -> ProposalId {
        hash_proposal(batch, description_hash)
    }

    /// Create the record for `batch` unless it already exists
    ///
    /// The caller is responsible for the membership check.
    pub fn propose(
        &mut self,
        proposer: Address,
        batch: &ActionBatch,
        description_hash: &DescriptionHash,
        now: DateTime<Utc>,
        journal: &mut EventJournal,
    ) -> CollectorResult<ProposalId> {
        let id = Self::hash(batch, description_hash);

        if let Some(existing) = self.proposals.get(&id) {
            debug!(
                proposal = %id,
                proposer = %proposer,
                original_proposer = %existing.proposer,
                "Proposal already registered"
            );
            return Ok(id);
        }

        let deadline = now.checked_add_signed(self.voting_period).ok_or_else(|| {
            CollectorError::InvalidConfig(format!(
                "voting period of {}s overflows the deadline from {}",
                self.voting_period.num_seconds(),
                now
            ))
        })?;
        self.proposals
            .insert(id, ProposalRecord::new(id, proposer, now, deadline));

        info!(
            proposal = %id,
            proposer = %proposer,
            actions = batch.len(),
            deadline = %deadline,
            "Proposal created"
        );

        journal.record(
            now,
            CollectorEvent::ProposalCreated {
                proposal_id: id,
                proposer,
                deadline,
            },
        );

        Ok(id)
    }

    /// Record for `id`, if registered
    pub fn get(&self, id: &ProposalId) -> Option<&ProposalRecord> {
        self.proposals.get(id)
    }

    /// Mutable record for `id`, if registered
    pub fn get_mut(&mut self, id: &ProposalId) -> Option<&mut ProposalRecord> {
        self.proposals.get_mut(id)
    }

    /// Record for `id`, or `UnknownProposal`
    pub fn require(&self, id: &ProposalId) -> CollectorResult<&ProposalRecord> {
        self.proposals
            .get(id)
            .ok_or(CollectorError::UnknownProposal(*id))
    }

    /// Replace records wholesale; used to commit a staged batch
    pub fn commit(&mut self, records: impl IntoIterator<Item = ProposalRecord>) {
        for record in records {
            self.proposals.insert(record.id, record);
        }
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &ProposalId) -> bool {
        self.proposals.contains_key(id)
    }

    /// Number of registered proposals
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Whether no proposal is registered
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// All records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ProposalRecord> {
        self.proposals.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector_types::{Action, Calldata, VoteType, Wei};

    fn batch() -> ActionBatch {
        ActionBatch::new(vec![Action::new(
            Address([9; 20]),
            Wei::zero(),
            Calldata::new(vec![0xde, 0xad]),
        )])
    }

    #[test]
    fn test_propose_creates_fresh_record() {
        let mut registry = ProposalRegistry::new(Duration::days(3));
        let mut journal = EventJournal::new();
        let now = Utc::now();
        let proposer = Address([1; 20]);

        let id = registry
            .propose(proposer, &batch(), &DescriptionHash([4; 32]), now, &mut journal)
            .unwrap();

        let record = registry.require(&id).unwrap();
        assert_eq!(record.proposer, proposer);
        assert_eq!(record.votes_cast(), 0);
        assert!(!record.executed);
        assert_eq!(record.deadline, now + Duration::days(3));
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_repropose_keeps_votes_and_deadline() {
        let mut registry = ProposalRegistry::new(Duration::days(3));
        let mut journal = EventJournal::new();
        let now = Utc::now();
        let desc = DescriptionHash([4; 32]);

        let id = registry
            .propose(Address([1; 20]), &batch(), &desc, now, &mut journal)
            .unwrap();
        registry
            .get_mut(&id)
            .unwrap()
            .record_vote(Address([1; 20]), VoteType::For);

        let later = now + Duration::days(1);
        let again = registry
            .propose(Address([2; 20]), &batch(), &desc, later, &mut journal)
            .unwrap();

        assert_eq!(id, again);
        let record = registry.require(&id).unwrap();
        assert_eq!(record.for_votes, 1);
        assert_eq!(record.proposer, Address([1; 20]));
        assert_eq!(record.deadline, now + Duration::days(3));
        assert_eq!(registry.len(), 1);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_deadline_past_calendar_end_rejected() {
        let mut registry = ProposalRegistry::new(Duration::days(3));
        let mut journal = EventJournal::new();
        let now = DateTime::<Utc>::MAX_UTC - Duration::days(1);

        let err = registry
            .propose(Address([1; 20]), &batch(), &DescriptionHash([4; 32]), now, &mut journal)
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_CONFIG");
        assert!(registry.is_empty());
        assert!(journal.is_empty());
    }

    #[test]
    fn test_unknown_proposal() {
        let registry = ProposalRegistry::new(Duration::days(3));
        assert!(matches!(
            registry.require(&ProposalId([1; 32])),
            Err(CollectorError::UnknownProposal(_))
        ));
    }

    #[test]
    fn test_hash_matches_crypto() {
        let desc = DescriptionHash([4; 32]);
        assert_eq!(ProposalRegistry::hash(&batch(), &desc), hash_proposal(&batch(), &desc));
    }
}
