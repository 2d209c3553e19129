//! Event journal: the engine's externally observable record
//!
//! Every committed operation appends exactly one entry per effect. Failed
//! calls append nothing, so the journal mirrors committed state.

use crate::{Address, ProposalId, VoteType, Wei};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one action in an executed batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Position in the batch
    pub index: usize,
    pub target: Address,
    pub value: Wei,
    /// Human-readable summary of what the call did
    pub summary: String,
}

/// Record emitted when a proposal's batch has run to completion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub proposal_id: ProposalId,
    /// Who submitted the execute call
    pub executor: Address,
    pub executed_at: DateTime<Utc>,
    pub outcomes: Vec<ActionOutcome>,
}

/// Something that happened inside the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectorEvent {
    MemberJoined {
        member: Address,
        contribution: Wei,
    },
    ProposalCreated {
        proposal_id: ProposalId,
        proposer: Address,
        deadline: DateTime<Utc>,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: Address,
        support: VoteType,
    },
    /// A ballot arrived through a relayer with a declared tip beneficiary
    BallotRelayed {
        proposal_id: ProposalId,
        signer: Address,
        relayer: Address,
        beneficiary: Address,
    },
    ProposalExecuted(ExecutionRecord),
}

impl CollectorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            CollectorEvent::MemberJoined { .. } => "member_joined",
            CollectorEvent::ProposalCreated { .. } => "proposal_created",
            CollectorEvent::VoteCast { .. } => "vote_cast",
            CollectorEvent::BallotRelayed { .. } => "ballot_relayed",
            CollectorEvent::ProposalExecuted(_) => "proposal_executed",
        }
    }
}

/// A journal entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique receipt identifier
    pub receipt_id: String,
    /// Position in the journal, starting at zero
    pub sequence: u64,
    /// Engine time at which the event was committed
    pub timestamp: DateTime<Utc>,
    pub event: CollectorEvent,
}

/// Append-only event journal
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventJournal {
    records: Vec<EventRecord>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub fn record(&mut self, timestamp: DateTime<Utc>, event: CollectorEvent) -> u64 {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            receipt_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            timestamp,
            event,
        });
        sequence
    }

    /// Append several events committed at the same instant
    pub fn extend(&mut self, timestamp: DateTime<Utc>, events: impl IntoIterator<Item = CollectorEvent>) {
        for event in events {
            self.record(timestamp, event);
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// All events of one kind, in order
    pub fn events_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a CollectorEvent> {
        self.records
            .iter()
            .map(|r| &r.event)
            .filter(move |e| e.kind() == kind)
    }

    /// Execution records for a given proposal
    pub fn executions_for(&self, proposal_id: &ProposalId) -> Vec<&ExecutionRecord> {
        self.records
            .iter()
            .filter_map(|r| match &r.event {
                CollectorEvent::ProposalExecuted(rec) if rec.proposal_id == *proposal_id => {
                    Some(rec)
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_dense() {
        let mut journal = EventJournal::new();
        let now = Utc::now();
        let a = journal.record(
            now,
            CollectorEvent::MemberJoined {
                member: Address([1; 20]),
                contribution: Wei(1),
            },
        );
        let b = journal.record(
            now,
            CollectorEvent::MemberJoined {
                member: Address([2; 20]),
                contribution: Wei(1),
            },
        );
        assert_eq!((a, b), (0, 1));
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.events_of_kind("member_joined").count(), 2);
        assert_eq!(journal.events_of_kind("vote_cast").count(), 0);
    }

    #[test]
    fn test_executions_for_filters_by_proposal() {
        let mut journal = EventJournal::new();
        let now = Utc::now();
        let record = ExecutionRecord {
            proposal_id: ProposalId([5; 32]),
            executor: Address([1; 20]),
            executed_at: now,
            outcomes: vec![],
        };
        journal.record(now, CollectorEvent::ProposalExecuted(record.clone()));

        assert_eq!(journal.executions_for(&ProposalId([5; 32])), vec![&record]);
        assert!(journal.executions_for(&ProposalId([6; 32])).is_empty());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = CollectorEvent::VoteCast {
            proposal_id: ProposalId([0; 32]),
            voter: Address([0; 20]),
            support: VoteType::For,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "vote_cast");
        assert_eq!(json["support"], "For");
    }
}
