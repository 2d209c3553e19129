//! Membership Ledger - who has joined the collector
//!
//! Joining takes exactly one contribution of the configured stake. Members
//! are never removed.

use chrono::{DateTime, Utc};
use collector_types::{Address, CollectorError, CollectorEvent, CollectorResult, EventJournal, Wei};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// The set of members and the stake required to join
#[derive(Clone, Debug)]
pub struct MembershipLedger {
    members: BTreeSet<Address>,
    join_stake: Wei,
}

impl MembershipLedger {
    /// Empty ledger requiring exactly `join_stake`
    pub fn new(join_stake: Wei) -> Self {
        Self {
            members: BTreeSet::new(),
            join_stake,
        }
    }

    /// Exact contribution required to join
    pub fn join_stake(&self) -> Wei {
        self.join_stake
    }

    /// Validate a join without recording it
    pub fn check_join(&self, who: &Address, contribution: Wei) -> CollectorResult<()> {
        if contribution != self.join_stake {
            return Err(CollectorError::WrongContributionAmount {
                required: self.join_stake,
                provided: contribution,
            });
        }
        if self.members.contains(who) {
            return Err(CollectorError::AlreadyMember(*who));
        }
        Ok(())
    }

    /// Admit `who` on an exact stake contribution
    pub fn join(
        &mut self,
        who: Address,
        contribution: Wei,
        now: DateTime<Utc>,
        journal: &mut EventJournal,
    ) -> CollectorResult<()> {
        if let Err(e) = self.check_join(&who, contribution) {
            warn!(member = %who, contribution = %contribution, code = e.code(), "Join rejected");
            return Err(e);
        }

        self.members.insert(who);

        info!(member = %who, members = self.members.len(), "Member joined");

        journal.record(
            now,
            CollectorEvent::MemberJoined {
                member: who,
                contribution,
            },
        );

        Ok(())
    }

    /// Whether `who` has joined
    pub fn is_member(&self, who: &Address) -> bool {
        self.members.contains(who)
    }

    /// Fail with `NotAMember` unless `who` has joined
    pub fn require_member(&self, who: &Address) -> CollectorResult<()> {
        if self.is_member(who) {
            Ok(())
        } else {
            Err(CollectorError::NotAMember(*who))
        }
    }

    /// Number of members
    pub fn member_count(&self) -> u64 {
        self.members.len() as u64
    }

    /// Members in address order
    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MembershipLedger, EventJournal) {
        (MembershipLedger::new(Wei::ether(1)), EventJournal::new())
    }

    #[test]
    fn test_join_with_exact_stake() {
        let (mut ledger, mut journal) = setup();
        let who = Address([1; 20]);

        ledger.join(who, Wei::ether(1), Utc::now(), &mut journal).unwrap();

        assert!(ledger.is_member(&who));
        assert_eq!(ledger.member_count(), 1);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_wrong_amounts_rejected() {
        let (mut ledger, mut journal) = setup();
        let who = Address([1; 20]);

        for amount in [Wei::zero(), Wei(Wei::ether(1).0 - 1), Wei::ether(2)] {
            let err = ledger.join(who, amount, Utc::now(), &mut journal).unwrap_err();
            assert!(matches!(err, CollectorError::WrongContributionAmount { .. }));
        }
        assert!(!ledger.is_member(&who));
        assert!(journal.is_empty());
    }

    #[test]
    fn test_second_join_rejected() {
        let (mut ledger, mut journal) = setup();
        let who = Address([1; 20]);

        ledger.join(who, Wei::ether(1), Utc::now(), &mut journal).unwrap();
        let err = ledger.join(who, Wei::ether(1), Utc::now(), &mut journal).unwrap_err();

        assert!(matches!(err, CollectorError::AlreadyMember(a) if a == who));
        assert_eq!(ledger.member_count(), 1);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_amount_checked_before_membership() {
        let (mut ledger, mut journal) = setup();
        let who = Address([1; 20]);

        ledger.join(who, Wei::ether(1), Utc::now(), &mut journal).unwrap();
        let err = ledger.check_join(&who, Wei::ether(2)).unwrap_err();
        assert_eq!(err.code(), "WRONG_CONTRIBUTION_AMOUNT");
    }

    #[test]
    fn test_require_member() {
        let (ledger, _) = setup();
        assert!(matches!(
            ledger.require_member(&Address([7; 20])),
            Err(CollectorError::NotAMember(_))
        ));
    }
}
