//! The Collector - main entry point composing all components
//!
//! Every public operation either commits all of its effects or returns an
//! error having changed nothing. Operations are applied serially through
//! `&mut self`.

use chrono::{DateTime, Utc};
use collector_crypto::Eip712Domain;
use collector_types::{
    ActionBatch, Address, Ballot, BallotSignature, Calldata, CollectorConfig, CollectorError,
    CollectorEvent, CollectorResult, DescriptionHash, EventJournal, ExecutionRecord, ProposalId,
    ProposalRecord, ProposalState, ProposalView, RelayedBallot, Wei, Word,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ballot_authenticator::BallotAuthenticator;
use crate::clock::{Clock, SystemClock};
use crate::execution_engine::{CallEnvironment, ExecutionEngine};
use crate::marketplace::NftMarketplace;
use crate::membership_ledger::MembershipLedger;
use crate::proposal_registry::ProposalRegistry;
use crate::tally::Tally;

/// The Collector engine; every operation goes through here
pub struct Collector {
    config: CollectorConfig,
    address: Address,
    clock: Arc<dyn Clock>,
    members: MembershipLedger,
    registry: ProposalRegistry,
    authenticator: BallotAuthenticator,
    tally: Tally,
    env: CallEnvironment,
    journal: EventJournal,
}

impl Collector {
    /// Create an engine deployed at `address`
    pub fn new(config: CollectorConfig, address: Address, clock: Arc<dyn Clock>) -> CollectorResult<Self> {
        config.validate()?;

        let domain = Eip712Domain::for_engine(&config, address);

        info!(
            engine = %address,
            name = %config.name,
            chain_id = config.chain_id,
            join_stake = %config.join_stake,
            voting_period_secs = config.voting_period_secs,
            "Collector created"
        );

        Ok(Self {
            members: MembershipLedger::new(config.join_stake),
            registry: ProposalRegistry::new(config.voting_period()),
            authenticator: BallotAuthenticator::new(domain),
            tally: Tally::new(config.quorum),
            env: CallEnvironment::new(address),
            journal: EventJournal::new(),
            config,
            address,
            clock,
        })
    }

    /// Create an engine driven by wall-clock time
    pub fn with_system_clock(config: CollectorConfig, address: Address) -> CollectorResult<Self> {
        Self::new(config, address, Arc::new(SystemClock))
    }

    /// Address the engine is deployed at
    pub fn address(&self) -> Address {
        self.address
    }

    /// Configuration the engine was created with
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Signing domain members must sign ballots under
    pub fn domain(&self) -> &Eip712Domain {
        self.authenticator.domain()
    }

    /// Current engine time
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // --- Membership ---

    /// Join by contributing exactly the configured stake
    pub fn become_member(&mut self, caller: Address, contribution: Wei) -> CollectorResult<()> {
        let now = self.now();
        self.members.join(caller, contribution, now, &mut self.journal)?;
        self.env.credit(contribution);
        Ok(())
    }

    // --- Proposals ---

    /// Canonical id of a batch; pure
    pub fn hash_proposal(&self, batch: &ActionBatch, description_hash: &DescriptionHash) -> ProposalId {
        ProposalRegistry::hash(batch, description_hash)
    }

    /// Register a proposal, or address the existing one for the same batch
    pub fn propose(
        &mut self,
        caller: Address,
        batch: &ActionBatch,
        description_hash: &DescriptionHash,
    ) -> CollectorResult<ProposalId> {
        if let Err(e) = self.members.require_member(&caller) {
            warn!(proposer = %caller, "Proposal rejected: not a member");
            return Err(e);
        }
        let now = self.now();
        self.registry
            .propose(caller, batch, description_hash, now, &mut self.journal)
    }

    /// [`propose`](Self::propose) taking the three parallel arrays
    pub fn propose_parts(
        &mut self,
        caller: Address,
        targets: Vec<Address>,
        values: Vec<Wei>,
        payloads: Vec<Calldata>,
        description_hash: &DescriptionHash,
    ) -> CollectorResult<ProposalId> {
        let batch = ActionBatch::from_parts(targets, values, payloads)?;
        self.propose(caller, &batch, description_hash)
    }

    // --- Voting ---

    fn check_relayer(&self, relayer: &Address) -> CollectorResult<()> {
        if self.config.members_only_relay && !self.members.is_member(relayer) {
            return Err(CollectorError::NotAMember(*relayer));
        }
        Ok(())
    }

    /// Count one signed ballot submitted by `relayer`; returns the signer
    pub fn cast_vote_by_sig(&mut self, relayer: Address, ballot: &Ballot) -> CollectorResult<Address> {
        let now = self.now();
        let result = self.check_relayer(&relayer).and_then(|_| {
            self.authenticator.verify(
                ballot,
                &self.members,
                self.registry.get(&ballot.proposal_id),
                now,
            )
        });
        let vote = match result {
            Ok(vote) => vote,
            Err(e) => {
                warn!(proposal = %ballot.proposal_id, relayer = %relayer, code = e.code(), "Ballot rejected");
                return Err(e);
            }
        };

        let record = self
            .registry
            .get_mut(&vote.proposal_id)
            .ok_or(CollectorError::UnknownProposal(vote.proposal_id))?;
        Tally::count(record, &vote)?;

        info!(proposal = %vote.proposal_id, voter = %vote.voter, support = %vote.support, "Vote cast");

        self.journal.record(
            now,
            CollectorEvent::VoteCast {
                proposal_id: vote.proposal_id,
                voter: vote.voter,
                support: vote.support,
            },
        );

        Ok(vote.voter)
    }

    /// [`cast_vote_by_sig`](Self::cast_vote_by_sig) taking the raw `(v, r, s)` triple
    pub fn cast_vote_by_sig_parts(
        &mut self,
        relayer: Address,
        proposal_id: ProposalId,
        support: u8,
        v: u8,
        r: Word,
        s: Word,
    ) -> CollectorResult<Address> {
        let ballot = Ballot::new(proposal_id, support, BallotSignature::new(v, r, s));
        self.cast_vote_by_sig(relayer, &ballot)
    }

    /// Count a batch of relayed ballots, all or nothing
    ///
    /// Ballots are verified in order against staged copies of the
    /// proposals they touch, so a duplicate signer later in the batch is
    /// caught. The first failure rejects the whole batch as
    /// `BallotRejected { index, .. }`. Returns the signers in order.
    pub fn vote_by_sigs(&mut self, relayer: Address, ballots: &[RelayedBallot]) -> CollectorResult<Vec<Address>> {
        let now = self.now();
        if let Err(e) = self.check_relayer(&relayer) {
            warn!(relayer = %relayer, "Ballot batch rejected: relayer not a member");
            return Err(e);
        }

        let mut staged: HashMap<ProposalId, ProposalRecord> = HashMap::new();
        let mut events = Vec::with_capacity(ballots.len() * 2);
        let mut voters = Vec::with_capacity(ballots.len());

        for (index, relayed) in ballots.iter().enumerate() {
            let ballot = &relayed.ballot;
            let id = ballot.proposal_id;

            let current = staged.get(&id).or_else(|| self.registry.get(&id));
            let vote = self
                .authenticator
                .verify(ballot, &self.members, current, now)
                .and_then(|vote| {
                    if !staged.contains_key(&id) {
                        let record = self.registry.require(&id)?.clone();
                        staged.insert(id, record);
                    }
                    let record = staged
                        .get_mut(&id)
                        .ok_or(CollectorError::UnknownProposal(id))?;
                    Tally::count(record, &vote)?;
                    Ok(vote)
                })
                .map_err(|source| CollectorError::BallotRejected {
                    index,
                    source: Box::new(source),
                });

            let vote = match vote {
                Ok(vote) => vote,
                Err(e) => {
                    warn!(
                        relayer = %relayer,
                        index,
                        code = e.root().code(),
                        "Ballot batch rejected"
                    );
                    return Err(e);
                }
            };

            events.push(CollectorEvent::VoteCast {
                proposal_id: id,
                voter: vote.voter,
                support: vote.support,
            });
            events.push(CollectorEvent::BallotRelayed {
                proposal_id: id,
                signer: vote.voter,
                relayer,
                beneficiary: relayed.tip,
            });
            voters.push(vote.voter);
        }

        self.registry.commit(staged.into_values());
        self.journal.extend(now, events);

        info!(relayer = %relayer, ballots = voters.len(), "Ballot batch committed");

        Ok(voters)
    }

    /// [`vote_by_sigs`](Self::vote_by_sigs) taking six parallel arrays
    #[allow(clippy::too_many_arguments)]
    pub fn vote_by_sigs_parts(
        &mut self,
        relayer: Address,
        proposal_ids: &[ProposalId],
        supports: &[u8],
        vs: &[u8],
        rs: &[Word],
        ss: &[Word],
        tips: &[Address],
    ) -> CollectorResult<Vec<Address>> {
        let n = proposal_ids.len();
        if [supports.len(), vs.len(), rs.len(), ss.len(), tips.len()]
            .iter()
            .any(|len| *len != n)
        {
            return Err(CollectorError::LengthMismatch(format!(
                "{} proposal ids, {} supports, {} vs, {} rs, {} ss, {} tips",
                n,
                supports.len(),
                vs.len(),
                rs.len(),
                ss.len(),
                tips.len()
            )));
        }

        let ballots: Vec<RelayedBallot> = (0..n)
            .map(|i| {
                RelayedBallot::new(
                    Ballot::new(
                        proposal_ids[i],
                        supports[i],
                        BallotSignature::new(vs[i], rs[i], ss[i]),
                    ),
                    tips[i],
                )
            })
            .collect();
        self.vote_by_sigs(relayer, &ballots)
    }

    // --- Execution ---

    /// Run a succeeded proposal's batch exactly once
    ///
    /// Checks, in order: the proposal exists, its window has closed, it
    /// succeeded, and it has not run yet. A failing action rolls back the
    /// whole batch and leaves the proposal executable.
    pub fn execute(
        &mut self,
        caller: Address,
        batch: &ActionBatch,
        description_hash: &DescriptionHash,
    ) -> CollectorResult<ExecutionRecord> {
        let now = self.now();
        let id = ProposalRegistry::hash(batch, description_hash);

        if let Err(e) = self.check_executable(&id, now) {
            warn!(proposal = %id, executor = %caller, code = e.code(), "Execution refused");
            return Err(e);
        }

        let (staged, outcomes) = match ExecutionEngine::run(&self.env, batch) {
            Ok(result) => result,
            Err(e) => {
                warn!(proposal = %id, executor = %caller, error = %e, "Execution rolled back");
                return Err(e);
            }
        };

        let record = self
            .registry
            .get_mut(&id)
            .ok_or(CollectorError::UnknownProposal(id))?;
        record.executed = true;
        self.env = staged;

        let execution = ExecutionRecord {
            proposal_id: id,
            executor: caller,
            executed_at: now,
            outcomes,
        };

        info!(
            proposal = %id,
            executor = %caller,
            actions = execution.outcomes.len(),
            pool = %self.env.pool(),
            "Proposal executed"
        );

        self.journal
            .record(now, CollectorEvent::ProposalExecuted(execution.clone()));

        Ok(execution)
    }

    /// [`execute`](Self::execute) taking the three parallel arrays
    pub fn execute_parts(
        &mut self,
        caller: Address,
        targets: Vec<Address>,
        values: Vec<Wei>,
        payloads: Vec<Calldata>,
        description_hash: &DescriptionHash,
    ) -> CollectorResult<ExecutionRecord> {
        let batch = ActionBatch::from_parts(targets, values, payloads)?;
        self.execute(caller, &batch, description_hash)
    }

    fn check_executable(&self, id: &ProposalId, now: DateTime<Utc>) -> CollectorResult<()> {
        let record = self.registry.require(id)?;
        if record.is_open(now) {
            return Err(CollectorError::VotingOpen {
                proposal_id: *id,
                deadline: record.deadline,
            });
        }
        if !self.tally.succeeded(record, self.members.member_count(), now) {
            return Err(CollectorError::ProposalHasNotSucceeded(*id));
        }
        if record.executed {
            return Err(CollectorError::AlreadyExecuted(*id));
        }
        Ok(())
    }

    // --- Collaborators ---

    /// Make a marketplace reachable from executed actions
    pub fn register_marketplace(&mut self, marketplace: Box<dyn NftMarketplace>) {
        info!(marketplace = %marketplace.address(), "Marketplace registered");
        self.env.register_marketplace(marketplace);
    }

    /// Registered marketplace at `address`, if any
    pub fn marketplace(&self, address: &Address) -> Option<&dyn NftMarketplace> {
        self.env.marketplace(address)
    }

    /// Current owner of an asset on a registered marketplace
    pub fn owner_of(&self, marketplace: &Address, collection: &Address, asset_id: u128) -> Option<Address> {
        self.env
            .marketplace(marketplace)
            .and_then(|m| m.owner_of(collection, asset_id))
    }

    // --- Queries ---

    /// Read model of a proposal
    pub fn proposal(&self, id: &ProposalId) -> Option<ProposalView> {
        self.registry.get(id).map(ProposalRecord::view)
    }

    /// Lifecycle state of a proposal at the current time
    pub fn proposal_state(&self, id: &ProposalId) -> Option<ProposalState> {
        let now = self.now();
        self.registry
            .get(id)
            .map(|r| self.tally.state(r, self.members.member_count(), now))
    }

    /// Whether `who` has a counted vote on `id`
    pub fn has_voted(&self, id: &ProposalId, who: &Address) -> bool {
        self.registry
            .get(id)
            .map(|r| r.has_voted(who))
            .unwrap_or(false)
    }

    /// Whether `who` has joined
    pub fn is_member(&self, who: &Address) -> bool {
        self.members.is_member(who)
    }

    /// Number of members
    pub fn member_count(&self) -> u64 {
        self.members.member_count()
    }

    /// Number of registered proposals
    pub fn proposal_count(&self) -> usize {
        self.registry.len()
    }

    /// Pooled balance available to executed actions
    pub fn pool_balance(&self) -> Wei {
        self.env.pool()
    }

    /// Plain transfers paid out to `recipient` by executed proposals
    pub fn payout_of(&self, recipient: &Address) -> Wei {
        self.env.payout_of(recipient)
    }

    /// Append-only record of committed effects
    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("address", &self.address)
            .field("members", &self.members.member_count())
            .field("proposals", &self.registry.len())
            .field("pool", &self.env.pool())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;
    use collector_crypto::BallotSigner;
    use collector_types::Action;

    const ENGINE: Address = Address([0xee; 20]);

    fn setup() -> (Collector, ManualClock) {
        let clock = ManualClock::starting_now();
        let collector = Collector::new(CollectorConfig::default(), ENGINE, Arc::new(clock.clone())).unwrap();
        (collector, clock)
    }

    fn join(c: &mut Collector) -> BallotSigner {
        let signer = BallotSigner::random();
        c.become_member(signer.address(), Wei::ether(1)).unwrap();
        signer
    }

    fn transfer_batch() -> ActionBatch {
        ActionBatch::new(vec![Action::transfer(Address([0x77; 20]), Wei(5))])
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CollectorConfig::default().with_voting_period_secs(0);
        assert!(Collector::with_system_clock(config, ENGINE).is_err());
    }

    #[test]
    fn test_unbounded_voting_period_rejected() {
        let config = CollectorConfig::default().with_voting_period_secs(u64::MAX);
        let err = Collector::with_system_clock(config, ENGINE).unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_join_credits_pool() {
        let (mut c, _) = setup();
        join(&mut c);
        join(&mut c);
        assert_eq!(c.pool_balance(), Wei::ether(2));
        assert_eq!(c.member_count(), 2);
    }

    #[test]
    fn test_failed_vote_leaves_no_trace() {
        let (mut c, _) = setup();
        let member = join(&mut c);
        let desc = DescriptionHash([1; 32]);
        let id = c.propose(member.address(), &transfer_batch(), &desc).unwrap();
        let before = c.journal().len();

        let ballot = member.sign_ballot(c.domain(), id, 7).unwrap();
        assert!(c.cast_vote_by_sig(Address([1; 20]), &ballot).is_err());

        assert_eq!(c.journal().len(), before);
        assert!(!c.has_voted(&id, &member.address()));
    }

    #[test]
    fn test_batch_duplicate_signer_rejects_all() {
        let (mut c, _) = setup();
        let a = join(&mut c);
        let b = join(&mut c);
        let id = c
            .propose(a.address(), &transfer_batch(), &DescriptionHash([1; 32]))
            .unwrap();

        let tip = Address([0x71; 20]);
        let ballots = vec![
            RelayedBallot::new(b.sign_ballot(c.domain(), id, 1).unwrap(), tip),
            RelayedBallot::new(a.sign_ballot(c.domain(), id, 1).unwrap(), tip),
            RelayedBallot::new(a.sign_ballot(c.domain(), id, 0).unwrap(), tip),
        ];

        let err = c.vote_by_sigs(a.address(), &ballots).unwrap_err();

        assert!(matches!(err, CollectorError::BallotRejected { index: 2, .. }));
        assert_eq!(err.root().code(), "ALREADY_VOTED");
        assert_eq!(c.proposal(&id).unwrap().for_votes, 0);
        assert!(!c.has_voted(&id, &b.address()));
    }

    #[test]
    fn test_parts_length_mismatch() {
        let (mut c, _) = setup();
        let member = join(&mut c);

        let err = c
            .propose_parts(
                member.address(),
                vec![Address([1; 20])],
                vec![],
                vec![Calldata::empty()],
                &DescriptionHash::default(),
            )
            .unwrap_err();
        assert_eq!(err.code(), "LENGTH_MISMATCH");

        let err = c
            .vote_by_sigs_parts(member.address(), &[ProposalId::default()], &[1], &[], &[], &[], &[])
            .unwrap_err();
        assert_eq!(err.code(), "LENGTH_MISMATCH");
    }

    #[test]
    fn test_members_only_relay_by_default() {
        let (mut c, _) = setup();
        let member = join(&mut c);
        let id = c
            .propose(member.address(), &transfer_batch(), &DescriptionHash([1; 32]))
            .unwrap();
        let ballot = member.sign_ballot(c.domain(), id, 1).unwrap();

        let err = c.cast_vote_by_sig(Address([1; 20]), &ballot).unwrap_err();
        assert!(matches!(err, CollectorError::NotAMember(a) if a == Address([1; 20])));

        c.cast_vote_by_sig(member.address(), &ballot).unwrap();
        assert!(c.has_voted(&id, &member.address()));
    }

    #[test]
    fn test_rolled_back_execution_can_retry() {
        let (mut c, clock) = setup();
        let member = join(&mut c);
        let desc = DescriptionHash([2; 32]);
        // More than the pool holds
        let batch = ActionBatch::new(vec![Action::transfer(Address([0x77; 20]), Wei::ether(2))]);
        let id = c.propose(member.address(), &batch, &desc).unwrap();
        let ballot = member.sign_ballot(c.domain(), id, 1).unwrap();
        c.cast_vote_by_sig(member.address(), &ballot).unwrap();
        clock.advance(Duration::days(4));

        let err = c.execute(member.address(), &batch, &desc).unwrap_err();
        assert!(matches!(err, CollectorError::ActionFailed { index: 0, .. }));
        assert!(!c.proposal(&id).unwrap().executed);
        assert_eq!(c.proposal_state(&id), Some(ProposalState::Succeeded));
        assert_eq!(c.pool_balance(), Wei::ether(1));

        // A second member tops up the pool; one vote in two still meets quorum
        join(&mut c);
        c.execute(member.address(), &batch, &desc).unwrap();
        assert_eq!(c.payout_of(&Address([0x77; 20])), Wei::ether(2));
        assert_eq!(c.pool_balance(), Wei::zero());
        assert_eq!(c.proposal_state(&id), Some(ProposalState::Executed));
    }
}
