//! In-memory end-to-end run: join, propose, vote, close, execute

use crate::error::{CliError, CliResult};
use crate::output::{emit, heading, row, OutputFormat};
use crate::settings::CliConfig;
use chrono::Duration;
use collector_crypto::{description_hash, BallotSigner, BuyFromMarketplace};
use collector_runtime::{Collector, InMemoryMarketplace, ManualClock};
use collector_types::{
    Action, ActionBatch, Address, ProposalId, ProposalState, RelayedBallot, VoteType, Wei,
};
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const MARKETPLACE: Address = Address([0x3a; 20]);
const COLLECTION: Address = Address([0x4f; 20]);
const SELLER: Address = Address([0x5e; 20]);
const ASSET_ID: u128 = 1;

#[derive(Serialize)]
struct SimulationReport {
    engine: Address,
    members: u64,
    proposal_id: ProposalId,
    support: VoteType,
    for_votes: u64,
    against_votes: u64,
    abstain_votes: u64,
    state: Option<ProposalState>,
    executed: bool,
    error_code: Option<String>,
    error: Option<String>,
    asset_owner: Option<Address>,
    pool_balance: Wei,
    events: usize,
}

pub fn run(config: &CliConfig, members: usize, support: VoteType, format: OutputFormat) -> CliResult<()> {
    if members == 0 {
        return Err(CliError::InvalidArgument("--members must be at least 1".into()));
    }

    let engine_config = config.engine.clone();
    let stake = engine_config.join_stake;
    let voting_period = engine_config.voting_period();

    let clock = ManualClock::starting_now();
    let mut collector = Collector::new(engine_config, config.engine_address, Arc::new(clock.clone()))?;
    collector.register_marketplace(Box::new(
        InMemoryMarketplace::new(MARKETPLACE).with_listing(COLLECTION, ASSET_ID, stake, SELLER),
    ));

    let signers: Vec<BallotSigner> = (0..members).map(|_| BallotSigner::random()).collect();
    for signer in &signers {
        collector.become_member(signer.address(), stake)?;
    }
    let relayer = signers[0].address();

    let buy = BuyFromMarketplace {
        marketplace: MARKETPLACE,
        collection: COLLECTION,
        asset_id: ASSET_ID,
        max_price: Wei(stake.0.saturating_mul(members as u128)),
    };
    let batch = ActionBatch::new(vec![Action::new(collector.address(), Wei::zero(), buy.encode())]);
    let desc = description_hash("Buying NFT 1");
    let id = collector.propose(relayer, &batch, &desc)?;

    let mut ballots = Vec::with_capacity(members);
    for signer in &signers {
        let ballot = signer.sign_ballot(collector.domain(), id, support.as_u8())?;
        ballots.push(RelayedBallot::new(ballot, relayer));
    }
    collector.vote_by_sigs(relayer, &ballots)?;

    clock.advance(voting_period + Duration::seconds(1));

    let outcome = collector.execute(relayer, &batch, &desc);
    info!(proposal = %id, executed = outcome.is_ok(), "Simulation finished");

    let view = collector
        .proposal(&id)
        .ok_or_else(|| CliError::InvalidArgument(format!("proposal {} vanished", id)))?;

    let report = SimulationReport {
        engine: collector.address(),
        members: collector.member_count(),
        proposal_id: id,
        support,
        for_votes: view.for_votes,
        against_votes: view.against_votes,
        abstain_votes: view.abstain_votes,
        state: collector.proposal_state(&id),
        executed: view.executed,
        error_code: outcome.as_ref().err().map(|e| e.code().to_string()),
        error: outcome.as_ref().err().map(|e| e.to_string()),
        asset_owner: collector.owner_of(&MARKETPLACE, &COLLECTION, ASSET_ID),
        pool_balance: collector.pool_balance(),
        events: collector.journal().len(),
    };

    emit(format, &report, |r| {
        heading("Collector Simulation");
        row("Engine", r.engine);
        row("Members", r.members);
        row("Proposal", r.proposal_id);
        row("Votes", format!("for {} / against {} / abstain {}", r.for_votes, r.against_votes, r.abstain_votes));
        if let Some(state) = r.state {
            row("State", state);
        }
        if r.executed {
            row("Executed", "yes".green());
        } else {
            row("Executed", "no".red());
        }
        if let Some(err) = &r.error {
            row("Refused", err.yellow());
        }
        if let Some(owner) = r.asset_owner {
            row("Asset owner", owner);
        }
        row("Pool balance", r.pool_balance);
        row("Journal events", r.events);
    })
}
