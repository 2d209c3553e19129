//! Proposal identity and call-data commands

use crate::error::{CliError, CliResult};
use crate::output::{emit, heading, row, OutputFormat};
use collector_crypto::{description_hash, hash_proposal, BuyFromMarketplace};
use collector_types::{ActionBatch, Address, Calldata, DescriptionHash, ProposalId, Wei};
use serde::Serialize;

#[derive(Serialize)]
struct ProposalHash {
    proposal_id: ProposalId,
    description_hash: DescriptionHash,
    actions: usize,
}

/// Resolve `--description` / `--description-hash` into a hash
pub fn resolve_description(
    description: Option<String>,
    hash: Option<DescriptionHash>,
) -> CliResult<DescriptionHash> {
    match (description, hash) {
        (Some(text), None) => Ok(description_hash(&text)),
        (None, Some(hash)) => Ok(hash),
        (Some(_), Some(_)) => Err(CliError::InvalidArgument(
            "pass either --description or --description-hash, not both".into(),
        )),
        (None, None) => Err(CliError::InvalidArgument(
            "one of --description or --description-hash is required".into(),
        )),
    }
}

pub fn hash(
    targets: Vec<Address>,
    values: Vec<Wei>,
    payloads: Vec<Calldata>,
    description: Option<String>,
    description_hash: Option<DescriptionHash>,
    format: OutputFormat,
) -> CliResult<()> {
    let batch = ActionBatch::from_parts(targets, values, payloads)?;
    let desc = resolve_description(description, description_hash)?;

    let result = ProposalHash {
        proposal_id: hash_proposal(&batch, &desc),
        description_hash: desc,
        actions: batch.len(),
    };

    emit(format, &result, |r| {
        heading("Proposal");
        row("Proposal id", r.proposal_id);
        row("Description hash", r.description_hash);
        row("Actions", r.actions);
    })
}

pub fn describe(text: &str, format: OutputFormat) -> CliResult<()> {
    let hash = description_hash(text);
    emit(format, &serde_json::json!({ "description_hash": hash }), |_| {
        println!("{}", hash);
    })
}

pub fn encode_buy(
    marketplace: Address,
    collection: Address,
    asset_id: u128,
    max_price: Wei,
    format: OutputFormat,
) -> CliResult<()> {
    let payload = BuyFromMarketplace {
        marketplace,
        collection,
        asset_id,
        max_price,
    }
    .encode();

    emit(format, &serde_json::json!({ "payload": payload }), |_| {
        println!("{}", payload);
    })
}
