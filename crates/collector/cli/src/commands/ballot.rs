//! Off-line ballot commands: digest, sign, recover

use crate::error::CliResult;
use crate::output::{emit, heading, row, OutputFormat};
use collector_crypto::{recover_signer, BallotSigner, Eip712Domain};
use collector_types::{encode_hex, Address, BallotSignature, ProposalId, Word};
use serde::Serialize;

#[derive(Serialize)]
struct DigestReport {
    name: String,
    chain_id: u64,
    verifying_contract: Address,
    domain_separator: String,
    proposal_id: ProposalId,
    support: u8,
    digest: String,
}

#[derive(Serialize)]
struct SignedBallot {
    signer: Address,
    proposal_id: ProposalId,
    support: u8,
    v: u8,
    r: Word,
    s: Word,
    signature: String,
}

#[derive(Serialize)]
struct Recovered {
    signer: Address,
}

pub fn digest(domain: &Eip712Domain, proposal_id: ProposalId, support: u8, format: OutputFormat) -> CliResult<()> {
    let report = DigestReport {
        name: domain.name.clone(),
        chain_id: domain.chain_id,
        verifying_contract: domain.verifying_contract,
        domain_separator: encode_hex(&domain.separator()),
        proposal_id,
        support,
        digest: encode_hex(&domain.ballot_digest(&proposal_id, support)),
    };

    emit(format, &report, |r| {
        heading("Ballot Digest");
        row("Domain", format!("{} (chain {})", r.name, r.chain_id));
        row("Engine", r.verifying_contract);
        row("Separator", &r.domain_separator);
        row("Proposal", r.proposal_id);
        row("Support", r.support);
        row("Digest", &r.digest);
    })
}

pub fn sign(
    domain: &Eip712Domain,
    key: &str,
    proposal_id: ProposalId,
    support: u8,
    format: OutputFormat,
) -> CliResult<()> {
    let signer = BallotSigner::from_hex(key)?;
    let ballot = signer.sign_ballot(domain, proposal_id, support)?;
    let sig = ballot.signature;

    let signed = SignedBallot {
        signer: signer.address(),
        proposal_id,
        support,
        v: sig.v,
        r: sig.r,
        s: sig.s,
        signature: sig.to_string(),
    };

    emit(format, &signed, |b| {
        heading("Signed Ballot");
        row("Signer", b.signer);
        row("Proposal", b.proposal_id);
        row("Support", b.support);
        row("v", b.v);
        row("r", b.r);
        row("s", b.s);
    })
}

pub fn recover(
    domain: &Eip712Domain,
    proposal_id: ProposalId,
    support: u8,
    signature: BallotSignature,
    format: OutputFormat,
) -> CliResult<()> {
    let digest = domain.ballot_digest(&proposal_id, support);
    let signer = recover_signer(&digest, &signature)?;

    emit(format, &Recovered { signer }, |r| {
        println!("{}", r.signer);
    })
}
