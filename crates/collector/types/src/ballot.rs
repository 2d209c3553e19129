//! Ballots: off-line signed votes
//!
//! A ballot is signed away from the engine and may be submitted by anyone.
//! The engine never sees key material, only the `(v, r, s)` triple.

use crate::bytes::{decode_hex, encode_hex};
use crate::{Address, CollectorError, HexError, ProposalId, Word};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a member votes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteType {
    Against,
    For,
    Abstain,
}

impl VoteType {
    /// Wire value signed into the ballot
    pub fn as_u8(self) -> u8 {
        match self {
            VoteType::Against => 0,
            VoteType::For => 1,
            VoteType::Abstain => 2,
        }
    }
}

impl TryFrom<u8> for VoteType {
    type Error = CollectorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteType::Against),
            1 => Ok(VoteType::For),
            2 => Ok(VoteType::Abstain),
            other => Err(CollectorError::InvalidVoteType(other)),
        }
    }
}

impl From<VoteType> for u8 {
    fn from(vote: VoteType) -> Self {
        vote.as_u8()
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Against => write!(f, "against"),
            VoteType::For => write!(f, "for"),
            VoteType::Abstain => write!(f, "abstain"),
        }
    }
}

impl FromStr for VoteType {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "against" | "0" => Ok(VoteType::Against),
            "for" | "1" => Ok(VoteType::For),
            "abstain" | "2" => Ok(VoteType::Abstain),
            other => other
                .parse::<u8>()
                .map_err(|_| CollectorError::InvalidVoteType(u8::MAX))
                .and_then(VoteType::try_from),
        }
    }
}

/// A recoverable ECDSA signature in `(v, r, s)` form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BallotSignature {
    /// Recovery byte, conventionally 27 or 28
    pub v: u8,
    pub r: Word,
    pub s: Word,
}

impl BallotSignature {
    pub fn new(v: u8, r: Word, s: Word) -> Self {
        Self { v, r, s }
    }

    /// Split a 65-byte `r ‖ s ‖ v` signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HexError> {
        if bytes.len() != 65 {
            return Err(HexError::WrongLength {
                expected: 65,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            r: Word::from_slice(&bytes[..32])?,
            s: Word::from_slice(&bytes[32..64])?,
            v: bytes[64],
        })
    }

    /// Concatenate as `r ‖ s ‖ v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r.0);
        out[32..64].copy_from_slice(&self.s.0);
        out[64] = self.v;
        out
    }
}

impl fmt::Display for BallotSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode_hex(&self.to_bytes()))
    }
}

impl FromStr for BallotSignature {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&decode_hex(s)?)
    }
}

/// A signed vote on one proposal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub proposal_id: ProposalId,
    /// Raw support byte as signed; validated after the signer is known
    pub support: u8,
    pub signature: BallotSignature,
}

impl Ballot {
    pub fn new(proposal_id: ProposalId, support: u8, signature: BallotSignature) -> Self {
        Self {
            proposal_id,
            support,
            signature,
        }
    }
}

/// A ballot submitted by a third party on the signer's behalf
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayedBallot {
    pub ballot: Ballot,
    /// Beneficiary declared for relaying this ballot
    pub tip: Address,
}

impl RelayedBallot {
    pub fn new(ballot: Ballot, tip: Address) -> Self {
        Self { ballot, tip }
    }
}
