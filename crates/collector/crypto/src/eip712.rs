//! EIP-712 typed-data hashing for ballots
//!
//! A ballot is the typed struct `Ballot(uint256 proposalId,uint8 support)`
//! signed under the domain `EIP712Domain(string name,uint256 chainId,address verifyingContract)`.
//! Binding the chain id and engine address into the digest keeps a ballot
//! from being replayed against another deployment.

use collector_types::{Address, CollectorConfig, ProposalId};

use crate::abi::{word_from_address, word_from_u128, word_from_u64, AbiWord};
use crate::keccak::{keccak256, keccak256_concat};

/// EIP-712 domain type string
pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";
/// EIP-712 ballot type string
pub const BALLOT_TYPE: &str = "Ballot(uint256 proposalId,uint8 support)";

/// Keccak-256 of [`DOMAIN_TYPE`]
pub fn domain_typehash() -> AbiWord {
    keccak256(DOMAIN_TYPE.as_bytes())
}

/// Keccak-256 of [`BALLOT_TYPE`]
pub fn ballot_typehash() -> AbiWord {
    keccak256(BALLOT_TYPE.as_bytes())
}

/// Signing domain of one engine deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip712Domain {
    /// Engine name
    pub name: String,
    /// Chain the engine runs on
    pub chain_id: u64,
    /// Address of the engine itself
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn new(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: name.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Domain of the engine deployed at `engine` under `config`
    pub fn for_engine(config: &CollectorConfig, engine: Address) -> Self {
        Self::new(config.name.clone(), config.chain_id, engine)
    }

    /// EIP-712 domain separator
    pub fn separator(&self) -> AbiWord {
        let name_hash = keccak256(self.name.as_bytes());
        keccak256_concat(&[
            &domain_typehash(),
            &name_hash,
            &word_from_u64(self.chain_id),
            &word_from_address(&self.verifying_contract),
        ])
    }

    /// `keccak256(0x19 0x01 ‖ domainSeparator ‖ hashStruct(Ballot))`
    pub fn ballot_digest(&self, proposal_id: &ProposalId, support: u8) -> AbiWord {
        let struct_hash = ballot_struct_hash(proposal_id, support);
        keccak256_concat(&[&[0x19, 0x01], &self.separator(), &struct_hash])
    }
}

/// `hashStruct(Ballot)` for one ballot
pub fn ballot_struct_hash(proposal_id: &ProposalId, support: u8) -> AbiWord {
    keccak256_concat(&[
        &ballot_typehash(),
        &proposal_id.0,
        &word_from_u128(support as u128),
    ])
}
