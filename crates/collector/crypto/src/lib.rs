//! Collector Cryptography
//!
//! Hashing and signature primitives shared by the engine and its clients:
//!
//! - [`keccak256`] and a minimal canonical ABI encoder
//! - [`hash_proposal`]: content-addressed proposal ids
//! - [`Eip712Domain`]: typed-data digests for ballots
//! - [`BallotSigner`] / [`recover_signer`]: secp256k1 signing and recovery
//! - [`BuyFromMarketplace`] / [`MarketplaceBuy`]: call data the engine dispatches
//!
//! All encodings are Ethereum-compatible, so ids and signatures produced by
//! standard wallet tooling verify here unchanged.

#![deny(unsafe_code)]

pub mod abi;
mod calls;
mod eip712;
mod error;
mod keccak;
mod proposal;
mod signer;

pub use calls::*;
pub use eip712::*;
pub use error::CryptoError;
pub use keccak::{description_hash, keccak256, keccak256_concat};
pub use proposal::hash_proposal;
pub use signer::{address_from_verifying_key, recover_signer, BallotSigner};
