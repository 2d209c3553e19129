//! Canonical ABI encoding
//!
//! Only the subset the engine needs: 32-byte static words, dynamic arrays
//! of static words, `bytes[]`, and `selector ‖ words` call data. Layout
//! follows the Solidity contract ABI so ids and digests match what
//! standard client tooling computes.

use collector_types::{Address, Calldata, Wei};

use crate::error::CryptoError;
use crate::keccak::keccak256;

/// One 32-byte ABI slot
pub type AbiWord = [u8; 32];

/// Width of an ABI slot
pub const WORD: usize = 32;

pub fn word_from_address(address: &Address) -> AbiWord {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(&address.0);
    word
}

pub fn word_from_u128(value: u128) -> AbiWord {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn word_from_u64(value: u64) -> AbiWord {
    word_from_u128(value as u128)
}

pub fn word_from_wei(value: Wei) -> AbiWord {
    word_from_u128(value.0)
}

/// Decode an address slot; the upper 12 bytes must be zero
pub fn address_from_word(word: &AbiWord) -> Result<Address, CryptoError> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(CryptoError::MalformedCalldata(
            "address word has dirty high bytes".into(),
        ));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address(bytes))
}

/// Decode a uint slot that must fit in 128 bits
pub fn u128_from_word(word: &AbiWord) -> Result<u128, CryptoError> {
    if word[..16].iter().any(|b| *b != 0) {
        return Err(CryptoError::MalformedCalldata(
            "integer does not fit in 128 bits".into(),
        ));
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(bytes))
}

/// Decode a uint slot, clamping anything wider than 128 bits to `u128::MAX`
pub fn u128_saturating_from_word(word: &AbiWord) -> u128 {
    u128_from_word(word).unwrap_or(u128::MAX)
}

/// Round a byte length up to a whole number of slots
fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Encode `T[]` where every element is a single static word
pub fn encode_word_array(words: &[AbiWord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD * (words.len() + 1));
    out.extend_from_slice(&word_from_u64(words.len() as u64));
    for word in words {
        out.extend_from_slice(word);
    }
    out
}

/// Encode a single `bytes` value: length then right-padded data
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD + padded_len(data.len()));
    out.extend_from_slice(&word_from_u64(data.len() as u64));
    out.extend_from_slice(data);
    out.resize(WORD + padded_len(data.len()), 0);
    out
}

/// Encode `bytes[]`: length, per-element offsets, then each element
pub fn encode_bytes_array(items: &[Calldata]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = items.iter().map(|c| encode_bytes(c.as_bytes())).collect();

    let mut out = Vec::new();
    out.extend_from_slice(&word_from_u64(items.len() as u64));

    // Offsets are relative to the first slot after the length word
    let mut offset = WORD * items.len();
    for item in &encoded {
        out.extend_from_slice(&word_from_u64(offset as u64));
        offset += item.len();
    }
    for item in encoded {
        out.extend_from_slice(&item);
    }
    out
}

/// A top-level `abi.encode(...)` argument
pub enum Token<'a> {
    /// A single static word
    Word(AbiWord),
    /// An already-encoded dynamic tail
    Dynamic(&'a [u8]),
}

/// `abi.encode` of a tuple of static words and pre-encoded dynamic values
pub fn encode_tuple(tokens: &[Token<'_>]) -> Vec<u8> {
    let head_len = WORD * tokens.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Word(word) => head.extend_from_slice(word),
            Token::Dynamic(data) => {
                head.extend_from_slice(&word_from_u64((head_len + tail.len()) as u64));
                tail.extend_from_slice(data);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// First four bytes of the Keccak-256 of a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `selector ‖ words` call data for a function with static arguments
pub fn encode_call(selector: [u8; 4], args: &[AbiWord]) -> Calldata {
    let mut out = Vec::with_capacity(4 + WORD * args.len());
    out.extend_from_slice(&selector);
    for arg in args {
        out.extend_from_slice(arg);
    }
    Calldata::new(out)
}

/// Split static call data into its selector and argument words
pub fn decode_call(payload: &[u8]) -> Result<([u8; 4], Vec<AbiWord>), CryptoError> {
    if payload.len() < 4 {
        return Err(CryptoError::MalformedCalldata(format!(
            "call data too short: {} bytes",
            payload.len()
        )));
    }
    let body = &payload[4..];
    if body.len() % WORD != 0 {
        return Err(CryptoError::MalformedCalldata(format!(
            "argument area of {} bytes is not word aligned",
            body.len()
        )));
    }

    let selector = [payload[0], payload[1], payload[2], payload[3]];
    let words = body
        .chunks_exact(WORD)
        .map(|chunk| {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            word
        })
        .collect();
    Ok((selector, words))
}
