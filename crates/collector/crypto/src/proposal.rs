//! Content-addressed proposal identifiers

use collector_types::{ActionBatch, DescriptionHash, ProposalId};

use crate::abi::{
    encode_bytes_array, encode_tuple, encode_word_array, word_from_address, word_from_wei, Token,
};
use crate::keccak::keccak256;

/// `keccak256(abi.encode(address[] targets, uint256[] values, bytes[] payloads, bytes32 descriptionHash))`
///
/// Deterministic and independent of who asks or when: the same batch and
/// description always yield the same id.
pub fn hash_proposal(batch: &ActionBatch, description_hash: &DescriptionHash) -> ProposalId {
    let targets: Vec<_> = batch.actions().iter().map(|a| word_from_address(&a.target)).collect();
    let values: Vec<_> = batch.actions().iter().map(|a| word_from_wei(a.value)).collect();
    let payloads = batch.payloads();

    let targets = encode_word_array(&targets);
    let values = encode_word_array(&values);
    let payloads = encode_bytes_array(&payloads);

    let encoded = encode_tuple(&[
        Token::Dynamic(&targets),
        Token::Dynamic(&values),
        Token::Dynamic(&payloads),
        Token::Word(description_hash.0),
    ]);

    ProposalId(keccak256(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keccak::description_hash;
    use collector_types::{Action, Address, Calldata, Wei};

    fn batch() -> ActionBatch {
        ActionBatch::new(vec![Action::new(
            Address([0xaa; 20]),
            Wei::zero(),
            Calldata::new(vec![1, 2, 3, 4]),
        )])
    }

    #[test]
    fn test_hash_is_deterministic() {
        let desc = description_hash("Buying NFT 1");
        assert_eq!(hash_proposal(&batch(), &desc), hash_proposal(&batch(), &desc));
    }

    #[test]
    fn test_every_field_changes_the_id() {
        let desc = description_hash("Buying NFT 1");
        let base = hash_proposal(&batch(), &desc);

        let other_desc = hash_proposal(&batch(), &description_hash("Buying NFT 2"));
        let other_target = hash_proposal(
            &ActionBatch::new(vec![Action::new(
                Address([0xbb; 20]),
                Wei::zero(),
                Calldata::new(vec![1, 2, 3, 4]),
            )]),
            &desc,
        );
        let other_value = hash_proposal(
            &ActionBatch::new(vec![Action::new(
                Address([0xaa; 20]),
                Wei(1),
                Calldata::new(vec![1, 2, 3, 4]),
            )]),
            &desc,
        );
        let other_payload = hash_proposal(
            &ActionBatch::new(vec![Action::new(
                Address([0xaa; 20]),
                Wei::zero(),
                Calldata::new(vec![1, 2, 3, 5]),
            )]),
            &desc,
        );

        for other in [other_desc, other_target, other_value, other_payload] {
            assert_ne!(base, other);
        }
    }

    #[test]
    fn test_multi_action_vector() {
        // abi.encode of three actions, one empty and one 33-byte payload
        let batch = ActionBatch::new(vec![
            Action::new(Address([0xaa; 20]), Wei::zero(), Calldata::new(vec![1, 2, 3, 4])),
            Action::new(Address([0xbb; 20]), Wei::ether(1), Calldata::empty()),
            Action::new(Address([0xcc; 20]), Wei(12345), Calldata::new(vec![0xab; 33])),
        ]);
        let desc = description_hash("Buying NFT 1");
        assert_eq!(
            hex::encode(desc.0),
            "913c559efce86257e41176998778c6a7d130e92c9503b138b0ef2ce1c0b7f3c4"
        );
        assert_eq!(
            hex::encode(hash_proposal(&batch, &desc).0),
            "d0674524b813c869065798fb432817931d1a850f0db3c2eba879ad2c64e56bd8"
        );
    }

    #[test]
    fn test_empty_batch_hashes() {
        let id = hash_proposal(&ActionBatch::default(), &DescriptionHash::default());
        assert!(!id.is_zero());
    }
}
