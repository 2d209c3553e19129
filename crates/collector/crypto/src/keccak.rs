use collector_types::DescriptionHash;
use sha3::{Digest, Keccak256};

/// Keccak-256 (the pre-standard SHA-3 variant used by Ethereum)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Hash several byte strings as if concatenated
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Hash a human-readable proposal description
pub fn description_hash(description: &str) -> DescriptionHash {
    DescriptionHash(keccak256(description.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_concat_matches_single_pass() {
        assert_eq!(keccak256_concat(&[b"ab", b"c"]), keccak256(b"abc"));
    }

    #[test]
    fn test_description_hash_distinguishes_text() {
        assert_ne!(description_hash("Buying NFT 1"), description_hash("Buying NFT 2"));
        assert_eq!(description_hash("x"), description_hash("x"));
    }
}
