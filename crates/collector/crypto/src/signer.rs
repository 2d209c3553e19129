//! secp256k1 ballot signing and signer recovery

use collector_types::{Address, Ballot, BallotSignature, ProposalId, Word};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::eip712::Eip712Domain;
use crate::error::CryptoError;
use crate::keccak::keccak256;

/// Ethereum-style address of a public key: last 20 bytes of the Keccak-256
/// of the uncompressed point without its prefix byte
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address(bytes)
}

/// A member's signing key
#[derive(Clone)]
pub struct BallotSigner {
    key: SigningKey,
    address: Address,
}

impl BallotSigner {
    fn from_key(key: SigningKey) -> Self {
        let address = address_from_verifying_key(key.verifying_key());
        Self { key, address }
    }

    /// Generate a fresh key from the OS RNG
    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut rand::rngs::OsRng))
    }

    /// Load a 32-byte secret scalar
    pub fn from_bytes(secret: &[u8]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(secret).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self::from_key(key))
    }

    /// Load a hex secret, with or without `0x`
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        let bytes = collector_types::decode_hex(secret)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Address ballots from this key recover to
    pub fn address(&self) -> Address {
        self.address
    }

    /// Hex of the secret scalar, `0x`-prefixed
    pub fn secret_hex(&self) -> String {
        collector_types::encode_hex(&self.key.to_bytes())
    }

    /// Sign a 32-byte digest; `v` is 27 or 28 and `s` is always low
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<BallotSignature, CryptoError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        Ok(BallotSignature::new(27 + recovery_id.to_byte(), Word(r), Word(s)))
    }

    /// Sign a ballot for `proposal_id` under `domain`
    pub fn sign_ballot(
        &self,
        domain: &Eip712Domain,
        proposal_id: ProposalId,
        support: u8,
    ) -> Result<Ballot, CryptoError> {
        let digest = domain.ballot_digest(&proposal_id, support);
        let signature = self.sign_digest(&digest)?;
        Ok(Ballot::new(proposal_id, support, signature))
    }
}

impl std::fmt::Debug for BallotSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BallotSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Recover the address that produced `signature` over `digest`
///
/// Rejects a recovery byte other than 27 or 28, zero or out-of-range
/// scalars, high-`s` (malleable) signatures, and a zero recovered address.
pub fn recover_signer(digest: &[u8; 32], signature: &BallotSignature) -> Result<Address, CryptoError> {
    let recovery_byte = match signature.v {
        27 | 28 => signature.v - 27,
        other => {
            return Err(CryptoError::InvalidSignature(format!(
                "recovery byte {} out of range",
                other
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(recovery_byte)
        .ok_or_else(|| CryptoError::InvalidSignature("bad recovery id".into()))?;

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r.0);
    rs[32..].copy_from_slice(&signature.s.0);
    let sig = Signature::from_slice(&rs).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    if sig.normalize_s().is_some() {
        return Err(CryptoError::InvalidSignature("malleable high-s value".into()));
    }

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let address = address_from_verifying_key(&key);
    if address.is_zero() {
        return Err(CryptoError::InvalidSignature("recovered zero address".into()));
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Eip712Domain {
        Eip712Domain::new("Collector", 1, Address([0x42; 20]))
    }

    #[test]
    fn test_known_key_address() {
        // Secret 1 maps to the generator point
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let signer = BallotSigner::from_bytes(&secret).unwrap();
        assert_eq!(
            signer.address().to_hex(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_sign_then_recover() {
        let signer = BallotSigner::random();
        let ballot = signer.sign_ballot(&domain(), ProposalId([3; 32]), 1).unwrap();
        assert!(ballot.signature.v == 27 || ballot.signature.v == 28);

        let digest = domain().ballot_digest(&ballot.proposal_id, ballot.support);
        assert_eq!(recover_signer(&digest, &ballot.signature).unwrap(), signer.address());
    }

    #[test]
    fn test_raw_parity_byte_rejected() {
        let signer = BallotSigner::random();
        let digest = [9u8; 32];
        let mut sig = signer.sign_digest(&digest).unwrap();
        sig.v -= 27;
        assert!(recover_signer(&digest, &sig).is_err());
    }

    #[test]
    fn test_wrong_digest_recovers_someone_else() {
        let signer = BallotSigner::random();
        let sig = signer.sign_digest(&[1u8; 32]).unwrap();
        if let Ok(addr) = recover_signer(&[2u8; 32], &sig) {
            assert_ne!(addr, signer.address());
        }
    }

    #[test]
    fn test_garbage_signature_rejected() {
        let mut r = [0u8; 32];
        r[..4].copy_from_slice(b"test");
        let sig = BallotSignature::new(0, Word(r), Word(r));
        assert!(recover_signer(&[5u8; 32], &sig).is_err());
    }

    #[test]
    fn test_bad_recovery_byte_rejected() {
        let signer = BallotSigner::random();
        let mut sig = signer.sign_digest(&[1u8; 32]).unwrap();
        sig.v = 29;
        assert!(matches!(
            recover_signer(&[1u8; 32], &sig),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_zero_scalars_rejected() {
        let sig = BallotSignature::new(27, Word::default(), Word::default());
        assert!(recover_signer(&[1u8; 32], &sig).is_err());
    }

    #[test]
    fn test_hex_key_roundtrip() {
        let signer = BallotSigner::random();
        let again = BallotSigner::from_hex(&signer.secret_hex()).unwrap();
        assert_eq!(again.address(), signer.address());
        assert!(BallotSigner::from_hex("0x00").is_err());
    }
}
