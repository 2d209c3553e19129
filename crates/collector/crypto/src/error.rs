use thiserror::Error;

/// Errors from signing, recovery and call-data decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("malformed call data: {0}")]
    MalformedCalldata(String),

    #[error("unknown function selector: 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),
}
