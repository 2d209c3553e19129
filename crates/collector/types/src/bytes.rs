//! Fixed-width identifiers and opaque call data
//!
//! Addresses, proposal ids and description hashes are plain byte arrays.
//! They render and parse as `0x`-prefixed lowercase hex, which is also
//! their serde representation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing hex-encoded values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Decode a hex string with or without a `0x` prefix
pub fn decode_hex(s: &str) -> Result<Vec<u8>, HexError> {
    let stripped = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(stripped).map_err(|e| HexError::InvalidHex(format!("{}: {}", s, e)))
}

/// Encode bytes as `0x`-prefixed lowercase hex
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width in bytes
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Build from a slice, failing unless it has exactly the right width
            pub fn from_slice(bytes: &[u8]) -> Result<Self, HexError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| HexError::WrongLength {
                    expected: $len,
                    actual: bytes.len(),
                })?;
                Ok(Self(arr))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            pub fn to_hex(&self) -> String {
                encode_hex(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = HexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_slice(&decode_hex(s)?)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte account identity (members, call targets, the engine itself)
    Address,
    20
);

fixed_bytes!(
    /// Content-derived proposal identifier (a 256-bit integer, big-endian)
    ProposalId,
    32
);

fixed_bytes!(
    /// Content hash of a proposal's human-readable description
    DescriptionHash,
    32
);

fixed_bytes!(
    /// A raw 32-byte word, used for signature scalars
    Word,
    32
);

impl Address {
    /// The null identity; never a valid signer
    pub const ZERO: Address = Address([0u8; 20]);
}

/// Opaque call data attached to an action
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Calldata(pub Vec<u8>);

impl Calldata {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Calldata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode_hex(&self.0))
    }
}

impl fmt::Debug for Calldata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Calldata({})", encode_hex(&self.0))
    }
}

impl FromStr for Calldata {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex(s).map(Self)
    }
}

impl From<Vec<u8>> for Calldata {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Calldata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_hex(&self.0))
    }
}

impl<'de> Deserialize<'de> for Calldata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr: Address = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        assert_eq!(addr.0[19], 0xff);
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ff");
    }

    #[test]
    fn test_address_without_prefix() {
        let addr: Address = "ab".repeat(20).parse().unwrap();
        assert_eq!(addr.0, [0xab; 20]);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            HexError::WrongLength {
                expected: 20,
                actual: 2
            }
        );
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            "0xzz".parse::<Calldata>(),
            Err(HexError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1; 20]).is_zero());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = ProposalId([7; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "07".repeat(32)));
        let back: ProposalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
