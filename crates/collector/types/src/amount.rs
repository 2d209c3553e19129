//! Value amounts in the smallest indivisible unit

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of wei in one ether
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// An amount of pooled value, in wei
///
/// Serializes as a decimal string so values above 2^53 survive JSON
/// clients; deserializes from either a string or an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(pub u128);

impl Wei {
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Whole ether, e.g. `Wei::ether(1)` for the default join stake
    pub const fn ether(value: u128) -> Self {
        Self(value * WEI_PER_ETHER)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl FromStr for Wei {
    type Err = std::num::ParseIntError;

    /// Plain decimal wei, with an optional ` wei` suffix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_suffix("wei").map(str::trim_end).unwrap_or(s);
        digits.parse().map(Self)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct WeiVisitor;

impl<'de> Visitor<'de> for WeiVisitor {
    type Value = Wei;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative wei amount as a decimal string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Wei, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Wei, E> {
        Ok(Wei(v as u128))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Wei, E> {
        Ok(Wei(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Wei, E> {
        u128::try_from(v)
            .map(Wei)
            .map_err(|_| E::custom(format!("negative amount: {}", v)))
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WeiVisitor)
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ether_conversion() {
        assert_eq!(Wei::ether(1).0, WEI_PER_ETHER);
        assert_eq!(Wei::ether(0), Wei::zero());
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Wei(5).checked_sub(Wei(3)), Some(Wei(2)));
        assert_eq!(Wei(3).checked_sub(Wei(5)), None);
        assert_eq!(Wei(u128::MAX).checked_add(Wei(1)), None);
        assert_eq!(Wei(u128::MAX).saturating_add(Wei(1)), Wei(u128::MAX));
    }

    #[test]
    fn test_serde_accepts_string_and_integer() {
        let big = Wei::ether(1000);
        let json = serde_json::to_string(&big).unwrap();
        assert_eq!(json, "\"1000000000000000000000\"");
        assert_eq!(serde_json::from_str::<Wei>(&json).unwrap(), big);
        assert_eq!(serde_json::from_str::<Wei>("42").unwrap(), Wei(42));
        assert!(serde_json::from_str::<Wei>("-1").is_err());
    }

    #[test]
    fn test_parse_with_suffix() {
        assert_eq!("17 wei".parse::<Wei>().unwrap(), Wei(17));
        assert_eq!("17".parse::<Wei>().unwrap(), Wei(17));
        assert!("abc".parse::<Wei>().is_err());
    }
}
