//! Engine parameters
//!
//! Everything tunable about a Collector deployment lives here: the EIP-712
//! domain tag, the join stake, the voting window and the quorum.

use crate::{CollectorError, CollectorResult, Wei};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Three days, in seconds
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 3 * 24 * 60 * 60;

/// Longest accepted voting window: one hundred years, in seconds
pub const MAX_VOTING_PERIOD_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Minimum participation, as a fraction of total membership
///
/// Satisfied when `votes_cast * denominator >= members * numerator`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumPolicy {
    pub numerator: u64,
    pub denominator: u64,
}

impl QuorumPolicy {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Quorum expressed in whole percent
    pub fn percent(percent: u64) -> Self {
        Self::new(percent, 100)
    }

    /// Whether `votes_cast` out of `members` meets the threshold
    pub fn is_met(&self, votes_cast: u64, members: u64) -> bool {
        (votes_cast as u128) * (self.denominator as u128)
            >= (members as u128) * (self.numerator as u128)
    }
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self::percent(25)
    }
}

/// Collector engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Name bound into the EIP-712 domain
    #[serde(default = "default_name")]
    pub name: String,

    /// Chain/network identifier bound into the EIP-712 domain
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Exact contribution required to join
    #[serde(default = "default_join_stake")]
    pub join_stake: Wei,

    /// Length of the voting window in seconds
    #[serde(default = "default_voting_period_secs")]
    pub voting_period_secs: u64,

    /// Minimum participation for a proposal to succeed
    #[serde(default)]
    pub quorum: QuorumPolicy,

    /// Require the submitter of a ballot to be a member as well
    #[serde(default = "default_members_only_relay")]
    pub members_only_relay: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            chain_id: default_chain_id(),
            join_stake: default_join_stake(),
            voting_period_secs: default_voting_period_secs(),
            quorum: QuorumPolicy::default(),
            members_only_relay: default_members_only_relay(),
        }
    }
}

fn default_name() -> String {
    "Collector".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_join_stake() -> Wei {
    Wei::ether(1)
}

fn default_members_only_relay() -> bool {
    true
}

fn default_voting_period_secs() -> u64 {
    DEFAULT_VOTING_PERIOD_SECS
}

impl CollectorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_join_stake(mut self, stake: Wei) -> Self {
        self.join_stake = stake;
        self
    }

    pub fn with_voting_period_secs(mut self, secs: u64) -> Self {
        self.voting_period_secs = secs;
        self
    }

    pub fn with_quorum(mut self, quorum: QuorumPolicy) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn with_members_only_relay(mut self, enabled: bool) -> Self {
        self.members_only_relay = enabled;
        self
    }

    /// The voting window as a duration, capped at [`MAX_VOTING_PERIOD_SECS`]
    pub fn voting_period(&self) -> Duration {
        Duration::seconds(self.voting_period_secs.min(MAX_VOTING_PERIOD_SECS) as i64)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> CollectorResult<()> {
        if self.join_stake.is_zero() {
            return Err(CollectorError::InvalidConfig(
                "join_stake must be non-zero".into(),
            ));
        }
        if self.voting_period_secs == 0 {
            return Err(CollectorError::InvalidConfig(
                "voting_period_secs must be non-zero".into(),
            ));
        }
        if self.voting_period_secs > MAX_VOTING_PERIOD_SECS {
            return Err(CollectorError::InvalidConfig(format!(
                "voting_period_secs {} exceeds the maximum of {}",
                self.voting_period_secs, MAX_VOTING_PERIOD_SECS
            )));
        }
        if self.quorum.denominator == 0 {
            return Err(CollectorError::InvalidConfig(
                "quorum denominator must be non-zero".into(),
            ));
        }
        if self.quorum.numerator > self.quorum.denominator {
            return Err(CollectorError::InvalidConfig(format!(
                "quorum {}/{} exceeds 100%",
                self.quorum.numerator, self.quorum.denominator
            )));
        }
        Ok(())
    }
}
