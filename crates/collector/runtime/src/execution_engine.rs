//! Execution Engine - atomic replay of an approved action batch
//!
//! Actions run in order against a staged copy of the [`CallEnvironment`].
//! The copy replaces the live environment only if every action succeeds;
//! any failure discards it, so a rolled-back batch leaves no trace.

use collector_crypto::{BuyFromMarketplace, MarketplaceBuy};
use collector_types::{Action, ActionBatch, ActionOutcome, Address, CollectorError, CollectorResult, Wei};
use std::collections::BTreeMap;
use tracing::debug;

use crate::marketplace::NftMarketplace;

/// Everything an action can touch: the pooled balance, plain transfers
/// out of it, and registered marketplaces
#[derive(Clone, Debug)]
pub struct CallEnvironment {
    engine: Address,
    pool: Wei,
    payouts: BTreeMap<Address, Wei>,
    marketplaces: BTreeMap<Address, Box<dyn NftMarketplace>>,
}

impl CallEnvironment {
    /// Empty environment for the engine at `engine`
    pub fn new(engine: Address) -> Self {
        Self {
            engine,
            pool: Wei::zero(),
            payouts: BTreeMap::new(),
            marketplaces: BTreeMap::new(),
        }
    }

    /// Address self-calls are recognised by
    pub fn engine(&self) -> Address {
        self.engine
    }

    /// Current pooled balance
    pub fn pool(&self) -> Wei {
        self.pool
    }

    /// Add `amount` to the pool
    pub fn credit(&mut self, amount: Wei) {
        self.pool = self.pool.saturating_add(amount);
    }

    fn debit(&mut self, amount: Wei) -> Result<(), String> {
        self.pool = self
            .pool
            .checked_sub(amount)
            .ok_or_else(|| format!("pool balance {} cannot cover {}", self.pool, amount))?;
        Ok(())
    }

    /// Total plain transfers received by `recipient`
    pub fn payout_of(&self, recipient: &Address) -> Wei {
        self.payouts.get(recipient).copied().unwrap_or_default()
    }

    /// Make `marketplace` callable by its address
    pub fn register_marketplace(&mut self, marketplace: Box<dyn NftMarketplace>) {
        self.marketplaces.insert(marketplace.address(), marketplace);
    }

    /// Registered marketplace at `address`, if any
    pub fn marketplace(&self, address: &Address) -> Option<&dyn NftMarketplace> {
        self.marketplaces.get(address).map(|m| m.as_ref())
    }

    /// Run one action, returning a summary of what it did
    fn dispatch(&mut self, action: &Action) -> Result<String, String> {
        if action.target == self.engine {
            return self.dispatch_self_call(action);
        }

        if self.marketplaces.contains_key(&action.target) && !action.payload.is_empty() {
            let call = MarketplaceBuy::decode(action.payload.as_bytes()).map_err(|e| e.to_string())?;
            self.debit(action.value)?;
            let engine = self.engine;
            let market = self
                .marketplaces
                .get_mut(&action.target)
                .ok_or_else(|| format!("marketplace {} disappeared", action.target))?;
            let paid = market
                .buy(engine, &call.collection, call.asset_id, action.value)
                .map_err(|e| e.to_string())?;
            return Ok(format!(
                "bought {}#{} from {} for {}",
                call.collection, call.asset_id, action.target, paid
            ));
        }

        if action.payload.is_empty() {
            self.debit(action.value)?;
            let received = self.payouts.entry(action.target).or_default();
            *received = received.saturating_add(action.value);
            return Ok(format!("transferred {} to {}", action.value, action.target));
        }

        Err(format!("no callable code at {}", action.target))
    }

    /// `buyFromNftMarketplace` reached through a proposal targeting the engine
    fn dispatch_self_call(&mut self, action: &Action) -> Result<String, String> {
        let call = BuyFromMarketplace::decode(action.payload.as_bytes()).map_err(|e| e.to_string())?;

        let engine = self.engine;
        let market = self
            .marketplaces
            .get(&call.marketplace)
            .ok_or_else(|| format!("unknown marketplace {}", call.marketplace))?;
        let price = market
            .price_of(&call.collection, call.asset_id)
            .map_err(|e| e.to_string())?;

        if price > call.max_price {
            return Err(format!("price {} exceeds maximum {}", price, call.max_price));
        }
        self.debit(price)?;

        let market = self
            .marketplaces
            .get_mut(&call.marketplace)
            .ok_or_else(|| format!("unknown marketplace {}", call.marketplace))?;
        market
            .buy(engine, &call.collection, call.asset_id, price)
            .map_err(|e| e.to_string())?;

        Ok(format!(
            "bought {}#{} from {} for {}",
            call.collection, call.asset_id, call.marketplace, price
        ))
    }
}

/// Runs action batches against a staged copy of a [`CallEnvironment`]
pub struct ExecutionEngine;

impl ExecutionEngine {
    /// Replay `batch` against a copy of `env`
    ///
    /// Returns the staged environment and per-action outcomes on success.
    /// The caller commits by replacing its environment with the result.
    pub fn run(env: &CallEnvironment, batch: &ActionBatch) -> CollectorResult<(CallEnvironment, Vec<ActionOutcome>)> {
        let mut staged = env.clone();
        let mut outcomes = Vec::with_capacity(batch.len());

        for (index, action) in batch.actions().iter().enumerate() {
            let summary = staged
                .dispatch(action)
                .map_err(|reason| CollectorError::ActionFailed { index, reason })?;

            debug!(index, target = %action.target, value = %action.value, summary = %summary, "Action succeeded");

            outcomes.push(ActionOutcome {
                index,
                target: action.target,
                value: action.value,
                summary,
            });
        }

        Ok((staged, outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::InMemoryMarketplace;
    use collector_types::Calldata;

    const ENGINE: Address = Address([0xee; 20]);
    const MARKET: Address = Address([0x3a; 20]);
    const COLLECTION: Address = Address([0xc0; 20]);
    const SELLER: Address = Address([0x5e; 20]);

    fn env(pool: Wei) -> CallEnvironment {
        let mut env = CallEnvironment::new(ENGINE);
        env.credit(pool);
        env.register_marketplace(Box::new(
            InMemoryMarketplace::new(MARKET).with_listing(COLLECTION, 1, Wei::ether(1), SELLER),
        ));
        env
    }

    fn self_buy(max_price: Wei) -> Action {
        let call = BuyFromMarketplace {
            marketplace: MARKET,
            collection: COLLECTION,
            asset_id: 1,
            max_price,
        };
        Action::new(ENGINE, Wei::zero(), call.encode())
    }

    #[test]
    fn test_self_call_purchase() {
        let live = env(Wei::ether(2));
        let batch = ActionBatch::new(vec![self_buy(Wei::ether(1000))]);

        let (staged, outcomes) = ExecutionEngine::run(&live, &batch).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(staged.pool(), Wei::ether(1));
        assert_eq!(staged.marketplace(&MARKET).unwrap().owner_of(&COLLECTION, 1), Some(ENGINE));
        // Live environment untouched until the caller commits
        assert_eq!(live.pool(), Wei::ether(2));
        assert_eq!(live.marketplace(&MARKET).unwrap().owner_of(&COLLECTION, 1), Some(SELLER));
    }

    #[test]
    fn test_price_above_maximum_fails() {
        let live = env(Wei::ether(2));
        let batch = ActionBatch::new(vec![self_buy(Wei(1))]);
        let err = ExecutionEngine::run(&live, &batch).unwrap_err();
        assert!(matches!(err, CollectorError::ActionFailed { index: 0, .. }));
    }

    #[test]
    fn test_pool_must_cover_purchase() {
        let live = env(Wei(10));
        let batch = ActionBatch::new(vec![self_buy(Wei::ether(1000))]);
        assert!(ExecutionEngine::run(&live, &batch).is_err());
    }

    #[test]
    fn test_direct_marketplace_buy() {
        let live = env(Wei::ether(2));
        let call = MarketplaceBuy {
            collection: COLLECTION,
            asset_id: 1,
        };
        let batch = ActionBatch::new(vec![Action::new(MARKET, Wei::ether(1), call.encode())]);

        let (staged, _) = ExecutionEngine::run(&live, &batch).unwrap();

        assert_eq!(staged.pool(), Wei::ether(1));
        assert_eq!(staged.marketplace(&MARKET).unwrap().owner_of(&COLLECTION, 1), Some(ENGINE));
    }

    #[test]
    fn test_plain_transfer() {
        let live = env(Wei(100));
        let to = Address([0x77; 20]);
        let batch = ActionBatch::new(vec![Action::transfer(to, Wei(40))]);

        let (staged, outcomes) = ExecutionEngine::run(&live, &batch).unwrap();

        assert_eq!(staged.pool(), Wei(60));
        assert_eq!(staged.payout_of(&to), Wei(40));
        assert!(outcomes[0].summary.contains("transferred"));
    }

    #[test]
    fn test_failure_later_in_batch_discards_earlier_effects() {
        let live = env(Wei::ether(2));
        let to = Address([0x77; 20]);
        let batch = ActionBatch::new(vec![
            Action::transfer(to, Wei(1)),
            Action::new(Address([0x99; 20]), Wei::zero(), Calldata::new(vec![1, 2, 3, 4])),
        ]);

        let err = ExecutionEngine::run(&live, &batch).unwrap_err();

        assert!(matches!(err, CollectorError::ActionFailed { index: 1, .. }));
        assert_eq!(live.payout_of(&to), Wei::zero());
        assert_eq!(live.pool(), Wei::ether(2));
    }
}
