//! Action batches: what a proposal will do if it passes
//!
//! A batch is an ordered list of `(target, value, payload)` calls. The
//! public surface accepts the three parallel arrays separately, so the
//! batch is only constructible when they line up one entry per action.

use crate::{Address, Calldata, CollectorError, CollectorResult, Wei};
use serde::{Deserialize, Serialize};

/// A single external call in an execution batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Call target
    pub target: Address,
    /// Value sent along with the call, debited from the pool
    pub value: Wei,
    /// Opaque call data
    pub payload: Calldata,
}

impl Action {
    pub fn new(target: Address, value: Wei, payload: Calldata) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }

    /// A plain value transfer with no call data
    pub fn transfer(target: Address, value: Wei) -> Self {
        Self::new(target, value, Calldata::empty())
    }
}

/// The ordered set of actions a proposal executes atomically
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionBatch {
    actions: Vec<Action>,
}

impl ActionBatch {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Zip parallel `targets`/`values`/`payloads` arrays into a batch
    pub fn from_parts(
        targets: Vec<Address>,
        values: Vec<Wei>,
        payloads: Vec<Calldata>,
    ) -> CollectorResult<Self> {
        if targets.len() != values.len() || targets.len() != payloads.len() {
            return Err(CollectorError::LengthMismatch(format!(
                "targets={}, values={}, payloads={}",
                targets.len(),
                values.len(),
                payloads.len()
            )));
        }

        let actions = targets
            .into_iter()
            .zip(values)
            .zip(payloads)
            .map(|((target, value), payload)| Action::new(target, value, payload))
            .collect();
        Ok(Self { actions })
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn targets(&self) -> Vec<Address> {
        self.actions.iter().map(|a| a.target).collect()
    }

    pub fn values(&self) -> Vec<Wei> {
        self.actions.iter().map(|a| a.value).collect()
    }

    pub fn payloads(&self) -> Vec<Calldata> {
        self.actions.iter().map(|a| a.payload.clone()).collect()
    }

    /// Sum of all action values, `None` on overflow
    pub fn total_value(&self) -> Option<Wei> {
        self.actions
            .iter()
            .try_fold(Wei::zero(), |acc, a| acc.checked_add(a.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_zips_in_order() {
        let batch = ActionBatch::from_parts(
            vec![Address([1; 20]), Address([2; 20])],
            vec![Wei(10), Wei(20)],
            vec![Calldata::empty(), Calldata::new(vec![0xaa])],
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.actions()[0].target, Address([1; 20]));
        assert_eq!(batch.actions()[1].payload, Calldata::new(vec![0xaa]));
        assert_eq!(batch.total_value(), Some(Wei(30)));
    }

    #[test]
    fn test_from_parts_rejects_mismatched_lengths() {
        let result = ActionBatch::from_parts(
            vec![Address([1; 20])],
            vec![Wei(1), Wei(2)],
            vec![Calldata::empty()],
        );
        assert!(matches!(result, Err(CollectorError::LengthMismatch(_))));
    }

    #[test]
    fn test_parts_accessors_roundtrip() {
        let batch = ActionBatch::default()
            .with_action(Action::transfer(Address([3; 20]), Wei(5)))
            .with_action(Action::new(Address([4; 20]), Wei(0), Calldata::new(vec![1, 2])));

        let rebuilt =
            ActionBatch::from_parts(batch.targets(), batch.values(), batch.payloads()).unwrap();
        assert_eq!(rebuilt, batch);
    }
}
