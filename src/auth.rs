// 2.0: oracle write authorization. an explicit policy object the oracle holds
// and queries on every privileged call. owner can do everything; updaters can
// only push prices.

use crate::types::TraderId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPolicy {
    owner: TraderId,
    updaters: HashSet<TraderId>,
}

impl AuthPolicy {
    pub fn new(owner: TraderId) -> Self {
        Self {
            owner,
            updaters: HashSet::new(),
        }
    }

    pub fn owner(&self) -> TraderId {
        self.owner
    }

    pub fn is_owner(&self, caller: TraderId) -> bool {
        caller == self.owner
    }

    // owner is implicitly an updater
    pub fn can_update(&self, caller: TraderId) -> bool {
        self.is_owner(caller) || self.updaters.contains(&caller)
    }

    pub fn add_updater(&mut self, updater: TraderId) {
        self.updaters.insert(updater);
    }

    // removing a non-member is a no-op, matching set semantics
    pub fn remove_updater(&mut self, updater: TraderId) {
        self.updaters.remove(&updater);
    }

    pub fn updater_count(&self) -> usize {
        self.updaters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_always_update() {
        let policy = AuthPolicy::new(TraderId(1));
        assert!(policy.is_owner(TraderId(1)));
        assert!(policy.can_update(TraderId(1)));
        assert!(!policy.can_update(TraderId(2)));
    }

    #[test]
    fn updater_grant_and_revoke() {
        let mut policy = AuthPolicy::new(TraderId(1));
        policy.add_updater(TraderId(7));
        assert!(policy.can_update(TraderId(7)));
        assert!(!policy.is_owner(TraderId(7)));

        policy.remove_updater(TraderId(7));
        assert!(!policy.can_update(TraderId(7)));
        assert_eq!(policy.updater_count(), 0);
    }
}
