use super::{RuleStore, StoreError, StoreResult};
use crate::rules::RuleSpec;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory implementation of RuleStore
///
/// Rule sets live in a sorted map, so listing order is deterministic.
/// Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryRuleStore {
    data: RwLock<BTreeMap<String, Vec<RuleSpec>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.data.read().contains_key(name))
    }

    fn create(&self, name: &str) -> StoreResult<()> {
        let mut data = self.data.write();
        if data.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        data.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn load(&self, name: &str) -> StoreResult<Vec<RuleSpec>> {
        self.data
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn save(&self, name: &str, rules: &[RuleSpec]) -> StoreResult<()> {
        self.data.write().insert(name.to_string(), rules.to_vec());
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        let mut data = self.data.write();
        if data.contains_key(to) {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        let rules = data
            .remove(from)
            .ok_or_else(|| StoreError::NotFound(from.to_string()))?;
        data.insert(to.to_string(), rules);
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        self.data
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
