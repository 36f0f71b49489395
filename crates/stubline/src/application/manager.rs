//! ApplicationManager - lifecycle management for named rule sets.
//!
//! Reads go straight to the store. Every mutation of a rule set runs under a
//! per-application lock, so concurrent appends to the same application are
//! applied one after another instead of overwriting each other.

use super::types::{validate_name, ApplicationError};
use crate::rules::{merge_rules, IngestSummary, RuleSpec};
use crate::store::{RuleStore, StoreError};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Manages the rule sets of all registered applications
pub struct ApplicationManager {
    store: Arc<dyn RuleStore>,
    /// Write locks by application name; an entry lives only while a writer holds or awaits it
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ApplicationManager {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            store,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Run `f` holding the write locks of `names`, taken in sorted order.
    ///
    /// Afterwards each entry is removed from the table unless another caller
    /// still holds a handle to it.
    fn with_write_locks<T>(&self, names: &[&str], f: impl FnOnce() -> T) -> T {
        let mut names = names.to_vec();
        names.sort_unstable();
        names.dedup();

        let locks: Vec<Arc<Mutex<()>>> = names.iter().map(|name| self.lock_for(name)).collect();
        let result = {
            let _guards: Vec<MutexGuard<'_, ()>> = locks.iter().map(|lock| lock.lock()).collect();
            f()
        };

        // Handles are only cloned under the table lock, so a count of 2
        // (table + ours) cannot grow while we hold it.
        let mut table = self.write_locks.lock();
        for (name, lock) in names.into_iter().zip(locks) {
            if Arc::strong_count(&lock) == 2 {
                table.remove(name);
            }
        }
        result
    }

    #[cfg(test)]
    fn lock_table_len(&self) -> usize {
        self.write_locks.lock().len()
    }

    /// Register a new application with an empty rule set
    pub fn create(&self, name: &str) -> Result<(), ApplicationError> {
        validate_name(name)?;

        self.with_write_locks(&[name], || match self.store.create(name) {
            Ok(()) => {
                info!("Created application '{}'", name);
                Ok(())
            }
            Err(StoreError::AlreadyExists(_)) => Err(ApplicationError::AlreadyExists(name.to_string())),
            Err(e) => Err(ApplicationError::storage(name, e)),
        })
    }

    /// List application names in ascending order
    pub fn list(&self) -> Result<Vec<String>, ApplicationError> {
        self.store.list().map_err(ApplicationError::ListFailed)
    }

    /// Rename an application, keeping its rule set
    pub fn rename(&self, current: &str, new_name: &str) -> Result<(), ApplicationError> {
        if validate_name(current).is_err() {
            return Err(ApplicationError::NotFound(current.to_string()));
        }
        validate_name(new_name)?;

        self.with_write_locks(&[current, new_name], || {
            if current == new_name {
                return match self.store.exists(current) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(ApplicationError::NotFound(current.to_string())),
                    Err(e) => Err(ApplicationError::storage(current, e)),
                };
            }

            match self.store.rename(current, new_name) {
                Ok(()) => {
                    info!("Renamed application '{}' to '{}'", current, new_name);
                    Ok(())
                }
                Err(StoreError::NotFound(_)) => Err(ApplicationError::NotFound(current.to_string())),
                Err(StoreError::AlreadyExists(_)) => {
                    Err(ApplicationError::AlreadyExists(new_name.to_string()))
                }
                Err(e) => Err(ApplicationError::storage(current, e)),
            }
        })
    }

    /// Delete an application and its rule set
    pub fn delete(&self, name: &str) -> Result<(), ApplicationError> {
        if validate_name(name).is_err() {
            return Err(ApplicationError::NotFound(name.to_string()));
        }

        self.with_write_locks(&[name], || match self.store.delete(name) {
            Ok(()) => {
                info!("Deleted application '{}'", name);
                Ok(())
            }
            Err(StoreError::NotFound(_)) => Err(ApplicationError::NotFound(name.to_string())),
            Err(e) => Err(ApplicationError::storage(name, e)),
        })
    }

    /// Append rules to an application, skipping duplicates.
    ///
    /// A corrupt stored record is replaced: the batch is merged into an empty
    /// set and the result written back.
    pub fn append(
        &self,
        name: &str,
        candidates: Vec<RuleSpec>,
    ) -> Result<IngestSummary, ApplicationError> {
        if validate_name(name).is_err() {
            return Err(ApplicationError::NotFound(name.to_string()));
        }

        self.with_write_locks(&[name], || {
            let mut rules = match self.store.load(name) {
                Ok(rules) => rules,
                Err(StoreError::NotFound(_)) => {
                    return Err(ApplicationError::NotFound(name.to_string()))
                }
                Err(StoreError::Corrupt { reason, .. }) => {
                    warn!(
                        application = name,
                        "Stored rule set is corrupt, rebuilding from incoming batch: {}", reason
                    );
                    Vec::new()
                }
                Err(e) => return Err(ApplicationError::storage(name, e)),
            };

            let summary = merge_rules(&mut rules, candidates);
            self.store
                .save(name, &rules)
                .map_err(|e| ApplicationError::storage(name, e))?;

            debug!(
                application = name,
                added = summary.added,
                duplicates = summary.duplicates,
                total = rules.len(),
                "Appended rules"
            );
            Ok(summary)
        })
    }

    /// Load the rule set used for replay.
    ///
    /// Unlike `append`, a corrupt record is an error here.
    pub fn rules(&self, name: &str) -> Result<Vec<RuleSpec>, ApplicationError> {
        if validate_name(name).is_err() {
            return Err(ApplicationError::NotFound(name.to_string()));
        }

        match self.store.load(name) {
            Ok(rules) => Ok(rules),
            Err(StoreError::NotFound(_)) => Err(ApplicationError::NotFound(name.to_string())),
            Err(e) => Err(ApplicationError::storage(name, e)),
        }
    }
}
