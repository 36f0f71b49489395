//! Durable keyed storage for rule sets.
//!
//! Each application name maps to exactly one ordered rule set. Backends:
//! - `FileRuleStore`: one JSON file per application inside a data directory
//! - `InMemoryRuleStore`: process-local map, for tests and throwaway runs

mod file;
mod inmemory;

pub use file::FileRuleStore;
pub use inmemory::InMemoryRuleStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::rules::RuleSpec;
use anyhow::Context;
use std::sync::Arc;

/// Errors raised by rule store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Rule set '{0}' not found")]
    NotFound(String),
    #[error("Rule set '{0}' already exists")]
    AlreadyExists(String),
    #[error("Rule set '{name}' is corrupt: {reason}")]
    Corrupt { name: String, reason: String },
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize rule set: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-agnostic trait for rule set storage
///
/// Operations are synchronous and record-granular: a rule set is always read
/// and written whole. Callers serialize concurrent writers to the same key.
pub trait RuleStore: Send + Sync {
    /// Check whether a rule set exists
    fn exists(&self, name: &str) -> StoreResult<bool>;

    /// Create an empty rule set
    fn create(&self, name: &str) -> StoreResult<()>;

    /// List all rule set names in ascending order
    fn list(&self) -> StoreResult<Vec<String>>;

    /// Load a rule set in stored order
    fn load(&self, name: &str) -> StoreResult<Vec<RuleSpec>>;

    /// Replace the stored rule set with `rules`
    fn save(&self, name: &str, rules: &[RuleSpec]) -> StoreResult<()>;

    /// Move a rule set to a new name
    fn rename(&self, from: &str, to: &str) -> StoreResult<()>;

    /// Remove a rule set
    fn delete(&self, name: &str) -> StoreResult<()>;
}

/// Create a RuleStore based on configuration
pub fn create_rule_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn RuleStore>> {
    match config.backend {
        StorageBackend::File => {
            let store = FileRuleStore::open(&config.data_dir).with_context(|| {
                format!("Failed to open data directory {}", config.data_dir.display())
            })?;
            tracing::info!("Using file RuleStore (data_dir={})", config.data_dir.display());
            Ok(Arc::new(store))
        }
        StorageBackend::InMemory => {
            tracing::info!("Using in-memory RuleStore (rule sets are lost on shutdown)");
            Ok(Arc::new(InMemoryRuleStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_create_inmemory_store() {
        let config = StorageConfig {
            backend: StorageBackend::InMemory,
            data_dir: PathBuf::new(),
        };
        let store = create_rule_store(&config).unwrap();
        store.create("billing").unwrap();
        assert_eq!(store.list().unwrap(), vec!["billing".to_string()]);
    }

    #[test]
    fn test_create_file_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let config = StorageConfig {
            backend: StorageBackend::File,
            data_dir: data_dir.clone(),
        };
        let store = create_rule_store(&config).unwrap();
        store.create("billing").unwrap();
        assert!(data_dir.join("billing.json").exists());
    }
}
