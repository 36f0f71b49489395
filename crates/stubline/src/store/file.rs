//! Flat-file JSON rule store.

use super::{RuleStore, StoreError, StoreResult};
use crate::rules::RuleSpec;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, info};

const RECORD_EXTENSION: &str = "json";

/// Stores each rule set as `<data_dir>/<name>.json`.
///
/// Writes go to a hidden temporary file that is renamed over the record, so a
/// reader sees either the old or the new rule set, never a partial one.
pub struct FileRuleStore {
    data_dir: PathBuf,
}

impl FileRuleStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        debug!("Opened rule store at {:?}", data_dir);
        Ok(Self { data_dir })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{RECORD_EXTENSION}"))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!(".{name}.{RECORD_EXTENSION}.tmp"))
    }

    fn map_not_found(name: &str, err: std::io::Error) -> StoreError {
        if err.kind() == ErrorKind::NotFound {
            StoreError::NotFound(name.to_string())
        } else {
            StoreError::Io(err)
        }
    }
}

impl RuleStore for FileRuleStore {
    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.record_path(name).try_exists()?)
    }

    fn create(&self, name: &str) -> StoreResult<()> {
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.record_path(name))
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(b"[]")?;
        info!("Created rule set file for '{}'", name);
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> StoreResult<Vec<RuleSpec>> {
        let json =
            fs::read_to_string(self.record_path(name)).map_err(|e| Self::map_not_found(name, e))?;
        serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    fn save(&self, name: &str, rules: &[RuleSpec]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(rules)?;
        let temp = self.temp_path(name);
        fs::write(&temp, json)?;
        if let Err(e) = fs::rename(&temp, self.record_path(name)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        debug!("Saved {} rules for '{}'", rules.len(), name);
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        let source = self.record_path(from);
        let target = self.record_path(to);
        if !source.try_exists()? {
            return Err(StoreError::NotFound(from.to_string()));
        }
        if target.try_exists()? {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        fs::rename(&source, &target).map_err(|e| Self::map_not_found(from, e))?;
        info!("Renamed rule set '{}' to '{}'", from, to);
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        fs::remove_file(self.record_path(name)).map_err(|e| Self::map_not_found(name, e))?;
        info!("Deleted rule set '{}'", name);
        Ok(())
    }
}
