//! Configuration types for the Stubline server.

mod listen;
mod logging;
mod replay;
mod storage;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use listen::ListenConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use replay::ReplayConfig;
pub use storage::{StorageBackend, StorageConfig};

/// Path segment reserved for the administrative API
pub const ADMIN_SEGMENT: &str = "api";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.listen.host.trim().is_empty() {
            anyhow::bail!("listen.host must not be empty");
        }
        if self.listen.port == 0 {
            anyhow::bail!("listen.port must be between 1 and 65535");
        }

        if self.storage.backend == StorageBackend::File
            && self.storage.data_dir.as_os_str().is_empty()
        {
            anyhow::bail!(
                "storage.data_dir is required when storage.backend is '{}'",
                self.storage.backend.as_str()
            );
        }

        let prefix = &self.replay.prefix;
        if prefix.is_empty() || prefix.contains('/') {
            anyhow::bail!(
                "replay.prefix must be a single non-empty path segment, got '{prefix}'"
            );
        }
        if prefix == ADMIN_SEGMENT {
            anyhow::bail!("replay.prefix '{prefix}' collides with the admin API segment");
        }
        if self.replay.identifier_param.is_empty() {
            anyhow::bail!("replay.identifier_param must not be empty");
        }

        Ok(())
    }
}
