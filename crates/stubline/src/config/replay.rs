//! Replay routing configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// Optional leading path segment for namespaced replay (`/<prefix>/<app>/...`)
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Query parameter carrying the unique identifier
    #[serde(default = "default_identifier_param")]
    pub identifier_param: String,
}

fn default_prefix() -> String {
    "simulated-data".to_string()
}

fn default_identifier_param() -> String {
    "uniqueIdentifier".to_string()
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            identifier_param: default_identifier_param(),
        }
    }
}
