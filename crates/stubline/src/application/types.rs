//! Error type and name rules for application management.

use crate::store::StoreError;

/// Longest accepted application name
pub const MAX_NAME_LEN: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Invalid application name: {0}")]
    InvalidName(String),
    #[error("Application '{0}' not found")]
    NotFound(String),
    #[error("Application '{0}' already exists")]
    AlreadyExists(String),
    #[error("Storage failure for application '{name}'")]
    Storage {
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("Failed to list applications")]
    ListFailed(#[source] StoreError),
}

impl ApplicationError {
    pub(crate) fn storage(name: &str, source: StoreError) -> Self {
        ApplicationError::Storage {
            name: name.to_string(),
            source,
        }
    }
}

/// Check that `name` can be used as an application name and store key.
///
/// Allowed: 1-128 ASCII alphanumerics, `-`, `_` and `.`, excluding `.` and `..`.
pub fn validate_name(name: &str) -> Result<(), ApplicationError> {
    if name.is_empty() {
        return Err(ApplicationError::InvalidName(
            "name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ApplicationError::InvalidName(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(ApplicationError::InvalidName(format!(
            "'{name}' is reserved"
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(ApplicationError::InvalidName(format!(
            "character '{bad}' is not allowed"
        )));
    }
    Ok(())
}
