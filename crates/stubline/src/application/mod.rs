//! Named application management.
//!
//! - `ApplicationManager`: create, list, rename, delete, append and load rule sets
//! - `ApplicationError`: failures mapped to HTTP status codes by the admin API

mod manager;
mod types;

pub use manager::ApplicationManager;
pub use types::{validate_name, ApplicationError, MAX_NAME_LEN};
