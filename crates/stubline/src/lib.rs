//! Stubline: an HTTP stub server replaying canned responses from per-application rule sets.

pub mod admin_api;
pub mod application;
pub mod config;
pub mod metrics;
pub mod replay;
pub mod rules;
pub mod store;
