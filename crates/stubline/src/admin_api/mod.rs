//! HTTP surface of Stubline.
//!
//! Administrative REST API:
//! - Creating, renaming, deleting and listing applications
//! - Appending to and listing an application's rule set
//! - Health and metrics endpoints
//!
//! Every other path is replay traffic, answered from the owning application's rules.

mod handlers;
mod router;
mod server;
pub(crate) mod types;

pub use router::route_request;
pub use server::{ServerState, StublineServer};
