//! Replay of canned responses.
//!
//! - `descriptor`: turns a raw request into a `RequestDescriptor`
//! - `dispatcher`: loads the application's rules, matches and emits the response

mod descriptor;
mod dispatcher;

pub use descriptor::{build_descriptor, parse_body, query_param, split_replay_path, ReplayTarget};
pub use dispatcher::{
    dispatch, load_failure_message, render_rule, replay, RenderError, ReplayOutcome,
    INTERNAL_ERROR_MESSAGE, NO_MATCH_MESSAGE,
};
