//! Replay dispatch: rule set lookup, matching and response emission.

use crate::admin_api::types::error_response;
use crate::application::{ApplicationError, ApplicationManager};
use crate::metrics::{self, outcome};
use crate::rules::{find_match_index, RequestDescriptor, RuleSpec};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use std::time::Instant;
use tracing::{debug, error};

pub const NO_MATCH_MESSAGE: &str = "No matching specification found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Result of replaying one request against an application's rule set
#[derive(Debug)]
pub enum ReplayOutcome {
    Matched { index: usize, rule: RuleSpec },
    NoMatch,
    LoadFailed(ApplicationError),
}

/// Failure to turn a matched rule into a response
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid status code {0}")]
    InvalidStatus(u16),
    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}

/// Load the rule set for `application` and select the rule for `request`
pub fn replay(
    manager: &ApplicationManager,
    application: &str,
    request: &RequestDescriptor,
) -> ReplayOutcome {
    let mut rules = match manager.rules(application) {
        Ok(rules) => rules,
        Err(e) => return ReplayOutcome::LoadFailed(e),
    };

    match find_match_index(&rules, request) {
        Some(index) => ReplayOutcome::Matched {
            index,
            rule: rules.swap_remove(index),
        },
        None => ReplayOutcome::NoMatch,
    }
}

/// Emit the rule's canned status, content type and body unmodified
pub fn render_rule(rule: &RuleSpec) -> Result<Response<Full<Bytes>>, RenderError> {
    let status = StatusCode::from_u16(rule.response_status_code)
        .map_err(|_| RenderError::InvalidStatus(rule.response_status_code))?;

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, rule.response_content_type.as_str())
        .body(Full::new(Bytes::from(rule.response_body())))?)
}

/// Replay a request and translate the outcome into an HTTP response
pub fn dispatch(
    manager: &ApplicationManager,
    application: &str,
    request: &RequestDescriptor,
) -> Response<Full<Bytes>> {
    let started = Instant::now();

    let (label, response) = match replay(manager, application, request) {
        ReplayOutcome::Matched { index, rule } => match render_rule(&rule) {
            Ok(response) => {
                debug!(
                    application,
                    method = %request.method,
                    path = %request.path,
                    rule_index = index,
                    status = rule.response_status_code,
                    "Replayed specification"
                );
                (outcome::MATCHED, response)
            }
            Err(e) => {
                error!(
                    application,
                    rule_index = index,
                    "Stored specification cannot be rendered: {}", e
                );
                (
                    outcome::INTERNAL_ERROR,
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE),
                )
            }
        },
        ReplayOutcome::NoMatch => {
            debug!(
                application,
                method = %request.method,
                path = %request.path,
                identifier = ?request.unique_identifier,
                "No specification matched"
            );
            (
                outcome::NO_MATCH,
                error_response(StatusCode::NOT_FOUND, NO_MATCH_MESSAGE),
            )
        }
        ReplayOutcome::LoadFailed(e) => {
            match &e {
                ApplicationError::Storage { source, .. } => {
                    error!(application, "Failed to load specifications: {}", source)
                }
                other => debug!(application, "Failed to load specifications: {}", other),
            }
            (
                outcome::LOAD_ERROR,
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &load_failure_message(application),
                ),
            )
        }
    };

    metrics::record_replay(label, started.elapsed().as_secs_f64() * 1000.0);
    response
}

/// Caller-facing message for an unavailable rule set; names the application only
pub fn load_failure_message(application: &str) -> String {
    format!("Failed to load specifications for application '{application}'")
}
