//! Rule ingestion and listing handlers.

use super::with_manager;
use crate::admin_api::server::ServerState;
use crate::admin_api::types::*;
use crate::metrics;
use crate::rules::RuleSpec;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Parse an ingestion body: a non-empty JSON array of rule specifications
fn parse_specifications(body: &[u8]) -> Result<Vec<RuleSpec>, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {e}"))?;

    let items = match value {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Err("Request body must be a non-empty array of specifications".to_string()),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| format!("Invalid specification at index {index}: {e}"))
        })
        .collect()
}

/// POST /api/end-point/:name - Append rules to an application
pub async fn handle_append<B>(
    name: &str,
    req: Request<B>,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let response = match collect_body(req).await {
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
        Ok(body) => match parse_specifications(&body) {
            Err(message) => error_response(StatusCode::BAD_REQUEST, &message),
            Ok(candidates) => {
                let received = candidates.len();
                let key = name.to_string();
                match with_manager(&state, move |manager| manager.append(&key, candidates)).await {
                    Ok(Ok(summary)) => {
                        metrics::record_ingestion(summary.added, summary.duplicates);
                        if summary.duplicates > 0 {
                            warn!(
                                application = name,
                                duplicates = summary.duplicates,
                                "Skipped duplicate specifications"
                            );
                        }
                        info!(
                            application = name,
                            received,
                            added = summary.added,
                            "Specifications ingested"
                        );
                        json_response(StatusCode::OK, &summary)
                    }
                    Ok(Err(e)) => application_error_response(&e),
                    Err(response) => response,
                }
            }
        },
    };

    metrics::record_admin_request("append_rules", response.status().as_u16());
    response
}

/// GET /api/end-point/:name - List an application's rules in match order
pub async fn handle_list(name: &str, state: Arc<ServerState>) -> Response<Full<Bytes>> {
    let key = name.to_string();
    let response = match with_manager(&state, move |manager| manager.rules(&key)).await {
        Ok(Ok(specifications)) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "name": name, "specifications": specifications }),
        ),
        Ok(Err(e)) => application_error_response(&e),
        Err(response) => response,
    };

    metrics::record_admin_request("list_rules", response.status().as_u16());
    response
}
