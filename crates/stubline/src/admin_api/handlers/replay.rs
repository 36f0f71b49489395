//! Replay handler: normalizes the transport request and hands it to the dispatcher.

use super::with_manager;
use crate::admin_api::server::ServerState;
use crate::admin_api::types::{collect_body, error_response};
use crate::replay::{build_descriptor, dispatch, ReplayTarget};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::warn;

/// ANY /:app/*path and /:prefix/:app/*path
pub async fn handle_replay<B>(
    target: ReplayTarget,
    req: Request<B>,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().as_str().to_string();
    let query = req.uri().query().map(str::to_string);
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => {
            warn!(application = %target.application, "{}", e);
            return error_response(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    let descriptor = build_descriptor(
        &method,
        &target,
        query.as_deref(),
        &state.replay.identifier_param,
        content_type.as_deref(),
        &body,
    );

    let application = target.application;
    with_manager(&state, move |manager| dispatch(manager, &application, &descriptor))
        .await
        .unwrap_or_else(|response| response)
}
