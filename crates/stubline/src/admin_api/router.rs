//! Two-stage route dispatch.
//!
//! Administrative routes (`/api/...`, `/health`, `/metrics`) are matched
//! first. Everything else is replay traffic: the first path segment (after
//! the optional namespace prefix) names the application.

use crate::admin_api::handlers::{applications, endpoints, replay, system};
use crate::admin_api::server::ServerState;
use crate::admin_api::types::{error_response, method_not_allowed, not_found};
use crate::config::ADMIN_SEGMENT;
use crate::replay::{split_replay_path, INTERNAL_ERROR_MESSAGE};
use bytes::Bytes;
use futures::FutureExt;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use std::borrow::Cow;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};

/// Parsed administrative route
#[derive(Debug, PartialEq, Eq)]
enum AdminRoute {
    /// POST /api/create-application
    CreateApplication,
    /// GET /api/list-application
    ListApplications,
    /// PUT /api/edit-application/:name
    EditApplication(String),
    /// DELETE /api/delete-application/:name
    DeleteApplication(String),
    /// POST/GET /api/end-point/:name
    EndPoint(String),
    /// GET /health
    Health,
    /// GET /metrics
    Metrics,
}

impl AdminRoute {
    /// Parse an administrative path.
    ///
    /// `None` means the path is not administrative and should be treated as replay traffic.
    /// `Some(None)` means the path is under the admin segment but names no known route.
    fn parse(path: &str) -> Option<Option<Self>> {
        match path {
            "/health" => return Some(Some(AdminRoute::Health)),
            "/metrics" => return Some(Some(AdminRoute::Metrics)),
            _ => {}
        }

        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let rest = match trimmed.split_once('/') {
            Some((ADMIN_SEGMENT, rest)) => rest,
            None if trimmed == ADMIN_SEGMENT => "",
            _ => return None,
        };

        let segments: Vec<&str> = rest.split('/').collect();
        let route = match segments.as_slice() {
            ["create-application"] => Some(AdminRoute::CreateApplication),
            ["list-application"] => Some(AdminRoute::ListApplications),
            ["edit-application", name] if !name.is_empty() => {
                Some(AdminRoute::EditApplication(decode(name)))
            }
            ["delete-application", name] if !name.is_empty() => {
                Some(AdminRoute::DeleteApplication(decode(name)))
            }
            ["end-point", name] if !name.is_empty() => Some(AdminRoute::EndPoint(decode(name))),
            _ => None,
        };
        Some(route)
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string())
}

/// Main request router.
///
/// A panic anywhere below is turned into a generic 500 so that internal
/// details never reach the caller.
pub async fn route_request<B>(
    req: Request<B>,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("{} {}", method, path);

    let response = match AssertUnwindSafe(route_by_path(&method, &path, req, state))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(_) => {
            error!("Handler panicked while serving {} {}", method, path);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    };
    Ok(response)
}

/// Route based on path
async fn route_by_path<B>(
    method: &Method,
    path: &str,
    req: Request<B>,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match AdminRoute::parse(path) {
        Some(Some(route)) => route_admin(method, route, req, state).await,
        Some(None) => not_found(),
        None => match split_replay_path(path, &state.replay.prefix) {
            Some(target) => replay::handle_replay(target, req, state).await,
            None => not_found(),
        },
    }
}

/// Dispatch administrative requests based on method and route
async fn route_admin<B>(
    method: &Method,
    route: AdminRoute,
    req: Request<B>,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match (method, route) {
        (&Method::GET, AdminRoute::Health) => system::handle_health(),
        (&Method::GET, AdminRoute::Metrics) => system::handle_metrics(),

        (&Method::POST, AdminRoute::CreateApplication) => {
            applications::handle_create(req, state).await
        }
        (&Method::GET, AdminRoute::ListApplications) => applications::handle_list(state).await,
        (&Method::PUT, AdminRoute::EditApplication(name)) => {
            applications::handle_rename(&name, req, state).await
        }
        (&Method::DELETE, AdminRoute::DeleteApplication(name)) => {
            applications::handle_delete(&name, state).await
        }

        (&Method::POST, AdminRoute::EndPoint(name)) => {
            endpoints::handle_append(&name, req, state).await
        }
        (&Method::GET, AdminRoute::EndPoint(name)) => endpoints::handle_list(&name, state).await,

        _ => method_not_allowed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationManager;
    use crate::config::ReplayConfig;
    use crate::store::InMemoryRuleStore;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState {
            manager: Arc::new(ApplicationManager::new(Arc::new(InMemoryRuleStore::new()))),
            replay: ReplayConfig::default(),
        })
    }

    async fn send(
        state: &Arc<ServerState>,
        method: &str,
        uri: &str,
        body: &str,
    ) -> (StatusCode, String) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let response = route_request(req, Arc::clone(state)).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_admin_route_parse() {
        assert_eq!(
            AdminRoute::parse("/api/create-application"),
            Some(Some(AdminRoute::CreateApplication))
        );
        assert_eq!(
            AdminRoute::parse("/api/list-application"),
            Some(Some(AdminRoute::ListApplications))
        );
        assert_eq!(
            AdminRoute::parse("/api/edit-application/billing"),
            Some(Some(AdminRoute::EditApplication("billing".to_string())))
        );
        assert_eq!(
            AdminRoute::parse("/api/delete-application/my%20app"),
            Some(Some(AdminRoute::DeleteApplication("my app".to_string())))
        );
        assert_eq!(
            AdminRoute::parse("/api/end-point/billing"),
            Some(Some(AdminRoute::EndPoint("billing".to_string())))
        );
        assert_eq!(AdminRoute::parse("/health"), Some(Some(AdminRoute::Health)));
        assert_eq!(AdminRoute::parse("/metrics"), Some(Some(AdminRoute::Metrics)));

        // Admin segment without a known route
        assert_eq!(AdminRoute::parse("/api"), Some(None));
        assert_eq!(AdminRoute::parse("/api/unknown"), Some(None));
        assert_eq!(AdminRoute::parse("/api/end-point/"), Some(None));
        assert_eq!(AdminRoute::parse("/api/end-point/a/b"), Some(None));

        // Replay traffic
        assert_eq!(AdminRoute::parse("/billing/invoice"), None);
        assert_eq!(AdminRoute::parse("/apiary/x"), None);
        assert_eq!(AdminRoute::parse("/health/check"), None);
        assert_eq!(AdminRoute::parse("/simulated-data/api/x"), None);
    }

    #[tokio::test]
    async fn test_end_to_end_billing_scenario() {
        let state = state();

        let (status, _) = send(&state, "POST", "/api/create-application", r#"{"name":"billing"}"#).await;
        assert_eq!(status, StatusCode::CREATED);

        let rules = json!([{
            "requestUrl": "/invoice",
            "requestMethod": "GET",
            "responseStatusCode": 200,
            "responseContentType": "application/json",
            "responseValue": {"ok": true}
        }]);
        let (status, body) = send(&state, "POST", "/api/end-point/billing", &rules.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        let summary: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary, json!({"added": 1, "duplicates": 0}));

        let (status, body) = send(&state, "GET", "/billing/invoice", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":true}"#);

        let (status, body) = send(&state, "GET", "/simulated-data/billing/invoice", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"ok":true}"#);

        let (status, _) = send(&state, "GET", "/billing/unknown", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unregistered_application_replay_is_500() {
        let state = state();
        let (status, body) = send(&state, "GET", "/payroll/run", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("payroll"));
    }

    #[tokio::test]
    async fn test_unknown_admin_route_and_wrong_method() {
        let state = state();

        let (status, _) = send(&state, "GET", "/api/nothing-here", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&state, "GET", "/api/create-application", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = send(&state, "POST", "/health", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_root_path_is_not_found() {
        let state = state();
        let (status, _) = send(&state, "GET", "/", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let state = state();

        let (status, _) = send(&state, "POST", "/api/create-application", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "POST", "/api/create-application", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "POST", "/api/create-application", r#"{"name":"a/b"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "POST", "/api/create-application", r#"{"name":"dup"}"#).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&state, "POST", "/api/create-application", r#"{"name":"dup"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("already exists"));
    }

    #[tokio::test]
    async fn test_append_validation() {
        let state = state();

        let (status, _) = send(&state, "POST", "/api/end-point/ghost", r#"[{"requestUrl":"/x","requestMethod":"GET","responseStatusCode":200,"responseContentType":"text/plain","responseValue":"x"}]"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&state, "POST", "/api/create-application", r#"{"name":"billing"}"#).await;

        let (status, _) = send(&state, "POST", "/api/end-point/billing", "[]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "POST", "/api/end-point/billing", r#"{"requestUrl":"/x"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_and_delete_routes() {
        let state = state();
        send(&state, "POST", "/api/create-application", r#"{"name":"billing"}"#).await;

        let (status, _) = send(&state, "PUT", "/api/edit-application/billing", r#"{"name":"invoicing"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&state, "PUT", "/api/edit-application/billing", r#"{"name":"other"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&state, "GET", "/api/list-application", "").await;
        assert_eq!(status, StatusCode::OK);
        let listed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(listed, json!({"applications": ["invoicing"]}));

        let (status, _) = send(&state, "DELETE", "/api/delete-application/invoicing", "").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&state, "DELETE", "/api/delete-application/invoicing", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
