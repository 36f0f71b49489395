//! Request/response types and response helpers for the HTTP API.

use crate::application::ApplicationError;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorDetail>,
}

/// Individual error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Body of create and rename requests
#[derive(Debug, Deserialize)]
pub struct ApplicationNameRequest {
    #[serde(default)]
    pub name: Option<String>,
}

impl ApplicationNameRequest {
    /// The trimmed name, if one was supplied
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Response for listing applications
#[derive(Debug, Serialize)]
pub struct ListApplicationsResponse {
    pub applications: Vec<String>,
}

/// Response for admin mutations
#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub message: String,
    pub name: String,
}

// =============================================================================
// Response helper functions
// =============================================================================

/// Create a JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with headers.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| internal_error_fallback())
}

fn internal_error_fallback() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Create an error response
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let error = ErrorResponse {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &error)
}

/// Create a not found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Create a method not allowed response
pub fn method_not_allowed() -> Response<Full<Bytes>> {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Map an application error onto a caller-facing response.
///
/// Storage failures are logged with their cause; the response only names the application.
pub fn application_error_response(err: &ApplicationError) -> Response<Full<Bytes>> {
    match err {
        ApplicationError::InvalidName(_) | ApplicationError::AlreadyExists(_) => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        ApplicationError::NotFound(_) => error_response(StatusCode::NOT_FOUND, &err.to_string()),
        ApplicationError::Storage { name, source } => {
            error!(application = %name, "Storage failure: {}", source);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
        ApplicationError::ListFailed(source) => {
            error!("Failed to list applications: {}", source);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Collect request body into bytes
pub async fn collect_body<B>(req: Request<B>) -> Result<Bytes, String>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    req.into_body()
        .collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}
