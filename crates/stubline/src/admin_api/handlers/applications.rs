//! Application CRUD handlers.

use super::with_manager;
use crate::admin_api::server::ServerState;
use crate::admin_api::types::*;
use crate::metrics;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

/// Read and parse the `{name}` body shared by create and rename
async fn read_name<B>(req: Request<B>) -> Result<String, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let body = collect_body(req)
        .await
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e))?;

    let parsed: ApplicationNameRequest = serde_json::from_slice(&body).map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON body: {e}"))
    })?;

    parsed
        .name()
        .map(str::to_string)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Application name is required"))
}

/// POST /api/create-application - Register a new application
pub async fn handle_create<B>(req: Request<B>, state: Arc<ServerState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let response = match read_name(req).await {
        Ok(name) => {
            let key = name.clone();
            match with_manager(&state, move |manager| manager.create(&key)).await {
                Ok(Ok(())) => json_response(
                    StatusCode::CREATED,
                    &ApplicationResponse {
                        message: format!("Application '{name}' created"),
                        name,
                    },
                ),
                Ok(Err(e)) => application_error_response(&e),
                Err(response) => response,
            }
        }
        Err(response) => response,
    };

    metrics::record_admin_request("create_application", response.status().as_u16());
    response
}

/// GET /api/list-application - List application names
pub async fn handle_list(state: Arc<ServerState>) -> Response<Full<Bytes>> {
    let response = match with_manager(&state, |manager| manager.list()).await {
        Ok(Ok(applications)) => json_response(
            StatusCode::OK,
            &ListApplicationsResponse { applications },
        ),
        Ok(Err(e)) => application_error_response(&e),
        Err(response) => response,
    };

    metrics::record_admin_request("list_applications", response.status().as_u16());
    response
}

/// PUT /api/edit-application/:current - Rename an application
pub async fn handle_rename<B>(
    current: &str,
    req: Request<B>,
    state: Arc<ServerState>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let response = match read_name(req).await {
        Ok(new_name) => {
            let (from, to) = (current.to_string(), new_name.clone());
            match with_manager(&state, move |manager| manager.rename(&from, &to)).await {
                Ok(Ok(())) => json_response(
                    StatusCode::OK,
                    &ApplicationResponse {
                        message: format!("Application '{current}' renamed to '{new_name}'"),
                        name: new_name,
                    },
                ),
                Ok(Err(e)) => application_error_response(&e),
                Err(response) => response,
            }
        }
        Err(response) => response,
    };

    metrics::record_admin_request("rename_application", response.status().as_u16());
    response
}

/// DELETE /api/delete-application/:name - Delete an application
pub async fn handle_delete(name: &str, state: Arc<ServerState>) -> Response<Full<Bytes>> {
    let key = name.to_string();
    let response = match with_manager(&state, move |manager| manager.delete(&key)).await {
        Ok(Ok(())) => json_response(
            StatusCode::OK,
            &ApplicationResponse {
                message: format!("Application '{name}' deleted"),
                name: name.to_string(),
            },
        ),
        Ok(Err(e)) => application_error_response(&e),
        Err(response) => response,
    };

    metrics::record_admin_request("delete_application", response.status().as_u16());
    response
}
