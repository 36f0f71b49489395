pub mod applications;
pub mod endpoints;
pub mod replay;
pub mod system;

use crate::admin_api::server::ServerState;
use crate::admin_api::types::error_response;
use crate::application::ApplicationManager;
use crate::replay::INTERNAL_ERROR_MESSAGE;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use tracing::error;

/// Run a manager call on tokio's blocking pool.
///
/// Manager calls do file I/O under per-application locks and must not park async workers.
/// A panic inside `f` surfaces as a 500.
pub(crate) async fn with_manager<T, F>(
    state: &Arc<ServerState>,
    f: F,
) -> Result<T, Response<Full<Bytes>>>
where
    F: FnOnce(&ApplicationManager) -> T + Send + 'static,
    T: Send + 'static,
{
    let manager = Arc::clone(&state.manager);
    tokio::task::spawn_blocking(move || f(&manager))
        .await
        .map_err(|e| {
            error!("Manager task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        })
}
