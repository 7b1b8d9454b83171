//! Inbound callback endpoint.
//!
//! The remote execution context POSTs the eventual script result to
//! `/wd/hub/session/{sessionId}/receive_async_response`. The route decodes
//! the dual-convention body and hands the `(status, value)` pair to the
//! executor; correlation and classification happen there.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde_json::{Value, json};

use relay_protocol::AsyncResponse;
use relay_runtime::Result;

use crate::driver::ScriptExecutor;

/// Shared route state.
#[derive(Clone)]
pub struct AppState {
    executor: Arc<ScriptExecutor>,
}

/// Builds the router exposing the async response endpoint.
pub fn create_router(executor: Arc<ScriptExecutor>) -> Router {
    Router::new()
        .route(
            "/wd/hub/session/{session_id}/receive_async_response",
            post(receive_async_response),
        )
        .with_state(AppState { executor })
}

async fn receive_async_response(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<AsyncResponse>,
) -> Json<Value> {
    state.executor.deliver_async_response(&session_id, body);
    Json(json!({ "value": null }))
}

/// Serves the router on a plain TCP listener.
///
/// The TLS-capable listener used for https callbacks is a separate seam
/// (`AsyncCallbackListener`); this helper covers the http path and tests.
pub async fn serve(router: Router, address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(target = "relay.http", address, "async response endpoint listening");
    axum::serve(listener, router).await?;
    Ok(())
}
