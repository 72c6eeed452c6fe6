//! MCP over HTTP
//!
//! `POST /mcp` carries one JSON-RPC message per request. An `initialize`
//! request opens a session whose id is returned in `Mcp-Session-Id`;
//! later requests name it in the same header. Requests without the header
//! run in the shared session. `DELETE /mcp` ends a session.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;

use super::ApiState;
use crate::mcp::types::{JsonRpcResponse, error_codes};

/// Session id header (case-insensitive on the wire)
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Build MCP router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_post).delete(handle_delete))
        .with_state(state)
}

async fn handle_post(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let server = &state.server;

    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            let failure = JsonRpcResponse::failure(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("parse error: {e}"),
            );
            return (StatusCode::BAD_REQUEST, Json(failure)).into_response();
        }
    };

    let is_initialize = value.get("method").and_then(Value::as_str) == Some("initialize");

    let session = if is_initialize {
        server.sessions().create().await
    } else if let Some(id) = session_id(&headers) {
        match server.sessions().get(id).await {
            Some(session) => session,
            None => return unknown_session(id),
        }
    } else {
        server.sessions().shared()
    };

    let Some(response) = server.handle_value(&session, value).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    if !is_initialize {
        return Json(response).into_response();
    }

    if response.error.is_some() {
        server.sessions().remove(session.id()).await;
        return Json(response).into_response();
    }

    let mut http_response = Json(response).into_response();
    match HeaderValue::from_str(session.id()) {
        Ok(value) => {
            http_response.headers_mut().insert(SESSION_HEADER, value);
        }
        Err(e) => tracing::error!(error = %e, "session id is not a valid header value"),
    }
    http_response
}

async fn handle_delete(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> StatusCode {
    let Some(id) = session_id(&headers) else {
        return StatusCode::BAD_REQUEST;
    };

    if state.server.sessions().remove(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

fn unknown_session(id: &str) -> Response {
    tracing::debug!(session = id, "request for unknown session");
    let failure = JsonRpcResponse::failure(
        Value::Null,
        error_codes::INVALID_REQUEST,
        format!("unknown session: {id}"),
    );
    (StatusCode::NOT_FOUND, Json(failure)).into_response()
}
