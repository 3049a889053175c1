//! Streamable HTTP endpoint
//!
//! One route, three methods: POST /mcp carries JSON-RPC traffic (an
//! initialization request opens a session, identified from then on by the
//! mcp-session-id header), GET /mcp holds an event stream open for the
//! session, and DELETE /mcp closes it.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Json, Router,
};
use futures_util::stream;
use mcp_common::{EmbeddableError, EmbeddableMcp};
use pg_common::{PostgresExecutor, QueryExecutor};
use rmcp::ServerHandler;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::HttpConfig;
use crate::jsonrpc::{RpcRequest, RpcResponse};
use crate::server::SqlSelectServer;
use crate::session::{McpSession, SessionStore};

/// Header carrying the session id on every request after initialization
pub const MCP_SESSION_HEADER: &str = "mcp-session-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live sessions keyed by id
    pub sessions: Arc<SessionStore>,
    /// Database executor handed to each session's server
    pub executor: Arc<dyn QueryExecutor>,
}

impl AppState {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            executor,
        }
    }
}

/// Start the HTTP server
pub async fn serve(config: HttpConfig) -> Result<()> {
    let executor = PostgresExecutor::connect(&config.pg)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let state = AppState::new(Arc::new(executor));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting MCP server on http://localhost:{}/mcp", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            mcp_common::shutdown_signal().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

/// Create the router with the /mcp endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/mcp", post(post_mcp).get(get_mcp).delete(delete_mcp))
        .layer(cors)
        .with_state(state)
}

fn session_id_from(headers: &HeaderMap) -> Option<&str> {
    // A header that is not valid UTF-8 still counts as present; it maps to
    // an id no session can have, so the request takes the invalid-session
    // path rather than the no-header one.
    headers
        .get(MCP_SESSION_HEADER)
        .map(|value| value.to_str().unwrap_or(""))
}

async fn lookup(state: &AppState, headers: &HeaderMap) -> Option<Arc<McpSession>> {
    state.sessions.get(session_id_from(headers)?).await
}

// ============================================================================
// POST: JSON-RPC requests
// ============================================================================

async fn post_mcp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    match session_id_from(&headers) {
        Some(id) => match state.sessions.get(id).await {
            Some(session) => continue_session(&session, body).await,
            None => no_session_response(),
        },
        None if body["method"] == "initialize" => initialize_session(&state, body).await,
        None => no_session_response(),
    }
}

fn no_session_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(RpcResponse::error(
            Value::Null,
            -32000,
            "Bad Request: No valid session ID provided",
        )),
    )
        .into_response()
}

/// Open a new session and answer the initialization request
async fn initialize_session(state: &AppState, body: Value) -> Response {
    let request: RpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(_) => {
            return (StatusCode::OK, Json(RpcResponse::invalid_request(Value::Null)))
                .into_response()
        }
    };
    if request.jsonrpc != "2.0" {
        return (StatusCode::OK, Json(RpcResponse::invalid_request(request.id))).into_response();
    }

    let server = SqlSelectServer::new(state.executor.clone());
    let info = match serde_json::to_value(server.get_info()) {
        Ok(info) => info,
        Err(e) => {
            return (
                StatusCode::OK,
                Json(RpcResponse::internal_error(request.id, e.to_string())),
            )
                .into_response()
        }
    };

    let session_id = Uuid::new_v4().to_string();
    state
        .sessions
        .insert(session_id.clone(), Arc::new(McpSession::new(server)))
        .await;
    tracing::info!("Session initialized: {}", session_id);

    (
        StatusCode::OK,
        [(MCP_SESSION_HEADER, session_id)],
        Json(RpcResponse::success(request.id, info)),
    )
        .into_response()
}

/// Answer a request addressed to an existing session
async fn continue_session(session: &McpSession, body: Value) -> Response {
    let request: RpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(_) => {
            return (StatusCode::OK, Json(RpcResponse::invalid_request(Value::Null)))
                .into_response()
        }
    };

    match dispatch(session, request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Route one JSON-RPC request to the session's server
///
/// Returns `None` for notifications, which are acknowledged without a body.
async fn dispatch(session: &McpSession, request: RpcRequest) -> Option<RpcResponse> {
    if request.jsonrpc != "2.0" {
        return Some(RpcResponse::invalid_request(request.id));
    }
    if request.is_notification() {
        tracing::debug!("Notification: {}", request.method);
        return None;
    }

    let RpcRequest {
        id, method, params, ..
    } = request;

    let response = match method.as_str() {
        "initialize" => {
            RpcResponse::error(id, -32600, "Invalid Request: Server already initialized")
        }
        "ping" => RpcResponse::success(id, json!({})),
        "tools/list" => list_session_tools(session, id),
        "tools/call" => dispatch_tool_call(session, id, params).await,
        _ => RpcResponse::method_not_found(id, &method),
    };
    Some(response)
}

// The server also implements rmcp's ServerHandler, which has its own
// list_tools/call_tool, so dispatch names the trait explicitly.
fn list_session_tools(session: &McpSession, id: Value) -> RpcResponse {
    match serde_json::to_value(EmbeddableMcp::list_tools(session.server())) {
        Ok(tools) => RpcResponse::success(id, json!({ "tools": tools })),
        Err(e) => RpcResponse::internal_error(id, e.to_string()),
    }
}

/// Params of a tools/call request
#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn dispatch_tool_call(session: &McpSession, id: Value, params: Value) -> RpcResponse {
    let call: CallParams = match serde_json::from_value(params) {
        Ok(call) => call,
        Err(e) => return RpcResponse::invalid_params(id, e.to_string()),
    };

    match EmbeddableMcp::call_tool(session.server(), &call.name, call.arguments).await {
        Ok(result) => match serde_json::to_value(result) {
            Ok(result) => RpcResponse::success(id, result),
            Err(e) => RpcResponse::internal_error(id, e.to_string()),
        },
        Err(EmbeddableError::ToolNotFound(name)) => {
            RpcResponse::invalid_params(id, format!("Unknown tool: {}", name))
        }
        Err(EmbeddableError::InvalidParams(message)) => RpcResponse::invalid_params(id, message),
        Err(EmbeddableError::McpError(message)) => RpcResponse::internal_error(id, message),
    }
}

// ============================================================================
// GET: per-session event stream
// ============================================================================

async fn get_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = lookup(&state, &headers).await else {
        return (StatusCode::BAD_REQUEST, "Invalid or missing session ID").into_response();
    };

    // Hold only the close receiver so eviction can drop the last sender
    let closed = session.watch_close();
    let stream = stream::unfold(closed, |mut closed| async move {
        match closed.changed().await {
            Ok(()) => Some((Ok::<Event, Infallible>(Event::default().comment("open")), closed)),
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

// ============================================================================
// DELETE: session close
// ============================================================================

async fn delete_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let removed = match session_id_from(&headers) {
        Some(id) => state.sessions.remove(id).await.map(|_| id),
        None => None,
    };

    match removed {
        Some(id) => {
            tracing::info!("Session closed: {}", id);
            StatusCode::OK.into_response()
        }
        None => (StatusCode::BAD_REQUEST, "Invalid or missing session ID").into_response(),
    }
}
