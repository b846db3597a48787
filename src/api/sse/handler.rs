//! Streamable HTTP and SSE handlers for MCP

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use super::{session::SessionManager, ClientSession};
use crate::event_store::{EventMessage, EventStore, EventStoreError, EventStoreResult};
use crate::market::MarketDataProvider;
use crate::protocol::{
    initialize_result, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ServerInfo, PROTOCOL_VERSION,
};
use crate::server::{extract_arguments, extract_tool_name};
use crate::tools::{build_registry, ToolRegistry};

/// Session header defined by the Streamable HTTP transport
pub const HEADER_SESSION_ID: &str = "Mcp-Session-Id";

/// Standard SSE resume header
pub const HEADER_LAST_EVENT_ID: &str = "Last-Event-ID";

/// Buffer between the store replay and stream assembly
const REPLAY_CHANNEL_CAPACITY: usize = 16;

/// Shared state for the Streamable HTTP endpoints
pub struct AppState {
    /// Event store backing stream resumability
    pub store: Arc<dyn EventStore>,
    /// Session manager
    pub sessions: SessionManager,
    /// Registered MCP tools
    pub tools: ToolRegistry,
    /// Server info
    pub server_info: ServerInfo,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        provider: Arc<dyn MarketDataProvider>,
        server_info: ServerInfo,
    ) -> Self {
        Self {
            store,
            sessions: SessionManager::new(),
            tools: build_registry(provider),
            server_info,
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Append a message to the session's stream, then push it live
///
/// The store write comes first: once `append` returns, a reconnecting
/// client can replay the event even if no stream is open right now.
async fn publish_event(
    state: &AppState,
    session: &ClientSession,
    message: Value,
) -> EventStoreResult<()> {
    let event_id = state.store.append(&session.session_id, message.clone()).await?;
    session.publish(EventMessage { event_id, message });
    Ok(())
}

async fn record_notification(
    state: &AppState,
    session: &ClientSession,
    notification: &JsonRpcNotification,
) -> EventStoreResult<()> {
    let message = serde_json::to_value(notification)?;
    publish_event(state, session, message).await
}

/// POST /mcp - Handle JSON-RPC requests
pub async fn mcp_post_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let id = request.id.clone().unwrap_or(Value::Null);

    // Validate JSON-RPC version
    if !request.is_valid() {
        let error = JsonRpcError::invalid_request(id, "jsonrpc must be '2.0'".to_string());
        return (StatusCode::BAD_REQUEST, Json(error)).into_response();
    }

    // Client notifications (initialized, cancelled, ...) get no body
    if request.is_notification() {
        return StatusCode::ACCEPTED.into_response();
    }

    if request.method == "initialize" {
        return handle_initialize(&state, id).await;
    }

    // Every other method runs inside the session named by the header.
    // An unknown ID means the session expired; the client must
    // re-initialize.
    let session = match header_str(&headers, HEADER_SESSION_ID) {
        Some(session_id) => match state.sessions.get_session(&session_id).await {
            Some(session) => session,
            None => return StatusCode::NOT_FOUND.into_response(),
        },
        None => {
            return (StatusCode::BAD_REQUEST, "Mcp-Session-Id header required").into_response()
        }
    };

    match request.method.as_str() {
        "tools/list" => {
            let result = json!({ "tools": state.tools.definitions() });
            (StatusCode::OK, Json(JsonRpcResponse::new(id, result))).into_response()
        }
        "tools/call" => match handle_tool_call(&state, &session, id, request.params).await {
            Ok(response) => (StatusCode::OK, Json(response)).into_response(),
            Err(error) => (StatusCode::OK, Json(error)).into_response(),
        },
        "ping" => (StatusCode::OK, Json(JsonRpcResponse::new(id, json!({})))).into_response(),
        _ => {
            let error = JsonRpcError::method_not_found(id, request.method);
            (StatusCode::OK, Json(error)).into_response()
        }
    }
}

/// Start a session and hand its ID back in the response headers
async fn handle_initialize(state: &AppState, id: Value) -> Response {
    let session = state.sessions.create_session().await;
    info!(session_id = %session.session_id, "session initialized");

    let response = JsonRpcResponse::new(id, initialize_result(&state.server_info));
    (
        StatusCode::OK,
        [(HEADER_SESSION_ID, session.session_id)],
        Json(response),
    )
        .into_response()
}

async fn handle_tool_call(
    state: &AppState,
    session: &ClientSession,
    id: Value,
    params: Option<Value>,
) -> Result<JsonRpcResponse, JsonRpcError> {
    let params = params.ok_or_else(|| {
        JsonRpcError::invalid_params(id.clone(), "Missing parameters".to_string())
    })?;

    let tool_name = extract_tool_name(&params).ok_or_else(|| {
        JsonRpcError::invalid_params(id.clone(), "Missing tool name".to_string())
    })?;

    let tool = state.tools.get(tool_name).cloned().ok_or_else(|| {
        JsonRpcError::new(
            id.clone(),
            -32602,
            "Unknown tool".to_string(),
            Some(json!({"tool": tool_name})),
        )
    })?;

    // Tool progress goes onto the session stream, so a client that
    // reconnects mid-call still sees it. A store failure is reported,
    // never swallowed.
    let note = JsonRpcNotification::log_message(
        "info",
        json!(format!("Calling tool: {tool_name}")),
    );
    record_notification(state, session, &note)
        .await
        .map_err(|e| store_error(id.clone(), &e))?;

    let arguments = extract_arguments(&params);
    match tool.execute(arguments).await {
        Ok(result) => Ok(JsonRpcResponse::new(id, result)),
        Err(e) => {
            let note = JsonRpcNotification::log_message(
                "error",
                json!(format!("Tool {tool_name} failed: {e}")),
            );
            if let Err(store_err) = record_notification(state, session, &note).await {
                error!("failed to record tool error event: {}", store_err);
            }
            Err(JsonRpcError::new(
                id,
                -32603,
                "Tool execution error".to_string(),
                Some(json!({"details": e.to_string()})),
            ))
        }
    }
}

fn store_error(id: Value, error: &EventStoreError) -> JsonRpcError {
    JsonRpcError::internal_error(id, format!("Event store unavailable: {error}"))
}

/// Encode a stored event as an SSE frame, carrying its ID for resume
fn message_event(event: &EventMessage) -> Event {
    Event::default()
        .event("message")
        .id(&event.event_id)
        .data(event.message.to_string())
}

/// GET /mcp - SSE stream for server→client messages
///
/// With a `Last-Event-ID` header the stream first replays every event
/// stored after that ID, then switches to live events.
pub async fn mcp_sse_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let Some(session_id) = header_str(&headers, HEADER_SESSION_ID) else {
        return (
            StatusCode::BAD_REQUEST,
            "Mcp-Session-Id header required",
        )
            .into_response();
    };
    let Some(session) = state.sessions.get_session(&session_id).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // Subscribe before replaying so events published in between are not
    // lost. Anything caught by both paths is dropped by event ID below.
    let mut live = session.subscribe();

    let mut replayed: Vec<EventMessage> = Vec::new();
    if let Some(last_event_id) = header_str(&headers, HEADER_LAST_EVENT_ID) {
        let (tx, mut rx) = mpsc::channel(REPLAY_CHANNEL_CAPACITY);
        let store = state.store.clone();
        let resume_from = last_event_id.clone();
        let replay = tokio::spawn(async move { store.replay_after(&resume_from, tx).await });
        while let Some(event) = rx.recv().await {
            replayed.push(event);
        }

        match replay.await {
            Ok(Ok(Some(stream_id))) if stream_id == session_id => {
                info!(
                    session_id = %session_id,
                    events = replayed.len(),
                    "resuming stream"
                );
            }
            Ok(Ok(Some(stream_id))) => {
                // The ID belongs to another session's stream; do not leak
                // its events here.
                warn!(
                    session_id = %session_id,
                    owner = %stream_id,
                    "Last-Event-ID from a different stream, ignoring"
                );
                replayed.clear();
            }
            Ok(Ok(None)) => {
                debug!(session_id = %session_id, "Last-Event-ID unknown or evicted");
            }
            Ok(Err(e)) => {
                error!("event replay failed: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "event replay failed")
                    .into_response();
            }
            Err(e) => {
                error!("event replay task failed: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "event replay failed")
                    .into_response();
            }
        }
    }

    let replayed_ids: HashSet<String> = replayed.iter().map(|e| e.event_id.clone()).collect();

    let stream = async_stream::stream! {
        for event in &replayed {
            yield Ok::<_, Infallible>(message_event(event));
        }

        loop {
            match live.recv().await {
                Ok(event) => {
                    if replayed_ids.contains(&event.event_id) {
                        continue;
                    }
                    yield Ok(message_event(&event));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Client is too slow
                    yield Ok(Event::default()
                        .event("error")
                        .data(format!("Missed {} events, reconnect with Last-Event-ID", n)));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::default().interval(Duration::from_secs(30)))
        .into_response()
}

/// DELETE /mcp - Terminate a session
pub async fn mcp_delete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let Some(session_id) = header_str(&headers, HEADER_SESSION_ID) else {
        return (
            StatusCode::BAD_REQUEST,
            "Mcp-Session-Id header required",
        )
            .into_response();
    };
    if state.sessions.get_session(&session_id).await.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    state.sessions.remove_session(&session_id).await;
    info!(session_id = %session_id, "session terminated");
    StatusCode::NO_CONTENT.into_response()
}

/// GET /mcp/info - Get server info
#[derive(Debug, Serialize)]
pub struct ServerInfoResponse {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
    pub tool_count: usize,
    pub active_sessions: usize,
}

pub async fn server_info_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let info = ServerInfoResponse {
        name: state.server_info.name.clone(),
        version: state.server_info.version.clone(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        tool_count: state.tools.len(),
        active_sessions: state.sessions.session_count().await,
    };
    Json(info)
}
