//! HTTP surface of the bridge.

use super::handler::{Bridge, BridgeError};
use super::protocol::{ChatCompletionRequest, DONE_SENTINEL};
use crate::agent::Agent;
use crate::rpc::protocol::error_codes;
use crate::rpc::{JsonRpcResponse, RpcDispatcher};
use crate::settings::ServiceConfig;
use crate::tools::ToolDefinition;
use crate::utils::unix_timestamp;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "fleetflow";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared, read-only state of the HTTP handlers.
#[derive(Debug)]
pub struct BridgeState {
    bridge: Bridge,
    rpc: RpcDispatcher,
    agent_name: String,
    tools: Vec<ToolDefinition>,
    model: String,
    public_url: String,
}

impl BridgeState {
    /// Builds handler state from configuration.
    pub fn new(config: &ServiceConfig, agent: Arc<dyn Agent>) -> Self {
        Self {
            agent_name: agent.name().to_string(),
            tools: agent.tools(),
            bridge: Bridge::from_config(agent.clone(), config),
            rpc: RpcDispatcher::new(agent, config.rpc.method.clone()),
            model: config.model.clone(),
            public_url: config.public_url(),
        }
    }
}

/// Builds the router.
pub fn router(state: Arc<BridgeState>) -> Router {
    Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/health", get(health))
        .route("/.well-known/agent-card.json", get(agent_card))
        .route("/", post(json_rpc))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the process stops.
pub async fn serve(config: &ServiceConfig, agent: Arc<dyn Agent>) -> std::io::Result<()> {
    let state = Arc::new(BridgeState::new(config, agent));
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        model = %state.bridge.model(),
        rpc_method = %state.rpc.method(),
        "Bridge listening"
    );
    axum::serve(listener, router(state)).await
}

/// POST /chat/completions
async fn chat_completions(
    State(state): State<Arc<BridgeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, BridgeError> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    state.bridge.authorize(presented)?;

    let request: ChatCompletionRequest =
        serde_json::from_slice(&body).map_err(|e| BridgeError::InvalidBody(e.to_string()))?;
    let chunks = state.bridge.handle(presented, &request).await?;

    let mut events: Vec<Result<Event, axum::Error>> = chunks
        .iter()
        .map(|chunk| Event::default().json_data(chunk))
        .collect();
    events.push(Ok(Event::default().data(DONE_SENTINEL)));

    let sse = Sse::new(futures::stream::iter(events));
    Ok((
        [(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        )],
        sse,
    )
        .into_response())
}

/// GET /health
async fn health(State(state): State<Arc<BridgeState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "model": state.model,
        "timestamp": unix_timestamp(),
    }))
}

/// GET /.well-known/agent-card.json
async fn agent_card(State(state): State<Arc<BridgeState>>) -> Json<Value> {
    let tools: Vec<Value> = state
        .tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "permission": tool.permission,
            })
        })
        .collect();
    Json(json!({
        "name": state.agent_name,
        "description": "Predictive maintenance agent for fleet vehicles",
        "version": env!("CARGO_PKG_VERSION"),
        "capabilities": {
            "streaming": true,
            "function_calling": false,
        },
        "preferredTransport": "HTTP",
        "url": state.public_url,
        "tools": tools,
    }))
}

/// POST /
async fn json_rpc(State(state): State<Arc<BridgeState>>, body: Bytes) -> Json<JsonRpcResponse> {
    let response = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => state.rpc.dispatch(value).await,
        Err(e) => JsonRpcResponse::error(
            Value::Null,
            error_codes::PARSE_ERROR,
            format!("Parse error: {e}"),
        ),
    };
    Json(response)
}
