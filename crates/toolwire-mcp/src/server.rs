// crates/toolwire-mcp/src/server.rs
// ============================================================================
// Module: Transport Server
// Description: JSON-RPC tool server over stdio and HTTP, plus invocation surface.
// Purpose: Expose the tool dispatcher in direct and streamed response modes.
// Dependencies: toolwire-core, toolwire-config, axum, tokio
// ============================================================================

//! ## Overview
//! The server exposes [`toolwire_core::Dispatcher`] as JSON-RPC 2.0
//! (`tools/list`, `tools/call`). Over stdio, requests use `Content-Length`
//! framing. Over HTTP, `POST /mcp` answers in one of three framings chosen
//! from the `Accept` header, falling back to the configured default:
//!
//! - direct: one JSON document;
//! - `application/x-ndjson`: one JSON-RPC document per content item, one per
//!   line;
//! - `text/event-stream`: the same documents as server-sent events.
//!
//! The HTTP transport also serves `POST /invocations`, `GET /ping`, and
//! `GET /`. All collaborators live in a single [`ServerState`] built once at
//! startup and shared by every handler; every request is reported to the
//! metrics and audit sinks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::ACCEPT;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::routing::get;
use axum::routing::post;
use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use toolwire_config::ServerAuditConfig;
use toolwire_config::ServerTransport;
use toolwire_config::StreamMode;
use toolwire_config::ToolwireConfig;
use toolwire_core::DispatchResponse;
use toolwire_core::Dispatcher;
use toolwire_core::ToolCallRequest;
use toolwire_core::ToolError;
use toolwire_core::ToolMethod;
use toolwire_core::ToolRegistry;
use toolwire_core::builtin_registry;

use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::InvocationAuditEvent;
use crate::audit::InvocationAuditEventParams;
use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::RequestAuditEventParams;
use crate::audit::StderrAuditSink;
use crate::invocation::EchoAgent;
use crate::invocation::ErrorDetail;
use crate::invocation::InvocationAgent;
use crate::invocation::InvocationContext;
use crate::invocation::InvocationRequest;
use crate::invocation::InvocationResponse;
use crate::invocation::PingResponse;
use crate::invocation::ServiceInfo;
use crate::telemetry::NoopMetrics;
use crate::telemetry::RequestMethod;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestOutcome;
use crate::telemetry::ToolMetrics;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JSON-RPC endpoint path.
pub const MCP_PATH: &str = "/mcp";
/// Invocation endpoint path.
pub const INVOCATIONS_PATH: &str = "/invocations";
/// Liveness endpoint path.
pub const PING_PATH: &str = "/ping";
/// Content type of newline-delimited JSON bodies.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
/// Content type of server-sent event bodies.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
/// JSON-RPC protocol version.
const JSONRPC_VERSION: &str = "2.0";
/// Buffered documents per streamed response.
const STREAM_CHANNEL_CAPACITY: usize = 16;
/// Maximum length of one stdio header line.
const MAX_HEADER_LINE_BYTES: usize = 8 * 1024;
/// Fallback payload when a response cannot be serialized.
const SERIALIZATION_FAILED_PAYLOAD: &str =
    "{\"jsonrpc\":\"2.0\",\"id\":null,\"error\":{\"code\":-32060,\"message\":\"serialization \
     failed\"}}";

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// Collaborators injected into the server at startup.
pub struct ServerParts {
    /// Tool registry, frozen before serving.
    pub registry: Arc<ToolRegistry>,
    /// Agent answering invocations.
    pub agent: Arc<dyn InvocationAgent>,
    /// Metrics sink.
    pub metrics: Arc<dyn ToolMetrics>,
    /// Audit sink.
    pub audit: Arc<dyn AuditSink>,
}

/// Tool server instance.
pub struct McpServer {
    /// Server configuration.
    config: ToolwireConfig,
    /// Shared request-handling context.
    state: Arc<ServerState>,
}

impl McpServer {
    /// Builds a server with the builtin tools, the echo agent, no-op metrics,
    /// and the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when configuration or initialization fails.
    pub fn from_config(config: ToolwireConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let registry = builtin_registry().map_err(|err| McpServerError::Init(err.to_string()))?;
        let audit = build_audit_sink(&config.server.audit)?;
        let parts = ServerParts {
            registry: Arc::new(registry),
            agent: Arc::new(EchoAgent),
            metrics: Arc::new(NoopMetrics),
            audit,
        };
        Self::with_parts(config, parts)
    }

    /// Builds a server from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Config`] when configuration is invalid.
    pub fn with_parts(config: ToolwireConfig, parts: ServerParts) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let state = Arc::new(build_server_state(&config, parts)?);
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the HTTP application for this server.
    #[must_use]
    pub fn app(&self) -> Router {
        build_app(Arc::clone(&self.state))
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => serve_stdio(&self.state),
            ServerTransport::Http => {
                let addr = self
                    .config
                    .server
                    .bind_addr()
                    .map_err(|err| McpServerError::Config(err.to_string()))?;
                let listener = TcpListener::bind(addr)
                    .await
                    .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
                self.serve_listener(listener).await
            }
        }
    }

    /// Serves HTTP requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when the server fails.
    pub async fn serve_listener(self, listener: TcpListener) -> Result<(), McpServerError> {
        let app = build_app(self.state);
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| McpServerError::Transport("http server failed".to_string()))
    }
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &ServerAuditConfig) -> Result<Arc<dyn AuditSink>, McpServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| McpServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Builds the shared handler state.
fn build_server_state(
    config: &ToolwireConfig,
    parts: ServerParts,
) -> Result<ServerState, McpServerError> {
    let remote_endpoint =
        config.remote.endpoint().map_err(|err| McpServerError::Config(err.to_string()))?;
    Ok(ServerState {
        dispatcher: Dispatcher::new(parts.registry),
        agent: parts.agent,
        metrics: parts.metrics,
        audit: parts.audit,
        max_body_bytes: config.server.max_body_bytes,
        stream_mode: config.server.stream_mode,
        default_user_id: config.invocation.default_user_id.clone(),
        default_session_id: config.invocation.default_session_id.clone(),
        remote_mode: config.remote.mode_label(),
        remote_endpoint: remote_endpoint.to_string(),
    })
}

/// Builds the HTTP router.
fn build_app(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(MCP_PATH, post(handle_rpc))
        .route(INVOCATIONS_PATH, post(handle_invocations))
        .route(PING_PATH, get(handle_ping))
        .route("/", get(handle_root))
        .with_state(state)
}

/// Shared context for every request handler.
struct ServerState {
    /// Tool dispatcher.
    dispatcher: Dispatcher,
    /// Agent answering invocations.
    agent: Arc<dyn InvocationAgent>,
    /// Metrics sink.
    metrics: Arc<dyn ToolMetrics>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// Framing used when the client states no preference.
    stream_mode: StreamMode,
    /// User id applied when an invocation omits one.
    default_user_id: String,
    /// Session id applied when an invocation omits one.
    default_session_id: String,
    /// Remote tool service mode label.
    remote_mode: &'static str,
    /// Resolved remote tool service endpoint.
    remote_endpoint: String,
}

/// Per-request transport metadata.
#[derive(Debug, Clone)]
struct RequestContext {
    /// Transport used for the request.
    transport: ServerTransport,
    /// Response framing.
    framing: StreamMode,
    /// Peer IP address when known.
    peer_ip: Option<String>,
}

impl RequestContext {
    /// Context for a stdio request.
    const fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            framing: StreamMode::Direct,
            peer_ip: None,
        }
    }

    /// Context for an HTTP request.
    fn http(framing: StreamMode, peer: SocketAddr) -> Self {
        Self {
            transport: ServerTransport::Http,
            framing,
            peer_ip: Some(peer.ip().to_string()),
        }
    }
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout until stdin closes.
fn serve_stdio(state: &ServerState) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(std::io::stdin());
    let mut writer = std::io::stdout();
    let context = RequestContext::stdio();
    while let Some(bytes) = read_framed(&mut reader, state.max_body_bytes)? {
        let (_, response) = parse_request(state, &context, &bytes);
        let payload = serde_json::to_vec(&response)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        write_framed(&mut writer, &payload)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: HTTP Handlers
// ============================================================================

/// Handles `POST /mcp`.
async fn handle_rpc(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let framing = negotiate_framing(&headers, state.stream_mode);
    let context = RequestContext::http(framing, peer);
    let (status, response) = parse_request(&state, &context, &bytes);
    match framing {
        StreamMode::Direct => (status, Json(response)).into_response(),
        StreamMode::Ndjson => ndjson_response(status, &response),
        StreamMode::Sse => sse_response(status, &response),
    }
}

/// Picks the response framing from the `Accept` header.
fn negotiate_framing(headers: &HeaderMap, default: StreamMode) -> StreamMode {
    let Some(accept) = headers.get(ACCEPT).and_then(|value| value.to_str().ok()) else {
        return default;
    };
    let accept = accept.to_ascii_lowercase();
    if accept.contains(NDJSON_CONTENT_TYPE) {
        StreamMode::Ndjson
    } else if accept.contains(EVENT_STREAM_CONTENT_TYPE) {
        StreamMode::Sse
    } else if accept.contains("application/json") {
        StreamMode::Direct
    } else {
        default
    }
}

/// Streams response documents as newline-delimited JSON.
fn ndjson_response(status: StatusCode, response: &JsonRpcResponse) -> Response {
    let documents = stream_documents(response);
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(STREAM_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        for document in documents {
            let mut line = document.into_bytes();
            line.push(b'\n');
            if tx.send(Ok(Bytes::from(line))).await.is_err() {
                break;
            }
        }
    });
    let mut reply = (status, Body::from_stream(ReceiverStream::new(rx))).into_response();
    reply.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(NDJSON_CONTENT_TYPE));
    reply
}

/// Streams response documents as server-sent events.
fn sse_response(status: StatusCode, response: &JsonRpcResponse) -> Response {
    let documents = stream_documents(response);
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(STREAM_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        for document in documents {
            if tx.send(Ok(Event::default().data(document))).await.is_err() {
                break;
            }
        }
    });
    (status, Sse::new(ReceiverStream::new(rx))).into_response()
}

/// Splits a response into one serialized JSON-RPC document per content item.
///
/// Responses without a multi-item `content` list yield a single document.
fn stream_documents(response: &JsonRpcResponse) -> Vec<String> {
    let items = response
        .result
        .as_ref()
        .and_then(|result| result.get("content"))
        .and_then(Value::as_array)
        .filter(|items| items.len() > 1);
    let (Some(result), Some(items)) = (response.result.as_ref(), items) else {
        return vec![serialize_response(response)];
    };
    items
        .iter()
        .map(|item| {
            let mut chunk = result.clone();
            if let Some(object) = chunk.as_object_mut() {
                object.insert("content".to_string(), Value::Array(vec![item.clone()]));
            }
            serialize_response(&JsonRpcResponse::success(response.id.clone(), chunk))
        })
        .collect()
}

/// Serializes a response, substituting a fixed error document on failure.
fn serialize_response(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| SERIALIZATION_FAILED_PAYLOAD.to_string())
}

/// Handles `POST /invocations`.
async fn handle_invocations(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    bytes: Bytes,
) -> Response {
    let started = Instant::now();
    let reply = run_invocation(&state, &bytes).await;
    let outcome =
        if reply.status.is_success() { RequestOutcome::Ok } else { RequestOutcome::Error };
    let event = RequestMetricEvent {
        transport: ServerTransport::Http,
        framing: StreamMode::Direct,
        method: RequestMethod::Invocation,
        tool: None,
        outcome,
        error_code: None,
        error_kind: reply.error_kind,
        request_bytes: bytes.len(),
        response_bytes: reply.response_bytes,
    };
    state.metrics.record_request(event.clone());
    state.metrics.record_latency(event, started.elapsed());
    state.audit.record_invocation(&InvocationAuditEvent::new(InvocationAuditEventParams {
        peer_ip: Some(peer.ip().to_string()),
        user_id: reply.context.as_ref().map(|context| context.user_id.clone()),
        session_id: reply.context.as_ref().map(|context| context.session_id.clone()),
        outcome,
        status: reply.status.as_u16(),
        prompt_bytes: reply.prompt_bytes,
        response_bytes: reply.response_bytes,
    }));
    reply.response
}

/// Result of processing one invocation.
struct InvocationReply {
    /// HTTP status.
    status: StatusCode,
    /// Rendered response.
    response: Response,
    /// Resolved identifiers once the request was accepted.
    context: Option<InvocationContext>,
    /// Failure label for observability.
    error_kind: Option<&'static str>,
    /// Prompt size in bytes.
    prompt_bytes: usize,
    /// Answer size in bytes.
    response_bytes: usize,
}

impl InvocationReply {
    /// Builds a `{"detail": ...}` failure reply.
    fn detail(status: StatusCode, error_kind: &'static str, detail: String) -> Self {
        Self {
            status,
            response: (
                status,
                Json(ErrorDetail {
                    detail,
                }),
            )
                .into_response(),
            context: None,
            error_kind: Some(error_kind),
            prompt_bytes: 0,
            response_bytes: 0,
        }
    }
}

/// Validates an invocation and asks the agent for an answer.
async fn run_invocation(state: &ServerState, bytes: &[u8]) -> InvocationReply {
    if bytes.len() > state.max_body_bytes {
        return InvocationReply::detail(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "request body too large".to_string(),
        );
    }
    let request = if bytes.trim_ascii().is_empty() {
        InvocationRequest::default()
    } else {
        match serde_json::from_slice::<InvocationRequest>(bytes) {
            Ok(request) => request,
            Err(_) => {
                return InvocationReply::detail(
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    "invalid invocation request".to_string(),
                );
            }
        }
    };
    let prompt = request.prompt.unwrap_or_default();
    if prompt.is_empty() {
        return InvocationReply::detail(
            StatusCode::BAD_REQUEST,
            "missing_prompt",
            "No prompt provided".to_string(),
        );
    }
    let context = InvocationContext {
        user_id: request.user_id.unwrap_or_else(|| state.default_user_id.clone()),
        session_id: request.session_id.unwrap_or_else(|| state.default_session_id.clone()),
    };
    match state.agent.respond(&context, &prompt).await {
        Ok(text) => {
            let response_bytes = text.len();
            let body = InvocationResponse::new(text, context.clone());
            InvocationReply {
                status: StatusCode::OK,
                response: (StatusCode::OK, Json(body)).into_response(),
                context: Some(context),
                error_kind: None,
                prompt_bytes: prompt.len(),
                response_bytes,
            }
        }
        Err(err) => {
            let mut reply = InvocationReply::detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "agent_error",
                err.to_string(),
            );
            reply.context = Some(context);
            reply.prompt_bytes = prompt.len();
            reply
        }
    }
}

/// Handles `GET /ping`.
async fn handle_ping(State(state): State<Arc<ServerState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "healthy".to_string(),
        agent_ready: Some(state.agent.is_ready()),
        mcp_mode: Some(state.remote_mode.to_string()),
        mcp_server: Some(state.remote_endpoint.clone()),
    })
}

/// Handles `GET /`.
async fn handle_root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "toolwire".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            format!("POST {INVOCATIONS_PATH}"),
            format!("GET {PING_PATH}"),
            format!("POST {MCP_PATH}"),
        ],
    })
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    #[serde(default)]
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    #[serde(default)]
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    const fn failure(id: Value, code: i64, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
            }),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Observability facts gathered while handling a request.
#[derive(Debug, Clone)]
struct RpcSummary {
    /// Request identifier label.
    request_id: Option<String>,
    /// Method classification.
    method: RequestMethod,
    /// Tool name for calls.
    tool: Option<String>,
    /// Failure label.
    error_kind: Option<&'static str>,
    /// Whether the tool reported a domain error.
    tool_error: bool,
}

impl RpcSummary {
    /// Summary for a request that could not be decoded.
    const fn invalid(error_kind: &'static str) -> Self {
        Self {
            request_id: None,
            method: RequestMethod::Invalid,
            tool: None,
            error_kind: Some(error_kind),
            tool_error: false,
        }
    }
}

/// Handled request with its status and summary.
struct RpcReply {
    /// HTTP status.
    status: StatusCode,
    /// JSON-RPC response.
    response: JsonRpcResponse,
    /// Observability facts.
    summary: RpcSummary,
}

impl RpcReply {
    /// Builds an error reply.
    fn failure(
        status: StatusCode,
        id: Value,
        code: i64,
        message: &str,
        summary: RpcSummary,
    ) -> Self {
        Self {
            status,
            response: JsonRpcResponse::failure(id, code, message.to_string()),
            summary,
        }
    }
}

/// Decodes, dispatches, and reports one request.
fn parse_request(
    state: &ServerState,
    context: &RequestContext,
    bytes: &[u8],
) -> (StatusCode, JsonRpcResponse) {
    let started = Instant::now();
    let reply = decode_request(state, bytes);
    record_request(state, context, bytes.len(), &reply, started);
    (reply.status, reply.response)
}

/// Enforces the size limit and decodes the request envelope.
fn decode_request(state: &ServerState, bytes: &[u8]) -> RpcReply {
    if bytes.len() > state.max_body_bytes {
        return RpcReply::failure(
            StatusCode::PAYLOAD_TOO_LARGE,
            Value::Null,
            -32070,
            "request body too large",
            RpcSummary::invalid("payload_too_large"),
        );
    }
    match serde_json::from_slice::<JsonRpcRequest>(bytes) {
        Ok(request) => handle_request(&state.dispatcher, request),
        Err(_) => RpcReply::failure(
            StatusCode::BAD_REQUEST,
            Value::Null,
            -32600,
            "invalid json-rpc request",
            RpcSummary::invalid("invalid_request"),
        ),
    }
}

/// Dispatches a decoded JSON-RPC request.
fn handle_request(dispatcher: &Dispatcher, request: JsonRpcRequest) -> RpcReply {
    let mut summary = RpcSummary {
        request_id: request_id_label(&request.id),
        method: RequestMethod::Other,
        tool: None,
        error_kind: None,
        tool_error: false,
    };
    if request.jsonrpc != JSONRPC_VERSION {
        summary.method = RequestMethod::Invalid;
        summary.error_kind = Some("invalid_version");
        return RpcReply::failure(
            StatusCode::BAD_REQUEST,
            request.id,
            -32600,
            "invalid json-rpc version",
            summary,
        );
    }
    let Some(method) = ToolMethod::parse(&request.method) else {
        summary.error_kind = Some("method_not_found");
        return RpcReply::failure(
            StatusCode::BAD_REQUEST,
            request.id,
            -32601,
            "method not found",
            summary,
        );
    };
    let call = match method {
        ToolMethod::List => {
            summary.method = RequestMethod::ToolsList;
            ToolCallRequest::list(request.id)
        }
        ToolMethod::Call => {
            summary.method = RequestMethod::ToolsCall;
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<ToolCallParams>(params) {
                Ok(params) => {
                    summary.tool = Some(params.name.clone());
                    ToolCallRequest::call(request.id, &params.name, params.arguments)
                }
                Err(_) => {
                    summary.error_kind = Some("invalid_params");
                    return RpcReply::failure(
                        StatusCode::BAD_REQUEST,
                        request.id,
                        -32602,
                        "invalid tool params",
                        summary,
                    );
                }
            }
        }
    };
    match dispatcher.dispatch(&call) {
        Ok(response) => {
            if let DispatchResponse::Call(result) = &response {
                summary.tool_error = result.is_error();
            }
            match response.to_value() {
                Ok(value) => RpcReply {
                    status: StatusCode::OK,
                    response: JsonRpcResponse::success(call.id, value),
                    summary,
                },
                Err(_) => {
                    summary.error_kind = Some("serialization");
                    RpcReply::failure(
                        StatusCode::OK,
                        call.id,
                        -32060,
                        "serialization failed",
                        summary,
                    )
                }
            }
        }
        Err(err) => jsonrpc_error(call.id, &err, summary),
    }
}

/// Builds a JSON-RPC error reply for a dispatch failure.
fn jsonrpc_error(id: Value, error: &ToolError, mut summary: RpcSummary) -> RpcReply {
    let (status, code) = match error {
        ToolError::UnknownTool(_) => (StatusCode::BAD_REQUEST, -32601),
        ToolError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, -32600),
        ToolError::InvalidArgument(_) | ToolError::EmptyInput(_) => {
            (StatusCode::BAD_REQUEST, -32602)
        }
        ToolError::DuplicateTool(_) => (StatusCode::INTERNAL_SERVER_ERROR, -32603),
    };
    summary.error_kind = Some(error.kind());
    RpcReply::failure(status, id, code, &error.to_string(), summary)
}

/// Renders a request identifier for logs.
fn request_id_label(id: &Value) -> Option<String> {
    match id {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

/// Emits metrics and an audit event for a handled request.
fn record_request(
    state: &ServerState,
    context: &RequestContext,
    request_bytes: usize,
    reply: &RpcReply,
    started: Instant,
) {
    let response_bytes = serde_json::to_vec(&reply.response).map_or(0, |payload| payload.len());
    let error_code = reply.response.error.as_ref().map(|error| error.code);
    let outcome = if error_code.is_some() {
        RequestOutcome::Error
    } else if reply.summary.tool_error {
        RequestOutcome::ToolError
    } else {
        RequestOutcome::Ok
    };
    let event = RequestMetricEvent {
        transport: context.transport,
        framing: context.framing,
        method: reply.summary.method,
        tool: reply.summary.tool.clone(),
        outcome,
        error_code,
        error_kind: reply.summary.error_kind,
        request_bytes,
        response_bytes,
    };
    state.metrics.record_request(event.clone());
    state.metrics.record_latency(event, started.elapsed());
    state.audit.record(&RequestAuditEvent::new(RequestAuditEventParams {
        request_id: reply.summary.request_id.clone(),
        transport: context.transport,
        framing: context.framing,
        peer_ip: context.peer_ip.clone(),
        method: reply.summary.method,
        tool: reply.summary.tool.clone(),
        outcome,
        error_code,
        error_kind: reply.summary.error_kind,
        request_bytes,
        response_bytes,
    }));
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Reads a framed stdio payload using `Content-Length` headers.
///
/// Returns `Ok(None)` when the input ends cleanly between messages.
fn read_framed(
    reader: &mut BufReader<impl Read>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError> {
    let header_limit = u64::try_from(MAX_HEADER_LINE_BYTES).unwrap_or(u64::MAX);
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .by_ref()
            .take(header_limit)
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if saw_header {
                return Err(McpServerError::Transport("stdio closed".to_string()));
            }
            return Ok(None);
        }
        if bytes >= MAX_HEADER_LINE_BYTES && !line.ends_with('\n') {
            return Err(McpServerError::Transport("header line too long".to_string()));
        }
        if line.trim().is_empty() {
            if saw_header {
                break;
            }
            continue;
        }
        saw_header = true;
        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            if content_length.is_some() {
                return Err(McpServerError::Transport("duplicate content length".to_string()));
            }
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using `Content-Length` headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests;
