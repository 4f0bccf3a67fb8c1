// crates/toolwire-cli/src/mcp_client.rs
// ============================================================================
// Module: MCP Client
// Description: Multi-transport JSON-RPC client for the Toolwire tool server.
// Purpose: Call `tools/list` and `tools/call` over HTTP, streamed HTTP, or stdio.
// Dependencies: reqwest, serde, toolwire-core
// ============================================================================

//! ## Overview
//! Provides the client side of the tool server. Direct HTTP reads one JSON-RPC
//! document per request. The NDJSON and SSE transports consume the body chunk
//! by chunk, frame it into lines, and merge the per-item documents back into a
//! single result. Every chunk read is bounded by the configured timeout; a
//! timeout or transport failure mid-stream discards what was read and reports
//! [`StreamError::PartialRead`].
//!
//! Security posture: server responses are untrusted; apply size limits and
//! fail closed on parsing errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::ChildStdout;
use tokio::process::Command;
use toolwire_config::StreamMode;
use toolwire_core::LineFramer;
use toolwire_core::StreamError;
use toolwire_core::ToolCallResult;
use toolwire_core::ToolContent;
use toolwire_core::ToolDescriptor;
use toolwire_core::ToolListResult;
use toolwire_core::decode_fragment;
use toolwire_mcp::EVENT_STREAM_CONTENT_TYPE;
use toolwire_mcp::NDJSON_CONTENT_TYPE;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest tool server reply the client will buffer.
pub const MAX_MCP_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Maximum stdio header line length accepted by the client.
const MAX_HEADER_LINE_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Wire transports the tool client can speak.
///
/// # Invariants
/// - Each HTTP variant maps to exactly one `Accept` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpTransport {
    /// HTTP JSON-RPC transport with a single response document.
    Http,
    /// HTTP JSON-RPC transport with newline-delimited response documents.
    Ndjson,
    /// HTTP JSON-RPC transport with server-sent event documents.
    Sse,
    /// Stdio JSON-RPC transport against a spawned server process.
    Stdio,
}

impl McpTransport {
    /// Maps a configured stream mode onto an HTTP transport.
    #[must_use]
    pub const fn from_stream_mode(mode: StreamMode) -> Self {
        match mode {
            StreamMode::Direct => Self::Http,
            StreamMode::Ndjson => Self::Ndjson,
            StreamMode::Sse => Self::Sse,
        }
    }

    /// Returns the `Accept` header value for HTTP transports.
    const fn accept(self) -> &'static str {
        match self {
            Self::Ndjson => NDJSON_CONTENT_TYPE,
            Self::Sse => EVENT_STREAM_CONTENT_TYPE,
            Self::Http | Self::Stdio => "application/json",
        }
    }
}

/// Connection settings for [`McpClient`].
///
/// # Invariants
/// - HTTP transports require `endpoint`; [`McpTransport::Stdio`] requires
///   `stdio_command`.
#[derive(Debug, Clone)]
pub struct McpClientConfig {
    /// Selected transport.
    pub transport: McpTransport,
    /// Endpoint URL for HTTP transports.
    pub endpoint: Option<String>,
    /// Stdio command to spawn.
    pub stdio_command: Option<PathBuf>,
    /// Stdio command arguments.
    pub stdio_args: Vec<String>,
    /// Stdio environment variables.
    pub stdio_env: Vec<(String, String)>,
    /// Per-request timeout; streamed transports apply it to each chunk.
    pub timeout: Duration,
}

impl McpClientConfig {
    /// Builds an HTTP client configuration.
    #[must_use]
    pub fn http(transport: McpTransport, endpoint: &str, timeout: Duration) -> Self {
        Self {
            transport,
            endpoint: Some(endpoint.to_string()),
            stdio_command: None,
            stdio_args: Vec::new(),
            stdio_env: Vec::new(),
            timeout,
        }
    }
}

/// Tool client failures.
///
/// # Invariants
/// - Payloads may quote server text and are never trusted for control flow.
#[derive(Debug, Error)]
pub enum McpClientError {
    /// Settings are incomplete for the chosen transport.
    #[error("tool client config error: {0}")]
    Config(String),
    /// Connection, timeout, or process failure.
    #[error("tool transport error: {0}")]
    Transport(String),
    /// Payload did not match the expected shape.
    #[error("tool payload error: {0}")]
    Json(String),
    /// Protocol parsing error or JSON-RPC error reply.
    #[error("tool protocol error: {0}")]
    Protocol(String),
    /// Reply exceeded [`MAX_MCP_RESPONSE_BYTES`].
    #[error("tool reply too large ({actual} > {limit} bytes)")]
    ResponseTooLarge {
        /// Bytes seen when the limit tripped.
        actual: usize,
        /// Byte limit.
        limit: usize,
    },
    /// Streamed body ended abnormally.
    #[error("tool stream error: {0}")]
    Stream(StreamError),
}

/// JSON-RPC client for the tool server.
///
/// # Invariants
/// - Request ids start at 1 and never repeat within one client.
pub struct McpClient {
    /// Transport backend.
    transport: McpTransportClient,
    /// Id for the next request.
    next_id: u64,
}

// ============================================================================
// SECTION: JSON-RPC Structures
// ============================================================================

/// Outgoing request.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    /// JSON-RPC version tag.
    jsonrpc: &'static str,
    /// Request identifier.
    id: u64,
    /// `tools/list` or `tools/call`.
    method: &'a str,
    /// Parameters payload.
    params: Value,
}

/// Reply document.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// Echoed request identifier; `null` when the server could not read it.
    #[serde(default)]
    id: Value,
    /// Present on success.
    #[serde(default)]
    result: Option<Value>,
    /// Present on failure.
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// Error member of a reply.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// Error code provided by the server.
    code: i64,
    /// Server message.
    message: String,
}

impl JsonRpcResponse {
    /// Returns the result payload or converts the error reply.
    fn into_result(self, method: &str) -> Result<Value, McpClientError> {
        if let Some(error) = self.error {
            return Err(McpClientError::Protocol(format!("{} ({})", error.message, error.code)));
        }
        self.result
            .ok_or_else(|| McpClientError::Protocol(format!("missing result in {method} response")))
    }
}

/// Fails when a reply answers some request other than `id`.
///
/// A `null` id is accepted only on error replies, where the server could not
/// recover the request id.
fn check_reply_id(response: &JsonRpcResponse, id: u64) -> Result<(), McpClientError> {
    if response.id == Value::from(id) || (response.id.is_null() && response.error.is_some()) {
        return Ok(());
    }
    Err(McpClientError::Protocol(format!(
        "reply id {} does not match request id {id}",
        response.id
    )))
}

// ============================================================================
// SECTION: Client Implementations
// ============================================================================

/// Transport backends.
enum McpTransportClient {
    /// HTTP transports (direct or streamed).
    Http(HttpMcpClient),
    /// Stdio transport.
    Stdio(StdioMcpClient),
}

impl McpClient {
    /// Connects a client over the configured transport.
    ///
    /// The stdio transport spawns its server immediately and must be created
    /// inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when configuration is invalid or transport setup fails.
    pub fn new(config: McpClientConfig) -> Result<Self, McpClientError> {
        let transport = match config.transport {
            McpTransport::Http | McpTransport::Ndjson | McpTransport::Sse => {
                McpTransportClient::Http(HttpMcpClient::new(config)?)
            }
            McpTransport::Stdio => McpTransportClient::Stdio(StdioMcpClient::spawn(config)?),
        };
        Ok(Self {
            transport,
            next_id: 1,
        })
    }

    /// Calls `tools/list` and returns the tool descriptors in server order.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the transport or parsing fails.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, McpClientError> {
        let result = self.send_request("tools/list", Value::Object(serde_json::Map::new())).await?;
        let parsed: ToolListResult = serde_json::from_value(result)
            .map_err(|err| McpClientError::Json(format!("invalid tools/list payload: {err}")))?;
        Ok(parsed.tools)
    }

    /// Calls `tools/call` and returns the tool result.
    ///
    /// Domain errors raised by the tool come back as a result with
    /// `is_error()` set, not as an `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the transport or parsing fails, or the
    /// server replies with a JSON-RPC error.
    pub async fn call_tool(
        &mut self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, McpClientError> {
        let params = serde_json::json!({
            "name": tool_name,
            "arguments": arguments,
        });
        let result = self.send_request("tools/call", params).await?;
        serde_json::from_value(result).map_err(|err| {
            McpClientError::Json(format!("invalid tools/call payload for {tool_name}: {err}"))
        })
    }

    /// Sends a JSON-RPC request and returns its result payload.
    async fn send_request(&mut self, method: &str, params: Value) -> Result<Value, McpClientError> {
        let id = self.next_id;
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| McpClientError::Protocol("json-rpc request id overflow".to_string()))?;
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response = match &mut self.transport {
            McpTransportClient::Http(client) => client.send_request(&request).await?,
            McpTransportClient::Stdio(client) => client.send_request(&request).await?,
        };
        if let Err(err) = check_reply_id(&response, id) {
            if let McpTransportClient::Stdio(client) = &mut self.transport {
                client.abandon();
            }
            return Err(err);
        }
        response.into_result(method)
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// HTTP JSON-RPC transport client.
struct HttpMcpClient {
    /// Shared HTTP client.
    client: Client,
    /// Endpoint URL.
    endpoint: String,
    /// Transport variant (direct, NDJSON, or SSE).
    transport: McpTransport,
    /// Per-chunk timeout for streamed bodies.
    timeout: Duration,
}

impl HttpMcpClient {
    /// Builds a new HTTP transport client.
    fn new(config: McpClientConfig) -> Result<Self, McpClientError> {
        let endpoint = config.endpoint.ok_or_else(|| {
            McpClientError::Config("endpoint is required for HTTP transport".to_string())
        })?;
        let mut builder = Client::builder().redirect(Policy::none());
        if config.transport == McpTransport::Http {
            builder = builder.timeout(config.timeout);
        } else {
            builder = builder.connect_timeout(config.timeout);
        }
        let client = builder.build().map_err(|err| McpClientError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            transport: config.transport,
            timeout: config.timeout,
        })
    }

    /// Sends a JSON-RPC request over HTTP.
    async fn send_request(
        &self,
        request: &JsonRpcRequest<'_>,
    ) -> Result<JsonRpcResponse, McpClientError> {
        let payload = serde_json::to_vec(request)
            .map_err(|err| McpClientError::Json(format!("jsonrpc serialization failed: {err}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(self.transport.accept()));
        let send = self.client.post(&self.endpoint).headers(headers).body(payload).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| McpClientError::Transport("request timed out".to_string()))?
            .map_err(|err| McpClientError::Transport(err.to_string()))?;
        if self.transport == McpTransport::Http {
            let body = read_response_body_with_limit(response, MAX_MCP_RESPONSE_BYTES).await?;
            return serde_json::from_slice(&body).map_err(|err| {
                McpClientError::Protocol(format!("invalid json-rpc response: {err}"))
            });
        }
        let documents = read_streamed_documents(response, self.timeout).await?;
        merge_documents(documents)
    }
}

// ============================================================================
// SECTION: HTTP Helpers
// ============================================================================

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, McpClientError> {
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| McpClientError::Transport(err.to_string()))?
    {
        checked_total(body.len(), chunk.len(), limit)?;
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Reads a streamed body into decoded JSON-RPC documents in arrival order.
///
/// Undecodable lines are skipped as framing noise. Each chunk read is bounded
/// by `timeout`.
async fn read_streamed_documents(
    mut response: reqwest::Response,
    timeout: Duration,
) -> Result<Vec<Value>, McpClientError> {
    let mut framer = LineFramer::new();
    let mut documents = Vec::new();
    let mut total: usize = 0;
    loop {
        let chunk = match tokio::time::timeout(timeout, response.chunk()).await {
            Ok(Ok(Some(chunk))) => chunk,
            Ok(Ok(None)) => break,
            Ok(Err(err)) => {
                return Err(partial_read(documents.len(), &format!("body read failed: {err}")));
            }
            Err(_) => return Err(partial_read(documents.len(), "chunk read timed out")),
        };
        total = checked_total(total, chunk.len(), MAX_MCP_RESPONSE_BYTES)?;
        framer.push(&chunk);
        while let Some(line) = framer.next_line() {
            if let Ok(document) = decode_fragment(&line) {
                documents.push(document);
            }
        }
    }
    if let Some(line) = framer.finish()
        && let Ok(document) = decode_fragment(&line)
    {
        documents.push(document);
    }
    Ok(documents)
}

/// Builds a partial-read error for a streamed body.
fn partial_read(fragments_discarded: usize, reason: &str) -> McpClientError {
    McpClientError::Stream(StreamError::PartialRead {
        fragments_discarded,
        reason: reason.to_string(),
    })
}

/// Adds `len` to `total`, failing when the sum exceeds `limit`.
fn checked_total(total: usize, len: usize, limit: usize) -> Result<usize, McpClientError> {
    match total.checked_add(len) {
        Some(next) if next <= limit => Ok(next),
        Some(next) => Err(McpClientError::ResponseTooLarge {
            actual: next,
            limit,
        }),
        None => Err(McpClientError::ResponseTooLarge {
            actual: usize::MAX,
            limit,
        }),
    }
}

/// Merges per-item streamed documents into one JSON-RPC response.
///
/// The first error document wins. Otherwise `result.content` lists are
/// concatenated in arrival order and `isError` is carried over.
fn merge_documents(documents: Vec<Value>) -> Result<JsonRpcResponse, McpClientError> {
    let mut id = Value::Null;
    let mut merged: Option<Value> = None;
    let mut content: Vec<ToolContent> = Vec::new();
    let mut has_content = false;
    for document in documents {
        let response: JsonRpcResponse = serde_json::from_value(document).map_err(|err| {
            McpClientError::Protocol(format!("invalid json-rpc stream document: {err}"))
        })?;
        if response.error.is_some() {
            return Ok(response);
        }
        let Some(result) = response.result else {
            continue;
        };
        if let Some(items) = result.get("content").cloned() {
            let items: Vec<ToolContent> = serde_json::from_value(items).map_err(|err| {
                McpClientError::Json(format!("invalid streamed content: {err}"))
            })?;
            content.extend(items);
            has_content = true;
        }
        if merged.is_none() {
            id = response.id;
            merged = Some(result);
        }
    }
    let mut result = merged
        .ok_or_else(|| McpClientError::Protocol("stream carried no json-rpc result".to_string()))?;
    if has_content && let Some(object) = result.as_object_mut() {
        let items = serde_json::to_value(&content)
            .map_err(|err| McpClientError::Json(format!("content merge failed: {err}")))?;
        object.insert("content".to_string(), items);
    }
    Ok(JsonRpcResponse {
        id,
        result: Some(result),
        error: None,
    })
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Tool server child process speaking `Content-Length` framing.
struct StdioMcpClient {
    /// Server process, stopped when the client drops or falls out of sync.
    child: Child,
    /// Framed exchange over the server pipes.
    session: FramedSession<BufReader<ChildStdout>, ChildStdin>,
}

impl StdioMcpClient {
    /// Launches the server process with piped stdin and stdout.
    fn spawn(config: McpClientConfig) -> Result<Self, McpClientError> {
        let program = config.stdio_command.ok_or_else(|| {
            McpClientError::Config("stdio transport needs a server command".to_string())
        })?;
        let mut child = Command::new(&program)
            .args(&config.stdio_args)
            .envs(config.stdio_env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                McpClientError::Transport(format!("cannot launch {}: {err}", program.display()))
            })?;
        let (Some(input), Some(output)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(McpClientError::Transport("server pipes unavailable".to_string()));
        };
        Ok(Self {
            child,
            session: FramedSession::new(BufReader::new(output), input, config.timeout),
        })
    }

    /// Writes one framed request and reads the framed reply.
    ///
    /// A failed exchange stops the server; later requests fail fast.
    async fn send_request(
        &mut self,
        request: &JsonRpcRequest<'_>,
    ) -> Result<JsonRpcResponse, McpClientError> {
        let payload = serde_json::to_vec(request)
            .map_err(|err| McpClientError::Json(format!("request encoding failed: {err}")))?;
        let reply = match self.session.exchange(&payload).await {
            Ok(reply) => reply,
            Err(err) => {
                self.abandon();
                return Err(err);
            }
        };
        serde_json::from_slice(&reply).map_err(|err| {
            self.abandon();
            McpClientError::Protocol(format!("invalid json-rpc response: {err}"))
        })
    }

    /// Marks the pipes unusable and stops the server process.
    fn abandon(&mut self) {
        self.session.desynced = true;
        let _ = self.child.start_kill();
    }
}

impl Drop for StdioMcpClient {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// One request/response framed exchange at a time over a reader and writer.
///
/// # Invariants
/// - Once `desynced` is set, the next frame on `output` may answer an older
///   request, so every later exchange is refused.
struct FramedSession<R, W> {
    /// Response side.
    output: R,
    /// Request side.
    input: W,
    /// Bound on one exchange.
    timeout: Duration,
    /// Set after a failed or abandoned exchange.
    desynced: bool,
}

impl<R, W> FramedSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps the pipes of a fresh server.
    const fn new(output: R, input: W, timeout: Duration) -> Self {
        Self {
            output,
            input,
            timeout,
            desynced: false,
        }
    }

    /// Writes `payload` as one frame and reads the next frame back.
    async fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>, McpClientError> {
        if self.desynced {
            return Err(McpClientError::Transport(
                "stdio server out of sync after an earlier failure".to_string(),
            ));
        }
        let Self {
            output,
            input,
            timeout,
            desynced,
        } = self;
        let exchange = async {
            write_framed(input, payload).await?;
            read_framed(output).await
        };
        let result = match tokio::time::timeout(*timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(McpClientError::Transport("stdio request timed out".to_string())),
        };
        if result.is_err() {
            *desynced = true;
        }
        result
    }
}

/// Reads one `Content-Length` framed message.
///
/// # Errors
///
/// Returns [`McpClientError`] when the stream closes, a header is malformed
/// or missing, or the declared length exceeds [`MAX_MCP_RESPONSE_BYTES`].
pub async fn read_framed<R>(reader: &mut R) -> Result<Vec<u8>, McpClientError>
where
    R: AsyncBufRead + Unpin,
{
    let mut declared: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|err| McpClientError::Transport(format!("stdio read failed: {err}")))?;
        if read == 0 {
            return Err(McpClientError::Transport("stdio closed".to_string()));
        }
        if read > MAX_HEADER_LINE_BYTES {
            return Err(McpClientError::Protocol("stdio header line too long".to_string()));
        }
        let header = line.trim();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            let len = value.trim().parse::<usize>().map_err(|_| {
                McpClientError::Protocol(format!("bad content length: {}", value.trim()))
            })?;
            declared = Some(len);
        }
    }
    let len = declared.ok_or_else(|| {
        McpClientError::Protocol("stdio reply has no content length".to_string())
    })?;
    if len > MAX_MCP_RESPONSE_BYTES {
        return Err(McpClientError::ResponseTooLarge {
            actual: len,
            limit: MAX_MCP_RESPONSE_BYTES,
        });
    }
    let mut body = vec![0u8; len];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|err| McpClientError::Transport(format!("stdio body read failed: {err}")))?;
    Ok(body)
}

/// Writes one `Content-Length` framed message and flushes.
///
/// # Errors
///
/// Returns [`McpClientError::Transport`] when the write fails.
pub async fn write_framed<W>(writer: &mut W, payload: &[u8]) -> Result<(), McpClientError>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
    frame.extend_from_slice(payload);
    writer
        .write_all(&frame)
        .await
        .map_err(|err| McpClientError::Transport(format!("stdio write failed: {err}")))?;
    writer
        .flush()
        .await
        .map_err(|err| McpClientError::Transport(format!("stdio flush failed: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
