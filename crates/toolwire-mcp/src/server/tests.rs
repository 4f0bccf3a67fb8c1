// crates/toolwire-mcp/src/server/tests.rs
// ============================================================================
// Module: Transport Server Unit Tests
// Description: Unit tests for framing, JSON-RPC handling, and HTTP handlers.
// Purpose: Validate server behavior with in-memory fixtures.
// Dependencies: toolwire-mcp
// ============================================================================

//! ## Overview
//! Exercises stdio framing, JSON-RPC error mapping, streamed response
//! framing, the invocation surface, and metrics/audit hooks.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only framing assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufReader;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::ACCEPT;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use bytes::Bytes;
use serde_json::Value;
use serde_json::json;
use toolwire_config::StreamMode;
use toolwire_config::ToolwireConfig;
use toolwire_core::builtin_registry;

use super::JsonRpcResponse;
use super::RequestContext;
use super::ServerParts;
use super::ServerState;
use super::build_server_state;
use super::handle_invocations;
use super::handle_ping;
use super::handle_rpc;
use super::negotiate_framing;
use super::parse_request;
use super::read_framed;
use super::stream_documents;
use super::write_framed;
use crate::audit::AuditSink;
use crate::audit::InvocationAuditEvent;
use crate::audit::RequestAuditEvent;
use crate::invocation::AgentError;
use crate::invocation::EchoAgent;
use crate::invocation::InvocationAgent;
use crate::invocation::InvocationContext;
use crate::telemetry::RequestMethod;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestOutcome;
use crate::telemetry::ToolMetrics;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

#[derive(Default)]
struct TestMetrics {
    events: Mutex<Vec<RequestMetricEvent>>,
    latencies: Mutex<Vec<(RequestMetricEvent, Duration)>>,
}

impl ToolMetrics for TestMetrics {
    fn record_request(&self, event: RequestMetricEvent) {
        self.events.lock().expect("events lock").push(event);
    }

    fn record_latency(&self, event: RequestMetricEvent, latency: Duration) {
        self.latencies.lock().expect("latencies lock").push((event, latency));
    }
}

#[derive(Default)]
struct TestAudit {
    events: Mutex<Vec<RequestAuditEvent>>,
    invocations: Mutex<Vec<InvocationAuditEvent>>,
}

impl AuditSink for TestAudit {
    fn record(&self, event: &RequestAuditEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }

    fn record_invocation(&self, event: &InvocationAuditEvent) {
        self.invocations.lock().expect("invocations lock").push(event.clone());
    }
}

struct FailingAgent;

#[async_trait]
impl InvocationAgent for FailingAgent {
    async fn respond(
        &self,
        _context: &InvocationContext,
        _prompt: &str,
    ) -> Result<String, AgentError> {
        Err(AgentError::Failed("model offline".to_string()))
    }

    fn is_ready(&self) -> bool {
        false
    }
}

struct Fixture {
    state: Arc<ServerState>,
    metrics: Arc<TestMetrics>,
    audit: Arc<TestAudit>,
}

fn fixture_with(config: &ToolwireConfig, agent: Arc<dyn InvocationAgent>) -> Fixture {
    let metrics = Arc::new(TestMetrics::default());
    let audit = Arc::new(TestAudit::default());
    let parts = ServerParts {
        registry: Arc::new(builtin_registry().expect("builtin registry")),
        agent,
        metrics: metrics.clone(),
        audit: audit.clone(),
    };
    let state = Arc::new(build_server_state(config, parts).expect("server state"));
    Fixture {
        state,
        metrics,
        audit,
    }
}

fn fixture() -> Fixture {
    fixture_with(&ToolwireConfig::default(), Arc::new(EchoAgent))
}

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40_000))
}

fn rpc_bytes(payload: &Value) -> Bytes {
    Bytes::from(serde_json::to_vec(payload).expect("payload bytes"))
}

fn call_payload(name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments},
    })
}

fn rpc(state: &ServerState, payload: &Value) -> (StatusCode, Value) {
    let (status, response) = parse_request(state, &RequestContext::stdio(), &rpc_bytes(payload));
    (status, serde_json::to_value(&response).expect("response json"))
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn framed(payload: &[u8]) -> Vec<u8> {
    let mut framed = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
    framed.extend_from_slice(payload);
    framed
}

// ============================================================================
// SECTION: Framing
// ============================================================================

#[test]
fn read_framed_rejects_payload_over_limit() {
    let payload = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
    let mut reader = BufReader::new(Cursor::new(framed(payload)));
    assert!(read_framed(&mut reader, payload.len() - 1).is_err());
}

#[test]
fn read_framed_accepts_payload_at_limit() {
    let payload = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
    let mut reader = BufReader::new(Cursor::new(framed(payload)));
    let bytes = read_framed(&mut reader, payload.len()).expect("payload read");
    assert_eq!(bytes.as_deref(), Some(&payload[..]));
    assert!(read_framed(&mut reader, payload.len()).expect("clean end").is_none());
}

#[test]
fn read_framed_rejects_oversized_headers() {
    let framed = format!("{}\r\n\r\n", "x".repeat(9_000));
    let mut reader = BufReader::new(Cursor::new(framed.into_bytes()));
    assert!(read_framed(&mut reader, 1024).is_err());
}

#[test]
fn read_framed_rejects_duplicate_and_missing_content_length() {
    let duplicate = "Content-Length: 2\r\ncontent-length: 2\r\n\r\n{}";
    let mut reader = BufReader::new(Cursor::new(duplicate.as_bytes().to_vec()));
    assert!(read_framed(&mut reader, 64).is_err());

    let missing = "X-Other: 1\r\n\r\n{}";
    let mut reader = BufReader::new(Cursor::new(missing.as_bytes().to_vec()));
    assert!(read_framed(&mut reader, 64).is_err());
}

#[test]
fn read_framed_reports_truncated_headers() {
    let mut reader = BufReader::new(Cursor::new(b"Content-Length: 2\r\n".to_vec()));
    assert!(read_framed(&mut reader, 64).is_err());
}

#[test]
fn write_framed_round_trips_through_read_framed() {
    let mut out = Vec::new();
    write_framed(&mut out, b"{\"ok\":true}").expect("write");
    let mut reader = BufReader::new(Cursor::new(out));
    let bytes = read_framed(&mut reader, 64).expect("read").expect("payload");
    assert_eq!(bytes, b"{\"ok\":true}");
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

#[test]
fn tools_list_returns_builtins_in_registration_order() {
    let fixture = fixture();
    let (status, body) =
        rpc(&fixture.state, &json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}));
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .expect("tools")
        .iter()
        .map(|tool| tool["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["calculate_statistics", "compound_interest", "text_analyzer"]);
    assert_eq!(body["result"]["tools"][1]["inputSchema"]["type"], "object");
}

#[test]
fn tools_call_returns_text_content() {
    let fixture = fixture();
    let (status, body) = rpc(
        &fixture.state,
        &call_payload("calculate_statistics", json!({"numbers": [10, 20, 30, 40, 50]})),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["content"][0]["type"], "text");
    let text = body["result"]["content"][0]["text"].as_str().expect("text");
    let stats: Value = serde_json::from_str(text).expect("stats json");
    assert_eq!(stats["mean"], 30.0);
    assert_eq!(stats["std_dev"], 14.1421);
    assert!(body["result"].get("isError").is_none());
}

#[test]
fn tool_domain_error_is_a_result_not_a_fault() {
    let fixture = fixture();
    let (status, body) = rpc(
        &fixture.state,
        &call_payload(
            "compound_interest",
            json!({"principal": 1000, "rate": 5, "time": 2, "frequency": 0}),
        ),
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["isError"], true);
    assert_eq!(body["result"]["content"][0]["type"], "error");
    assert_eq!(body["result"]["content"][0]["kind"], "invalid_argument");

    let events = fixture.metrics.events.lock().expect("events lock");
    assert_eq!(events[0].outcome, RequestOutcome::ToolError);
    assert_eq!(events[0].tool.as_deref(), Some("compound_interest"));
    drop(events);
}

#[test]
fn unknown_tool_maps_to_method_not_found() {
    let fixture = fixture();
    let (status, body) = rpc(&fixture.state, &call_payload("weather", json!({})));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["error"]["message"], "unknown tool: weather");
}

#[test]
fn malformed_requests_map_to_json_rpc_errors() {
    let fixture = fixture();
    let (_, bad_version) =
        rpc(&fixture.state, &json!({"jsonrpc": "1.0", "id": 1, "method": "tools/list"}));
    assert_eq!(bad_version["error"]["code"], -32600);

    let (_, unknown_method) =
        rpc(&fixture.state, &json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}));
    assert_eq!(unknown_method["error"]["code"], -32601);

    let (_, bad_params) = rpc(
        &fixture.state,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"arguments": {}}}),
    );
    assert_eq!(bad_params["error"]["code"], -32602);

    let (status, response) =
        parse_request(&fixture.state, &RequestContext::stdio(), b"{not json");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error.expect("error").code, -32600);
}

#[test]
fn parse_request_rejects_payload_over_limit() {
    let mut config = ToolwireConfig::default();
    let bytes = rpc_bytes(&json!({"jsonrpc": "2.0", "id": 99, "method": "tools/list"}));
    config.server.max_body_bytes = bytes.len() - 1;
    let fixture = fixture_with(&config, Arc::new(EchoAgent));
    let (status, response) = parse_request(&fixture.state, &RequestContext::stdio(), &bytes);
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error.expect("error").code, -32070);
}

#[test]
fn metrics_and_audit_recorded_for_tools_list() {
    let fixture = fixture();
    let (status, _) =
        rpc(&fixture.state, &json!({"jsonrpc": "2.0", "id": "req-1", "method": "tools/list"}));
    assert_eq!(status, StatusCode::OK);

    let events = fixture.metrics.events.lock().expect("events lock");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].method, RequestMethod::ToolsList);
    assert_eq!(events[0].outcome, RequestOutcome::Ok);
    assert_eq!(events[0].error_code, None);
    assert!(events[0].response_bytes > 0);
    drop(events);

    let latencies = fixture.metrics.latencies.lock().expect("latencies lock");
    assert_eq!(latencies.len(), 1);
    drop(latencies);

    let audit = fixture.audit.events.lock().expect("audit lock");
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].event, "mcp_request");
    assert_eq!(audit[0].request_id.as_deref(), Some("req-1"));
    drop(audit);
}

// ============================================================================
// SECTION: Streamed Framing
// ============================================================================

#[test]
fn negotiate_framing_prefers_accept_header() {
    let mut headers = HeaderMap::new();
    assert_eq!(negotiate_framing(&headers, StreamMode::Sse), StreamMode::Sse);
    headers.insert(ACCEPT, HeaderValue::from_static("application/x-ndjson"));
    assert_eq!(negotiate_framing(&headers, StreamMode::Direct), StreamMode::Ndjson);
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    assert_eq!(negotiate_framing(&headers, StreamMode::Direct), StreamMode::Sse);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    assert_eq!(negotiate_framing(&headers, StreamMode::Ndjson), StreamMode::Direct);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    assert_eq!(negotiate_framing(&headers, StreamMode::Ndjson), StreamMode::Ndjson);
}

#[test]
fn stream_documents_split_multi_item_content() {
    let response = JsonRpcResponse::success(
        json!(3),
        json!({"content": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]}),
    );
    let documents = stream_documents(&response);
    assert_eq!(documents.len(), 2);
    let second: Value = serde_json::from_str(&documents[1]).expect("json");
    assert_eq!(second["id"], 3);
    assert_eq!(second["result"]["content"], json!([{"type": "text", "text": "b"}]));
}

#[test]
fn stream_documents_keep_single_documents_whole() {
    let response = JsonRpcResponse::failure(json!(1), -32601, "method not found".to_string());
    let documents = stream_documents(&response);
    assert_eq!(documents.len(), 1);
    assert!(!documents[0].contains('\n'));
}

#[tokio::test]
async fn ndjson_response_emits_one_line_per_document() {
    let fixture = fixture();
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/x-ndjson"));
    let payload = call_payload("text_analyzer", json!({"text": "Hi there. Bye!"}));
    let response = handle_rpc(
        State(Arc::clone(&fixture.state)),
        ConnectInfo(peer()),
        headers,
        rpc_bytes(&payload),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(CONTENT_TYPE).expect("content type"), "application/x-ndjson");
    let body = body_text(response).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(body.ends_with('\n'));
    let doc: Value = serde_json::from_str(lines[0]).expect("line json");
    let summary: Value =
        serde_json::from_str(doc["result"]["content"][0]["text"].as_str().expect("text"))
            .expect("summary json");
    assert_eq!(summary["sentences"], 2);
}

#[tokio::test]
async fn sse_response_wraps_documents_in_data_events() {
    let fixture = fixture();
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    let payload = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"});
    let response = handle_rpc(
        State(Arc::clone(&fixture.state)),
        ConnectInfo(peer()),
        headers,
        rpc_bytes(&payload),
    )
    .await;
    assert_eq!(response.headers().get(CONTENT_TYPE).expect("content type"), "text/event-stream");
    let body = body_text(response).await;
    assert!(body.starts_with("data: {"));
    assert!(body.contains("calculate_statistics"));
}

// ============================================================================
// SECTION: Invocation Surface
// ============================================================================

#[tokio::test]
async fn invocation_returns_output_message_envelope() {
    let fixture = fixture();
    let body = rpc_bytes(&json!({"prompt": "What is 2+2?", "session_id": "session-abc"}));
    let response =
        handle_invocations(State(Arc::clone(&fixture.state)), ConnectInfo(peer()), body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(value["output"]["message"]["content"][0]["text"], "Mock response: What is 2+2?");
    assert_eq!(value["metadata"]["user_id"], "test-user-001");
    assert_eq!(value["metadata"]["session_id"], "session-abc");
    assert!(value["timestamp"].is_string());

    let invocations = fixture.audit.invocations.lock().expect("invocations lock");
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].status, 200);
    assert_eq!(invocations[0].session_id.as_deref(), Some("session-abc"));
    drop(invocations);
}

#[tokio::test]
async fn invocation_without_prompt_is_rejected() {
    let fixture = fixture();
    for body in [Bytes::new(), rpc_bytes(&json!({})), rpc_bytes(&json!({"prompt": ""}))] {
        let response =
            handle_invocations(State(Arc::clone(&fixture.state)), ConnectInfo(peer()), body)
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(value, json!({"detail": "No prompt provided"}));
    }
}

#[tokio::test]
async fn invocation_agent_failure_is_internal_error() {
    let fixture = fixture_with(&ToolwireConfig::default(), Arc::new(FailingAgent));
    let body = rpc_bytes(&json!({"prompt": "hello"}));
    let response =
        handle_invocations(State(Arc::clone(&fixture.state)), ConnectInfo(peer()), body).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(value["detail"], "agent failed: model offline");

    let events = fixture.metrics.events.lock().expect("events lock");
    assert_eq!(events[0].method, RequestMethod::Invocation);
    assert_eq!(events[0].outcome, RequestOutcome::Error);
    assert_eq!(events[0].error_kind, Some("agent_error"));
    drop(events);
}

#[tokio::test]
async fn ping_reports_health_and_remote_mode() {
    let fixture = fixture_with(&ToolwireConfig::default(), Arc::new(FailingAgent));
    let ping = handle_ping(State(Arc::clone(&fixture.state))).await.0;
    assert_eq!(ping.status, "healthy");
    assert_eq!(ping.agent_ready, Some(false));
    assert_eq!(ping.mcp_mode.as_deref(), Some("url"));
    assert_eq!(ping.mcp_server.as_deref(), Some("http://localhost:8000/mcp"));
}
