// crates/toolwire-mcp/tests/audit_sinks.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: JSON-line audit output and sink selection from configuration.
// Purpose: Ensure audit events are durable, parseable, and redacted.
// ============================================================================

//! Audit sink integration tests.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;

use serde_json::Value;
use toolwire_config::ServerTransport;
use toolwire_config::StreamMode;
use toolwire_config::ToolwireConfig;
use toolwire_mcp::AuditSink;
use toolwire_mcp::FileAuditSink;
use toolwire_mcp::InvocationAuditEvent;
use toolwire_mcp::McpServer;
use toolwire_mcp::RequestAuditEvent;
use toolwire_mcp::RequestMethod;
use toolwire_mcp::RequestOutcome;
use toolwire_mcp::audit::InvocationAuditEventParams;
use toolwire_mcp::audit::RequestAuditEventParams;

fn request_event(tool: &str) -> RequestAuditEvent {
    RequestAuditEvent::new(RequestAuditEventParams {
        request_id: Some("1".to_string()),
        transport: ServerTransport::Http,
        framing: StreamMode::Ndjson,
        peer_ip: Some("127.0.0.1".to_string()),
        method: RequestMethod::ToolsCall,
        tool: Some(tool.to_string()),
        outcome: RequestOutcome::Ok,
        error_code: None,
        error_kind: None,
        request_bytes: 120,
        response_bytes: 240,
    })
}

#[test]
fn file_sink_appends_one_json_line_per_event() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.jsonl");
    let sink = FileAuditSink::new(&path).expect("open sink");
    sink.record(&request_event("calculate_statistics"));
    sink.record_invocation(&InvocationAuditEvent::new(InvocationAuditEventParams {
        peer_ip: None,
        user_id: Some("user".to_string()),
        session_id: Some("session".to_string()),
        outcome: RequestOutcome::Error,
        status: 400,
        prompt_bytes: 0,
        response_bytes: 0,
    }));

    let contents = fs::read_to_string(&path).expect("read audit log");
    let lines: Vec<Value> =
        contents.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "mcp_request");
    assert_eq!(lines[0]["transport"], "http");
    assert_eq!(lines[0]["framing"], "ndjson");
    assert_eq!(lines[0]["method"], "tools_call");
    assert_eq!(lines[0]["tool"], "calculate_statistics");
    assert!(lines[0]["timestamp_ms"].as_u64().is_some_and(|ms| ms > 0));
    assert_eq!(lines[1]["event"], "invocation");
    assert_eq!(lines[1]["status"], 400);
    assert!(lines[1].get("prompt").is_none());
}

#[test]
fn file_sink_appends_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.jsonl");
    FileAuditSink::new(&path).expect("open sink").record(&request_event("a"));
    FileAuditSink::new(&path).expect("reopen sink").record(&request_event("b"));
    let contents = fs::read_to_string(&path).expect("read audit log");
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn server_opens_configured_audit_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("server-audit.jsonl");
    let mut config = ToolwireConfig::default();
    config.server.audit.path = Some(path.display().to_string());
    McpServer::from_config(config).expect("server");
    assert!(path.exists());
}

#[test]
fn server_rejects_unopenable_audit_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing-dir").join("audit.jsonl");
    let mut config = ToolwireConfig::default();
    config.server.audit.path = Some(path.display().to_string());
    let err = McpServer::from_config(config).err().expect("init error");
    assert!(err.to_string().contains("audit log open failed"));
}
