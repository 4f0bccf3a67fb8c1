// crates/toolwire-mcp/src/audit.rs
// ============================================================================
// Module: Request Audit Logging
// Description: Structured audit events for JSON-RPC and invocation requests.
// Purpose: Emit JSON-line audit logs without a logging framework dependency.
// Dependencies: toolwire-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as one JSON object per line and routed to a
//! sink chosen from configuration: stderr, an append-only file, or nowhere.
//! Events never carry prompts, tool arguments, or tool output; only sizes,
//! labels, and identifiers are recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use toolwire_config::ServerTransport;
use toolwire_config::StreamMode;

use crate::telemetry::RequestMethod;
use crate::telemetry::RequestOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// JSON-RPC request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// JSON-RPC request identifier when provided.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Response framing.
    pub framing: StreamMode,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Method classification.
    pub method: RequestMethod,
    /// Tool name when available (`tools/call`).
    pub tool: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct a request audit event.
pub struct RequestAuditEventParams {
    /// JSON-RPC request identifier when provided.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Response framing.
    pub framing: StreamMode,
    /// Peer IP address if known.
    pub peer_ip: Option<String>,
    /// Method classification.
    pub method: RequestMethod,
    /// Tool name when available.
    pub tool: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Invocation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Resolved user identifier.
    pub user_id: Option<String>,
    /// Resolved session identifier.
    pub session_id: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// HTTP status code returned.
    pub status: u16,
    /// Prompt size in bytes.
    pub prompt_bytes: usize,
    /// Answer size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct an invocation audit event.
pub struct InvocationAuditEventParams {
    /// Peer IP address if known.
    pub peer_ip: Option<String>,
    /// Resolved user identifier.
    pub user_id: Option<String>,
    /// Resolved session identifier.
    pub session_id: Option<String>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// HTTP status code returned.
    pub status: u16,
    /// Prompt size in bytes.
    pub prompt_bytes: usize,
    /// Answer size in bytes.
    pub response_bytes: usize,
}

impl RequestAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RequestAuditEventParams) -> Self {
        Self {
            event: "mcp_request",
            timestamp_ms: now_ms(),
            request_id: params.request_id,
            transport: params.transport,
            framing: params.framing,
            peer_ip: params.peer_ip,
            method: params.method,
            tool: params.tool,
            outcome: params.outcome,
            error_code: params.error_code,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

impl InvocationAuditEvent {
    /// Creates a new invocation audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: InvocationAuditEventParams) -> Self {
        Self {
            event: "invocation",
            timestamp_ms: now_ms(),
            peer_ip: params.peer_ip,
            user_id: params.user_id,
            session_id: params.session_id,
            outcome: params.outcome,
            status: params.status,
            prompt_bytes: params.prompt_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

/// Milliseconds since the Unix epoch; zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for request events.
pub trait AuditSink: Send + Sync {
    /// Record a JSON-RPC request event.
    fn record(&self, event: &RequestAuditEvent);

    /// Record an invocation event.
    fn record_invocation(&self, _event: &InvocationAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event line to stderr.
    fn emit(event: &impl Serialize) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        Self::emit(event);
    }

    fn record_invocation(&self, event: &InvocationAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event line and flushes.
    fn emit(&self, event: &impl Serialize) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &RequestAuditEvent) {
        self.emit(event);
    }

    fn record_invocation(&self, event: &InvocationAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &RequestAuditEvent) {}

    fn record_invocation(&self, _event: &InvocationAuditEvent) {}
}
