// crates/toolwire-mcp/src/telemetry.rs
// ============================================================================
// Module: Request Telemetry
// Description: Metric hooks for JSON-RPC and invocation request handling.
// Purpose: Provide metric events and latency observations without hard deps.
// Dependencies: toolwire-config, serde
// ============================================================================

//! ## Overview
//! A thin metrics interface for request counters and latency histograms.
//! The server records every request through [`ToolMetrics`]; deployments
//! without a metrics backend use [`NoopMetrics`]. Labels are stable strings
//! and never carry raw tool arguments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;
use toolwire_config::ServerTransport;
use toolwire_config::StreamMode;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Request method classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMethod {
    /// JSON-RPC `tools/list`.
    ToolsList,
    /// JSON-RPC `tools/call`.
    ToolsCall,
    /// `POST /invocations`.
    Invocation,
    /// Invalid or malformed JSON-RPC request.
    Invalid,
    /// Unsupported JSON-RPC method.
    Other,
}

impl RequestMethod {
    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Invocation => "invocation",
            Self::Invalid => "invalid",
            Self::Other => "other",
        }
    }
}

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Successful request.
    Ok,
    /// Tool ran but reported a domain error in its result.
    ToolError,
    /// Failed request.
    Error,
}

impl RequestOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ToolError => "tool_error",
            Self::Error => "error",
        }
    }
}

/// Request metric event payload.
///
/// # Invariants
/// - Optional fields are `None` when the metadata is unavailable.
#[derive(Debug, Clone)]
pub struct RequestMetricEvent {
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Response framing.
    pub framing: StreamMode,
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

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for requests and latencies.
pub trait ToolMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: RequestMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: RequestMetricEvent, latency: Duration);
}

/// No-op metrics sink.
pub struct NoopMetrics;

impl ToolMetrics for NoopMetrics {
    fn record_request(&self, _event: RequestMetricEvent) {}

    fn record_latency(&self, _event: RequestMetricEvent, _latency: Duration) {}
}
