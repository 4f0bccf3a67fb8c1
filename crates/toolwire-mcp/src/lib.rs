// crates/toolwire-mcp/src/lib.rs
// ============================================================================
// Module: Toolwire MCP
// Description: JSON-RPC tool server and invocation surface for Toolwire.
// Purpose: Serve the builtin tools over stdio and HTTP with audit and metrics.
// Dependencies: toolwire-core, toolwire-config, axum, tokio
// ============================================================================

//! ## Overview
//! Toolwire MCP exposes the tool dispatcher as JSON-RPC 2.0 over stdio and
//! HTTP (direct, NDJSON, and SSE framing), plus the `/invocations` and
//! `/ping` endpoints consumed by a hosted agent runtime. All collaborators are
//! injected once at startup through [`server::ServerParts`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod invocation;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::InvocationAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::StderrAuditSink;
pub use invocation::AgentError;
pub use invocation::EchoAgent;
pub use invocation::ErrorDetail;
pub use invocation::InvocationAgent;
pub use invocation::InvocationContext;
pub use invocation::InvocationRequest;
pub use invocation::InvocationResponse;
pub use invocation::PingResponse;
pub use invocation::ServiceInfo;
pub use server::EVENT_STREAM_CONTENT_TYPE;
pub use server::INVOCATIONS_PATH;
pub use server::MCP_PATH;
pub use server::McpServer;
pub use server::McpServerError;
pub use server::NDJSON_CONTENT_TYPE;
pub use server::PING_PATH;
pub use server::ServerParts;
pub use telemetry::NoopMetrics;
pub use telemetry::RequestMethod;
pub use telemetry::RequestMetricEvent;
pub use telemetry::RequestOutcome;
pub use telemetry::ToolMetrics;
