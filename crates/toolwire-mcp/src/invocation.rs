// crates/toolwire-mcp/src/invocation.rs
// ============================================================================
// Module: Invocation Surface
// Description: Payloads and agent capability behind `POST /invocations`.
// Purpose: Decouple the HTTP surface from whatever produces the answer text.
// Dependencies: async-trait, serde, time
// ============================================================================

//! ## Overview
//! The hosted runtime calls `POST /invocations` with a prompt and optional
//! user and session identifiers. The server resolves defaults, asks an
//! injected [`InvocationAgent`] for the answer text, and wraps it in the
//! `output.message.content[0].text` envelope. Reasoning is out of scope:
//! [`EchoAgent`] is the shipped implementation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Body of `POST /invocations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Prompt text; missing and empty are both rejected.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Caller user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Caller session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Successful reply of `POST /invocations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// Assistant output envelope.
    pub output: InvocationOutput,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    /// Request metadata echo.
    pub metadata: InvocationMetadata,
}

/// `output` member of an invocation reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationOutput {
    /// Assistant message.
    pub message: AssistantMessage,
}

/// Assistant message with text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Message role; always `assistant`.
    pub role: String,
    /// Content items.
    pub content: Vec<MessageText>,
}

/// Text content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText {
    /// Text payload.
    pub text: String,
}

/// Metadata echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationMetadata {
    /// Resolved user identifier.
    pub user_id: String,
    /// Resolved session identifier.
    pub session_id: String,
    /// Answer length in characters.
    pub response_length: usize,
}

impl InvocationResponse {
    /// Wraps answer text in the output envelope.
    #[must_use]
    pub fn new(text: String, context: InvocationContext) -> Self {
        let response_length = text.chars().count();
        Self {
            output: InvocationOutput {
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: vec![MessageText {
                        text,
                    }],
                },
            },
            timestamp: utc_timestamp(),
            metadata: InvocationMetadata {
                user_id: context.user_id,
                session_id: context.session_id,
                response_length,
            },
        }
    }
}

/// Error reply body (`{"detail": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable failure description.
    pub detail: String,
}

/// Reply of `GET /ping`.
///
/// Only `status` is required on the wire; runtimes that answer with a bare
/// `{"status":"healthy"}` decode with the remaining fields unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Whether the agent reports itself ready.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_ready: Option<bool>,
    /// Remote tool service mode label (`runtime` or `url`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_mode: Option<String>,
    /// Resolved remote tool service endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<String>,
}

/// Reply of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name.
    pub service: String,
    /// Crate version.
    pub version: String,
    /// Served endpoints as `METHOD path` labels.
    pub endpoints: Vec<String>,
}

/// Identifiers resolved for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// User identifier.
    pub user_id: String,
    /// Session identifier.
    pub session_id: String,
}

// ============================================================================
// SECTION: Agent Capability
// ============================================================================

/// Agent failures surfaced as HTTP 500.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent cannot serve requests.
    #[error("agent unavailable: {0}")]
    Unavailable(String),
    /// The agent failed while producing an answer.
    #[error("agent failed: {0}")]
    Failed(String),
}

/// Produces answer text for a prompt.
#[async_trait]
pub trait InvocationAgent: Send + Sync {
    /// Answers `prompt` within the given context.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when no answer can be produced.
    async fn respond(&self, context: &InvocationContext, prompt: &str)
    -> Result<String, AgentError>;

    /// Reports readiness for the liveness probe.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Agent that echoes the prompt back.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAgent;

#[async_trait]
impl InvocationAgent for EchoAgent {
    async fn respond(
        &self,
        _context: &InvocationContext,
        prompt: &str,
    ) -> Result<String, AgentError> {
        Ok(format!("Mock response: {prompt}"))
    }
}

/// Formats the current UTC time as RFC 3339.
fn utc_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
