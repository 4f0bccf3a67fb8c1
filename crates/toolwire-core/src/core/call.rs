// crates/toolwire-core/src/core/call.rs
// ============================================================================
// Module: Tool Call Envelopes
// Description: Per-call request and result types for tool dispatch.
// Purpose: Carry one tool invocation from a transport to the dispatcher and back.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ToolCallRequest`] is created per call and discarded after the
//! dispatcher answers it. Results serialize to the MCP result shape
//! `{"content":[{"type":"text","text":...}]}`; failed calls carry exactly one
//! error item and set `isError`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::spec::ToolDescriptor;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Dispatch method.
///
/// # Invariants
/// - Variants are stable for JSON-RPC method matching and telemetry labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMethod {
    /// `tools/list`.
    #[serde(rename = "tools/list")]
    List,
    /// `tools/call`.
    #[serde(rename = "tools/call")]
    Call,
}

impl ToolMethod {
    /// Returns the JSON-RPC method string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "tools/list",
            Self::Call => "tools/call",
        }
    }

    /// Parses a JSON-RPC method string.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "tools/list" => Some(Self::List),
            "tools/call" => Some(Self::Call),
            _ => None,
        }
    }
}

/// A single dispatch request.
///
/// # Invariants
/// - `name` is `Some` whenever `method` is [`ToolMethod::Call`]; the
///   dispatcher rejects calls without one.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Opaque correlation token echoed by transports.
    pub id: Value,
    /// Requested method.
    pub method: ToolMethod,
    /// Tool name for calls.
    pub name: Option<String>,
    /// Raw arguments object.
    pub arguments: Value,
}

impl ToolCallRequest {
    /// Builds a `tools/list` request.
    #[must_use]
    pub const fn list(id: Value) -> Self {
        Self {
            id,
            method: ToolMethod::List,
            name: None,
            arguments: Value::Null,
        }
    }

    /// Builds a `tools/call` request.
    #[must_use]
    pub fn call(id: Value, name: &str, arguments: Value) -> Self {
        Self {
            id,
            method: ToolMethod::Call,
            name: Some(name.to_string()),
            arguments,
        }
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// One item of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Text output.
    Text {
        /// Text payload.
        text: String,
    },
    /// Domain error raised by the tool.
    Error {
        /// Stable error kind label.
        kind: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Result of a `tools/call`.
///
/// # Invariants
/// - Success results contain only text items; error results contain exactly
///   one error item and report `is_error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Ordered output items.
    content: Vec<ToolContent>,
    /// Whether the call failed.
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    is_error: bool,
}

impl ToolCallResult {
    /// Builds a successful result with a single text item.
    #[must_use]
    pub fn text(text: String) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text,
            }],
            is_error: false,
        }
    }

    /// Builds an error result from a tool error.
    #[must_use]
    pub fn error(error: &ToolError) -> Self {
        Self {
            content: vec![ToolContent::Error {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }],
            is_error: true,
        }
    }

    /// Returns the ordered output items.
    #[must_use]
    pub fn content(&self) -> &[ToolContent] {
        &self.content
    }

    /// Returns true when the call failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// Returns the first text item, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ToolContent::Text {
                text,
            } => Some(text.as_str()),
            ToolContent::Error {
                ..
            } => None,
        })
    }

    /// Returns the error message when the call failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ToolContent::Error {
                message, ..
            } => Some(message.as_str()),
            ToolContent::Text {
                ..
            } => None,
        })
    }
}

/// Result of a `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolListResult {
    /// Tools in registration order.
    pub tools: Vec<ToolDescriptor>,
}

/// Dispatcher output for either method.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResponse {
    /// Listing of registered tools.
    Tools(ToolListResult),
    /// Outcome of a tool call.
    Call(ToolCallResult),
}

impl DispatchResponse {
    /// Serializes the response as a JSON-RPC `result` value.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Tools(list) => serde_json::to_value(list),
            Self::Call(result) => serde_json::to_value(result),
        }
    }
}

/// Serde helper for omitting `isError: false`.
#[allow(clippy::trivially_copy_pass_by_ref, reason = "Signature required by serde.")]
const fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// SECTION: Tests
// ============================================================================
