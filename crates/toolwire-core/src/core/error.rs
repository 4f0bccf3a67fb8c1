// crates/toolwire-core/src/core/error.rs
// ============================================================================
// Module: Tool Errors
// Description: Error kinds raised by registration, validation, and handlers.
// Purpose: Give every tool failure a stable, labelled kind.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ToolError`] covers registry and dispatch failures. Handler-level kinds
//! (`InvalidArgument`, `EmptyInput`) are converted into error results by the
//! dispatcher; only `UnknownTool` and `InvalidRequest` escape to transports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool registry and dispatch errors.
///
/// # Invariants
/// - Variants are stable for transport error mapping and audit labels.
/// - String payloads are user-facing and never contain argument values beyond
///   the offending parameter name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Tool name is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Tool name was registered twice.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),
    /// Parameter missing, of the wrong type, or out of domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Domain input was empty where at least one element is required.
    #[error("empty input: {0}")]
    EmptyInput(String),
    /// Request envelope was malformed (for example a call without a tool name).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ToolError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::DuplicateTool(_) => "duplicate_tool",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::EmptyInput(_) => "empty_input",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Returns true when the error belongs in a tool result rather than a
    /// protocol-level error response.
    #[must_use]
    pub const fn is_handler_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::EmptyInput(_))
    }
}
