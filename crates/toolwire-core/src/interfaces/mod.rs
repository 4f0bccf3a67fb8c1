// crates/toolwire-core/src/interfaces/mod.rs
// ============================================================================
// Module: Toolwire Interfaces
// Description: Handler contract implemented by registered tools.
// Purpose: Decouple the registry and dispatcher from concrete tool code.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A [`ToolHandler`] receives arguments that have already been validated
//! against its [`crate::ToolSpec`] and returns a JSON result object. Handlers
//! must be deterministic and free of shared mutable state so the dispatcher
//! can call them from any number of tasks at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::ToolArguments;
use crate::core::ToolError;

// ============================================================================
// SECTION: Tool Handler
// ============================================================================

/// Executes a registered tool.
pub trait ToolHandler: Send + Sync {
    /// Runs the tool against validated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] or [`ToolError::EmptyInput`]
    /// when the arguments are outside the tool's domain.
    fn call(&self, arguments: &ToolArguments) -> Result<Value, ToolError>;
}

impl<F> ToolHandler for F
where
    F: Fn(&ToolArguments) -> Result<Value, ToolError> + Send + Sync,
{
    fn call(&self, arguments: &ToolArguments) -> Result<Value, ToolError> {
        self(arguments)
    }
}
