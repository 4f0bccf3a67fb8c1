// crates/toolwire-core/src/runtime/dispatcher.rs
// ============================================================================
// Module: Tool Dispatcher
// Description: Resolves, validates, and executes tool calls against a registry.
// Purpose: Turn a tool call request into a result envelope without aborting.
// Dependencies: crate::{core, runtime::registry}, serde_json
// ============================================================================

//! ## Overview
//! The dispatcher is stateless over a shared [`ToolRegistry`]; cloning it is
//! cheap and concurrent calls need no locking. Domain errors raised while
//! binding arguments or running a handler become error results. Only an
//! unknown tool name or a malformed request is returned as `Err`, because
//! those are protocol faults rather than tool outcomes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::core::DispatchResponse;
use crate::core::ToolArguments;
use crate::core::ToolCallRequest;
use crate::core::ToolCallResult;
use crate::core::ToolError;
use crate::core::ToolListResult;
use crate::core::ToolMethod;
use crate::core::ToolSpec;
use crate::runtime::registry::ToolRegistry;

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Dispatches tool requests against a shared registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// Read-only registry shared across tasks.
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over a built registry.
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
        }
    }

    /// Dispatches a request.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for unregistered names and
    /// [`ToolError::InvalidRequest`] for a call without a tool name.
    pub fn dispatch(&self, request: &ToolCallRequest) -> Result<DispatchResponse, ToolError> {
        match request.method {
            ToolMethod::List => Ok(DispatchResponse::Tools(self.list_tools())),
            ToolMethod::Call => {
                let name = request.name.as_deref().ok_or_else(|| {
                    ToolError::InvalidRequest("tools/call requires a tool name".to_string())
                })?;
                self.call_tool(name, &request.arguments).map(DispatchResponse::Call)
            }
        }
    }

    /// Lists registered tools in registration order.
    #[must_use]
    pub fn list_tools(&self) -> ToolListResult {
        ToolListResult {
            tools: self.registry.list().map(ToolSpec::descriptor).collect(),
        }
    }

    /// Calls a tool by name.
    ///
    /// The handler's JSON output is serialized into a single text item.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when the name is not registered.
    pub fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolCallResult, ToolError> {
        let tool = self.registry.get(name)?;
        let outcome = ToolArguments::bind(tool.spec(), arguments)
            .and_then(|bound| tool.handler().call(&bound));
        Ok(match outcome {
            Ok(output) => match serde_json::to_string(&output) {
                Ok(text) => ToolCallResult::text(text),
                Err(err) => ToolCallResult::error(&ToolError::InvalidArgument(format!(
                    "tool output serialization failed: {err}"
                ))),
            },
            Err(err) => ToolCallResult::error(&err),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
