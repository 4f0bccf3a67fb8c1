// crates/toolwire-core/src/runtime/registry.rs
// ============================================================================
// Module: Tool Registry
// Description: Ordered, name-indexed set of invocable tools.
// Purpose: Resolve tool names to specifications and handlers.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The registry is populated once at process start and then shared read-only
//! (typically behind an `Arc`). Listing preserves registration order so
//! `tools/list` responses are deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::ToolError;
use crate::core::ToolSpec;
use crate::interfaces::ToolHandler;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A tool specification paired with its handler.
#[derive(Clone)]
pub struct RegisteredTool {
    /// Immutable specification.
    spec: ToolSpec,
    /// Handler invoked on dispatch.
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    /// Returns the tool specification.
    #[must_use]
    pub const fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    /// Returns the tool handler.
    #[must_use]
    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// Registry of tools keyed by name.
///
/// # Invariants
/// - Tool names are unique.
/// - `index` maps every name to its position in `tools`.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Tools in registration order.
    tools: Vec<RegisteredTool>,
    /// Name to position lookup.
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateTool`] when the name is already present,
    /// or [`ToolError::InvalidArgument`] when the spec is malformed.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), ToolError> {
        spec.validate()?;
        if self.index.contains_key(&spec.name) {
            return Err(ToolError::DuplicateTool(spec.name));
        }
        self.index.insert(spec.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            spec,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Returns the specifications in registration order.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &ToolSpec> {
        self.tools.iter().map(RegisteredTool::spec)
    }

    /// Looks up a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when the name is not registered.
    pub fn get(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.index
            .get(name)
            .and_then(|position| self.tools.get(*position))
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
