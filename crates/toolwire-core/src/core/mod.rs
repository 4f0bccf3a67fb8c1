// crates/toolwire-core/src/core/mod.rs
// ============================================================================
// Module: Toolwire Core Types
// Description: Tool specifications, call envelopes, and error kinds.
// Purpose: Provide stable, serializable types shared by servers and clients.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types describe what a tool accepts ([`ToolSpec`]), how a caller asks
//! for it ([`ToolCallRequest`]), and what comes back ([`ToolCallResult`]).
//! These types are the canonical source for every wire surface in the
//! workspace.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod arguments;
pub mod call;
pub mod error;
pub mod spec;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use arguments::ArgValue;
pub use arguments::ToolArguments;
pub use call::DispatchResponse;
pub use call::ToolCallRequest;
pub use call::ToolCallResult;
pub use call::ToolContent;
pub use call::ToolListResult;
pub use call::ToolMethod;
pub use error::ToolError;
pub use spec::ParamSpec;
pub use spec::ParamType;
pub use spec::ToolDescriptor;
pub use spec::ToolSpec;
