// crates/toolwire-core/src/lib.rs
// ============================================================================
// Module: Toolwire Core Library
// Description: Public API surface for the Toolwire core.
// Purpose: Expose tool registry, dispatch, and response extraction primitives.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Toolwire core holds the transport-agnostic half of the tool protocol: a
//! registry of deterministic tools, a dispatcher that validates arguments and
//! packages results, and the client-side reader that reduces a streamed or
//! single-document response body to ordered text fragments. Nothing here
//! performs network I/O; transports live in `toolwire-mcp` and `toolwire-cli`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ToolHandler;
pub use runtime::DEFAULT_ENVELOPE_PRIORITY;
pub use runtime::Dispatcher;
pub use runtime::EnvelopeNormalizer;
pub use runtime::EnvelopeShape;
pub use runtime::FragmentAccumulator;
pub use runtime::LineFramer;
pub use runtime::NO_TEXT_PLACEHOLDER;
pub use runtime::RegisteredTool;
pub use runtime::StreamError;
pub use runtime::StreamReader;
pub use runtime::ToolRegistry;
pub use runtime::builtin_registry;
pub use runtime::decode_fragment;
pub use runtime::join_fragments;
