// crates/toolwire-core/src/runtime/mod.rs
// ============================================================================
// Module: Toolwire Runtime
// Description: Registry, dispatcher, builtin tools, and response reading.
// Purpose: Provide the executable half of the tool protocol.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime holds the process-wide [`ToolRegistry`], the stateless
//! [`Dispatcher`] over it, the three builtin tools, and the client-side
//! [`StreamReader`] and [`EnvelopeNormalizer`] used to turn response bodies
//! back into text.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod builtin;
pub mod dispatcher;
pub mod envelope;
pub mod registry;
pub mod stream;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builtin::builtin_registry;
pub use dispatcher::Dispatcher;
pub use envelope::DEFAULT_ENVELOPE_PRIORITY;
pub use envelope::EnvelopeNormalizer;
pub use envelope::EnvelopeShape;
pub use envelope::NO_TEXT_PLACEHOLDER;
pub use registry::RegisteredTool;
pub use registry::ToolRegistry;
pub use stream::FragmentAccumulator;
pub use stream::LineFramer;
pub use stream::StreamError;
pub use stream::StreamReader;
pub use stream::decode_fragment;
pub use stream::join_fragments;
