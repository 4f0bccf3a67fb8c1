// crates/toolwire-cli/src/lib.rs
// ============================================================================
// Module: Toolwire CLI Library
// Description: Client-side building blocks shared by the `toolwire` binary.
// Purpose: Expose the MCP client, invocation client, and evaluation runner.
// Dependencies: reqwest, tokio, toolwire-core, toolwire-config, toolwire-mcp
// ============================================================================

//! ## Overview
//! The `toolwire` binary is a thin dispatcher over these modules: the
//! multi-transport [`mcp_client`], the streamed-body [`invoke_client`], and
//! the out-of-process [`evaluation`] runner. They live in a library so
//! integration tests can drive them against a loopback server.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod evaluation;
pub mod invoke_client;
pub mod mcp_client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use evaluation::EvaluationCase;
pub use evaluation::EvaluationCommand;
pub use evaluation::EvaluationOutcome;
pub use evaluation::default_cases;
pub use invoke_client::InvocationReply;
pub use invoke_client::InvokeClient;
pub use invoke_client::InvokeError;
pub use invoke_client::generate_session_id;
pub use mcp_client::McpClient;
pub use mcp_client::McpClientConfig;
pub use mcp_client::McpClientError;
pub use mcp_client::McpTransport;
