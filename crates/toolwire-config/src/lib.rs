// crates/toolwire-config/src/lib.rs
// ============================================================================
// Module: Toolwire Config
// Description: Configuration model, loading, and validation for Toolwire.
// Purpose: Provide a single source of truth for server and client settings.
// Dependencies: serde, toml, url, toolwire-core
// ============================================================================

//! ## Overview
//! Toolwire configuration is read from TOML, patched with environment
//! overrides, and validated fail-closed before any server or client is built.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::DEFAULT_EVALUATORS;
pub use config::EnvelopeConfig;
pub use config::EvaluationConfig;
pub use config::InvocationConfig;
pub use config::RemoteConfig;
pub use config::ServerAuditConfig;
pub use config::ServerConfig;
pub use config::ServerTransport;
pub use config::StreamMode;
pub use config::ToolwireConfig;
pub use config::env_flag;
