// crates/toolwire-cli/tests/common/mod.rs
// ============================================================================
// Module: CLI Test Fixtures
// Description: Loopback servers shared by the client integration tests.
// Purpose: Run the real tool server, or a scripted body, on 127.0.0.1:0.
// Dependencies: axum, tokio, toolwire-config, toolwire-mcp
// ============================================================================

//! Shared loopback fixtures.

#![allow(
    dead_code,
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only fixtures; each test binary uses a subset."
)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use toolwire_config::ToolwireConfig;
use toolwire_mcp::McpServer;

/// Client timeout used against loopback servers.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for an in-process HTTP server with audit output disabled.
pub fn http_config() -> ToolwireConfig {
    let mut config = ToolwireConfig::default();
    config.server.audit.enabled = false;
    config
}

/// Starts the tool server on an ephemeral loopback port.
pub async fn spawn_server(config: ToolwireConfig) -> SocketAddr {
    let server = McpServer::from_config(config).expect("server init");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = server.serve_listener(listener).await;
    });
    addr
}

/// Serves an arbitrary router on an ephemeral loopback port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Returns the JSON-RPC endpoint URL for `addr`.
pub fn mcp_url(addr: SocketAddr) -> String {
    format!("http://{addr}/mcp")
}

/// Returns the invocation endpoint URL for `addr`.
pub fn invocations_url(addr: SocketAddr) -> String {
    format!("http://{addr}/invocations")
}
