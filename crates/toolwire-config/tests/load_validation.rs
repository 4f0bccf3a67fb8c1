//! Config load validation tests for toolwire-config.
// crates/toolwire-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, syntax).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use toolwire_config::ConfigError;
use toolwire_config::ServerTransport;
use toolwire_config::ToolwireConfig;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ToolwireConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(ToolwireConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(ToolwireConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(ToolwireConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(ToolwireConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(ToolwireConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"[server\ntransport = \"http\"")?;
    assert_invalid(ToolwireConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_transport() -> TestResult {
    let file = write_config(b"[server]\ntransport = \"carrier-pigeon\"\n")?;
    assert_invalid(ToolwireConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_accepts_http_server_file() -> TestResult {
    let file = write_config(
        b"[server]\ntransport = \"http\"\nbind = \"127.0.0.1:8080\"\nstream_mode = \"ndjson\"\n",
    )?;
    let config = ToolwireConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.server.transport != ServerTransport::Http {
        return Err("expected http transport".to_string());
    }
    let addr = config.server.bind_addr().map_err(|err| err.to_string())?;
    if addr.port() != 8080 {
        return Err(format!("unexpected bind port {}", addr.port()));
    }
    Ok(())
}
