//! Config validation tests for toolwire-config.
// crates/toolwire-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Defaults, field validation, env overrides, and endpoints.
// Purpose: Ensure every section fails closed on invalid input.
// =============================================================================

use std::collections::HashMap;

use toolwire_config::DEFAULT_EVALUATORS;
use toolwire_config::ServerTransport;
use toolwire_config::StreamMode;
use toolwire_config::ToolwireConfig;
use toolwire_core::DEFAULT_ENVELOPE_PRIORITY;
use toolwire_core::EnvelopeShape;

type TestResult = Result<(), String>;

fn parse(toml: &str) -> Result<ToolwireConfig, String> {
    ToolwireConfig::from_toml(toml).map_err(|err| err.to_string())
}

fn assert_rejected(toml: &str, needle: &str) -> TestResult {
    let config = parse(toml)?;
    match config.validate() {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err(format!("expected validation failure for {needle}")),
    }
}

fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn empty_file_yields_valid_defaults() -> TestResult {
    let config = parse("")?;
    config.validate().map_err(|err| err.to_string())?;
    if config.server.transport != ServerTransport::Stdio
        || config.server.stream_mode != StreamMode::Direct
        || config.server.max_body_bytes != 1024 * 1024
        || !config.server.audit.enabled
    {
        return Err("unexpected server defaults".to_string());
    }
    if config.remote.url != "http://localhost:8000/mcp" || config.remote.use_runtime {
        return Err("unexpected remote defaults".to_string());
    }
    if config.invocation.default_user_id != "test-user-001"
        || config.invocation.default_session_id != "test-session-001"
    {
        return Err("unexpected invocation defaults".to_string());
    }
    if config.envelope.priority != DEFAULT_ENVELOPE_PRIORITY.to_vec() {
        return Err("unexpected envelope defaults".to_string());
    }
    if config.evaluation.evaluators != DEFAULT_EVALUATORS {
        return Err("unexpected evaluator defaults".to_string());
    }
    Ok(())
}

#[test]
fn http_transport_requires_bind() -> TestResult {
    assert_rejected("[server]\ntransport = \"http\"\n", "http transport requires bind")
}

#[test]
fn http_transport_rejects_invalid_bind() -> TestResult {
    assert_rejected(
        "[server]\ntransport = \"http\"\nbind = \"localhost\"\n",
        "invalid bind address",
    )
}

#[test]
fn zero_max_body_bytes_rejected() -> TestResult {
    assert_rejected("[server]\nmax_body_bytes = 0\n", "max_body_bytes must be greater than zero")
}

#[test]
fn blank_audit_path_rejected() -> TestResult {
    assert_rejected("[server.audit]\npath = \"  \"\n", "server.audit.path must be non-empty")
}

#[test]
fn remote_url_requires_http_scheme() -> TestResult {
    assert_rejected("[remote]\nurl = \"ftp://example.com/mcp\"\n", "unsupported scheme")?;
    assert_rejected("[remote]\nurl = \"not a url\"\n", "invalid remote.url")
}

#[test]
fn runtime_mode_requires_runtime_id() -> TestResult {
    assert_rejected("[remote]\nuse_runtime = true\n", "remote.runtime_id is required")
}

#[test]
fn region_must_be_lowercase_slug() -> TestResult {
    assert_rejected("[remote]\nregion = \"US West\"\n", "invalid remote.region")
}

#[test]
fn timeouts_are_bounded() -> TestResult {
    assert_rejected("[remote]\ntimeout_ms = 10\n", "remote.timeout_ms must be between")?;
    assert_rejected("[invocation]\ntimeout_ms = 700000\n", "invocation.timeout_ms must be between")
}

#[test]
fn envelope_priority_must_be_non_empty_and_unique() -> TestResult {
    assert_rejected("[envelope]\npriority = []\n", "envelope.priority must be non-empty")?;
    assert_rejected(
        "[envelope]\npriority = [\"response\", \"response\"]\n",
        "duplicate envelope.priority entry: response",
    )
}

#[test]
fn envelope_priority_order_is_configurable() -> TestResult {
    let config = parse("[envelope]\npriority = [\"response\", \"output_message\"]\n")?;
    config.validate().map_err(|err| err.to_string())?;
    let normalizer = config.envelope.normalizer();
    if normalizer.priority() != [EnvelopeShape::Response, EnvelopeShape::OutputMessage] {
        return Err(format!("unexpected priority {:?}", normalizer.priority()));
    }
    Ok(())
}

#[test]
fn evaluators_must_be_non_empty() -> TestResult {
    assert_rejected("[evaluation]\nevaluators = []\n", "evaluation.evaluators must be non-empty")
}

#[test]
fn env_overrides_switch_to_runtime_mode() -> TestResult {
    let mut config = parse("")?;
    config.apply_overrides(overrides(&[
        ("TOOLWIRE_RUNTIME_ID", "arn:aws:bedrock-agentcore:us-east-1:123:runtime/calc agent"),
        ("TOOLWIRE_USE_RUNTIME", "Yes"),
        ("TOOLWIRE_REGION", "us-east-1"),
        ("TOOLWIRE_DEFAULT_USER_ID", "user-42"),
    ]));
    config.validate().map_err(|err| err.to_string())?;
    if config.remote.mode_label() != "runtime" || config.invocation.default_user_id != "user-42" {
        return Err("overrides were not applied".to_string());
    }
    let endpoint = config.remote.endpoint().map_err(|err| err.to_string())?;
    let expected = "https://bedrock-agentcore.us-east-1.amazonaws.com/runtimes/\
                    arn%3Aaws%3Abedrock-agentcore%3Aus-east-1%3A123%3Aruntime%2Fcalc%20agent/\
                    invocations?qualifier=DEFAULT";
    if endpoint.as_str() != expected {
        return Err(format!("unexpected endpoint {endpoint}"));
    }
    Ok(())
}

#[test]
fn env_override_flag_false_keeps_direct_url() -> TestResult {
    let mut config = parse("[remote]\nuse_runtime = true\nruntime_id = \"rt-1\"\n")?;
    config.apply_overrides(overrides(&[
        ("TOOLWIRE_USE_RUNTIME", "off"),
        ("TOOLWIRE_REMOTE_URL", "https://tools.internal/mcp"),
    ]));
    config.validate().map_err(|err| err.to_string())?;
    let endpoint = config.remote.endpoint().map_err(|err| err.to_string())?;
    if config.remote.mode_label() != "url" || endpoint.as_str() != "https://tools.internal/mcp" {
        return Err(format!("unexpected endpoint {endpoint}"));
    }
    Ok(())
}

#[test]
fn empty_runtime_id_override_clears_value() -> TestResult {
    let mut config = parse("[remote]\nruntime_id = \"rt-1\"\n")?;
    config.apply_overrides(overrides(&[("TOOLWIRE_RUNTIME_ID", "")]));
    if config.remote.runtime_id.is_some() {
        return Err("expected runtime id to be cleared".to_string());
    }
    Ok(())
}
