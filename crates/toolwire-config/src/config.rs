// crates/toolwire-config/src/config.rs
// ============================================================================
// Module: Toolwire Configuration
// Description: Configuration loading and validation for Toolwire.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: toolwire-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then patched from the environment. Resolution order for the file is the
//! explicit path, then `TOOLWIRE_CONFIG`, then `toolwire.toml` in the working
//! directory. Only the implicit default file may be absent; in that case
//! built-in defaults apply. Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use toolwire_core::DEFAULT_ENVELOPE_PRIORITY;
use toolwire_core::EnvelopeNormalizer;
use toolwire_core::EnvelopeShape;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "toolwire.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "TOOLWIRE_CONFIG";
/// Environment variable overriding `remote.url`.
pub(crate) const REMOTE_URL_ENV_VAR: &str = "TOOLWIRE_REMOTE_URL";
/// Environment variable overriding `remote.runtime_id`.
pub(crate) const RUNTIME_ID_ENV_VAR: &str = "TOOLWIRE_RUNTIME_ID";
/// Environment variable overriding `remote.use_runtime`.
pub(crate) const USE_RUNTIME_ENV_VAR: &str = "TOOLWIRE_USE_RUNTIME";
/// Environment variable overriding `remote.region`.
pub(crate) const REGION_ENV_VAR: &str = "TOOLWIRE_REGION";
/// Environment variable overriding `invocation.default_user_id`.
pub(crate) const USER_ID_ENV_VAR: &str = "TOOLWIRE_DEFAULT_USER_ID";
/// Environment variable overriding `invocation.default_session_id`.
pub(crate) const SESSION_ID_ENV_VAR: &str = "TOOLWIRE_DEFAULT_SESSION_ID";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 1_000;
/// Maximum request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum length of identifiers such as user and session ids.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 256;
/// Maximum number of evaluators per evaluation run.
pub(crate) const MAX_EVALUATORS: usize = 32;

/// Evaluators run when none are configured.
pub const DEFAULT_EVALUATORS: &[&str] = &[
    "Builtin.GoalSuccessRate",
    "Builtin.Correctness",
    "Builtin.ToolParameterAccuracy",
    "Builtin.ToolSelectionAccuracy",
];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Toolwire configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolwireConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote tool service configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Invocation surface configuration.
    #[serde(default)]
    pub invocation: InvocationConfig,
    /// Response envelope configuration.
    #[serde(default)]
    pub envelope: EnvelopeConfig,
    /// Evaluation runner configuration.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl ToolwireConfig {
    /// Loads configuration from disk using the default resolution rules, then
    /// applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        let mut config = if !explicit && !resolved.exists() {
            Self::default()
        } else {
            Self::from_file(&resolved)?
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration file without overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses configuration from TOML text without overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment-style overrides from `lookup`.
    ///
    /// Values are treated as opaque strings; a present but empty value clears
    /// optional fields.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(REMOTE_URL_ENV_VAR) {
            self.remote.url = url;
        }
        if let Some(runtime_id) = lookup(RUNTIME_ID_ENV_VAR) {
            self.remote.runtime_id = Some(runtime_id).filter(|value| !value.trim().is_empty());
        }
        if let Some(flag) = lookup(USE_RUNTIME_ENV_VAR) {
            self.remote.use_runtime = env_flag(&flag);
        }
        if let Some(region) = lookup(REGION_ENV_VAR) {
            self.remote.region = region;
        }
        if let Some(user_id) = lookup(USER_ID_ENV_VAR) {
            self.invocation.default_user_id = user_id;
        }
        if let Some(session_id) = lookup(SESSION_ID_ENV_VAR) {
            self.invocation.default_session_id = session_id;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.remote.validate()?;
        self.invocation.validate()?;
        self.envelope.validate()?;
        self.evaluation.validate()?;
        Ok(())
    }
}

/// Parses a boolean flag the way deployment environments spell it.
///
/// `true`, `1`, and `yes` (any case, surrounding whitespace ignored) are
/// true; everything else is false.
#[must_use]
pub fn env_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport type for the server.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Response framing used when the client states no preference.
    #[serde(default)]
    pub stream_mode: StreamMode,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: default_max_body_bytes(),
            stream_mode: StreamMode::Direct,
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.transport == ServerTransport::Http {
            self.bind_addr()?;
        }
        self.audit.validate()
    }

    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address is missing or invalid.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self
            .bind
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("http transport requires bind".to_string()))?;
        bind.trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {bind}")))
    }
}

/// Supported server transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP transport (direct and streamed responses).
    Http,
}

impl ServerTransport {
    /// Returns a stable label for the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

/// Response framing for HTTP JSON-RPC replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// One JSON document per response.
    #[default]
    Direct,
    /// Newline-delimited JSON, one document per content item.
    Ndjson,
    /// Server-sent events carrying the JSON document.
    Sse,
}

impl StreamMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Ndjson => "ndjson",
            Self::Sse => "sse",
        }
    }
}

/// Audit logging configuration for server requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when absent.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Remote Tool Service
// ============================================================================

/// Remote tool service configuration.
///
/// # Invariants
/// - When `use_runtime` is set, `runtime_id` is present and the endpoint is
///   the hosted runtime invocation URL; otherwise `url` is used directly.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Direct URL of the tool service.
    #[serde(default = "default_remote_url")]
    pub url: String,
    /// Hosted runtime identifier.
    #[serde(default)]
    pub runtime_id: Option<String>,
    /// Route calls through the hosted runtime instead of `url`.
    #[serde(default)]
    pub use_runtime: bool,
    /// Hosted runtime region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Hosted runtime qualifier.
    #[serde(default = "default_qualifier")]
    pub qualifier: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_remote_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: default_remote_url(),
            runtime_id: None,
            use_runtime: false,
            region: default_region(),
            qualifier: default_qualifier(),
            timeout_ms: default_remote_timeout_ms(),
        }
    }
}

impl RemoteConfig {
    /// Validates remote configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url("remote.url", &self.url)?;
        validate_timeout("remote.timeout_ms", self.timeout_ms)?;
        if self.use_runtime {
            let runtime_id = self.runtime_id.as_deref().unwrap_or_default();
            if runtime_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "remote.runtime_id is required when remote.use_runtime is set".to_string(),
                ));
            }
            validate_identifier("remote.runtime_id", runtime_id, 2048)?;
        }
        let region_ok = self
            .region
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if self.region.is_empty() || !region_ok {
            return Err(ConfigError::Invalid(format!("invalid remote.region: {}", self.region)));
        }
        validate_identifier("remote.qualifier", &self.qualifier, MAX_IDENTIFIER_LENGTH)?;
        Ok(())
    }

    /// Returns a stable label for the endpoint mode.
    #[must_use]
    pub const fn mode_label(&self) -> &'static str {
        if self.use_runtime { "runtime" } else { "url" }
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolves the endpoint the client should call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint cannot be built.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        if !self.use_runtime {
            return parse_http_url("remote.url", &self.url);
        }
        let runtime_id = self.runtime_id.as_deref().ok_or_else(|| {
            ConfigError::Invalid("remote.runtime_id is required".to_string())
        })?;
        let encoded: String = url::form_urlencoded::byte_serialize(runtime_id.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        let raw = format!(
            "https://bedrock-agentcore.{}.amazonaws.com/runtimes/{encoded}/invocations",
            self.region
        );
        let mut endpoint = Url::parse(&raw)
            .map_err(|err| ConfigError::Invalid(format!("invalid runtime endpoint: {err}")))?;
        endpoint.query_pairs_mut().append_pair("qualifier", &self.qualifier);
        Ok(endpoint)
    }
}

// ============================================================================
// SECTION: Invocation Surface
// ============================================================================

/// Invocation surface configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InvocationConfig {
    /// URL of the `/invocations` endpoint used by the client.
    #[serde(default = "default_invocation_url")]
    pub url: String,
    /// User id applied when a request omits one.
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
    /// Session id applied when a request omits one.
    #[serde(default = "default_session_id")]
    pub default_session_id: String,
    /// Client request timeout in milliseconds.
    #[serde(default = "default_invocation_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            url: default_invocation_url(),
            default_user_id: default_user_id(),
            default_session_id: default_session_id(),
            timeout_ms: default_invocation_timeout_ms(),
        }
    }
}

impl InvocationConfig {
    /// Validates invocation configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        parse_http_url("invocation.url", &self.url)?;
        validate_identifier(
            "invocation.default_user_id",
            &self.default_user_id,
            MAX_IDENTIFIER_LENGTH,
        )?;
        validate_identifier(
            "invocation.default_session_id",
            &self.default_session_id,
            MAX_IDENTIFIER_LENGTH,
        )?;
        validate_timeout("invocation.timeout_ms", self.timeout_ms)
    }

    /// Returns the client request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Response envelope configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeConfig {
    /// Shapes probed in order when extracting answer text.
    #[serde(default = "default_envelope_priority")]
    pub priority: Vec<EnvelopeShape>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            priority: default_envelope_priority(),
        }
    }
}

impl EnvelopeConfig {
    /// Validates envelope configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.priority.is_empty() {
            return Err(ConfigError::Invalid("envelope.priority must be non-empty".to_string()));
        }
        for (index, shape) in self.priority.iter().enumerate() {
            if self.priority[.. index].contains(shape) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate envelope.priority entry: {}",
                    shape.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Builds the normalizer for this probe order.
    #[must_use]
    pub fn normalizer(&self) -> EnvelopeNormalizer {
        EnvelopeNormalizer::new(self.priority.clone())
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluation runner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    /// Evaluation command-line program.
    #[serde(default = "default_evaluation_program")]
    pub program: String,
    /// Agent identifier passed to the evaluator.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Evaluator names.
    #[serde(default = "default_evaluators")]
    pub evaluators: Vec<String>,
    /// Evaluation timeout in milliseconds.
    #[serde(default = "default_evaluation_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            program: default_evaluation_program(),
            agent_id: None,
            evaluators: default_evaluators(),
            timeout_ms: default_evaluation_timeout_ms(),
        }
    }
}

impl EvaluationConfig {
    /// Validates evaluation configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier("evaluation.program", &self.program, MAX_TOTAL_PATH_LENGTH)?;
        if let Some(agent_id) = &self.agent_id {
            validate_identifier("evaluation.agent_id", agent_id, MAX_IDENTIFIER_LENGTH)?;
        }
        if self.evaluators.is_empty() {
            return Err(ConfigError::Invalid("evaluation.evaluators must be non-empty".to_string()));
        }
        if self.evaluators.len() > MAX_EVALUATORS {
            return Err(ConfigError::Invalid(format!(
                "evaluation.evaluators exceeds {MAX_EVALUATORS} entries"
            )));
        }
        for evaluator in &self.evaluators {
            validate_identifier("evaluation.evaluators", evaluator, MAX_IDENTIFIER_LENGTH)?;
        }
        validate_timeout("evaluation.timeout_ms", self.timeout_ms)
    }

    /// Returns the evaluation timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The flag is true when the path was supplied explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a non-empty, bounded, trimmed identifier.
fn validate_identifier(field: &str, value: &str, max_len: usize) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.trim() != value {
        return Err(ConfigError::Invalid(format!("{field} must be trimmed")));
    }
    if value.len() > max_len {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

/// Validates a timeout against the allowed range.
fn validate_timeout(field: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if (MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&timeout_ms) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )))
    }
}

/// Parses an `http` or `https` URL.
fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::Invalid(format!("invalid {field}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid(format!("{field} has unsupported scheme: {other}"))),
    }
}

/// Default max body bytes for server requests.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default audit logging enabled state.
const fn default_audit_enabled() -> bool {
    true
}

/// Default tool service URL.
fn default_remote_url() -> String {
    "http://localhost:8000/mcp".to_string()
}

/// Default hosted runtime region.
fn default_region() -> String {
    "us-west-2".to_string()
}

/// Default hosted runtime qualifier.
fn default_qualifier() -> String {
    "DEFAULT".to_string()
}

/// Default tool service timeout.
const fn default_remote_timeout_ms() -> u64 {
    60_000
}

/// Default invocation endpoint URL.
fn default_invocation_url() -> String {
    "http://localhost:8080/invocations".to_string()
}

/// Default invocation user id.
fn default_user_id() -> String {
    "test-user-001".to_string()
}

/// Default invocation session id.
fn default_session_id() -> String {
    "test-session-001".to_string()
}

/// Default invocation timeout.
const fn default_invocation_timeout_ms() -> u64 {
    120_000
}

/// Default envelope probe order.
fn default_envelope_priority() -> Vec<EnvelopeShape> {
    DEFAULT_ENVELOPE_PRIORITY.to_vec()
}

/// Default evaluation program.
fn default_evaluation_program() -> String {
    "agentcore".to_string()
}

/// Default evaluator names.
fn default_evaluators() -> Vec<String> {
    DEFAULT_EVALUATORS.iter().map(|name| (*name).to_string()).collect()
}

/// Default evaluation timeout.
const fn default_evaluation_timeout_ms() -> u64 {
    120_000
}

// ============================================================================
// SECTION: Tests
// ============================================================================
