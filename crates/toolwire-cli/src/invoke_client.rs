// crates/toolwire-cli/src/invoke_client.rs
// ============================================================================
// Module: Invocation Client
// Description: HTTP client for the `/invocations` and `/ping` endpoints.
// Purpose: Send prompts and reduce streamed or single-document replies to text.
// Dependencies: reqwest, rand, toolwire-core, toolwire-mcp
// ============================================================================

//! ## Overview
//! The invocation client posts a prompt and consumes the reply body
//! incrementally through a [`FragmentAccumulator`], so the same code path
//! handles a single JSON document and a newline-delimited stream. Each chunk
//! read is bounded by the configured timeout. A timeout or transport failure
//! mid-body discards every accumulated fragment and surfaces
//! [`StreamError::PartialRead`]; truncated answers are never returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use rand::RngCore;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::redirect::Policy;
use thiserror::Error;
use toolwire_config::InvocationConfig;
use toolwire_core::EnvelopeNormalizer;
use toolwire_core::FragmentAccumulator;
use toolwire_core::StreamError;
use toolwire_core::join_fragments;
use toolwire_mcp::ErrorDetail;
use toolwire_mcp::InvocationRequest;
use toolwire_mcp::PING_PATH;
use toolwire_mcp::PingResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum reply body size accepted by the invocation client.
pub const MAX_INVOCATION_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Maximum `/ping` reply and error body size read by the client.
pub const MAX_AUX_RESPONSE_BYTES: usize = 64 * 1024;

/// Prefix of generated session identifiers.
const SESSION_PREFIX: &str = "session-";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Invocation client errors.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Invalid client configuration.
    #[error("invocation client config error: {0}")]
    Config(String),
    /// Request could not be sent or the connection failed before a reply.
    #[error("invocation transport error: {0}")]
    Transport(String),
    /// Server replied with a non-success status.
    #[error("invocation failed with http status {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail or body preview.
        detail: String,
    },
    /// Reply body exceeded the size limit.
    #[error("invocation response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Bytes received so far.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
    /// Reply body ended abnormally.
    #[error("invocation stream error: {0}")]
    Stream(StreamError),
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Text reply of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReply {
    /// Session identifier the prompt was sent under.
    pub session_id: String,
    /// Extracted fragments in arrival order.
    pub fragments: Vec<String>,
    /// Non-empty body lines skipped as undecodable.
    pub skipped_lines: usize,
}

impl InvocationReply {
    /// Returns the joined answer text, or the no-text placeholder.
    #[must_use]
    pub fn text(&self) -> String {
        join_fragments(&self.fragments)
    }
}

/// HTTP client for the invocation surface.
#[derive(Debug, Clone)]
pub struct InvokeClient {
    /// Reqwest client instance.
    client: Client,
    /// `/invocations` endpoint.
    endpoint: Url,
    /// Normalizer applied to every decoded fragment.
    normalizer: EnvelopeNormalizer,
    /// Per-chunk timeout.
    timeout: Duration,
}

impl InvokeClient {
    /// Builds a client from invocation configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Config`] when the URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(
        config: &InvocationConfig,
        normalizer: EnvelopeNormalizer,
    ) -> Result<Self, InvokeError> {
        let endpoint = Url::parse(&config.url)
            .map_err(|err| InvokeError::Config(format!("invalid invocation url: {err}")))?;
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(config.timeout())
            .build()
            .map_err(|err| InvokeError::Config(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            normalizer,
            timeout: config.timeout(),
        })
    }

    /// Sends a prompt and returns the extracted answer fragments.
    ///
    /// A missing `session_id` is replaced with a generated one.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the request fails, the server replies
    /// with an error status, or the body ends abnormally.
    pub async fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> Result<InvocationReply, InvokeError> {
        let session_id = request.session_id.clone().unwrap_or_else(generate_session_id);
        let body = InvocationRequest {
            prompt: request.prompt.clone(),
            user_id: request.user_id.clone(),
            session_id: Some(session_id.clone()),
        };
        let send = self.client.post(self.endpoint.clone()).json(&body).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| InvokeError::Transport("request timed out".to_string()))?
            .map_err(|err| InvokeError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }
        let accumulator = FragmentAccumulator::new(self.normalizer.clone());
        let mut accumulator = consume_body(response, accumulator, self.timeout).await?;
        accumulator.flush();
        let skipped_lines = accumulator.skipped_lines();
        Ok(InvocationReply {
            session_id,
            fragments: accumulator.finish(),
            skipped_lines,
        })
    }

    /// Calls the `/ping` health check next to the invocation endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when `/ping` cannot be reached or replies
    /// with an unexpected payload.
    pub async fn ping(&self) -> Result<PingResponse, InvokeError> {
        let url = self
            .endpoint
            .join(PING_PATH)
            .map_err(|err| InvokeError::Config(format!("invalid ping url: {err}")))?;
        let send = self.client.get(url).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| InvokeError::Transport("ping timed out".to_string()))?
            .map_err(|err| InvokeError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }
        let body = read_bounded(response, MAX_AUX_RESPONSE_BYTES, self.timeout).await?;
        serde_json::from_slice::<PingResponse>(&body)
            .map_err(|err| InvokeError::Transport(format!("invalid ping reply: {err}")))
    }

    /// Converts a non-success reply into [`InvokeError::Status`].
    async fn status_error(&self, status: StatusCode, response: reqwest::Response) -> InvokeError {
        let detail = match read_bounded(response, MAX_AUX_RESPONSE_BYTES, self.timeout).await {
            Ok(bytes) => serde_json::from_slice::<ErrorDetail>(&bytes).map_or_else(
                |_| String::from_utf8_lossy(&bytes).trim().to_string(),
                |error| error.detail,
            ),
            Err(err) => err.to_string(),
        };
        InvokeError::Status {
            status: status.as_u16(),
            detail,
        }
    }
}

// ============================================================================
// SECTION: Body Consumption
// ============================================================================

/// Feeds the reply body into `accumulator` chunk by chunk.
async fn consume_body(
    mut response: reqwest::Response,
    mut accumulator: FragmentAccumulator,
    timeout: Duration,
) -> Result<FragmentAccumulator, InvokeError> {
    let mut total: usize = 0;
    loop {
        let chunk = match tokio::time::timeout(timeout, response.chunk()).await {
            Ok(Ok(Some(chunk))) => chunk,
            Ok(Ok(None)) => return Ok(accumulator),
            Ok(Err(err)) => {
                let reason = format!("body read failed: {err}");
                return Err(InvokeError::Stream(accumulator.abort(&reason)));
            }
            Err(_) => return Err(InvokeError::Stream(accumulator.abort("chunk read timed out"))),
        };
        total = total.saturating_add(chunk.len());
        if total > MAX_INVOCATION_RESPONSE_BYTES {
            return Err(InvokeError::ResponseTooLarge {
                actual: total,
                limit: MAX_INVOCATION_RESPONSE_BYTES,
            });
        }
        accumulator.push_chunk(&chunk);
    }
}

/// Reads a whole body of at most `limit` bytes, bounding each chunk read.
async fn read_bounded(
    mut response: reqwest::Response,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<u8>, InvokeError> {
    let mut body = Vec::new();
    loop {
        let chunk = match tokio::time::timeout(timeout, response.chunk()).await {
            Ok(Ok(Some(chunk))) => chunk,
            Ok(Ok(None)) => return Ok(body),
            Ok(Err(err)) => return Err(InvokeError::Transport(format!("body read failed: {err}"))),
            Err(_) => return Err(InvokeError::Transport("body read timed out".to_string())),
        };
        let actual = body.len().saturating_add(chunk.len());
        if actual > limit {
            return Err(InvokeError::ResponseTooLarge {
                actual,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
    }
}

/// Generates a `session-<32 hex>` identifier.
#[must_use]
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    format!("{SESSION_PREFIX}{:016x}{:016x}", rng.next_u64(), rng.next_u64())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
