// crates/toolwire-core/src/runtime/stream.rs
// ============================================================================
// Module: Streaming Response Reader
// Description: Line framing and fragment extraction for response bodies.
// Purpose: Reduce single-document or newline-delimited bodies to ordered text.
// Dependencies: crate::runtime::envelope, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A response body is either one JSON document or a sequence of
//! newline-delimited JSON fragments, possibly interleaved with transport
//! noise (keep-alives, SSE `event:` lines, partial frames). The reader frames
//! the body into lines, decodes each non-empty line, runs the
//! [`EnvelopeNormalizer`] over it, and keeps any extracted text in arrival
//! order. Lines that fail to decode are skipped.
//!
//! Chunks may split lines anywhere; [`LineFramer`] buffers partial lines
//! until their newline arrives, and a final line without a trailing newline
//! is still decoded when the body ends. Cancellation or a read failure
//! discards everything accumulated and reports [`StreamError::PartialRead`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_json::Value;
use thiserror::Error;

use crate::runtime::envelope::EnvelopeNormalizer;
use crate::runtime::envelope::NO_TEXT_PLACEHOLDER;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix carried by server-sent event data lines.
const SSE_DATA_PREFIX: &str = "data:";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Response body reading errors.
///
/// # Invariants
/// - `Decode` is recovered per fragment and never aborts a read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A single fragment could not be decoded.
    #[error("fragment decode error: {0}")]
    Decode(String),
    /// The body ended abnormally or the read was cancelled.
    #[error("partial read: {reason} ({fragments_discarded} fragments discarded)")]
    PartialRead {
        /// Fragments accumulated before the failure and then dropped.
        fragments_discarded: usize,
        /// Failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Line Framing
// ============================================================================

/// Incremental newline framer over arbitrary byte chunks.
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    /// Bytes received but not yet returned as a complete line.
    pending: Vec<u8>,
}

impl LineFramer {
    /// Creates an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of body bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Pops the next complete line without its terminator (`\n` or `\r\n`).
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|byte| *byte == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..= end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Takes the unterminated remainder once the body has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Returns the number of buffered bytes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================================
// SECTION: Fragment Decoding
// ============================================================================

/// Decodes one fragment line into a JSON object.
///
/// An SSE `data:` prefix is removed, and anything before the first `{` is
/// treated as framing noise.
///
/// # Errors
///
/// Returns [`StreamError::Decode`] when the line is not UTF-8, carries no
/// object, or is not valid JSON.
pub fn decode_fragment(line: &[u8]) -> Result<Value, StreamError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| StreamError::Decode("fragment is not valid utf-8".to_string()))?;
    let text = text.trim();
    let text = text.strip_prefix(SSE_DATA_PREFIX).map_or(text, str::trim_start);
    let start = text
        .find('{')
        .ok_or_else(|| StreamError::Decode("fragment carries no json object".to_string()))?;
    serde_json::from_str(&text[start ..]).map_err(|err| StreamError::Decode(err.to_string()))
}

/// Collects extracted text from framed lines.
///
/// # Invariants
/// - `fragments` preserves line arrival order.
#[derive(Debug, Clone)]
pub struct FragmentAccumulator {
    /// Line framer for incoming chunks.
    framer: LineFramer,
    /// Normalizer applied to decoded fragments.
    normalizer: EnvelopeNormalizer,
    /// Extracted text in arrival order.
    fragments: Vec<String>,
    /// Non-empty lines that failed to decode.
    skipped: usize,
}

impl FragmentAccumulator {
    /// Creates an accumulator using `normalizer` for extraction.
    #[must_use]
    pub fn new(normalizer: EnvelopeNormalizer) -> Self {
        Self {
            framer: LineFramer::new(),
            normalizer,
            fragments: Vec::new(),
            skipped: 0,
        }
    }

    /// Feeds a chunk of body bytes and processes every completed line.
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.framer.push(chunk);
        while let Some(line) = self.framer.next_line() {
            self.accept_line(&line);
        }
    }

    /// Returns the fragments extracted so far.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Returns how many non-empty lines were skipped as undecodable.
    #[must_use]
    pub const fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Decodes any unterminated final line.
    pub fn flush(&mut self) {
        if let Some(line) = self.framer.finish() {
            self.accept_line(&line);
        }
    }

    /// Completes the read, decoding any unterminated final line.
    #[must_use]
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.fragments
    }

    /// Abandons the read, discarding accumulated fragments.
    #[must_use]
    pub fn abort(self, reason: &str) -> StreamError {
        StreamError::PartialRead {
            fragments_discarded: self.fragments.len(),
            reason: reason.to_string(),
        }
    }

    /// Decodes and normalizes one line.
    fn accept_line(&mut self, line: &[u8]) {
        if line.trim_ascii().is_empty() {
            return;
        }
        match decode_fragment(line) {
            Ok(doc) => {
                if let Some(text) = self.normalizer.normalize(&doc) {
                    self.fragments.push(text);
                }
            }
            Err(_) => self.skipped += 1,
        }
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Synchronous reader over a buffered body.
#[derive(Debug, Clone, Default)]
pub struct StreamReader {
    /// Normalizer applied to each decoded fragment.
    normalizer: EnvelopeNormalizer,
    /// Optional cancellation flag checked between chunks.
    cancel: Option<Arc<AtomicBool>>,
}

impl StreamReader {
    /// Creates a reader with the given normalizer.
    #[must_use]
    pub const fn new(normalizer: EnvelopeNormalizer) -> Self {
        Self {
            normalizer,
            cancel: None,
        }
    }

    /// Attaches a cancellation flag; setting it aborts the next read step.
    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Reads `body` to the end and returns extracted text in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::PartialRead`] when the read is cancelled or the
    /// underlying reader fails before the body ends.
    pub fn read<R: BufRead>(&self, mut body: R) -> Result<Vec<String>, StreamError> {
        let mut accumulator = FragmentAccumulator::new(self.normalizer.clone());
        loop {
            if self.is_cancelled() {
                return Err(accumulator.abort("read cancelled"));
            }
            let chunk = match body.fill_buf() {
                Ok(chunk) => chunk,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(accumulator.abort(&format!("body read failed: {err}"))),
            };
            if chunk.is_empty() {
                break;
            }
            let consumed = chunk.len();
            accumulator.push_chunk(chunk);
            body.consume(consumed);
        }
        Ok(accumulator.finish())
    }

    /// Returns true when the cancellation flag is set.
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Acquire))
    }
}

/// Joins fragments with newlines, or returns [`NO_TEXT_PLACEHOLDER`] if none.
#[must_use]
pub fn join_fragments(fragments: &[String]) -> String {
    if fragments.is_empty() { NO_TEXT_PLACEHOLDER.to_string() } else { fragments.join("\n") }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
