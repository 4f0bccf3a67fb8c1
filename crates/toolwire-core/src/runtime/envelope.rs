// crates/toolwire-core/src/runtime/envelope.rs
// ============================================================================
// Module: Envelope Normalizer
// Description: Extracts the answer text from nested response envelopes.
// Purpose: Reduce any supported envelope shape to a single string or nothing.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Responses wrap their text in one of three shapes:
//!
//! - `{"result": {"content": [{"text": ...}]}}`
//! - `{"output": {"message": {"content": [{"text": ...}]}}}`
//! - `{"response": "..."}`
//!
//! [`EnvelopeNormalizer`] attempts a typed decode against each shape in a
//! configurable priority order and returns the first that matches. A shape
//! whose chain is missing a link, has a link of the wrong type, has an empty
//! `content` list, or ends in an empty string does not match; the next shape
//! is tried. Normalization never fails; callers substitute
//! [`NO_TEXT_PLACEHOLDER`] when nothing matched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Answer substituted when no envelope shape yields text.
pub const NO_TEXT_PLACEHOLDER: &str = "(Agent responded with no text content)";

/// Default probe order.
pub const DEFAULT_ENVELOPE_PRIORITY: [EnvelopeShape; 3] =
    [EnvelopeShape::ResultContent, EnvelopeShape::OutputMessage, EnvelopeShape::Response];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported envelope shapes.
///
/// # Invariants
/// - Variants are stable for configuration parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeShape {
    /// `result.content[0].text`.
    ResultContent,
    /// `output.message.content[0].text`.
    OutputMessage,
    /// `response` as a string.
    Response,
}

impl EnvelopeShape {
    /// Returns a stable label for the shape.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResultContent => "result_content",
            Self::OutputMessage => "output_message",
            Self::Response => "response",
        }
    }

    /// Attempts to extract text using this shape only.
    #[must_use]
    pub fn extract(self, doc: &Value) -> Option<String> {
        let text = match self {
            Self::ResultContent => {
                ResultEnvelope::deserialize(doc).ok().and_then(|env| env.result.first_text())
            }
            Self::OutputMessage => OutputEnvelope::deserialize(doc)
                .ok()
                .and_then(|env| env.output.message.first_text()),
            Self::Response => ResponseEnvelope::deserialize(doc).ok().map(|env| env.response),
        }?;
        (!text.is_empty()).then_some(text)
    }
}

/// `{"result": {...}}` envelope.
#[derive(Deserialize)]
struct ResultEnvelope {
    /// Result body.
    result: ContentList,
}

/// `{"output": {"message": {...}}}` envelope.
#[derive(Deserialize)]
struct OutputEnvelope {
    /// Output body.
    output: OutputBody,
}

/// Body of an output envelope.
#[derive(Deserialize)]
struct OutputBody {
    /// Assistant message.
    message: ContentList,
}

/// `{"response": "..."}` envelope.
#[derive(Deserialize)]
struct ResponseEnvelope {
    /// Flat answer text.
    response: String,
}

/// Object carrying a `content` list.
#[derive(Deserialize)]
struct ContentList {
    /// Content items; only the first is inspected.
    content: Vec<Value>,
}

/// A content item carrying text.
#[derive(Deserialize)]
struct TextItem {
    /// Text payload.
    text: String,
}

impl ContentList {
    /// Decodes the first content item as a text item.
    fn first_text(self) -> Option<String> {
        let first = self.content.into_iter().next()?;
        TextItem::deserialize(first).ok().map(|item| item.text)
    }
}

// ============================================================================
// SECTION: Normalizer
// ============================================================================

/// Extracts answer text from decoded response documents.
///
/// # Invariants
/// - Pure: the same document always yields the same output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeNormalizer {
    /// Shapes probed in order.
    priority: Vec<EnvelopeShape>,
}

impl Default for EnvelopeNormalizer {
    fn default() -> Self {
        Self {
            priority: DEFAULT_ENVELOPE_PRIORITY.to_vec(),
        }
    }
}

impl EnvelopeNormalizer {
    /// Creates a normalizer with a custom probe order.
    #[must_use]
    pub const fn new(priority: Vec<EnvelopeShape>) -> Self {
        Self {
            priority,
        }
    }

    /// Returns the probe order.
    #[must_use]
    pub fn priority(&self) -> &[EnvelopeShape] {
        &self.priority
    }

    /// Returns the text of the first matching shape, if any.
    #[must_use]
    pub fn normalize(&self, doc: &Value) -> Option<String> {
        self.priority.iter().find_map(|shape| shape.extract(doc))
    }

    /// Returns the extracted text or [`NO_TEXT_PLACEHOLDER`].
    #[must_use]
    pub fn normalize_or_placeholder(&self, doc: &Value) -> String {
        self.normalize(doc).unwrap_or_else(|| NO_TEXT_PLACEHOLDER.to_string())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only normalizer assertions."
    )]

    use serde_json::json;

    use super::EnvelopeNormalizer;
    use super::EnvelopeShape;
    use super::NO_TEXT_PLACEHOLDER;

    #[test]
    fn content_that_is_not_a_list_falls_through() {
        let doc = json!({"result": {"content": "nope"}, "response": "flat"});
        assert_eq!(EnvelopeNormalizer::default().normalize(&doc), Some("flat".to_string()));
    }

    #[test]
    fn empty_text_does_not_satisfy_a_shape() {
        let doc = json!({"result": {"content": [{"text": ""}]}});
        assert_eq!(EnvelopeNormalizer::default().normalize(&doc), None);
    }

    #[test]
    fn only_first_content_item_is_inspected() {
        let doc = json!({"result": {"content": [{"type": "image"}, {"text": "late"}]}});
        assert_eq!(EnvelopeShape::ResultContent.extract(&doc), None);
    }

    #[test]
    fn custom_priority_changes_winner() {
        let doc = json!({
            "result": {"content": [{"text": "from result"}]},
            "response": "from response"
        });
        let flat_first =
            EnvelopeNormalizer::new(vec![EnvelopeShape::Response, EnvelopeShape::ResultContent]);
        assert_eq!(flat_first.normalize(&doc), Some("from response".to_string()));
        assert_eq!(EnvelopeNormalizer::default().normalize(&doc), Some("from result".to_string()));
    }

    #[test]
    fn empty_priority_always_yields_placeholder() {
        let doc = json!({"response": "ignored"});
        let normalizer = EnvelopeNormalizer::new(Vec::new());
        assert_eq!(normalizer.normalize_or_placeholder(&doc), NO_TEXT_PLACEHOLDER);
    }

    #[test]
    fn non_object_documents_yield_nothing() {
        let normalizer = EnvelopeNormalizer::default();
        assert_eq!(normalizer.normalize(&json!("text")), None);
        assert_eq!(normalizer.normalize(&json!([1, 2])), None);
        assert_eq!(normalizer.normalize(&json!(null)), None);
    }
}
