// crates/toolwire-core/src/runtime/builtin.rs
// ============================================================================
// Module: Builtin Tools
// Description: Statistics, compound interest, and text analysis tools.
// Purpose: Provide the deterministic tools served by default.
// Dependencies: crate::{core, runtime::registry}, serde, serde_json
// ============================================================================

//! ## Overview
//! Each builtin tool is a pure function with a typed summary, plus a thin
//! handler that reads [`ToolArguments`] and serializes the summary. Rounding
//! matches decimal half-even rounding of the exact binary value, so outputs
//! are reproducible across platforms.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::ParamSpec;
use crate::core::ParamType;
use crate::core::ToolArguments;
use crate::core::ToolError;
use crate::core::ToolSpec;
use crate::runtime::registry::ToolRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the statistics tool.
pub const CALCULATE_STATISTICS: &str = "calculate_statistics";
/// Name of the compound interest tool.
pub const COMPOUND_INTEREST: &str = "compound_interest";
/// Name of the text analysis tool.
pub const TEXT_ANALYZER: &str = "text_analyzer";

/// Default compounding periods per year.
pub const DEFAULT_FREQUENCY: i64 = 12;
/// Upper bound on compounding periods per year.
pub const MAX_FREQUENCY: i64 = 1_000_000;
/// Number of words reported by the text analyzer.
const TOP_WORD_COUNT: usize = 5;
/// Characters stripped from word edges before counting frequency.
const WORD_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];
/// Characters that terminate a sentence.
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds a registry holding the three builtin tools in listing order.
///
/// # Errors
///
/// Returns [`ToolError`] if a builtin specification is rejected.
pub fn builtin_registry() -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(statistics_spec(), statistics_handler)?;
    registry.register(interest_spec(), interest_handler)?;
    registry.register(text_spec(), text_handler)?;
    Ok(registry)
}

/// Specification for `calculate_statistics`.
fn statistics_spec() -> ToolSpec {
    ToolSpec::new(
        CALCULATE_STATISTICS,
        "Calculate mean, median, population standard deviation, min, max, sum, and count for a \
         list of numbers.",
    )
    .param(ParamSpec::required("numbers", ParamType::NumberArray, "Numbers to summarize"))
}

/// Specification for `compound_interest`.
fn interest_spec() -> ToolSpec {
    ToolSpec::new(
        COMPOUND_INTEREST,
        "Calculate compound interest: final amount, interest earned, and return on investment.",
    )
    .param(ParamSpec::required("principal", ParamType::Number, "Initial investment amount"))
    .param(ParamSpec::required("rate", ParamType::Number, "Annual interest rate in percent"))
    .param(ParamSpec::required("time", ParamType::Number, "Investment period in years"))
    .param(ParamSpec::with_default(
        "frequency",
        ParamType::Integer,
        json!(DEFAULT_FREQUENCY),
        "Compounding periods per year",
    ))
}

/// Specification for `text_analyzer`.
fn text_spec() -> ToolSpec {
    ToolSpec::new(
        TEXT_ANALYZER,
        "Analyze text: character, word, and sentence counts, averages, and the most frequent \
         words.",
    )
    .param(ParamSpec::required("text", ParamType::String, "Text to analyze"))
}

/// Handler for `calculate_statistics`.
fn statistics_handler(arguments: &ToolArguments) -> Result<Value, ToolError> {
    let summary = calculate_statistics(arguments.numbers("numbers")?)?;
    to_json(&summary)
}

/// Handler for `compound_interest`.
fn interest_handler(arguments: &ToolArguments) -> Result<Value, ToolError> {
    let summary = compound_interest(
        arguments.number("principal")?,
        arguments.number("rate")?,
        arguments.number("time")?,
        arguments.integer("frequency")?,
    )?;
    to_json(&summary)
}

/// Handler for `text_analyzer`.
fn text_handler(arguments: &ToolArguments) -> Result<Value, ToolError> {
    to_json(&text_analyzer(arguments.text("text")?))
}

/// Serializes a summary into a JSON value.
fn to_json(summary: &impl Serialize) -> Result<Value, ToolError> {
    serde_json::to_value(summary)
        .map_err(|err| ToolError::InvalidArgument(format!("result serialization failed: {err}")))
}

// ============================================================================
// SECTION: Statistics
// ============================================================================

/// Output of `calculate_statistics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    /// Arithmetic mean, 4 decimals.
    pub mean: f64,
    /// Median, 4 decimals.
    pub median: f64,
    /// Population standard deviation, 4 decimals.
    pub std_dev: f64,
    /// Smallest input, exact.
    pub min: f64,
    /// Largest input, exact.
    pub max: f64,
    /// Sum of inputs, 4 decimals.
    pub sum: f64,
    /// Number of inputs.
    pub count: usize,
}

/// Summarizes a list of numbers.
///
/// # Errors
///
/// Returns [`ToolError::EmptyInput`] for an empty list and
/// [`ToolError::InvalidArgument`] when the result is not finite.
pub fn calculate_statistics(numbers: &[f64]) -> Result<StatisticsSummary, ToolError> {
    if numbers.is_empty() {
        return Err(ToolError::EmptyInput("numbers must contain at least one value".to_string()));
    }
    let count = numbers.len();
    let n = count_as_f64(count);
    let sum: f64 = numbers.iter().sum();
    let mean = sum / n;
    let variance = numbers.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = count / 2;
    let median =
        if count % 2 == 0 { (sorted[middle - 1] + sorted[middle]) / 2.0 } else { sorted[middle] };
    let summary = StatisticsSummary {
        mean: round_to(mean, 4),
        median: round_to(median, 4),
        std_dev: round_to(variance.sqrt(), 4),
        min: sorted[0],
        max: sorted[count - 1],
        sum: round_to(sum, 4),
        count,
    };
    ensure_finite(&[summary.mean, summary.std_dev, summary.sum])?;
    Ok(summary)
}

// ============================================================================
// SECTION: Compound Interest
// ============================================================================

/// Output of `compound_interest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestSummary {
    /// Initial investment, echoed.
    pub principal: f64,
    /// Amount after compounding, 2 decimals.
    pub final_amount: f64,
    /// Final amount minus principal, 2 decimals.
    pub interest_earned: f64,
    /// Interest as a percentage of principal, 2 decimals.
    pub roi_percentage: f64,
    /// Investment period in years, echoed.
    pub years: f64,
    /// Annual rate in percent, echoed.
    pub annual_rate: f64,
}

/// Computes compound interest.
///
/// `final_amount = principal * (1 + rate / 100 / frequency) ^ (frequency * time)`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArgument`] when `frequency` is not in
/// `1..=MAX_FREQUENCY`, `principal` is zero, or the result is not finite.
pub fn compound_interest(
    principal: f64,
    rate: f64,
    time: f64,
    frequency: i64,
) -> Result<InterestSummary, ToolError> {
    if frequency <= 0 {
        return Err(ToolError::InvalidArgument("frequency must be greater than zero".to_string()));
    }
    let periods = i32::try_from(frequency)
        .ok()
        .filter(|periods| i64::from(*periods) <= MAX_FREQUENCY)
        .ok_or_else(|| {
            ToolError::InvalidArgument(format!("frequency must not exceed {MAX_FREQUENCY}"))
        })?;
    if principal == 0.0 {
        return Err(ToolError::InvalidArgument("principal must be non-zero".to_string()));
    }
    let periods = f64::from(periods);
    let final_amount = principal * (1.0 + rate / 100.0 / periods).powf(periods * time);
    let interest_earned = final_amount - principal;
    let roi_percentage = interest_earned / principal * 100.0;
    ensure_finite(&[final_amount, interest_earned, roi_percentage])?;
    Ok(InterestSummary {
        principal,
        final_amount: round_to(final_amount, 2),
        interest_earned: round_to(interest_earned, 2),
        roi_percentage: round_to(roi_percentage, 2),
        years: time,
        annual_rate: rate,
    })
}

// ============================================================================
// SECTION: Text Analysis
// ============================================================================

/// A word and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    /// Case-folded, punctuation-stripped word.
    pub word: String,
    /// Occurrences.
    pub count: usize,
}

/// Output of `text_analyzer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSummary {
    /// Characters including whitespace.
    pub characters: usize,
    /// Characters with ASCII spaces removed.
    pub characters_no_spaces: usize,
    /// Whitespace-separated words.
    pub words: usize,
    /// Sentence terminators counted, at least 1.
    pub sentences: usize,
    /// Mean word length, 2 decimals; 0 when there are no words.
    pub avg_word_length: f64,
    /// Words per sentence, 2 decimals.
    pub avg_words_per_sentence: f64,
    /// Up to five most frequent words, ties in first-seen order.
    pub top_5_words: Vec<WordCount>,
}

/// Analyzes a text.
#[must_use]
pub fn text_analyzer(text: &str) -> TextSummary {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentences = text.chars().filter(|ch| SENTENCE_TERMINATORS.contains(ch)).count().max(1);
    let letters: usize = words.iter().map(|word| word.chars().count()).sum();
    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        round_to(count_as_f64(letters) / count_as_f64(words.len()), 2)
    };

    let mut frequencies: Vec<WordCount> = Vec::new();
    for word in &words {
        let cleaned = word.to_lowercase();
        let cleaned = cleaned.trim_matches(WORD_PUNCTUATION);
        if cleaned.is_empty() {
            continue;
        }
        match frequencies.iter_mut().find(|entry| entry.word == cleaned) {
            Some(entry) => entry.count += 1,
            None => frequencies.push(WordCount {
                word: cleaned.to_string(),
                count: 1,
            }),
        }
    }
    frequencies.sort_by(|left, right| right.count.cmp(&left.count));
    frequencies.truncate(TOP_WORD_COUNT);

    TextSummary {
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|ch| *ch != ' ').count(),
        words: words.len(),
        sentences,
        avg_word_length,
        avg_words_per_sentence: round_to(count_as_f64(words.len()) / count_as_f64(sentences), 2),
        top_5_words: frequencies,
    }
}

// ============================================================================
// SECTION: Numeric Helpers
// ============================================================================

/// Rounds to `places` decimals using the shortest correctly rounded decimal.
#[must_use]
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse::<f64>().unwrap_or(value)
}

/// Converts a count to `f64` for averaging.
#[allow(clippy::cast_precision_loss, reason = "Counts stay far below 2^52.")]
fn count_as_f64(count: usize) -> f64 {
    count as f64
}

/// Rejects overflowed or undefined results.
fn ensure_finite(values: &[f64]) -> Result<(), ToolError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ToolError::InvalidArgument("result is not a finite number".to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
