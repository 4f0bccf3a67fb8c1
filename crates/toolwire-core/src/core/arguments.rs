// crates/toolwire-core/src/core/arguments.rs
// ============================================================================
// Module: Tool Arguments
// Description: Validation and coercion of raw JSON arguments against a schema.
// Purpose: Hand handlers typed values instead of untrusted JSON.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`ToolArguments::bind`] checks a raw arguments object against a
//! [`ToolSpec`]: required parameters must be present, defaults fill the gaps,
//! and every value is coerced to its declared [`ParamType`]. Numbers may be
//! sent as numeric strings; integers accept whole-valued floats. Unknown
//! argument keys are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::spec::ParamSpec;
use crate::core::spec::ParamType;
use crate::core::spec::ToolSpec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest magnitude accepted for a float-encoded integer (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Finite number.
    Number(f64),
    /// Signed integer.
    Integer(i64),
    /// String value.
    Text(String),
    /// Sequence of finite numbers.
    Numbers(Vec<f64>),
}

/// Validated arguments for a single tool call.
///
/// # Invariants
/// - Every required parameter of the bound spec has a value.
/// - Each value matches the declared type of its parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    /// Coerced values keyed by parameter name.
    values: BTreeMap<String, ArgValue>,
}

impl ToolArguments {
    /// Validates and coerces `raw` against `spec`.
    ///
    /// `raw` must be a JSON object; `null` is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when a required parameter is
    /// missing or a value cannot be coerced to its declared type.
    pub fn bind(spec: &ToolSpec, raw: &Value) -> Result<Self, ToolError> {
        let empty = serde_json::Map::new();
        let object = match raw {
            Value::Object(object) => object,
            Value::Null => &empty,
            _ => {
                return Err(ToolError::InvalidArgument("arguments must be an object".to_string()));
            }
        };
        let mut values = BTreeMap::new();
        for param in &spec.params {
            let supplied = object.get(&param.name).filter(|value| !value.is_null());
            let source = match (supplied, &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default,
                (None, None) if param.required => {
                    return Err(ToolError::InvalidArgument(format!(
                        "missing required parameter: {}",
                        param.name
                    )));
                }
                (None, None) => continue,
            };
            values.insert(param.name.clone(), coerce(param, source)?);
        }
        Ok(Self {
            values,
        })
    }

    /// Returns the raw coerced value for a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Returns a number parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the parameter is absent or
    /// not a number.
    pub fn number(&self, name: &str) -> Result<f64, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Number(value)) => Ok(*value),
            _ => Err(missing(name, ParamType::Number)),
        }
    }

    /// Returns an integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the parameter is absent or
    /// not an integer.
    pub fn integer(&self, name: &str) -> Result<i64, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Integer(value)) => Ok(*value),
            _ => Err(missing(name, ParamType::Integer)),
        }
    }

    /// Returns a string parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the parameter is absent or
    /// not a string.
    pub fn text(&self, name: &str) -> Result<&str, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Text(value)) => Ok(value),
            _ => Err(missing(name, ParamType::String)),
        }
    }

    /// Returns a number-sequence parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the parameter is absent or
    /// not a number sequence.
    pub fn numbers(&self, name: &str) -> Result<&[f64], ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Numbers(values)) => Ok(values),
            _ => Err(missing(name, ParamType::NumberArray)),
        }
    }
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Coerces a raw value to the declared parameter type.
fn coerce(param: &ParamSpec, value: &Value) -> Result<ArgValue, ToolError> {
    let coerced = match param.param_type {
        ParamType::Number => coerce_number(value).map(ArgValue::Number),
        ParamType::Integer => coerce_integer(value).map(ArgValue::Integer),
        ParamType::String => value.as_str().map(|text| ArgValue::Text(text.to_string())),
        ParamType::NumberArray => coerce_numbers(value).map(ArgValue::Numbers),
    };
    coerced.ok_or_else(|| {
        ToolError::InvalidArgument(format!(
            "parameter {} must be {}",
            param.name,
            param.param_type.as_str()
        ))
    })
}

/// Coerces a JSON number or numeric string to a finite float.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Coerces a JSON integer, whole-valued float, or integer string to `i64`.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().and_then(whole_float)),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_float))
        }
        _ => None,
    }
}

/// Converts a whole-valued float within the exact integer range to `i64`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Value is checked to be whole and within +/- 2^53 before the cast."
)]
fn whole_float(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        Some(value as i64)
    } else {
        None
    }
}

/// Coerces a JSON array of numbers (or numeric strings).
fn coerce_numbers(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(coerce_number).collect()
}

/// Builds the error for a missing or mistyped typed lookup.
fn missing(name: &str, expected: ParamType) -> ToolError {
    ToolError::InvalidArgument(format!("parameter {name} must be {}", expected.as_str()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
