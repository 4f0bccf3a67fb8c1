// crates/toolwire-core/src/core/spec.rs
// ============================================================================
// Module: Tool Specifications
// Description: Tool names, parameter schemas, and listing descriptors.
// Purpose: Describe tools once and derive their wire schema from that description.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ToolSpec`] is the immutable description of a tool: its name, a short
//! description, and an ordered parameter schema. The JSON input schema
//! advertised by `tools/list` is derived from it, never written by hand.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::error::ToolError;

// ============================================================================
// SECTION: Parameter Schema
// ============================================================================

/// Accepted parameter value types.
///
/// # Invariants
/// - Variants are stable for schema generation and argument coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Finite floating point number.
    Number,
    /// Signed integer; whole-valued floats are accepted.
    Integer,
    /// UTF-8 string passed through unchanged.
    String,
    /// Sequence of finite numbers.
    NumberArray,
}

impl ParamType {
    /// Returns a stable label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::NumberArray => "number_array",
        }
    }

    /// Returns the JSON schema fragment for the type.
    #[must_use]
    pub fn json_schema(self) -> Value {
        match self {
            Self::Number => json!({ "type": "number" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::String => json!({ "type": "string" }),
            Self::NumberArray => json!({ "type": "array", "items": { "type": "number" } }),
        }
    }
}

/// A single named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name as it appears in the arguments object.
    pub name: String,
    /// Accepted value type.
    pub param_type: ParamType,
    /// Whether the caller must supply the parameter.
    pub required: bool,
    /// Default applied when the parameter is absent.
    pub default: Option<Value>,
    /// Human-readable description for listings.
    pub description: String,
}

impl ParamSpec {
    /// Builds a required parameter.
    #[must_use]
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: true,
            default: None,
            description: description.to_string(),
        }
    }

    /// Builds an optional parameter with a default value.
    #[must_use]
    pub fn with_default(
        name: &str,
        param_type: ParamType,
        default: Value,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: false,
            default: Some(default),
            description: description.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Tool Specification
// ============================================================================

/// Immutable description of a registered tool.
///
/// # Invariants
/// - `name` is non-empty and unique within a registry.
/// - Parameter names are unique and kept in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name used for dispatch.
    pub name: String,
    /// Human-readable description for listings.
    pub description: String,
    /// Ordered parameter schema.
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    /// Starts a tool specification with no parameters.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter to the schema.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Checks the structural invariants of the specification.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArgument`] when the name is blank or a
    /// parameter name repeats.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::InvalidArgument("tool name must be non-empty".to_string()));
        }
        for (index, param) in self.params.iter().enumerate() {
            if param.name.trim().is_empty() {
                return Err(ToolError::InvalidArgument(format!(
                    "{}: parameter name must be non-empty",
                    self.name
                )));
            }
            if self.params[.. index].iter().any(|earlier| earlier.name == param.name) {
                return Err(ToolError::InvalidArgument(format!(
                    "{}: duplicate parameter {}",
                    self.name, param.name
                )));
            }
        }
        Ok(())
    }

    /// Derives the JSON input schema advertised in tool listings.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut schema = param.param_type.json_schema();
            if let Value::Object(object) = &mut schema {
                object.insert("description".to_string(), Value::String(param.description.clone()));
                if let Some(default) = &param.default {
                    object.insert("default".to_string(), default.clone());
                }
            }
            properties.insert(param.name.clone(), schema);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Builds the listing descriptor for this tool.
    #[must_use]
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool entry returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema for the arguments object.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
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
        reason = "Test-only schema assertions."
    )]

    use serde_json::json;

    use super::ParamSpec;
    use super::ParamType;
    use super::ToolSpec;

    fn interest_spec() -> ToolSpec {
        ToolSpec::new("compound_interest", "Compound interest")
            .param(ParamSpec::required("principal", ParamType::Number, "Initial amount"))
            .param(ParamSpec::with_default("frequency", ParamType::Integer, json!(12), "Periods"))
    }

    #[test]
    fn input_schema_lists_required_params_and_defaults() {
        let schema = interest_spec().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["principal"]));
        assert_eq!(schema["properties"]["frequency"]["default"], json!(12));
        assert_eq!(schema["properties"]["principal"]["type"], "number");
    }

    #[test]
    fn number_array_schema_declares_items() {
        assert_eq!(ParamType::NumberArray.json_schema()["items"]["type"], "number");
    }

    #[test]
    fn validate_rejects_duplicate_params() {
        let spec = interest_spec()
            .param(ParamSpec::required("principal", ParamType::Number, "again"));
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate parameter principal"));
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert!(ToolSpec::new("  ", "blank").validate().is_err());
    }

    #[test]
    fn descriptor_uses_camel_case_schema_key() {
        let value = serde_json::to_value(interest_spec().descriptor()).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }
}
