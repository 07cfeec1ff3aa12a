//! Input builders from JSON configuration dictionaries
//!
//! Block definition loaders hand each entry of a block's `args` list to
//! `InputBuilder::from_json`. Recognized keys are `type`, `name`, `align`
//! and `check`; anything else is ignored.

use crate::input::{Alignment, DEFAULT_INPUT_NAME, InputBuilder, InputType};
use blockly_core::EngineResult;
use serde_json::Value;

impl InputBuilder {
    /// Build an `InputBuilder` from a configuration dictionary
    ///
    /// Returns `None` when `type` is missing or isn't an input type.
    pub fn from_json(json: &Value) -> Option<InputBuilder> {
        let object = json.as_object()?;

        let type_name = object.get("type").and_then(Value::as_str).unwrap_or("");
        let Some(input_type) = InputType::from_str_opt(type_name) else {
            tracing::warn!("Ignoring input definition with type '{}'", type_name);
            return None;
        };

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_INPUT_NAME);
        let mut builder = InputBuilder::new(input_type, name);

        if let Some(alignment) = object
            .get("align")
            .and_then(Value::as_str)
            .and_then(Alignment::from_str_opt)
        {
            builder.set_alignment(alignment);
        }

        builder.set_connection_type_checks(object.get("check").and_then(parse_checks));

        Some(builder)
    }

    /// Parse JSON text and build from it
    ///
    /// Malformed text is an error; well-formed JSON that doesn't describe an
    /// input is `Ok(None)`.
    pub fn from_json_str(json: &str) -> EngineResult<Option<InputBuilder>> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_json(&value))
    }
}

/// A string is one tag; an array must be all strings. Anything else clears
/// the constraint.
fn parse_checks(check: &Value) -> Option<Vec<String>> {
    match check {
        Value::String(tag) => Some(vec![tag.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
