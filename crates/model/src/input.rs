//! Inputs: the named slots of a block
//!
//! An input carries an ordered run of fields and, for value and statement
//! inputs, a connection that a child block can plug into.

use crate::connection::{Connection, ConnectionKind};
use crate::field::Field;
use blockly_core::{BlockId, EngineError, EngineResult, Named, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name given to inputs whose definition doesn't provide one
pub const DEFAULT_INPUT_NAME: &str = "NAME";

// ============================================================================
// InputType
// ============================================================================

/// Kind of input slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    /// Accepts an expression block through an `Input` connection
    #[serde(rename = "input_value")]
    Value,
    /// Accepts a statement stack through a `Next` connection
    #[serde(rename = "input_statement")]
    Statement,
    /// Fields only, no connection
    #[serde(rename = "input_dummy")]
    Dummy,
}

impl InputType {
    /// Parse a definition string (`input_value`, `input_statement`, `input_dummy`)
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "input_value" => Some(InputType::Value),
            "input_statement" => Some(InputType::Statement),
            "input_dummy" => Some(InputType::Dummy),
            _ => None,
        }
    }

    /// Get the definition string
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Value => "input_value",
            InputType::Statement => "input_statement",
            InputType::Dummy => "input_dummy",
        }
    }

    /// Kind of the connection this input type carries, if any
    pub fn connection_kind(&self) -> Option<ConnectionKind> {
        match self {
            InputType::Value => Some(ConnectionKind::Input),
            InputType::Statement => Some(ConnectionKind::Next),
            InputType::Dummy => None,
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Horizontal alignment of an input's fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alignment {
    #[default]
    Left,
    Centre,
    Right,
}

impl Alignment {
    /// Parse a definition string (`LEFT`, `CENTRE`, `RIGHT`)
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "LEFT" => Some(Alignment::Left),
            "CENTRE" => Some(Alignment::Centre),
            "RIGHT" => Some(Alignment::Right),
            _ => None,
        }
    }

    /// Get the definition string
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "LEFT",
            Alignment::Centre => "CENTRE",
            Alignment::Right => "RIGHT",
        }
    }
}

// ============================================================================
// Input
// ============================================================================

/// A named slot on a block
#[derive(Debug, Serialize)]
pub struct Input {
    input_type: InputType,
    name: String,
    alignment: Alignment,
    fields: Vec<Field>,
    connection: Option<Connection>,
    source_block: BlockId,
}

impl Input {
    /// Get the input type
    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    /// Get the alignment
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Get the fields in order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get a field by name
    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Get a field by name, mutably
    ///
    /// Use the field's setters to edit it. Replacing it wholesale can break
    /// name uniqueness, which `validate` reports.
    pub fn field_named_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    /// Get the connection (`None` for dummy inputs)
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    /// Get the block this input belongs to
    pub fn source_block(&self) -> BlockId {
        self.source_block
    }
}

impl Named for Input {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validatable for Input {
    /// Field names must be unique within an input
    fn validate(&self) -> EngineResult<()> {
        check_unique_field_names(&self.name, &self.fields)
    }
}

fn check_unique_field_names(input: &str, fields: &[Field]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name()) {
            return Err(EngineError::input_validation(
                input,
                format!("duplicate field name '{}'", field.name()),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// InputBuilder
// ============================================================================

/// Pending description of an input
///
/// Holds its own fields; `build` moves deep copies of them into the input
/// so the builder can be reused.
#[derive(Debug)]
pub struct InputBuilder {
    pub input_type: InputType,
    pub name: String,
    pub alignment: Alignment,
    pub connection_type_checks: Option<Vec<String>>,
    fields: Vec<Field>,
}

impl InputBuilder {
    /// Create a builder for an input of the given type
    pub fn new(input_type: InputType, name: impl Into<String>) -> Self {
        Self {
            input_type,
            name: name.into(),
            alignment: Alignment::default(),
            connection_type_checks: None,
            fields: Vec::new(),
        }
    }

    /// Builder that recreates `input`: fields are copied, the connection
    /// keeps its type checks but not its target
    pub fn from_input(input: &Input) -> Self {
        Self {
            input_type: input.input_type,
            name: input.name.clone(),
            alignment: input.alignment,
            connection_type_checks: input
                .connection
                .as_ref()
                .and_then(|c| c.type_checks().map(<[String]>::to_vec)),
            fields: input.fields.iter().map(Field::copy).collect(),
        }
    }

    /// Append fields to the pending list
    ///
    /// Names are not checked here; duplicates are rejected when the block
    /// is made.
    pub fn append_fields(&mut self, fields: impl IntoIterator<Item = Field>) -> &mut Self {
        self.fields.extend(fields);
        self
    }

    /// Append a single field
    pub fn append_field(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Set the alignment
    pub fn set_alignment(&mut self, alignment: Alignment) -> &mut Self {
        self.alignment = alignment;
        self
    }

    /// Restrict the connection to these tags (`None` accepts anything)
    pub fn set_connection_type_checks(&mut self, checks: Option<Vec<String>>) -> &mut Self {
        self.connection_type_checks = checks;
        self
    }

    /// Restrict the connection to a single tag
    pub fn set_connection_type_check(&mut self, check: impl Into<String>) -> &mut Self {
        self.connection_type_checks = Some(vec![check.into()]);
        self
    }

    /// Get the pending fields
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Check the pending state before a block is made from it
    pub(crate) fn check(&self) -> EngineResult<()> {
        check_unique_field_names(&self.name, &self.fields)
    }

    /// Build an input bound to `source_block`
    pub fn build(&self, source_block: BlockId) -> Input {
        let connection = self.input_type.connection_kind().map(|kind| {
            Connection::new(kind, source_block, self.connection_type_checks.clone())
        });

        Input {
            input_type: self.input_type,
            name: self.name.clone(),
            alignment: self.alignment,
            fields: self.fields.iter().map(Field::copy).collect(),
            connection,
            source_block,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
