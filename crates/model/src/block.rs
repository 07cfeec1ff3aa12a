//! Block definitions
//!
//! A `Block` is either a statement (previous/next connections) or an
//! expression (output connection), never both. Blocks are made by
//! `BlockBuilder` and live in a `BlockGraph`, which owns the edges between
//! them.

use crate::connection::{Connection, ConnectionSlot};
use crate::field::Field;
use crate::input::Input;
use blockly_core::{
    BlockId, Colour, EngineError, EngineResult, Identifiable, Named, Position, Positioned,
    Validatable, WorkspaceId,
};
use serde::Serialize;
use std::collections::HashSet;

// ============================================================================
// Block
// ============================================================================

/// A node in a program tree
#[derive(Debug, Serialize)]
pub struct Block {
    pub(crate) id: BlockId,
    pub(crate) name: String,
    pub(crate) inputs: Vec<Input>,
    pub(crate) previous_connection: Option<Connection>,
    pub(crate) next_connection: Option<Connection>,
    pub(crate) output_connection: Option<Connection>,

    /// Display colour
    pub colour: Colour,

    /// Hover text
    pub tooltip: String,

    /// Link to documentation
    pub help_url: String,

    /// Render value inputs on one row
    pub inputs_inline: bool,

    pub(crate) position: Position,
    pub(crate) workspace: Option<WorkspaceId>,
}

impl Block {
    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the inputs in order
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Get the previous connection
    pub fn previous_connection(&self) -> Option<&Connection> {
        self.previous_connection.as_ref()
    }

    /// Get the next connection
    pub fn next_connection(&self) -> Option<&Connection> {
        self.next_connection.as_ref()
    }

    /// Get the output connection
    pub fn output_connection(&self) -> Option<&Connection> {
        self.output_connection.as_ref()
    }

    /// Get the workspace this block is registered in
    pub fn workspace(&self) -> Option<WorkspaceId> {
        self.workspace
    }

    /// Check if this is a statement block
    pub fn is_statement(&self) -> bool {
        self.previous_connection.is_some() || self.next_connection.is_some()
    }

    /// Check if this is an expression block
    pub fn is_expression(&self) -> bool {
        self.output_connection.is_some()
    }

    /// Get the first input with the given name
    pub fn input_named(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name() == name)
    }

    /// Get the index of the first input with the given name
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|i| i.name() == name)
    }

    /// Get the first field with the given name, searching inputs in order
    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.inputs.iter().find_map(|i| i.field_named(name))
    }

    /// Get the first field with the given name, mutably
    ///
    /// Inputs themselves are never handed out mutably, since connection
    /// slots address them by position. Assigning a whole new `Field` here
    /// bypasses the name check; `validate` reports any resulting duplicate.
    pub fn field_named_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.inputs.iter_mut().find_map(|i| i.field_named_mut(name))
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Get the connection at a slot
    pub fn connection(&self, slot: ConnectionSlot) -> Option<&Connection> {
        match slot {
            ConnectionSlot::Previous => self.previous_connection.as_ref(),
            ConnectionSlot::Next => self.next_connection.as_ref(),
            ConnectionSlot::Output => self.output_connection.as_ref(),
            ConnectionSlot::Input(index) => self.inputs.get(index)?.connection(),
        }
    }

    pub(crate) fn connection_mut(&mut self, slot: ConnectionSlot) -> Option<&mut Connection> {
        match slot {
            ConnectionSlot::Previous => self.previous_connection.as_mut(),
            ConnectionSlot::Next => self.next_connection.as_mut(),
            ConnectionSlot::Output => self.output_connection.as_mut(),
            ConnectionSlot::Input(index) => self.inputs.get_mut(index)?.connection_mut(),
        }
    }

    /// Get the connection at a slot, or `ConnectionNotFound`
    pub fn require_connection(&self, slot: ConnectionSlot) -> EngineResult<&Connection> {
        self.connection(slot)
            .ok_or_else(|| EngineError::ConnectionNotFound {
                block: self.id,
                slot: slot.to_string(),
            })
    }

    /// All connections with their slots: output, previous, next, then inputs
    pub fn connections(&self) -> Vec<(ConnectionSlot, &Connection)> {
        let own = [
            (ConnectionSlot::Output, self.output_connection.as_ref()),
            (ConnectionSlot::Previous, self.previous_connection.as_ref()),
            (ConnectionSlot::Next, self.next_connection.as_ref()),
        ];
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| (ConnectionSlot::Input(index), input.connection()));

        own.into_iter()
            .chain(inputs)
            .filter_map(|(slot, conn)| conn.map(|c| (slot, c)))
            .collect()
    }

    /// The connection that attaches this block to a parent
    pub fn parent_connection(&self) -> Option<(ConnectionSlot, &Connection)> {
        if let Some(output) = &self.output_connection {
            return Some((ConnectionSlot::Output, output));
        }
        self.previous_connection
            .as_ref()
            .map(|previous| (ConnectionSlot::Previous, previous))
    }

    /// Slots that can host children, in traversal order: next, then inputs
    pub fn child_connection_slots(&self) -> Vec<ConnectionSlot> {
        let mut slots = Vec::new();
        if self.next_connection.is_some() {
            slots.push(ConnectionSlot::Next);
        }
        slots.extend(
            self.inputs
                .iter()
                .enumerate()
                .filter(|(_, input)| input.connection().is_some())
                .map(|(index, _)| ConnectionSlot::Input(index)),
        );
        slots
    }

    /// Check that no connection is joined
    pub fn is_disconnected(&self) -> bool {
        self.connections().iter().all(|(_, c)| !c.is_connected())
    }
}

impl Identifiable for Block {
    fn id(&self) -> BlockId {
        self.id
    }
}

impl Named for Block {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Positioned for Block {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl Validatable for Block {
    /// Shape checks: statement/expression exclusivity, unique input names,
    /// unique field names per input, and back-references pointing here
    fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::validation("Block name cannot be empty"));
        }
        if self.is_statement() && self.is_expression() {
            return Err(EngineError::invalid_configuration(format!(
                "Block '{}' has both an output and previous/next connections",
                self.name
            )));
        }

        let mut input_names = HashSet::new();
        for input in &self.inputs {
            if !input.name().is_empty() && !input_names.insert(input.name()) {
                return Err(EngineError::input_validation(
                    input.name(),
                    format!("duplicate input name in block '{}'", self.name),
                ));
            }
            input.validate()?;
            if input.source_block() != self.id {
                return Err(EngineError::internal(format!(
                    "Input '{}' does not point back at block {}",
                    input.name(),
                    self.id
                )));
            }
        }

        for (slot, connection) in self.connections() {
            if connection.source_block() != self.id {
                return Err(EngineError::internal(format!(
                    "Connection {} does not point back at block {}",
                    slot, self.id
                )));
            }
        }

        Ok(())
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Block {}

impl std::hash::Hash for Block {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================
