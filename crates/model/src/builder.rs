//! Block construction
//!
//! `BlockBuilder` is a plain mutable description of a block. `make_block`
//! turns it into a new `Block` with a fresh id, every connection present
//! but unconnected. Building from an existing block copies its shape and
//! metadata and none of its edges.

use crate::block::Block;
use crate::connection::{Connection, ConnectionKind};
use crate::graph::BlockGraph;
use crate::input::InputBuilder;
use blockly_core::{BlockId, Colour, EngineError, EngineResult, Named, Position};
use std::collections::HashSet;
use uuid::Uuid;

/// Enablement and type checks of one of the block's own connections
#[derive(Debug, Clone, Default, PartialEq)]
struct ConnectionSpec {
    enabled: bool,
    type_checks: Option<Vec<String>>,
}

impl ConnectionSpec {
    fn from_connection(connection: Option<&Connection>) -> Self {
        match connection {
            Some(c) => Self {
                enabled: true,
                type_checks: c.type_checks().map(<[String]>::to_vec),
            },
            None => Self::default(),
        }
    }

    fn build(&self, kind: ConnectionKind, block: BlockId) -> Option<Connection> {
        self.enabled
            .then(|| Connection::new(kind, block, self.type_checks.clone()))
    }
}

// ============================================================================
// BlockBuilder
// ============================================================================

/// Builder for `Block`
#[derive(Debug)]
pub struct BlockBuilder {
    /// Block type name, e.g. `controls_if`
    pub name: String,

    /// Inputs in order
    pub input_builders: Vec<InputBuilder>,

    /// Display colour
    pub colour: Colour,

    /// Hover text
    pub tooltip: String,

    /// Link to documentation
    pub help_url: String,

    /// Render value inputs on one row
    pub inputs_inline: bool,

    /// Initial workspace position
    pub position: Position,

    previous: ConnectionSpec,
    next: ConnectionSpec,
    output: ConnectionSpec,
}

impl BlockBuilder {
    /// Create an empty builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_builders: Vec::new(),
            colour: Colour::default(),
            tooltip: String::new(),
            help_url: String::new(),
            inputs_inline: false,
            position: Position::zero(),
            previous: ConnectionSpec::default(),
            next: ConnectionSpec::default(),
            output: ConnectionSpec::default(),
        }
    }

    /// Builder describing a structural copy of `block`
    ///
    /// Inputs and fields are deep-copied. Connections keep their enablement
    /// and type checks; targets are never carried over.
    pub fn from_block(block: &Block) -> Self {
        Self {
            name: block.name().to_string(),
            input_builders: block.inputs().iter().map(InputBuilder::from_input).collect(),
            colour: block.colour,
            tooltip: block.tooltip.clone(),
            help_url: block.help_url.clone(),
            inputs_inline: block.inputs_inline,
            position: block.position,
            previous: ConnectionSpec::from_connection(block.previous_connection()),
            next: ConnectionSpec::from_connection(block.next_connection()),
            output: ConnectionSpec::from_connection(block.output_connection()),
        }
    }

    // ========================================================================
    // Connection configuration
    // ========================================================================

    /// Enable or disable the previous connection
    ///
    /// Enabling fails with `InvalidConfiguration` if the output connection
    /// is enabled.
    pub fn set_previous_connection(
        &mut self,
        enabled: bool,
        type_checks: Option<Vec<String>>,
    ) -> EngineResult<()> {
        if enabled && self.output.enabled {
            return Err(EngineError::invalid_configuration(format!(
                "Block '{}' cannot have a previous connection and an output connection",
                self.name
            )));
        }
        self.previous = ConnectionSpec {
            enabled,
            type_checks,
        };
        Ok(())
    }

    /// Enable or disable the next connection
    ///
    /// Enabling fails with `InvalidConfiguration` if the output connection
    /// is enabled.
    pub fn set_next_connection(
        &mut self,
        enabled: bool,
        type_checks: Option<Vec<String>>,
    ) -> EngineResult<()> {
        if enabled && self.output.enabled {
            return Err(EngineError::invalid_configuration(format!(
                "Block '{}' cannot have a next connection and an output connection",
                self.name
            )));
        }
        self.next = ConnectionSpec {
            enabled,
            type_checks,
        };
        Ok(())
    }

    /// Enable or disable the output connection
    ///
    /// Enabling fails with `InvalidConfiguration` if the previous or next
    /// connection is enabled.
    pub fn set_output_connection(
        &mut self,
        enabled: bool,
        type_checks: Option<Vec<String>>,
    ) -> EngineResult<()> {
        if enabled && (self.previous.enabled || self.next.enabled) {
            return Err(EngineError::invalid_configuration(format!(
                "Block '{}' cannot have an output connection and previous/next connections",
                self.name
            )));
        }
        self.output = ConnectionSpec {
            enabled,
            type_checks,
        };
        Ok(())
    }

    /// Check if the previous connection is enabled
    pub fn has_previous_connection(&self) -> bool {
        self.previous.enabled
    }

    /// Check if the next connection is enabled
    pub fn has_next_connection(&self) -> bool {
        self.next.enabled
    }

    /// Check if the output connection is enabled
    pub fn has_output_connection(&self) -> bool {
        self.output.enabled
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Set the colour
    pub fn set_colour(&mut self, colour: Colour) -> &mut Self {
        self.colour = colour;
        self
    }

    /// Set the colour from a hue in degrees
    pub fn set_colour_hue(&mut self, hue: f32) -> &mut Self {
        self.colour = Colour::from_hue(hue);
        self
    }

    /// Set the tooltip
    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) -> &mut Self {
        self.tooltip = tooltip.into();
        self
    }

    /// Set the help URL
    pub fn set_help_url(&mut self, help_url: impl Into<String>) -> &mut Self {
        self.help_url = help_url.into();
        self
    }

    /// Render value inputs on one row
    pub fn set_inputs_inline(&mut self, inline: bool) -> &mut Self {
        self.inputs_inline = inline;
        self
    }

    /// Set the initial position
    pub fn set_position(&mut self, position: Position) -> &mut Self {
        self.position = position;
        self
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Append an input
    pub fn with_input(mut self, input: InputBuilder) -> Self {
        self.input_builders.push(input);
        self
    }

    /// Set the colour
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.set_colour(colour);
        self
    }

    /// Set the colour from a hue in degrees
    pub fn with_colour_hue(mut self, hue: f32) -> Self {
        self.set_colour_hue(hue);
        self
    }

    /// Set the tooltip
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.set_tooltip(tooltip);
        self
    }

    /// Set the help URL
    pub fn with_help_url(mut self, help_url: impl Into<String>) -> Self {
        self.set_help_url(help_url);
        self
    }

    /// Render value inputs inline
    pub fn with_inputs_inline(mut self, inline: bool) -> Self {
        self.set_inputs_inline(inline);
        self
    }

    /// Set the initial position
    pub fn with_position(mut self, position: Position) -> Self {
        self.set_position(position);
        self
    }

    // ========================================================================
    // Assembly
    // ========================================================================

    fn check(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::validation("Block name cannot be empty"));
        }
        if self.output.enabled && (self.previous.enabled || self.next.enabled) {
            return Err(EngineError::invalid_configuration(format!(
                "Block '{}' cannot have an output connection and previous/next connections",
                self.name
            )));
        }

        let mut names = HashSet::new();
        for input in &self.input_builders {
            if !input.name.is_empty() && !names.insert(input.name.as_str()) {
                return Err(EngineError::input_validation(
                    &input.name,
                    format!("duplicate input name in block '{}'", self.name),
                ));
            }
            input.check()?;
        }
        Ok(())
    }

    /// Make a new block from this description
    ///
    /// The block gets a fresh id and starts fully disconnected.
    pub fn make_block(&self) -> EngineResult<Block> {
        self.check()?;

        let id = Uuid::new_v4();
        let inputs = self.input_builders.iter().map(|b| b.build(id)).collect();

        let block = Block {
            id,
            name: self.name.clone(),
            inputs,
            previous_connection: self.previous.build(ConnectionKind::Previous, id),
            next_connection: self.next.build(ConnectionKind::Next, id),
            output_connection: self.output.build(ConnectionKind::Output, id),
            colour: self.colour,
            tooltip: self.tooltip.clone(),
            help_url: self.help_url.clone(),
            inputs_inline: self.inputs_inline,
            position: self.position,
            workspace: None,
        };

        tracing::debug!("Made block '{}' ({})", block.name, id);
        Ok(block)
    }

    /// Make a new block and insert it into `graph`
    pub fn make_block_in(&self, graph: &mut BlockGraph) -> EngineResult<BlockId> {
        let block = self.make_block()?;
        Ok(graph.insert(block))
    }
}

// ============================================================================
// Tests
// ============================================================================
