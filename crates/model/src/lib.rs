//! # Blockly Model
//!
//! The data-level core of a block-programming editor: blocks, their inputs
//! and fields, the typed connections that join blocks into program trees,
//! and the registry of trees active in a workspace.
//!
//! ## Core Concepts
//!
//! - **Field**: A named leaf value inside an input (text, checkbox, dropdown, ...)
//! - **Input**: A slot on a block holding fields and, for value/statement inputs, a connection
//! - **Connection**: A typed endpoint (previous/next/input/output) joined to at most one other
//! - **Block**: A statement or expression node, made through `BlockBuilder`
//! - **BlockGraph**: The arena that owns blocks and performs connect/disconnect
//! - **Workspace**: The registry of block trees, free of duplicates
//!

// Module declarations
pub mod block;
pub mod builder;
pub mod connection;
pub mod field;
pub mod graph;
pub mod input;
pub mod json;
pub mod layout;
pub mod workspace;

// Re-export commonly used types at crate root
pub use block::Block;
pub use builder::BlockBuilder;
pub use connection::{Connection, ConnectionKind, ConnectionRef, ConnectionSlot};
pub use field::{DropdownOption, Field, FieldDelegate, FieldKind, FieldValue};
pub use graph::BlockGraph;
pub use input::{Alignment, DEFAULT_INPUT_NAME, Input, InputBuilder, InputType};
pub use layout::{FieldLayout, FieldLayoutMeasurer};
pub use workspace::Workspace;

// Re-export core types that are commonly used with the model
pub use blockly_core::{
    BlockId, Colour, EngineError, EngineResult, Identifiable, Named, Position, Positioned, Rect,
    Size, Timestamped, Validatable, WorkspaceId,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Alignment,
        // Model types
        Block,
        BlockBuilder,
        BlockGraph,
        BlockId,
        // Re-exported from core
        Colour,
        ConnectionKind,
        ConnectionRef,
        ConnectionSlot,
        DropdownOption,
        EngineError,
        EngineResult,
        Field,
        FieldKind,
        FieldValue,
        Identifiable,
        InputBuilder,
        InputType,
        Named,
        Size,
        Validatable,
        Workspace,
    };
}
