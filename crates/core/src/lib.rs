//! # Blockly Core
//!
//! Core types, traits, and error handling for the block editor model.
//!
//! This crate provides the foundational building blocks used by the model
//! crate, including:
//!
//! - **Types**: Identifiers, geometric primitives (Position, Size, Rect), Colour
//! - **Traits**: Common behaviors like `Validatable` and `Identifiable`
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::{Identifiable, Named, Positioned, Timestamped, Validatable};
pub use types::{
    BlockId, Colour, DEFAULT_BLOCK_SATURATION, DEFAULT_BLOCK_VALUE, Position, Rect, Size,
    WorkspaceId,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
