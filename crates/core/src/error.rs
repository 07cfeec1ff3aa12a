//! Error types for the block editor model
//!
//! Every failure in the model is recoverable and surfaced to the caller.
//! Operations validate first and mutate last, so an `Err` always means
//! nothing changed.

use crate::types::BlockId;
use thiserror::Error;

/// The main error type for the block editor model
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A field value was rejected
    #[error("Field validation failed for '{field}': {message}")]
    FieldValidation { field: String, message: String },

    /// An input (or the fields inside it) was rejected at block assembly
    #[error("Input validation failed for '{input}': {message}")]
    InputValidation { input: String, message: String },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection kinds don't complement each other, or type checks are disjoint
    #[error("Incompatible connection: {0}")]
    IncompatibleConnection(String),

    /// One of the endpoints is already joined to something else
    #[error("Connection already in use: {0}")]
    ConnectionInUse(String),

    /// The addressed connection slot doesn't exist on the block
    #[error("Connection '{slot}' not found on block {block}")]
    ConnectionNotFound { block: BlockId, slot: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Conflicting builder settings (output vs. previous/next)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// Block is already registered in the workspace
    #[error("Duplicate block: {0} is already registered")]
    DuplicateBlock(BlockId),

    /// Block is not present where it was expected
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create a field validation error
    pub fn field_validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::FieldValidation {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create an input validation error
    pub fn input_validation(input: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::InputValidation {
            input: input.into(),
            message: msg.into(),
        }
    }

    /// Create an incompatible connection error
    pub fn incompatible(msg: impl Into<String>) -> Self {
        EngineError::IncompatibleConnection(msg.into())
    }

    /// Create a connection-in-use error
    pub fn in_use(msg: impl Into<String>) -> Self {
        EngineError::ConnectionInUse(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::FieldValidation { .. }
                | EngineError::InputValidation { .. }
        )
    }

    /// Check if this error came from joining two connections
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            EngineError::IncompatibleConnection(_)
                | EngineError::ConnectionInUse(_)
                | EngineError::ConnectionNotFound { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::BlockNotFound(_) | EngineError::ConnectionNotFound { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
