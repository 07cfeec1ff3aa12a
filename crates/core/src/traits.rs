//! Core traits for the block editor model
//!
//! Small shared behaviors implemented by blocks, inputs, and the workspace.

use crate::error::EngineResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use blockly_core::{Validatable, EngineResult, EngineError};
///
/// struct Tooltip(String);
///
/// impl Validatable for Tooltip {
///     fn validate(&self) -> EngineResult<()> {
///         if self.0.len() > 512 {
///             return Err(EngineError::validation("Tooltip too long"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a unique identifier
///
/// Identity in the model is always decided by this id, never by address.
pub trait Identifiable {
    /// Get the unique identifier
    fn id(&self) -> uuid::Uuid;

    /// Check if this matches another identifier
    fn matches_id(&self, id: uuid::Uuid) -> bool {
        self.id() == id
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types that have a name
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Check if the name matches exactly
    fn name_matches(&self, other: &str) -> bool {
        self.name() == other
    }
}

// ============================================================================
// Positioned Trait
// ============================================================================

/// Trait for types placed in workspace coordinates
pub trait Positioned {
    /// Get the current position
    fn position(&self) -> crate::types::Position;

    /// Set the position
    fn set_position(&mut self, position: crate::types::Position);

    /// Move by a relative offset
    fn translate(&mut self, dx: f32, dy: f32) {
        let pos = self.position();
        self.set_position(pos.offset(dx, dy));
    }
}

// ============================================================================
// Timestamped Trait
// ============================================================================

/// Trait for types that track creation and modification times
pub trait Timestamped {
    /// Get the creation timestamp
    fn created_at(&self) -> chrono::DateTime<chrono::Utc>;

    /// Get the last modification timestamp
    fn modified_at(&self) -> chrono::DateTime<chrono::Utc>;

    /// Update the modification timestamp to now
    fn touch(&mut self);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    struct TestValidatable {
        valid: bool,
    }

    impl Validatable for TestValidatable {
        fn validate(&self) -> EngineResult<()> {
            if self.valid {
                Ok(())
            } else {
                Err(crate::error::EngineError::validation("Invalid state"))
            }
        }
    }

    #[test]
    fn test_validatable_trait() {
        let valid = TestValidatable { valid: true };
        assert!(valid.is_valid());
        assert!(valid.validation_errors().is_empty());

        let invalid = TestValidatable { valid: false };
        assert!(!invalid.is_valid());
        assert_eq!(invalid.validation_errors().len(), 1);
    }

    struct Marker {
        position: Position,
    }

    impl Positioned for Marker {
        fn position(&self) -> Position {
            self.position
        }

        fn set_position(&mut self, position: Position) {
            self.position = position;
        }
    }

    #[test]
    fn test_positioned_translate() {
        let mut marker = Marker {
            position: Position::new(1.0, 2.0),
        };
        marker.translate(3.0, 4.0);
        assert_eq!(marker.position(), Position::new(4.0, 6.0));
    }
}
