//! Field definitions for block inputs
//!
//! A `Field` is a named leaf value living inside an `Input`: a label, an
//! editable text box, a checkbox, a dropdown, and so on. The variants form a
//! closed set in `FieldValue`, so copying and validation are plain matches.

use blockly_core::{Colour, EngineError, EngineResult, Named, Size};
use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};

// ============================================================================
// FieldDelegate
// ============================================================================

/// Observer notified when a field's value changes
///
/// Called synchronously from `Field::set_value`, after the new value is in
/// place. A field holds at most one delegate and never keeps it alive.
pub trait FieldDelegate {
    /// The field's value has changed
    fn field_did_change(&self, field: &Field);
}

// ============================================================================
// FieldValue
// ============================================================================

/// One entry of a dropdown field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    /// Text shown to the user
    pub display_name: String,
    /// Value used by generated code
    pub value: String,
}

impl DropdownOption {
    /// Create a new dropdown option
    pub fn new(display_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            value: value.into(),
        }
    }
}

/// Typed payload of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldValue {
    /// Static, non-editable text
    Label { text: String },
    /// Editable text
    Input { text: String },
    /// Boolean toggle
    Checkbox { checked: bool },
    /// Colour picker
    Colour { colour: Colour },
    /// Choice among fixed options
    Dropdown {
        options: Vec<DropdownOption>,
        selected_index: usize,
    },
    /// Inline image
    Image {
        location: String,
        size: Size,
        alt_text: String,
    },
    /// Reference to a named variable
    Variable { variable: String },
    /// Angle in degrees, kept in `[0, 360)`
    Angle { angle: f64 },
}

/// Discriminant of a `FieldValue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Label,
    Input,
    Checkbox,
    Colour,
    Dropdown,
    Image,
    Variable,
    Angle,
}

impl FieldKind {
    /// Name used in block definitions (`field_input`, `field_dropdown`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Label => "field_label",
            FieldKind::Input => "field_input",
            FieldKind::Checkbox => "field_checkbox",
            FieldKind::Colour => "field_colour",
            FieldKind::Dropdown => "field_dropdown",
            FieldKind::Image => "field_image",
            FieldKind::Variable => "field_variable",
            FieldKind::Angle => "field_angle",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FieldValue {
    /// Get the variant discriminant
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Label { .. } => FieldKind::Label,
            FieldValue::Input { .. } => FieldKind::Input,
            FieldValue::Checkbox { .. } => FieldKind::Checkbox,
            FieldValue::Colour { .. } => FieldKind::Colour,
            FieldValue::Dropdown { .. } => FieldKind::Dropdown,
            FieldValue::Image { .. } => FieldKind::Image,
            FieldValue::Variable { .. } => FieldKind::Variable,
            FieldValue::Angle { .. } => FieldKind::Angle,
        }
    }

    /// Check the value and bring it into canonical form
    ///
    /// `field` is only used for error messages.
    fn normalized(self, field: &str) -> EngineResult<Self> {
        match self {
            FieldValue::Dropdown {
                options,
                selected_index,
            } => {
                if options.is_empty() {
                    return Err(EngineError::field_validation(
                        field,
                        "dropdown must have at least one option",
                    ));
                }
                if selected_index >= options.len() {
                    return Err(EngineError::field_validation(
                        field,
                        format!(
                            "selected index {} out of bounds for {} options",
                            selected_index,
                            options.len()
                        ),
                    ));
                }
                Ok(FieldValue::Dropdown {
                    options,
                    selected_index,
                })
            }
            FieldValue::Image {
                location,
                size,
                alt_text,
            } => {
                if !size.is_valid() {
                    return Err(EngineError::field_validation(
                        field,
                        "image size must be finite and non-negative",
                    ));
                }
                Ok(FieldValue::Image {
                    location,
                    size,
                    alt_text,
                })
            }
            FieldValue::Variable { variable } => {
                if variable.is_empty() {
                    return Err(EngineError::field_validation(
                        field,
                        "variable name cannot be empty",
                    ));
                }
                Ok(FieldValue::Variable { variable })
            }
            FieldValue::Angle { angle } => {
                if !angle.is_finite() {
                    return Err(EngineError::field_validation(field, "angle must be finite"));
                }
                Ok(FieldValue::Angle {
                    angle: angle.rem_euclid(360.0),
                })
            }
            other => Ok(other),
        }
    }

    /// Text a renderer would show for this value
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Label { text } | FieldValue::Input { text } => text.clone(),
            FieldValue::Checkbox { checked } => {
                let text = if *checked { "TRUE" } else { "FALSE" };
                text.to_string()
            }
            FieldValue::Colour { colour } => colour.to_hex(),
            FieldValue::Dropdown {
                options,
                selected_index,
            } => options
                .get(*selected_index)
                .map(|o| o.display_name.clone())
                .unwrap_or_default(),
            FieldValue::Image { alt_text, .. } => alt_text.clone(),
            FieldValue::Variable { variable } => variable.clone(),
            FieldValue::Angle { angle } => format!("{}°", angle),
        }
    }
}

// ============================================================================
// Field
// ============================================================================

/// A named value inside an input
#[derive(Serialize)]
pub struct Field {
    name: String,
    #[serde(flatten)]
    value: FieldValue,
    #[serde(skip)]
    delegate: Option<Weak<dyn FieldDelegate>>,
}

impl Field {
    /// Create a field, validating the value
    pub fn new(name: impl Into<String>, value: FieldValue) -> EngineResult<Self> {
        let name = name.into();
        let value = value.normalized(&name)?;
        Ok(Self {
            name,
            value,
            delegate: None,
        })
    }

    /// Values that can't fail validation skip the `Result`
    fn unchecked(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
            delegate: None,
        }
    }

    /// Create a label field
    pub fn label(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::unchecked(name, FieldValue::Label { text: text.into() })
    }

    /// Create an editable text field
    pub fn text_input(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::unchecked(name, FieldValue::Input { text: text.into() })
    }

    /// Create a checkbox field
    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self::unchecked(name, FieldValue::Checkbox { checked })
    }

    /// Create a colour field
    pub fn colour(name: impl Into<String>, colour: Colour) -> Self {
        Self::unchecked(name, FieldValue::Colour { colour })
    }

    /// Create a dropdown field
    pub fn dropdown(
        name: impl Into<String>,
        options: Vec<DropdownOption>,
        selected_index: usize,
    ) -> EngineResult<Self> {
        Self::new(
            name,
            FieldValue::Dropdown {
                options,
                selected_index,
            },
        )
    }

    /// Create an image field
    pub fn image(
        name: impl Into<String>,
        location: impl Into<String>,
        size: Size,
        alt_text: impl Into<String>,
    ) -> EngineResult<Self> {
        Self::new(
            name,
            FieldValue::Image {
                location: location.into(),
                size,
                alt_text: alt_text.into(),
            },
        )
    }

    /// Create a variable field
    pub fn variable(name: impl Into<String>, variable: impl Into<String>) -> EngineResult<Self> {
        Self::new(
            name,
            FieldValue::Variable {
                variable: variable.into(),
            },
        )
    }

    /// Create an angle field; the angle is normalized into `[0, 360)`
    pub fn angle(name: impl Into<String>, angle: f64) -> EngineResult<Self> {
        Self::new(name, FieldValue::Angle { angle })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the field value
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Get the variant discriminant
    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    /// Text a renderer would show for this field
    pub fn text(&self) -> String {
        self.value.display_text()
    }

    /// Check whether a live delegate is attached
    pub fn has_delegate(&self) -> bool {
        self.delegate
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    // ========================================================================
    // Copy and mutation
    // ========================================================================

    /// Independent copy with the same name and value and no delegate
    pub fn copy(&self) -> Field {
        let value = match &self.value {
            FieldValue::Label { text } => FieldValue::Label { text: text.clone() },
            FieldValue::Input { text } => FieldValue::Input { text: text.clone() },
            FieldValue::Checkbox { checked } => FieldValue::Checkbox { checked: *checked },
            FieldValue::Colour { colour } => FieldValue::Colour { colour: *colour },
            FieldValue::Dropdown {
                options,
                selected_index,
            } => FieldValue::Dropdown {
                options: options.clone(),
                selected_index: *selected_index,
            },
            FieldValue::Image {
                location,
                size,
                alt_text,
            } => FieldValue::Image {
                location: location.clone(),
                size: *size,
                alt_text: alt_text.clone(),
            },
            FieldValue::Variable { variable } => FieldValue::Variable {
                variable: variable.clone(),
            },
            FieldValue::Angle { angle } => FieldValue::Angle { angle: *angle },
        };
        Field::unchecked(self.name.clone(), value)
    }

    /// Attach the observer, replacing any previous one
    pub fn set_delegate<D: FieldDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let weak = Rc::downgrade(delegate);
        self.delegate = Some(weak as Weak<dyn FieldDelegate>);
    }

    /// Detach the observer
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Replace the value and notify the delegate
    ///
    /// The new value must be the same variant as the current one. On error
    /// the field is left untouched and no notification is sent.
    pub fn set_value(&mut self, value: FieldValue) -> EngineResult<()> {
        if value.kind() != self.kind() {
            return Err(EngineError::field_validation(
                &self.name,
                format!("cannot change a {} into a {}", self.kind(), value.kind()),
            ));
        }
        self.value = value.normalized(&self.name)?;
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        let Some(weak) = &self.delegate else {
            return;
        };
        match weak.upgrade() {
            Some(delegate) => delegate.field_did_change(self),
            None => {
                tracing::debug!("Delegate of field '{}' was dropped", self.name);
                self.delegate = None;
            }
        }
    }

    /// Set the text of a label or text input
    pub fn set_text(&mut self, text: impl Into<String>) -> EngineResult<()> {
        let text = text.into();
        let value = match self.kind() {
            FieldKind::Label => FieldValue::Label { text },
            FieldKind::Input => FieldValue::Input { text },
            other => return Err(self.wrong_kind("set_text", other)),
        };
        self.set_value(value)
    }

    /// Set the state of a checkbox
    pub fn set_checked(&mut self, checked: bool) -> EngineResult<()> {
        self.set_value(FieldValue::Checkbox { checked })
    }

    /// Set the colour of a colour field
    pub fn set_colour(&mut self, colour: Colour) -> EngineResult<()> {
        self.set_value(FieldValue::Colour { colour })
    }

    /// Select a dropdown option by index
    pub fn set_selected_index(&mut self, selected_index: usize) -> EngineResult<()> {
        let FieldValue::Dropdown { options, .. } = &self.value else {
            return Err(self.wrong_kind("set_selected_index", self.kind()));
        };
        let value = FieldValue::Dropdown {
            options: options.clone(),
            selected_index,
        };
        self.set_value(value)
    }

    /// Set the variable a variable field refers to
    pub fn set_variable(&mut self, variable: impl Into<String>) -> EngineResult<()> {
        self.set_value(FieldValue::Variable {
            variable: variable.into(),
        })
    }

    /// Set the angle of an angle field
    pub fn set_angle(&mut self, angle: f64) -> EngineResult<()> {
        self.set_value(FieldValue::Angle { angle })
    }

    fn wrong_kind(&self, operation: &str, kind: FieldKind) -> EngineError {
        EngineError::field_validation(
            &self.name,
            format!("{} is not supported by {}", operation, kind),
        )
    }

    // ========================================================================
    // Variant queries
    // ========================================================================

    /// Selected option of a dropdown
    pub fn selected_option(&self) -> Option<&DropdownOption> {
        match &self.value {
            FieldValue::Dropdown {
                options,
                selected_index,
            } => options.get(*selected_index),
            _ => None,
        }
    }

    /// State of a checkbox
    pub fn checked(&self) -> Option<bool> {
        match self.value {
            FieldValue::Checkbox { checked } => Some(checked),
            _ => None,
        }
    }
}

impl Named for Field {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("has_delegate", &self.has_delegate())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
