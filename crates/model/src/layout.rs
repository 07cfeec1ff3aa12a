//! Field measurement contract for renderers
//!
//! The model doesn't render anything. A renderer supplies a
//! `FieldLayoutMeasurer` that knows how big a field is on screen, and
//! `FieldLayout` converts between view units and workspace units.

use crate::field::Field;
use blockly_core::{Position, Rect, Size};

/// Measures fields in view coordinates
pub trait FieldLayoutMeasurer {
    /// Size needed to draw `field` at `scale`, in view units
    ///
    /// `scale` is the zoom relative to workspace units: 1.0 is 100%,
    /// 0.5 is 50%, 2.0 is 200%.
    fn measure_field(&self, field: &Field, scale: f32) -> Size;
}

/// Size and placement of one field inside its input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldLayout {
    /// Size in workspace units
    pub size: Size,

    /// Offset from the parent input's origin, in workspace units
    pub relative_position: Position,

    /// Frame in view units, relative to the owning block
    pub view_frame: Rect,
}

impl FieldLayout {
    /// Create an empty layout at `relative_position`
    pub fn new(relative_position: Position) -> Self {
        Self {
            relative_position,
            ..Self::default()
        }
    }

    /// Measure `field` and store its size in workspace units
    ///
    /// A non-positive scale means the workspace can't be measured yet and
    /// gives a zero size.
    pub fn layout(&mut self, field: &Field, measurer: &dyn FieldLayoutMeasurer, scale: f32) {
        self.size = if scale > 0.0 {
            let measured = measurer.measure_field(field, scale);
            Size::new(
                to_workspace_units(measured.width, scale),
                to_workspace_units(measured.height, scale),
            )
        } else {
            Size::zero()
        };
    }

    /// Recompute the view frame from the parent input's position
    pub fn refresh_view_frame(&mut self, parent_relative_position: Position, scale: f32) {
        let origin = parent_relative_position + self.relative_position;
        self.view_frame = Rect::from_xywh(
            (origin.x * scale).ceil(),
            (origin.y * scale).ceil(),
            (self.size.width * scale).ceil(),
            (self.size.height * scale).ceil(),
        );
    }
}

fn to_workspace_units(view: f32, scale: f32) -> f32 {
    if view.is_finite() && view > 0.0 {
        (view / scale).ceil()
    } else {
        0.0
    }
}

// ============================================================================
// Tests
// ============================================================================
