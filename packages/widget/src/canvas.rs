//! Drawing surface model for canvas-kind widgets.
//!
//! A canvas widget draws imperatively into a [`Surface`] through the
//! [`CanvasContext`](crate::value::CanvasContext) handed to its render
//! procedure. The surface records draw operations as plain values so tests
//! can assert on what was drawn without a real device.

use serde::{Deserialize, Serialize};

/// Size of the drawable area, in device-independent pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Create a viewport with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned scale applied to a surface's recorded operations.
///
/// Used when a widget declares a `transform` projection: a viewport change
/// retargets this transform instead of forcing a full re-render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform { sx: 1.0, sy: 1.0 };

    /// The scale that maps content laid out for `from` onto `to`.
    ///
    /// A zero-sized `from` axis maps to the identity on that axis.
    pub fn fit(from: Viewport, to: Viewport) -> Self {
        let scale = |from: u32, to: u32| {
            if from == 0 {
                1.0
            } else {
                f64::from(to) / f64::from(from)
            }
        };
        Self {
            sx: scale(from.width, to.width),
            sy: scale(from.height, to.height),
        }
    }

    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A single recorded draw operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    /// Clear the whole surface.
    Clear,
    /// A line segment between two points.
    Line { from: (f64, f64), to: (f64, f64) },
    /// An axis-aligned rectangle.
    Rect { origin: (f64, f64), size: (f64, f64) },
    /// A text run anchored at a point.
    Text { at: (f64, f64), content: String },
}

/// The drawing surface a canvas widget renders into.
///
/// Impure widgets rely on the same surface instance surviving config and
/// viewport updates; the runtime must not recreate it behind their back.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    viewport: Viewport,
    transform: Transform,
    ops: Vec<DrawOp>,
}

impl Surface {
    /// Create an empty surface sized to the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            transform: Transform::IDENTITY,
            ops: Vec::new(),
        }
    }

    /// The viewport the surface is currently sized for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The transform applied to the recorded operations.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Record a draw operation.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// The recorded operations, in draw order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Discard all recorded operations, keeping viewport and transform.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Resize the drawable area without touching transform or recorded
    /// operations. The widget is expected to redraw for the new size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Retarget the surface to a new viewport by adjusting the transform,
    /// keeping the recorded operations.
    ///
    /// The new transform composes onto whatever the surface was originally
    /// laid out for, so repeated resizes do not accumulate error.
    pub fn apply_viewport(&mut self, viewport: Viewport) {
        let original = Viewport {
            width: (f64::from(self.viewport.width) / self.transform.sx).round() as u32,
            height: (f64::from(self.viewport.height) / self.transform.sy).round() as u32,
        };
        self.transform = Transform::fit(original, viewport);
        self.viewport = viewport;
    }

    /// Reset to an empty surface sized to `viewport`.
    pub fn reset(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.transform = Transform::IDENTITY;
        self.ops.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_scales_both_axes() {
        let t = Transform::fit(Viewport::new(100, 200), Viewport::new(200, 100));
        assert_eq!(t.sx, 2.0);
        assert_eq!(t.sy, 0.5);
    }

    #[test]
    fn fit_handles_zero_source() {
        let t = Transform::fit(Viewport::new(0, 0), Viewport::new(640, 480));
        assert!(t.is_identity());
    }

    #[test]
    fn surface_records_ops_in_order() {
        let mut surface = Surface::new(Viewport::new(10, 10));
        surface.push(DrawOp::Clear);
        surface.push(DrawOp::Line {
            from: (0.0, 0.0),
            to: (1.0, 1.0),
        });
        assert_eq!(surface.ops().len(), 2);
        assert_eq!(surface.ops()[0], DrawOp::Clear);
    }

    #[test]
    fn apply_viewport_keeps_ops_and_retargets_transform() {
        let mut surface = Surface::new(Viewport::new(100, 100));
        surface.push(DrawOp::Rect {
            origin: (0.0, 0.0),
            size: (50.0, 50.0),
        });

        surface.apply_viewport(Viewport::new(200, 200));
        assert_eq!(surface.ops().len(), 1);
        assert_eq!(surface.transform(), Transform { sx: 2.0, sy: 2.0 });

        // A second resize scales relative to the original layout, not the
        // intermediate one.
        surface.apply_viewport(Viewport::new(100, 100));
        assert!(surface.transform().is_identity());
    }

    #[test]
    fn reset_discards_everything() {
        let mut surface = Surface::new(Viewport::new(100, 100));
        surface.push(DrawOp::Clear);
        surface.apply_viewport(Viewport::new(300, 300));

        surface.reset(Viewport::new(40, 40));
        assert!(surface.ops().is_empty());
        assert!(surface.transform().is_identity());
        assert_eq!(surface.viewport(), Viewport::new(40, 40));
    }
}
