use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas coordinates.
///
/// `top` is the numerically larger y edge, `bottom` the smaller one; the
/// occupancy index only ever sees rects with `top >= bottom` and
/// `right >= left`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, right: f32, bottom: f32) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Rect of the given dimensions centered on `(x, y)`.
    pub fn centered(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            top: y + height / 2.0,
            left: x - width / 2.0,
            right: x + width / 2.0,
            bottom: y - height / 2.0,
        }
    }

    pub fn x(&self) -> f32 {
        self.left
    }

    pub fn y(&self) -> f32 {
        self.bottom
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Separating-axis test with strict inequalities: rects that merely
    /// touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.bottom < other.top
            && other.bottom < self.top
    }

    /// True when the rect lies entirely within `[0, width] x [0, height]`.
    pub fn fits(&self, width: f32, height: f32) -> bool {
        self.left >= 0.0 && self.right <= width && self.bottom >= 0.0 && self.top <= height
    }
}
