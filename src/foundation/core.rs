use crate::foundation::error::{PlumageError, PlumageResult};

/// Axis-aligned integer rectangle, half-open: `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlacementRect {
    /// Left edge (inclusive).
    pub x0: u32,
    /// Top edge (inclusive).
    pub y0: u32,
    /// Right edge (exclusive).
    pub x1: u32,
    /// Bottom edge (exclusive).
    pub y1: u32,
}

impl PlacementRect {
    /// Build a rectangle from its min and max corners.
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> PlumageResult<Self> {
        if x1 < x0 || y1 < y0 {
            return Err(PlumageError::validation(format!(
                "placement max corner ({x1},{y1}) is before min corner ({x0},{y0})"
            )));
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    pub(crate) const fn from_corners(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Overlap of two rectangles; empty rectangles collapse onto `self`'s origin.
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1).max(x0);
        let y1 = self.y1.min(other.y1).max(y0);
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle of size `width x height` anchored at this rectangle's origin.
    pub fn with_size_at_origin(self, width: u32, height: u32) -> Self {
        Self {
            x0: self.x0,
            y0: self.y0,
            x1: self.x0.saturating_add(width),
            y1: self.y0.saturating_add(height),
        }
    }

    /// Whole-image bounds.
    pub fn of_size(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
