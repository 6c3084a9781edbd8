//! L4 Atomic Layer: Coordinates, bounds and interpolation
//!
//! Everything the intersection engine needs to reason about a single axis
//! lives here, so the engine itself never branches on orientation.

use serde::{Deserialize, Serialize};

/// Linear interpolation between `start` and `end`
///
/// `pct` outside `[0, 1]` yields `0.0` rather than extrapolating.
#[inline]
pub fn lerp(start: f64, end: f64, pct: f64) -> f64 {
    if !(0.0..=1.0).contains(&pct) {
        return 0.0;
    }
    (1.0 - pct) * start + pct * end
}

/// Scroll axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Scroll direction as configured by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

impl Direction {
    /// The axis this direction scrolls along
    pub fn axis(self) -> Axis {
        match self {
            Direction::Horizontal => Axis::X,
            Direction::Vertical => Axis::Y,
        }
    }
}

/// A 2D point or offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Mutable access to one component
    #[inline]
    pub fn along_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// Clamp each component into `[0, limit]`
    pub fn clamp_to(self, limit: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.clamp(0.0, limit.x.max(0.0)),
            y: self.y.clamp(0.0, limit.y.max(0.0)),
        }
    }
}

/// Width and height of a viewport or document
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along an axis (width for X, height for Y)
    #[inline]
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Axis-aligned bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Bounds {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// The start/end pair for an axis (`left/right` or `top/bottom`)
    #[inline]
    pub fn span(&self, axis: Axis) -> Span {
        match axis {
            Axis::X => Span::new(self.left, self.right),
            Axis::Y => Span::new(self.top, self.bottom),
        }
    }

    /// Move the bounds by an offset
    pub fn translate(self, by: Vec2) -> Bounds {
        Bounds {
            top: self.top + by.y,
            bottom: self.bottom + by.y,
            left: self.left + by.x,
            right: self.right + by.x,
        }
    }

    /// Shrink the bounds along one axis: `start += inset[0]`, `end -= inset[1]`
    pub fn inset(mut self, axis: Axis, inset: [f64; 2]) -> Bounds {
        match axis {
            Axis::X => {
                self.left += inset[0];
                self.right -= inset[1];
            }
            Axis::Y => {
                self.top += inset[0];
                self.bottom -= inset[1];
            }
        }
        self
    }
}

/// A one-dimensional interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Visible span of a viewport scrolled to `offset`
    #[inline]
    pub fn visible(offset: f64, viewport: f64) -> Self {
        Self::new(offset, offset + viewport)
    }

    #[inline]
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }
}
