use serde::Serialize;

use crate::geometry::{Axis, Direction, Vec2};

/// Which way the last frame moved along the active axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

/// Scroll position snapshot handed to scroll listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollState {
    pub offset: Vec2,
    /// Maximum reachable offset
    pub limit: Vec2,
    pub direction: Direction,
    pub axis: Axis,
    /// Pixels moved per frame along the axis, when `get_speed` is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Last movement, when `get_direction` is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<Heading>,
}

impl ScrollState {
    pub fn new(direction: Direction, limit: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            limit,
            direction,
            axis: direction.axis(),
            speed: None,
            heading: None,
        }
    }

    /// Offset along the active axis
    #[inline]
    pub fn position(&self) -> f64 {
        self.offset.along(self.axis)
    }

    /// Limit along the active axis
    #[inline]
    pub fn max_position(&self) -> f64 {
        self.limit.along(self.axis)
    }

    /// Heading implied by a move from `previous` to the current offset
    pub(crate) fn heading_from(&self, previous: f64) -> Option<Heading> {
        let delta = self.position() - previous;
        if delta == 0.0 {
            return None;
        }
        Some(match (self.axis, delta > 0.0) {
            (Axis::Y, true) => Heading::Down,
            (Axis::Y, false) => Heading::Up,
            (Axis::X, true) => Heading::Right,
            (Axis::X, false) => Heading::Left,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_follows_direction() {
        let state = ScrollState::new(Direction::Horizontal, Vec2::new(500.0, 0.0));
        assert_eq!(state.axis, Axis::X);
        assert_eq!(state.max_position(), 500.0);
    }

    #[test]
    fn test_heading() {
        let mut state = ScrollState::new(Direction::Vertical, Vec2::new(0.0, 1000.0));
        state.offset.y = 200.0;
        assert_eq!(state.heading_from(100.0), Some(Heading::Down));
        assert_eq!(state.heading_from(300.0), Some(Heading::Up));
        assert_eq!(state.heading_from(200.0), None);
    }
}
