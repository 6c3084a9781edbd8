//! L3 Molecular Layer: Eased scroll animation
//!
//! Combines easing curves and frame timing. Call `start()` to begin an
//! animation, then `update()` once per frame to get the position for that
//! frame.

use std::time::{Duration, Instant};

use super::timing::{is_complete, progress};
use crate::config::EasingType;

/// Active scroll animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    /// Frame time the animation started at
    start: Instant,
    /// Starting scroll position
    from: f64,
    /// Target scroll position
    to: f64,
    duration: Duration,
    easing: EasingType,
}

/// Eased animation along the active scroll axis
#[derive(Debug, Clone, Default)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Begin animating from `from` to `to`
    ///
    /// Replaces any running animation. Returns false (and starts nothing) when
    /// there is nowhere to go or no time to get there; the caller jumps instead.
    pub fn start(
        &mut self,
        from: f64,
        to: f64,
        duration: Duration,
        easing: EasingType,
        now: Instant,
    ) -> bool {
        if from == to || duration.is_zero() {
            self.animation = None;
            return false;
        }

        self.animation = Some(ActiveAnimation {
            start: now,
            from,
            to,
            duration,
            easing,
        });
        true
    }

    /// Advance to frame time `now`
    ///
    /// Returns the interpolated position while an animation runs (the exact
    /// target on its last frame), `None` when idle.
    pub fn update(&mut self, now: Instant) -> Option<f64> {
        let anim = self.animation.as_ref()?;

        if is_complete(anim.start, now, anim.duration) {
            let to = anim.to;
            self.animation = None;
            return Some(to);
        }

        let t = anim.easing.apply(progress(anim.start, now, anim.duration));
        Some(anim.from + (anim.to - anim.from) * t)
    }

    /// Stop at the current position
    pub fn cancel(&mut self) {
        self.animation = None;
    }
}
