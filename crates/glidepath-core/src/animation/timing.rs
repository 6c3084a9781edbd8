//! L4 Atomic Layer: Frame timing
//!
//! Frame timestamps are passed in rather than read from the clock, so a host
//! can drive animations from its own frame callback (and tests can step time).

use std::time::{Duration, Instant};

/// Animation progress (0.0 to 1.0) at frame time `now`
#[inline]
pub fn progress(start: Instant, now: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Check if an animation started at `start` is over at `now`
#[inline]
pub fn is_complete(start: Instant, now: Instant, duration: Duration) -> bool {
    now.saturating_duration_since(start) >= duration
}
