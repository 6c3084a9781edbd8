//! Animated scrolling
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves
//! - `timing` - Frame-time progress calculations
//!
//! ## L3 Molecular Layer
//! - `animator` - Eased `scroll_to` animation state

// L4 Atomic Layer
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod animator;

pub use animator::ScrollAnimator;
