pub mod animation;
pub mod config;
pub mod controller;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod host;
pub mod intersection;
pub mod registry;
pub mod state;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{EasingType, ScrollConfig};
pub use controller::{ScrollController, ScrollMode, ScrollTarget, ScrollToBinding, ScrollToOptions};
pub use device::{DeviceContext, DeviceInfo};
pub use dispatch::{CallValue, EventKind, ListenerId, Way};
pub use error::{Error, Result};
pub use geometry::{Bounds, Direction, Size, Vec2};
pub use host::{ElementHandle, Viewport};
pub use registry::{ElementConfig, ElementId, TrackedElement};
pub use state::ScrollState;
