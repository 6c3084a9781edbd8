//! Device class detection
//!
//! The host reports what it knows about the user agent and viewport; the
//! resulting context picks which direction/smooth settings apply.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Raw facts about the device, as reported by the host
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    pub user_agent: String,
    pub platform: String,
    pub max_touch_points: u32,
    pub viewport_width: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceContext {
    #[default]
    Desktop,
    Tablet,
    Smartphone,
}

impl fmt::Display for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceContext::Desktop => "desktop",
            DeviceContext::Tablet => "tablet",
            DeviceContext::Smartphone => "smartphone",
        };
        f.write_str(name)
    }
}

fn mobile_user_agent() -> &'static Regex {
    static MOBILE_UA: OnceLock<Regex> = OnceLock::new();
    MOBILE_UA.get_or_init(|| {
        Regex::new(r"(?i)Android|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
            .expect("mobile user agent pattern is valid")
    })
}

impl DeviceContext {
    /// Classify a device
    ///
    /// iPadOS reports itself as `MacIntel`, so a Mac platform with more than
    /// one touch point counts as mobile too.
    pub fn detect(info: &DeviceInfo, tablet_breakpoint: f64) -> Self {
        let is_mobile = mobile_user_agent().is_match(&info.user_agent)
            || (info.platform == "MacIntel" && info.max_touch_points > 1)
            || info.viewport_width < tablet_breakpoint;

        if !is_mobile {
            DeviceContext::Desktop
        } else if info.viewport_width >= tablet_breakpoint {
            DeviceContext::Tablet
        } else {
            DeviceContext::Smartphone
        }
    }

    pub fn is_mobile(self) -> bool {
        self != DeviceContext::Desktop
    }
}
