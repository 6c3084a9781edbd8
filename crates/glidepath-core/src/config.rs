use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::device::DeviceContext;
use crate::geometry::Direction;

/// Engine configuration
///
/// Unknown keys in the TOML source are ignored; every known key falls back to
/// its default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Attribute namespace for declarative bindings (`data-<name>-to`, ...)
    #[serde(default = "default_name")]
    pub name: String,
    /// Default `[start, end]` insets applied to every tracked element
    #[serde(default)]
    pub offset: [f64; 2],
    /// Default repeat flag for tracked elements
    #[serde(default)]
    pub repeat: bool,
    /// Desktop smooth scrolling
    #[serde(default)]
    pub smooth: bool,
    /// Desktop scroll direction
    #[serde(default)]
    pub direction: Direction,
    /// Per-frame interpolation factor for smooth mode (0.0-1.0)
    #[serde(default = "default_lerp")]
    pub lerp: f64,
    /// Class applied to elements while they are in view
    #[serde(default = "default_class")]
    pub class: String,
    /// Marker class the embedding app applies to the document root on activation
    #[serde(default = "default_init_class")]
    pub init_class: String,
    /// Track scroll speed in the scroll state
    #[serde(default)]
    pub get_speed: bool,
    /// Track scroll heading in the scroll state
    #[serde(default)]
    pub get_direction: bool,
    /// Multiplier applied to `scroll_by` deltas
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Eased `scroll_to` animation
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Tablet overrides
    #[serde(default)]
    pub tablet: TabletConfig,
    /// Smartphone overrides
    #[serde(default)]
    pub smartphone: SmartphoneConfig,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            offset: [0.0, 0.0],
            repeat: false,
            smooth: false,
            direction: Direction::default(),
            lerp: default_lerp(),
            class: default_class(),
            init_class: default_init_class(),
            get_speed: false,
            get_direction: false,
            multiplier: default_multiplier(),
            animation: AnimationConfig::default(),
            tablet: TabletConfig::default(),
            smartphone: SmartphoneConfig::default(),
        }
    }
}

/// Easing curve for animated scrolling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump straight to the target at the end of the animation
    None,
    Linear,
    /// 1 - (1-t)^3
    #[default]
    Cubic,
    /// 1 - (1-t)^5
    Quintic,
    /// 1 - 2^(-10t)
    EaseOut,
    /// Cubic acceleration then deceleration
    EaseInOutCubic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Duration of an eased `scroll_to` in milliseconds (0 = jump)
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Easing curve
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate used by hosts that pace frames themselves
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            easing: EasingType::default(),
            fps: default_fps(),
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Frame interval for `fps`
    pub fn frame_interval(&self) -> Duration {
        if self.fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.fps as u64)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabletConfig {
    #[serde(default)]
    pub smooth: bool,
    #[serde(default)]
    pub direction: Direction,
    /// Viewport width below which a mobile device counts as a smartphone
    #[serde(default = "default_breakpoint")]
    pub breakpoint: f64,
}

impl Default for TabletConfig {
    fn default() -> Self {
        Self {
            smooth: false,
            direction: Direction::default(),
            breakpoint: default_breakpoint(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartphoneConfig {
    #[serde(default)]
    pub smooth: bool,
    #[serde(default)]
    pub direction: Direction,
}

/// A configuration combination that is accepted but only partially supported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigWarning {
    pub context: DeviceContext,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`smooth = false` and `horizontal` direction are not yet compatible ({})",
            self.context
        )
    }
}

fn default_name() -> String {
    "scroll".to_string()
}

fn default_lerp() -> f64 {
    0.1
}

fn default_class() -> String {
    "is-inview".to_string()
}

fn default_init_class() -> String {
    "has-scroll-init".to_string()
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_duration_ms() -> u64 {
    1000
}

fn default_fps() -> u32 {
    60
}

fn default_breakpoint() -> f64 {
    1024.0
}

impl ScrollConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml_string()?)?;

        Ok(())
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/glidepath/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("glidepath")
            .join("config.toml")
    }

    /// Direction in effect for a device context
    pub fn direction_for(&self, context: DeviceContext) -> Direction {
        match context {
            DeviceContext::Desktop => self.direction,
            DeviceContext::Tablet => self.tablet.direction,
            DeviceContext::Smartphone => self.smartphone.direction,
        }
    }

    /// Whether smooth scrolling is requested for a device context
    pub fn smooth_for(&self, context: DeviceContext) -> bool {
        match context {
            DeviceContext::Desktop => self.smooth,
            DeviceContext::Tablet => self.tablet.smooth,
            DeviceContext::Smartphone => self.smartphone.smooth,
        }
    }

    /// Combinations that degrade behavior, one per affected context
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        [
            DeviceContext::Desktop,
            DeviceContext::Tablet,
            DeviceContext::Smartphone,
        ]
        .into_iter()
        .filter(|&context| {
            !self.smooth_for(context) && self.direction_for(context) == Direction::Horizontal
        })
        .map(|context| ConfigWarning { context })
        .collect()
    }
}
