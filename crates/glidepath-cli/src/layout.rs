//! Page layouts for the simulator
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[element]]
//! name = "hero"
//! top = 0
//! bottom = 700
//! call = "hero, fade"
//! repeat = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use glidepath_core::{Bounds, ElementConfig, Size};

#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    pub viewport: Size,
    /// Scrollable extent; defaults to the furthest element edge
    #[serde(default)]
    pub document: Option<Size>,
    #[serde(default, rename = "element")]
    pub elements: Vec<LayoutElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutElement {
    #[serde(default)]
    pub name: Option<String>,
    pub top: f64,
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    /// Defaults to the viewport width
    #[serde(default)]
    pub right: Option<f64>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub call: Option<String>,
    #[serde(default)]
    pub repeat: Option<bool>,
    #[serde(default)]
    pub offset: Option<[f64; 2]>,
}

impl Layout {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid layout {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let layout: Layout = toml::from_str(content)?;
        for element in &layout.elements {
            if element.bottom < element.top {
                anyhow::bail!(
                    "element {} has bottom ({}) above top ({})",
                    element.name.as_deref().unwrap_or("(unnamed)"),
                    element.bottom,
                    element.top
                );
            }
        }
        Ok(layout)
    }

    pub fn document_size(&self) -> Size {
        self.document.unwrap_or_else(|| {
            let width = self.viewport.width;
            let mut size = Size::new(width, self.viewport.height);
            for element in &self.elements {
                size.width = size.width.max(element.bounds(width).right);
                size.height = size.height.max(element.bottom);
            }
            size
        })
    }
}

impl LayoutElement {
    /// Document-space bounds
    pub fn bounds(&self, viewport_width: f64) -> Bounds {
        Bounds::new(
            self.top,
            self.bottom,
            self.left,
            self.right.unwrap_or(viewport_width),
        )
    }

    pub fn element_config(&self) -> ElementConfig {
        ElementConfig {
            name: self.name.clone(),
            class: self.class.clone(),
            call: self.call.clone(),
            repeat: self.repeat,
            offset: self.offset,
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}
