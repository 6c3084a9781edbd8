//! Host handles backed by a static layout

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use glidepath_core::{Bounds, ElementHandle, Size, Vec2, Viewport};

/// Page scroll position shared between the simulator and its elements
pub type PageScroll = Rc<Cell<Vec2>>;

/// A laid-out element; `rect()` is relative to the current page scroll
#[derive(Debug, Clone)]
pub struct SimElement {
    label: String,
    bounds: Bounds,
    scroll: PageScroll,
    classes: Rc<RefCell<BTreeSet<String>>>,
}

impl SimElement {
    pub fn new(label: impl Into<String>, bounds: Bounds, scroll: PageScroll) -> Self {
        Self {
            label: label.into(),
            bounds,
            scroll,
            classes: Rc::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().iter().cloned().collect()
    }
}

impl ElementHandle for SimElement {
    fn rect(&self) -> Bounds {
        let scroll = self.scroll.get();
        self.bounds.translate(Vec2::new(-scroll.x, -scroll.y))
    }

    fn add_class(&self, class: &str) {
        if self.classes.borrow_mut().insert(class.to_string()) {
            tracing::debug!("{}: +{}", self.label, class);
        }
    }

    fn remove_class(&self, class: &str) {
        if self.classes.borrow_mut().remove(class) {
            tracing::debug!("{}: -{}", self.label, class);
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimViewport {
    size: Size,
    document: Size,
}

impl SimViewport {
    pub fn new(size: Size, document: Size) -> Self {
        Self { size, document }
    }
}

impl Viewport for SimViewport {
    fn size(&self) -> Size {
        self.size
    }

    fn document_size(&self) -> Size {
        self.document
    }
}
