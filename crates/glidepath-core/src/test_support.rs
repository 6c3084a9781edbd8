//! In-memory host handles shared by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::geometry::{Bounds, Size};
use crate::host::{ElementHandle, Viewport};

#[derive(Debug, Default)]
struct ElementState {
    rect: Bounds,
    transform: Option<String>,
    classes: BTreeSet<String>,
    rect_calls: Cell<usize>,
}

/// Element whose clones share state, so tests can inspect what the engine did
#[derive(Debug, Clone, Default)]
pub struct FakeElement(Rc<RefCell<ElementState>>);

impl FakeElement {
    /// A 100px wide element spanning `top..bottom`
    pub fn at(top: f64, bottom: f64) -> Self {
        Self::with_bounds(Bounds::new(top, bottom, 0.0, 100.0))
    }

    pub fn with_bounds(rect: Bounds) -> Self {
        let element = Self::default();
        element.0.borrow_mut().rect = rect;
        element
    }

    pub fn set_transform(&self, transform: &str) {
        self.0.borrow_mut().transform = Some(transform.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.contains(class)
    }

    pub fn rect_calls(&self) -> usize {
        self.0.borrow().rect_calls.get()
    }
}

impl ElementHandle for FakeElement {
    fn rect(&self) -> Bounds {
        let state = self.0.borrow();
        state.rect_calls.set(state.rect_calls.get() + 1);
        state.rect
    }

    fn transform(&self) -> Option<String> {
        self.0.borrow().transform.clone()
    }

    fn add_class(&self, class: &str) {
        self.0.borrow_mut().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.remove(class);
    }
}

#[derive(Debug, Clone)]
pub struct FakeViewport(Rc<RefCell<(Size, Size)>>);

impl FakeViewport {
    pub fn new(size: Size, document: Size) -> Self {
        Self(Rc::new(RefCell::new((size, document))))
    }

    pub fn set_size(&self, size: Size) {
        self.0.borrow_mut().0 = size;
    }
}

impl Viewport for FakeViewport {
    fn size(&self) -> Size {
        self.0.borrow().0
    }

    fn document_size(&self) -> Size {
        self.0.borrow().1
    }
}
