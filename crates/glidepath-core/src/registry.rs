//! Tracked element records, keyed by a stable id
//!
//! Records are only mutated by the engine; callers get shared references.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ScrollConfig;
use crate::geometry::{Axis, Bounds, Vec2};
use crate::host::ElementHandle;
use crate::transform::parse_translate;

/// Stable identifier of a tracked element
///
/// Ids are assigned in registration order and never reused, so iterating the
/// registry visits elements in the order they were registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Per-element options, unset fields fall back to the engine config
#[derive(Debug, Clone, Default)]
pub struct ElementConfig {
    /// Anchor name for `scroll_to("#name")`
    pub name: Option<String>,
    /// Class toggled on enter/exit
    pub class: Option<String>,
    /// Comma-separated call token
    pub call: Option<String>,
    pub repeat: Option<bool>,
    /// `[start, end]` insets along the active axis
    pub offset: Option<[f64; 2]>,
}

impl ElementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_call(mut self, call: impl Into<String>) -> Self {
        self.call = Some(call.into());
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn with_offset(mut self, start: f64, end: f64) -> Self {
        self.offset = Some([start, end]);
        self
    }
}

/// An element registered for viewport tracking
#[derive(Debug)]
pub struct TrackedElement<E> {
    pub(crate) id: ElementId,
    pub(crate) element: E,
    pub(crate) name: Option<String>,
    pub(crate) bounds: Bounds,
    pub(crate) in_view: bool,
    pub(crate) progress: f64,
    /// Live call token; cleared once a one-shot enter has been dispatched
    pub(crate) call: Option<String>,
    /// Token as registered, for `rearm`
    pub(crate) registered_call: Option<String>,
    pub(crate) repeat: bool,
    pub(crate) class: String,
    pub(crate) offset: [f64; 2],
}

impl<E> TrackedElement<E> {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Bounds in document coordinates
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn in_view(&self) -> bool {
        self.in_view
    }

    /// Traversal progress; negative before entering, above 1 after leaving
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn call(&self) -> Option<&str> {
        self.call.as_deref()
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

/// Document-space bounds of an element
///
/// The rect is viewport-relative, so the current scroll offset is added back;
/// any translate applied by a running transform is removed so bounds describe
/// the element's resting position.
pub(crate) fn measure<E: ElementHandle>(
    element: &E,
    scroll: Vec2,
    axis: Axis,
    offset: [f64; 2],
) -> Bounds {
    let translate = element
        .transform()
        .map(|t| parse_translate(&t))
        .unwrap_or(Vec2::ZERO);

    element
        .rect()
        .translate(Vec2::new(scroll.x - translate.x, scroll.y - translate.y))
        .inset(axis, offset)
}

/// Element id to record mapping
#[derive(Debug)]
pub struct ElementRegistry<E> {
    elements: BTreeMap<ElementId, TrackedElement<E>>,
    next_id: u64,
}

impl<E> Default for ElementRegistry<E> {
    fn default() -> Self {
        Self {
            elements: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<E: ElementHandle> ElementRegistry<E> {
    /// Register an element, measuring it against the current scroll offset
    pub fn insert(
        &mut self,
        element: E,
        config: ElementConfig,
        defaults: &ScrollConfig,
        scroll: Vec2,
        axis: Axis,
    ) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;

        let offset = config.offset.unwrap_or(defaults.offset);
        let bounds = measure(&element, scroll, axis, offset);
        let call = config.call.filter(|c| !c.trim().is_empty());

        self.elements.insert(
            id,
            TrackedElement {
                id,
                element,
                name: config.name,
                bounds,
                in_view: false,
                progress: 0.0,
                registered_call: call.clone(),
                call,
                repeat: config.repeat.unwrap_or(defaults.repeat),
                class: config.class.unwrap_or_else(|| defaults.class.clone()),
                offset,
            },
        );

        id
    }

    /// Re-measure every element
    pub fn refresh_bounds(&mut self, scroll: Vec2, axis: Axis) {
        for tracked in self.elements.values_mut() {
            tracked.bounds = measure(&tracked.element, scroll, axis, tracked.offset);
        }
    }
}

impl<E> ElementRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, id: ElementId) -> Option<TrackedElement<E>> {
        self.elements.remove(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&TrackedElement<E>> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut TrackedElement<E>> {
        self.elements.get_mut(&id)
    }

    /// First element registered under an anchor name
    pub fn find_by_name(&self, name: &str) -> Option<&TrackedElement<E>> {
        self.elements.values().find(|t| t.name.as_deref() == Some(name))
    }

    /// Records in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedElement<E>> {
        self.elements.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedElement<E>> {
        self.elements.values_mut()
    }

    /// Restore a one-shot element's call token. Returns false for unknown ids.
    pub fn rearm(&mut self, id: ElementId) -> bool {
        match self.elements.get_mut(&id) {
            Some(tracked) => {
                tracked.call = tracked.registered_call.clone();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeElement;

    #[test]
    fn test_insert_applies_defaults() {
        let mut registry = ElementRegistry::new();
        let defaults = ScrollConfig {
            repeat: true,
            ..Default::default()
        };

        let id = registry.insert(
            FakeElement::at(100.0, 200.0),
            ElementConfig::new().with_call("reveal"),
            &defaults,
            Vec2::ZERO,
            Axis::Y,
        );

        let tracked = registry.get(id).unwrap();
        assert_eq!(tracked.class(), "is-inview");
        assert!(tracked.repeat());
        assert_eq!(tracked.call(), Some("reveal"));
        assert!(!tracked.in_view());
        assert_eq!(tracked.bounds().top, 100.0);
    }

    #[test]
    fn test_blank_call_token_is_dropped() {
        let mut registry = ElementRegistry::new();
        let id = registry.insert(
            FakeElement::at(0.0, 10.0),
            ElementConfig::new().with_call("  "),
            &ScrollConfig::default(),
            Vec2::ZERO,
            Axis::Y,
        );
        assert_eq!(registry.get(id).unwrap().call(), None);
    }

    #[test]
    fn test_ids_follow_registration_order() {
        let mut registry = ElementRegistry::new();
        let config = ScrollConfig::default();
        let a = registry.insert(FakeElement::at(0.0, 1.0), ElementConfig::new(), &config, Vec2::ZERO, Axis::Y);
        let b = registry.insert(FakeElement::at(0.0, 1.0), ElementConfig::new(), &config, Vec2::ZERO, Axis::Y);
        registry.remove(a);
        let c = registry.insert(FakeElement::at(0.0, 1.0), ElementConfig::new(), &config, Vec2::ZERO, Axis::Y);

        let order: Vec<ElementId> = registry.iter().map(|t| t.id()).collect();
        assert_eq!(order, vec![b, c]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_measure_adds_scroll_and_removes_translate() {
        let element = FakeElement::at(50.0, 150.0);
        element.set_transform("matrix(1, 0, 0, 1, 0, -30)");

        let bounds = measure(&element, Vec2::new(0.0, 400.0), Axis::Y, [10.0, 5.0]);
        assert_eq!(bounds.top, 50.0 + 400.0 + 30.0 + 10.0);
        assert_eq!(bounds.bottom, 150.0 + 400.0 + 30.0 - 5.0);
    }

    #[test]
    fn test_find_by_name_and_rearm() {
        let mut registry = ElementRegistry::new();
        let id = registry.insert(
            FakeElement::at(0.0, 10.0),
            ElementConfig::new().with_name("intro").with_call("fade"),
            &ScrollConfig::default(),
            Vec2::ZERO,
            Axis::Y,
        );

        assert_eq!(registry.find_by_name("intro").map(|t| t.id()), Some(id));
        assert!(registry.find_by_name("outro").is_none());

        registry.get_mut(id).unwrap().call = None;
        assert!(registry.rearm(id));
        assert_eq!(registry.get(id).unwrap().call(), Some("fade"));

        registry.remove(id);
        assert!(!registry.rearm(id));
    }
}
