//! L3 Molecular Layer: Viewport intersection engine
//!
//! Compares the scroll offset against every tracked element once per frame,
//! flips `in_view`, toggles classes and collects the call events the
//! controller has to dispatch. The engine never invokes callbacks itself.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dispatch::{CallValue, Way};
use crate::geometry::{Size, Span};
use crate::host::ElementHandle;
use crate::registry::{ElementId, ElementRegistry, TrackedElement};
use crate::state::ScrollState;

/// A pending "call" dispatch produced by a transition
#[derive(Debug, Clone, PartialEq)]
pub struct CallEvent {
    pub element: ElementId,
    pub way: Way,
    pub value: CallValue,
    /// Enter of a non-repeating element; its token goes once this is dispatched
    pub one_shot: bool,
}

/// Element registry plus the set of ids currently in view
///
/// `visible` holds exactly the ids whose record has `in_view == true`.
#[derive(Debug)]
pub struct IntersectionEngine<E> {
    registry: ElementRegistry<E>,
    visible: BTreeSet<ElementId>,
}

impl<E> Default for IntersectionEngine<E> {
    fn default() -> Self {
        Self {
            registry: ElementRegistry::default(),
            visible: BTreeSet::new(),
        }
    }
}

impl<E> IntersectionEngine<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ElementRegistry<E> {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ElementRegistry<E> {
        &mut self.registry
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.visible.contains(&id)
    }

    /// Records currently in view, in registration order
    pub fn visible_elements(&self) -> impl Iterator<Item = &TrackedElement<E>> {
        self.visible.iter().filter_map(|id| self.registry.get(*id))
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Stop tracking an element. Unknown ids are ignored.
    pub fn unregister(&mut self, id: ElementId) -> Option<TrackedElement<E>> {
        self.visible.remove(&id);
        self.registry.remove(id)
    }

    pub fn clear(&mut self) {
        self.visible.clear();
        self.registry.clear();
    }

    /// Drop the call token of every one-shot element in `events`
    ///
    /// Run after the events were dispatched, so listeners still see the token.
    pub fn consume_one_shot(&mut self, events: &[CallEvent]) {
        for event in events.iter().filter(|e| e.one_shot) {
            if let Some(tracked) = self.registry.get_mut(event.element) {
                tracked.call = None;
            }
        }
    }
}

impl<E: ElementHandle> IntersectionEngine<E> {
    /// Run one detection pass
    ///
    /// With `force`, elements already in view go through the enter transition
    /// again so a newly subscribed call listener sees them. Call events are
    /// only produced when `calls_enabled` is set.
    pub fn detect_elements(
        &mut self,
        scroll: &ScrollState,
        viewport: Size,
        calls_enabled: bool,
        force: bool,
    ) -> Vec<CallEvent> {
        let axis = scroll.axis;
        let offset = scroll.position();
        let viewport_size = viewport.along(axis);
        let visible = Span::visible(offset, viewport_size);

        let mut events = Vec::new();

        for tracked in self.registry.iter_mut() {
            let span = tracked.bounds.span(axis);

            if (!tracked.in_view || force) && visible.end >= span.start && visible.start < span.end
            {
                set_in_view(tracked, &mut self.visible, calls_enabled, &mut events);
            }

            if tracked.in_view {
                let travel = span.len() + viewport_size;
                tracked.progress = if travel == 0.0 {
                    0.0
                } else {
                    (offset - (span.start - viewport_size)) / travel
                };

                if visible.end < span.start || visible.start > span.end {
                    set_out_of_view(tracked, &mut self.visible, calls_enabled, &mut events);
                }
            }
        }

        events
    }
}

fn set_in_view<E: ElementHandle>(
    tracked: &mut TrackedElement<E>,
    visible: &mut BTreeSet<ElementId>,
    calls_enabled: bool,
    events: &mut Vec<CallEvent>,
) {
    tracked.in_view = true;
    visible.insert(tracked.id);
    tracked.element.add_class(&tracked.class);
    debug!(element = %tracked.id, "element entered view");

    if !calls_enabled {
        return;
    }
    if let Some(token) = tracked.call.as_deref() {
        events.push(CallEvent {
            element: tracked.id,
            way: Way::Enter,
            value: CallValue::parse(token),
            one_shot: !tracked.repeat,
        });
    }
}

fn set_out_of_view<E: ElementHandle>(
    tracked: &mut TrackedElement<E>,
    visible: &mut BTreeSet<ElementId>,
    calls_enabled: bool,
    events: &mut Vec<CallEvent>,
) {
    tracked.in_view = false;
    visible.remove(&tracked.id);
    debug!(element = %tracked.id, "element left view");

    if calls_enabled {
        if let Some(token) = tracked.call.as_deref() {
            events.push(CallEvent {
                element: tracked.id,
                way: Way::Exit,
                value: CallValue::parse(token),
                one_shot: false,
            });
        }
    }

    if tracked.repeat {
        tracked.element.remove_class(&tracked.class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrollConfig;
    use crate::geometry::{Bounds, Direction, Vec2};
    use crate::registry::ElementConfig;
    use crate::test_support::FakeElement;

    fn vertical(offset: f64) -> ScrollState {
        let mut state = ScrollState::new(Direction::Vertical, Vec2::new(0.0, 10_000.0));
        state.offset.y = offset;
        state
    }

    fn register(
        engine: &mut IntersectionEngine<FakeElement>,
        element: FakeElement,
        config: ElementConfig,
    ) -> ElementId {
        engine.registry_mut().insert(
            element,
            config,
            &ScrollConfig::default(),
            Vec2::ZERO,
            crate::geometry::Axis::Y,
        )
    }

    fn assert_visible_set_in_sync(engine: &IntersectionEngine<FakeElement>) {
        for tracked in engine.registry().iter() {
            assert_eq!(tracked.in_view(), engine.is_visible(tracked.id()));
        }
    }

    #[test]
    fn test_element_inside_first_screen_enters_immediately() {
        let mut engine = IntersectionEngine::new();
        let element = FakeElement::at(500.0, 600.0);
        let id = register(&mut engine, element.clone(), ElementConfig::new());

        engine.detect_elements(&vertical(0.0), Size::new(1200.0, 800.0), false, false);

        assert!(engine.is_visible(id));
        assert!(element.has_class("is-inview"));
        assert_visible_set_in_sync(&engine);
    }

    #[test]
    fn test_boundary_is_in_view() {
        let mut engine = IntersectionEngine::new();
        let id = register(&mut engine, FakeElement::at(800.0, 900.0), ElementConfig::new());

        engine.detect_elements(&vertical(0.0), Size::new(1200.0, 800.0), false, false);
        assert!(engine.is_visible(id));
    }

    #[test]
    fn test_progress() {
        let mut engine = IntersectionEngine::new();
        let id = register(&mut engine, FakeElement::at(100.0, 300.0), ElementConfig::new());
        let viewport = Size::new(1200.0, 200.0);

        engine.detect_elements(&vertical(100.0), viewport, false, false);
        let progress = engine.registry().get(id).unwrap().progress();
        assert!((progress - 0.5).abs() < 1e-9);

        engine.detect_elements(&vertical(0.0), viewport, false, false);
        let progress = engine.registry().get(id).unwrap().progress();
        assert!((progress - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_progress_is_not_clamped() {
        let mut engine = IntersectionEngine::new();
        let id = register(&mut engine, FakeElement::at(100.0, 300.0), ElementConfig::new());

        let viewport = Size::new(1200.0, 200.0);
        engine.detect_elements(&vertical(100.0), viewport, false, false);

        // Element bottom sits exactly at the viewport top: still in view, at 1.0
        engine.detect_elements(&vertical(300.0), viewport, false, false);
        let tracked = engine.registry().get(id).unwrap();
        assert!(tracked.in_view());
        assert!(tracked.progress() >= 1.0);
    }

    #[test]
    fn test_exit_and_class_removal_depends_on_repeat() {
        let mut engine = IntersectionEngine::new();
        let once = FakeElement::at(0.0, 100.0);
        let repeating = FakeElement::at(0.0, 100.0);
        let a = register(&mut engine, once.clone(), ElementConfig::new());
        let b = register(&mut engine, repeating.clone(), ElementConfig::new().with_repeat(true));
        let viewport = Size::new(1200.0, 500.0);

        engine.detect_elements(&vertical(0.0), viewport, false, false);
        assert!(engine.is_visible(a) && engine.is_visible(b));

        engine.detect_elements(&vertical(1000.0), viewport, false, false);
        assert!(!engine.is_visible(a) && !engine.is_visible(b));
        assert!(once.has_class("is-inview"));
        assert!(!repeating.has_class("is-inview"));
        assert_visible_set_in_sync(&engine);
    }

    #[test]
    fn test_detection_is_idempotent() {
        let mut engine = IntersectionEngine::new();
        register(
            &mut engine,
            FakeElement::at(100.0, 200.0),
            ElementConfig::new().with_call("a").with_repeat(true),
        );
        let viewport = Size::new(1200.0, 800.0);

        let first = engine.detect_elements(&vertical(0.0), viewport, true, false);
        let second = engine.detect_elements(&vertical(0.0), viewport, true, false);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(engine.visible_count(), 1);
    }

    #[test]
    fn test_one_shot_call_fires_once() {
        let mut engine = IntersectionEngine::new();
        let id = register(
            &mut engine,
            FakeElement::at(1000.0, 1100.0),
            ElementConfig::new().with_call("counter, 3"),
        );
        let viewport = Size::new(1200.0, 500.0);

        let mut enters = 0;
        for _ in 0..5 {
            let events = engine.detect_elements(&vertical(800.0), viewport, true, false);
            if enters == 0 {
                assert_eq!(engine.registry().get(id).unwrap().call(), Some("counter, 3"));
            }
            engine.consume_one_shot(&events);
            for event in events {
                if event.way == Way::Enter {
                    assert!(event.one_shot);
                    enters += 1;
                    assert_eq!(event.element, id);
                    assert_eq!(
                        event.value,
                        CallValue::Multiple(vec!["counter".into(), "3".into()])
                    );
                }
            }
            let events = engine.detect_elements(&vertical(0.0), viewport, true, false);
            engine.consume_one_shot(&events);
        }

        assert_eq!(enters, 1);
        assert_eq!(engine.registry().get(id).unwrap().call(), None);
    }

    #[test]
    fn test_repeating_call_fires_enter_and_exit() {
        let mut engine = IntersectionEngine::new();
        register(
            &mut engine,
            FakeElement::at(1000.0, 1100.0),
            ElementConfig::new().with_call("pulse").with_repeat(true),
        );
        let viewport = Size::new(1200.0, 500.0);

        let enter = engine.detect_elements(&vertical(800.0), viewport, true, false);
        let exit = engine.detect_elements(&vertical(0.0), viewport, true, false);

        assert_eq!(enter.len(), 1);
        assert_eq!(enter[0].way, Way::Enter);
        assert_eq!(enter[0].value, CallValue::Single("pulse".into()));
        assert_eq!(exit.len(), 1);
        assert_eq!(exit[0].way, Way::Exit);
    }

    #[test]
    fn test_no_call_events_when_disabled() {
        let mut engine = IntersectionEngine::new();
        let element = FakeElement::at(0.0, 100.0);
        register(&mut engine, element.clone(), ElementConfig::new().with_call("x"));

        let events = engine.detect_elements(&vertical(0.0), Size::new(1200.0, 500.0), false, false);

        assert!(events.is_empty());
        assert!(element.has_class("is-inview"));
    }

    #[test]
    fn test_force_replays_enter_for_visible_elements() {
        let mut engine = IntersectionEngine::new();
        register(
            &mut engine,
            FakeElement::at(0.0, 100.0),
            ElementConfig::new().with_call("x").with_repeat(true),
        );
        let viewport = Size::new(1200.0, 500.0);

        assert!(engine.detect_elements(&vertical(0.0), viewport, false, false).is_empty());
        let replay = engine.detect_elements(&vertical(0.0), viewport, true, true);
        assert_eq!(replay.len(), 1);
        assert_eq!(replay[0].way, Way::Enter);
    }

    #[test]
    fn test_horizontal_axis_uses_left_right() {
        let mut engine = IntersectionEngine::new();
        let element = FakeElement::with_bounds(Bounds::new(0.0, 100.0, 2000.0, 2300.0));
        let id = engine.registry_mut().insert(
            element,
            ElementConfig::new(),
            &ScrollConfig::default(),
            Vec2::ZERO,
            crate::geometry::Axis::X,
        );
        let mut state = ScrollState::new(Direction::Horizontal, Vec2::new(10_000.0, 0.0));
        let viewport = Size::new(1000.0, 800.0);

        engine.detect_elements(&state, viewport, false, false);
        assert!(!engine.is_visible(id));

        state.offset.x = 1000.0;
        engine.detect_elements(&state, viewport, false, false);
        assert!(engine.is_visible(id));
        let progress = engine.registry().get(id).unwrap().progress();
        assert!((progress - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_unregister_keeps_sets_in_sync() {
        let mut engine = IntersectionEngine::new();
        let id = register(&mut engine, FakeElement::at(0.0, 100.0), ElementConfig::new());
        engine.detect_elements(&vertical(0.0), Size::new(1200.0, 500.0), false, false);

        assert!(engine.unregister(id).is_some());
        assert!(!engine.is_visible(id));
        assert_eq!(engine.visible_count(), 0);
        assert!(engine.unregister(id).is_none());
    }
}
