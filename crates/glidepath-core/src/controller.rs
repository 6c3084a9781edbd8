//! Scroll position controller
//!
//! Owns the scroll state, the intersection engine and the listener table.
//! The host calls `frame()` from its animation-frame callback; everything else
//! is an explicit method call between frames.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::animation::ScrollAnimator;
use crate::config::{EasingType, ScrollConfig};
use crate::device::DeviceContext;
use crate::dispatch::{
    CallValue, DispatchReport, EventKind, ListenerId, ListenerResult, ListenerTable, Way,
};
use crate::error::Result;
use crate::geometry::{lerp, Size, Vec2};
use crate::host::{ElementHandle, Viewport};
use crate::intersection::IntersectionEngine;
use crate::registry::{ElementConfig, ElementId, TrackedElement};
use crate::state::ScrollState;

/// Distance below which smooth mode snaps onto its target
const SNAP_DISTANCE: f64 = 0.5;

/// How the offset follows its target each frame
///
/// Chosen by the embedding application; the controller never switches modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// The host scrolls natively and reports positions; the offset jumps to them
    Native,
    /// The offset eases toward the target by `config.lerp` per frame
    Smooth,
}

/// Destination of a `scroll_to`
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    Top,
    Bottom,
    Position(f64),
    Element(ElementId),
    /// A tracked element registered under this name
    Anchor(String),
}

impl ScrollTarget {
    /// Parse an href-style target: `top`, `bottom`, `#name`, or a number
    pub fn parse(href: &str) -> Option<Self> {
        let href = href.trim();
        match href {
            "" => None,
            "top" => Some(ScrollTarget::Top),
            "bottom" => Some(ScrollTarget::Bottom),
            _ => {
                if let Some(name) = href.strip_prefix('#') {
                    (!name.is_empty()).then(|| ScrollTarget::Anchor(name.to_string()))
                } else {
                    href.parse::<f64>()
                        .ok()
                        .filter(|p| p.is_finite())
                        .map(ScrollTarget::Position)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrollToOptions {
    /// Added to the resolved position
    pub offset: f64,
    /// Overrides `config.animation.duration_ms`
    pub duration: Option<Duration>,
    /// Overrides `config.animation.easing`
    pub easing: Option<EasingType>,
    /// Jump without animating
    pub immediate: bool,
}

/// A declarative click-to-scroll binding (`data-<name>-to`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollToBinding {
    /// Plain `href`
    pub href: Option<String>,
    /// `data-<name>-href`, preferred over `href`
    pub scroll_href: Option<String>,
    /// `data-<name>-offset`
    pub offset: Option<String>,
}

impl ScrollToBinding {
    /// Build a binding from an element's attributes
    ///
    /// Returns `None` unless the element carries `data-<name>-to`.
    pub fn from_attributes<'a, I>(name: &str, attributes: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let to_attr = format!("data-{name}-to");
        let href_attr = format!("data-{name}-href");
        let offset_attr = format!("data-{name}-offset");

        let mut marked = false;
        let mut binding = ScrollToBinding::default();
        for (key, value) in attributes {
            if key == to_attr {
                marked = true;
            } else if key == href_attr {
                binding.scroll_href = Some(value.to_string());
            } else if key == offset_attr {
                binding.offset = Some(value.to_string());
            } else if key == "href" {
                binding.href = Some(value.to_string());
            }
        }

        marked.then_some(binding)
    }

    pub fn target(&self) -> Option<ScrollTarget> {
        self.scroll_href
            .as_deref()
            .or(self.href.as_deref())
            .and_then(ScrollTarget::parse)
    }

    pub fn options(&self) -> ScrollToOptions {
        ScrollToOptions {
            offset: self
                .offset
                .as_deref()
                .and_then(|o| o.trim().parse::<f64>().ok())
                .filter(|o| o.is_finite())
                .unwrap_or(0.0),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(u64);

/// Scroll position controller
pub struct ScrollController<E, V> {
    config: ScrollConfig,
    context: DeviceContext,
    mode: ScrollMode,
    viewport: V,
    viewport_size: Size,
    state: ScrollState,
    /// Where the offset is heading (native position or smooth target)
    target: Vec2,
    engine: IntersectionEngine<E>,
    listeners: ListenerTable<E>,
    animator: ScrollAnimator,
    bindings: BTreeMap<BindingId, ScrollToBinding>,
    next_binding: u64,
    running: bool,
    /// A resize recomputation is scheduled for the next frame
    resize_tick: bool,
    /// Native resize notifications are accepted
    listening: bool,
    initialized: bool,
}

impl<E, V> fmt::Debug for ScrollController<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollController")
            .field("context", &self.context)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("elements", &self.engine.registry().len())
            .field("listeners", &self.listeners)
            .field("running", &self.running)
            .field("initialized", &self.initialized)
            .finish()
    }
}

fn compute_limit(viewport: Size, document: Size) -> Vec2 {
    Vec2::new(
        (document.width - viewport.width).max(0.0),
        (document.height - viewport.height).max(0.0),
    )
}

impl<E: ElementHandle, V: Viewport> ScrollController<E, V> {
    /// Build a controller for a device context
    ///
    /// Incompatible option combinations are logged as warnings; the controller
    /// is created regardless. The animation loop starts stopped.
    pub fn new(config: ScrollConfig, context: DeviceContext, mode: ScrollMode, viewport: V) -> Self {
        for warning in config.warnings() {
            warn!("{}", warning);
        }

        let direction = config.direction_for(context);
        let viewport_size = viewport.size();
        let limit = compute_limit(viewport_size, viewport.document_size());

        debug!(%context, ?mode, ?direction, "scroll controller created");

        Self {
            config,
            context,
            mode,
            viewport,
            viewport_size,
            state: ScrollState::new(direction, limit),
            target: Vec2::ZERO,
            engine: IntersectionEngine::new(),
            listeners: ListenerTable::new(),
            animator: ScrollAnimator::new(),
            bindings: BTreeMap::new(),
            next_binding: 0,
            running: false,
            resize_tick: false,
            listening: true,
            initialized: false,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn context(&self) -> DeviceContext {
        self.context
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn engine(&self) -> &IntersectionEngine<E> {
        &self.engine
    }

    pub fn listeners(&self) -> &ListenerTable<E> {
        &self.listeners
    }

    pub fn element(&self, id: ElementId) -> Option<&TrackedElement<E>> {
        self.engine.registry().get(id)
    }

    pub fn visible_elements(&self) -> impl Iterator<Item = &TrackedElement<E>> {
        self.engine.visible_elements()
    }

    pub fn has_call_listeners(&self) -> bool {
        self.listeners.has_call_listeners()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    // Activation marker

    /// Mark the library active. Returns true only when the state changed.
    ///
    /// The embedding application applies `config().init_class` to the
    /// document root when this returns true.
    pub fn activate(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        debug!(class = %self.config.init_class, "scroll controller activated");
        true
    }

    /// Clear the active marker. Returns true only when the state changed.
    pub fn deactivate(&mut self) -> bool {
        if !self.initialized {
            return false;
        }
        self.initialized = false;
        debug!(class = %self.config.init_class, "scroll controller deactivated");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // Elements

    /// Start tracking an element; it is tested on the next detection pass
    pub fn register_element(&mut self, element: E, config: ElementConfig) -> ElementId {
        let id = self.engine.registry_mut().insert(
            element,
            config,
            &self.config,
            self.state.offset,
            self.state.axis,
        );
        debug!(element = %id, "element registered");
        id
    }

    /// Stop tracking an element. Unknown ids are a no-op returning false.
    pub fn unregister_element(&mut self, id: ElementId) -> bool {
        self.engine.unregister(id).is_some()
    }

    /// Let a one-shot element fire its enter call again
    pub fn rearm(&mut self, id: ElementId) -> bool {
        self.engine.registry_mut().rearm(id)
    }

    // Listeners

    pub fn on_scroll<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ScrollState) -> ListenerResult + 'static,
    {
        self.listeners.on_scroll(listener)
    }

    /// Subscribe to call events
    ///
    /// Forces a detection pass so elements already in view fire their enter
    /// call right away.
    pub fn on_call<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CallValue, Way, &TrackedElement<E>) -> ListenerResult + 'static,
    {
        let id = self.listeners.on_call(listener);
        self.run_detection(true);
        id
    }

    /// Subscribe to an application-defined event; `scroll` and `call` are rejected
    pub fn on_custom<F>(&mut self, name: impl Into<String>, listener: F) -> Result<ListenerId>
    where
        F: FnMut() -> ListenerResult + 'static,
    {
        self.listeners.on_custom(name, listener)
    }

    pub fn off(&mut self, kind: &EventKind, id: ListenerId) -> bool {
        self.listeners.off(kind, id)
    }

    /// Fire a custom event
    pub fn emit(&mut self, name: &str) -> DispatchReport {
        self.listeners.dispatch_custom(name)
    }

    // Scroll position

    /// Force the scroll offset to `(x, y)`, clamped to the limit
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        let offset = Vec2::new(x, y).clamp_to(self.state.limit);
        self.animator.cancel();
        self.state.offset = offset;
        self.target = offset;
    }

    /// Record a position the host scrolled to natively
    pub fn native_scroll(&mut self, x: f64, y: f64) {
        self.target = Vec2::new(x, y).clamp_to(self.state.limit);
    }

    /// Move the target by a delta, scaled by `config.multiplier`
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        let m = self.config.multiplier;
        self.animator.cancel();
        self.target = Vec2::new(self.target.x + dx * m, self.target.y + dy * m)
            .clamp_to(self.state.limit);
    }

    /// Scroll to a target along the active axis
    ///
    /// Returns false when the target cannot be resolved (unknown element or
    /// anchor); nothing changes in that case.
    pub fn scroll_to(&mut self, target: ScrollTarget, options: ScrollToOptions, now: Instant) -> bool {
        let axis = self.state.axis;
        let position = match &target {
            ScrollTarget::Top => 0.0,
            ScrollTarget::Bottom => self.state.max_position(),
            ScrollTarget::Position(p) => *p,
            ScrollTarget::Element(id) => match self.engine.registry().get(*id) {
                Some(tracked) => tracked.bounds().span(axis).start,
                None => {
                    debug!(element = %id, "scroll_to: unknown element");
                    return false;
                }
            },
            ScrollTarget::Anchor(name) => match self.engine.registry().find_by_name(name) {
                Some(tracked) => tracked.bounds().span(axis).start,
                None => {
                    debug!(anchor = %name, "scroll_to: unknown anchor");
                    return false;
                }
            },
        };
        let position = position + options.offset;
        if !position.is_finite() {
            debug!(?target, offset = options.offset, "scroll_to: non-finite position");
            return false;
        }
        let position = position.clamp(0.0, self.state.max_position());

        let duration = options
            .duration
            .unwrap_or_else(|| self.config.animation.duration());
        let easing = options.easing.unwrap_or(self.config.animation.easing);

        *self.target.along_mut(axis) = position;
        let animating = !options.immediate
            && self
                .animator
                .start(self.state.position(), position, duration, easing, now);
        if !animating {
            self.animator.cancel();
            *self.state.offset.along_mut(axis) = position;
        }

        debug!(?target, position, animating, "scroll_to");
        true
    }

    // Click-to-scroll bindings

    pub fn bind_scroll_to(&mut self, binding: ScrollToBinding) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        self.bindings.insert(id, binding);
        id
    }

    pub fn unbind_scroll_to(&mut self, id: BindingId) -> bool {
        self.bindings.remove(&id).is_some()
    }

    /// Handle a click on a bound element
    pub fn click(&mut self, id: BindingId, now: Instant) -> bool {
        let Some(binding) = self.bindings.get(&id) else {
            return false;
        };
        let Some(target) = binding.target() else {
            return false;
        };
        let options = binding.options();
        self.scroll_to(target, options, now)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    // Frame loop

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.animator.cancel();
    }

    /// Native resize notification
    ///
    /// Requests within one frame collapse into a single recomputation on the
    /// next `frame()`.
    pub fn request_resize(&mut self) {
        if !self.listening || self.resize_tick {
            return;
        }
        self.resize_tick = true;
        debug!("resize scheduled");
    }

    /// Re-read the viewport, then re-measure everything
    pub fn resize(&mut self) {
        self.viewport_size = self.viewport.size();
        self.state.limit = compute_limit(self.viewport_size, self.viewport.document_size());
        self.state.offset = self.state.offset.clamp_to(self.state.limit);
        self.target = self.target.clamp_to(self.state.limit);
        self.update();
    }

    /// Re-measure element bounds and run detection
    pub fn update(&mut self) {
        self.engine
            .registry_mut()
            .refresh_bounds(self.state.offset, self.state.axis);
        self.run_detection(false);
    }

    /// One animation frame: offset update, detection, then dispatch
    pub fn frame(&mut self, now: Instant) {
        if self.resize_tick {
            self.resize();
            self.resize_tick = false;
        }

        if !self.running {
            return;
        }

        let previous = self.state.position();
        self.advance(now);
        self.track_motion(previous);

        self.run_detection(false);
        self.listeners.dispatch_scroll(&self.state);
    }

    fn advance(&mut self, now: Instant) {
        if let Some(position) = self.animator.update(now) {
            *self.state.offset.along_mut(self.state.axis) = position;
            return;
        }

        match self.mode {
            ScrollMode::Native => self.state.offset = self.target,
            ScrollMode::Smooth => {
                let factor = self.config.lerp.clamp(0.0, 1.0);
                self.state.offset = Vec2::new(
                    approach(self.state.offset.x, self.target.x, factor),
                    approach(self.state.offset.y, self.target.y, factor),
                );
            }
        }
    }

    fn track_motion(&mut self, previous: f64) {
        if self.config.get_speed {
            self.state.speed = Some(self.state.position() - previous);
        }
        if self.config.get_direction {
            if let Some(heading) = self.state.heading_from(previous) {
                self.state.heading = Some(heading);
            }
        }
    }

    fn run_detection(&mut self, force: bool) {
        let calls_enabled = self.listeners.has_call_listeners();
        let events =
            self.engine
                .detect_elements(&self.state, self.viewport_size, calls_enabled, force);

        for event in &events {
            if let Some(tracked) = self.engine.registry().get(event.element) {
                self.listeners.dispatch_call(&event.value, event.way, tracked);
            }
        }
        self.engine.consume_one_shot(&events);
    }

    /// Tear down: stop the loop, drop listeners, bindings and elements
    pub fn destroy(&mut self) {
        self.running = false;
        self.listening = false;
        self.resize_tick = false;
        self.animator.cancel();
        self.listeners.clear();
        self.bindings.clear();
        self.engine.clear();
        self.deactivate();
        info!("scroll controller destroyed");
    }
}

fn approach(current: f64, target: f64, factor: f64) -> f64 {
    let next = lerp(current, target, factor);
    if (target - next).abs() < SNAP_DISTANCE {
        target
    } else {
        next
    }
}
