//! Event dispatch hub
//!
//! A typed listener table: one channel per event kind, each an ordered list of
//! listeners. A channel exists only while it has listeners, so "attached" and
//! "non-empty" are the same thing.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::registry::TrackedElement;
use crate::state::ScrollState;

/// Outcome of a single listener invocation
pub type ListenerResult = anyhow::Result<()>;

type ScrollListener = Box<dyn FnMut(&ScrollState) -> ListenerResult>;
type CallListener<E> = Box<dyn FnMut(&CallValue, Way, &TrackedElement<E>) -> ListenerResult>;
type CustomListener = Box<dyn FnMut() -> ListenerResult>;

/// Event kinds listeners can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Fired once per frame with the scroll state
    Scroll,
    /// Fired when an element carrying a call token enters or exits
    Call,
    /// Application-defined event, fired through `emit`
    Custom(String),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Scroll => f.write_str("scroll"),
            EventKind::Call => f.write_str("call"),
            EventKind::Custom(name) => f.write_str(name),
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "scroll" => EventKind::Scroll,
            "call" => EventKind::Call,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Transition direction carried by a call event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Way {
    Enter,
    Exit,
}

impl fmt::Display for Way {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Way::Enter => f.write_str("enter"),
            Way::Exit => f.write_str("exit"),
        }
    }
}

/// Parsed call token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CallValue {
    Single(String),
    Multiple(Vec<String>),
}

impl CallValue {
    /// Split a comma-separated token, trimming each part
    pub fn parse(token: &str) -> Self {
        let mut parts: Vec<String> = token.split(',').map(|p| p.trim().to_string()).collect();
        if parts.len() == 1 {
            CallValue::Single(parts.remove(0))
        } else {
            CallValue::Multiple(parts)
        }
    }
}

impl fmt::Display for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallValue::Single(value) => f.write_str(value),
            CallValue::Multiple(values) => f.write_str(&values.join(",")),
        }
    }
}

/// What happened during one dispatch
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Listeners invoked, failed ones included
    pub invoked: usize,
    pub errors: Vec<Error>,
}

impl DispatchReport {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Channel<L> {
    listeners: Vec<(ListenerId, L)>,
}

impl<L> Default for Channel<L> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<L> Channel<L> {
    fn remove(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Listener table with one channel per event kind
pub struct ListenerTable<E> {
    scroll: Option<Channel<ScrollListener>>,
    call: Option<Channel<CallListener<E>>>,
    custom: HashMap<String, Channel<CustomListener>>,
    next_id: u64,
}

impl<E> Default for ListenerTable<E> {
    fn default() -> Self {
        Self {
            scroll: None,
            call: None,
            custom: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<E> fmt::Debug for ListenerTable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerTable")
            .field("scroll", &self.listener_count(&EventKind::Scroll))
            .field("call", &self.listener_count(&EventKind::Call))
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<E> ListenerTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn on_scroll<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ScrollState) -> ListenerResult + 'static,
    {
        let id = self.next_id();
        attach(&mut self.scroll, &EventKind::Scroll)
            .listeners
            .push((id, Box::new(listener)));
        id
    }

    pub fn on_call<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CallValue, Way, &TrackedElement<E>) -> ListenerResult + 'static,
    {
        let id = self.next_id();
        attach(&mut self.call, &EventKind::Call)
            .listeners
            .push((id, Box::new(listener)));
        id
    }

    /// Subscribe to an application-defined event
    ///
    /// `scroll` and `call` name the built-in channels and are rejected.
    pub fn on_custom<F>(&mut self, name: impl Into<String>, listener: F) -> Result<ListenerId>
    where
        F: FnMut() -> ListenerResult + 'static,
    {
        let name = name.into();
        if !matches!(EventKind::from(name.as_str()), EventKind::Custom(_)) {
            return Err(Error::ReservedEvent(name));
        }

        let id = self.next_id();
        let channel = self.custom.entry(name.clone()).or_insert_with(|| {
            debug!(event = %name, "attached event channel");
            Channel::default()
        });
        channel.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    /// Remove a listener, detaching the channel once it is empty
    ///
    /// Returns false when the listener is not subscribed to `kind`.
    pub fn off(&mut self, kind: &EventKind, id: ListenerId) -> bool {
        match kind {
            EventKind::Scroll => detach(&mut self.scroll, kind, id),
            EventKind::Call => detach(&mut self.call, kind, id),
            EventKind::Custom(name) => {
                let Some(channel) = self.custom.get_mut(name) else {
                    return false;
                };
                let removed = channel.remove(id);
                if removed && channel.listeners.is_empty() {
                    self.custom.remove(name);
                    debug!(event = %kind, "detached event channel");
                }
                removed
            }
        }
    }

    /// Whether any listener is subscribed to call events
    pub fn has_call_listeners(&self) -> bool {
        self.call.is_some()
    }

    pub fn is_attached(&self, kind: &EventKind) -> bool {
        match kind {
            EventKind::Scroll => self.scroll.is_some(),
            EventKind::Call => self.call.is_some(),
            EventKind::Custom(name) => self.custom.contains_key(name),
        }
    }

    pub fn listener_count(&self, kind: &EventKind) -> usize {
        match kind {
            EventKind::Scroll => self.scroll.as_ref().map_or(0, |c| c.listeners.len()),
            EventKind::Call => self.call.as_ref().map_or(0, |c| c.listeners.len()),
            EventKind::Custom(name) => self.custom.get(name).map_or(0, |c| c.listeners.len()),
        }
    }

    /// Detach every channel
    pub fn clear(&mut self) {
        self.scroll = None;
        self.call = None;
        self.custom.clear();
    }

    pub fn dispatch_scroll(&mut self, state: &ScrollState) -> DispatchReport {
        let mut report = DispatchReport::default();
        if let Some(channel) = self.scroll.as_mut() {
            for (id, listener) in channel.listeners.iter_mut() {
                invoke(&EventKind::Scroll, *id, &mut report, || listener(state));
            }
        }
        report
    }

    pub fn dispatch_call(
        &mut self,
        value: &CallValue,
        way: Way,
        element: &TrackedElement<E>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        if let Some(channel) = self.call.as_mut() {
            for (id, listener) in channel.listeners.iter_mut() {
                invoke(&EventKind::Call, *id, &mut report, || listener(value, way, element));
            }
        }
        report
    }

    /// Fire a custom event. Names nobody listens to are a no-op.
    pub fn dispatch_custom(&mut self, name: &str) -> DispatchReport {
        let mut report = DispatchReport::default();
        if let Some(channel) = self.custom.get_mut(name) {
            let kind = EventKind::Custom(name.to_string());
            for (id, listener) in channel.listeners.iter_mut() {
                invoke(&kind, *id, &mut report, || listener());
            }
        }
        report
    }
}

fn attach<'a, L>(slot: &'a mut Option<Channel<L>>, kind: &EventKind) -> &'a mut Channel<L> {
    slot.get_or_insert_with(|| {
        debug!(event = %kind, "attached event channel");
        Channel::default()
    })
}

fn detach<L>(slot: &mut Option<Channel<L>>, kind: &EventKind, id: ListenerId) -> bool {
    let Some(channel) = slot.as_mut() else {
        return false;
    };
    let removed = channel.remove(id);
    if removed && channel.listeners.is_empty() {
        *slot = None;
        debug!(event = %kind, "detached event channel");
    }
    removed
}

/// Run one listener, containing both returned errors and panics
fn invoke<F>(kind: &EventKind, id: ListenerId, report: &mut DispatchReport, call: F)
where
    F: FnOnce() -> ListenerResult,
{
    report.invoked += 1;

    let error = match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => return,
        Ok(Err(e)) => Error::Listener(format!("{e:#}")),
        Err(payload) => Error::Listener(format!("panicked: {}", panic_message(payload.as_ref()))),
    };

    warn!(event = %kind, listener = %id, error = %error, "listener failed, continuing dispatch");
    report.errors.push(error);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::geometry::{Direction, Vec2};
    use crate::test_support::FakeElement;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn state() -> ScrollState {
        ScrollState::new(Direction::Vertical, Vec2::new(0.0, 1000.0))
    }

    #[test]
    fn test_call_value_parse() {
        assert_eq!(CallValue::parse("fade"), CallValue::Single("fade".into()));
        assert_eq!(
            CallValue::parse(" counter , 3 ,up"),
            CallValue::Multiple(vec!["counter".into(), "3".into(), "up".into()])
        );
    }

    #[test]
    fn test_event_kind_from_name() {
        assert_eq!(EventKind::from("scroll"), EventKind::Scroll);
        assert_eq!(EventKind::from("call"), EventKind::Call);
        assert_eq!(EventKind::from("menu"), EventKind::Custom("menu".into()));
    }

    #[test]
    fn test_dispatch_in_subscription_order() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();
        let log: Log = Rc::default();

        let a = log.clone();
        table.on_scroll(move |_| {
            a.borrow_mut().push("a");
            Ok(())
        });
        let b = log.clone();
        table.on_scroll(move |_| {
            b.borrow_mut().push("b");
            Ok(())
        });

        let report = table.dispatch_scroll(&state());
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(report.invoked, 2);
        assert!(report.is_ok());
    }

    #[test]
    fn test_failing_listener_does_not_stop_dispatch() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();
        let log: Log = Rc::default();

        let a = log.clone();
        table.on_scroll(move |_| {
            a.borrow_mut().push("a");
            anyhow::bail!("boom")
        });
        table.on_scroll(|_| panic!("listener exploded"));
        let c = log.clone();
        table.on_scroll(move |_| {
            c.borrow_mut().push("c");
            Ok(())
        });

        let report = table.dispatch_scroll(&state());
        assert_eq!(*log.borrow(), vec!["a", "c"]);
        assert_eq!(report.invoked, 3);
        assert_eq!(report.failed(), 2);
        assert!(report.errors[1].to_string().contains("listener exploded"));
    }

    #[test]
    fn test_channel_attach_and_detach() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();
        assert!(!table.is_attached(&EventKind::Scroll));

        let first = table.on_scroll(|_| Ok(()));
        let second = table.on_scroll(|_| Ok(()));
        assert!(table.is_attached(&EventKind::Scroll));
        assert_eq!(table.listener_count(&EventKind::Scroll), 2);

        assert!(table.off(&EventKind::Scroll, first));
        assert!(table.is_attached(&EventKind::Scroll));
        assert!(table.off(&EventKind::Scroll, second));
        assert!(!table.is_attached(&EventKind::Scroll));
        assert!(!table.off(&EventKind::Scroll, second));
    }

    #[test]
    fn test_off_with_wrong_kind_is_noop() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();
        let id = table.on_call(|_, _, _| Ok(()));

        assert!(!table.off(&EventKind::Scroll, id));
        assert!(!table.off(&EventKind::Custom("menu".into()), id));
        assert!(table.has_call_listeners());
        assert!(table.off(&EventKind::Call, id));
        assert!(!table.has_call_listeners());
    }

    #[test]
    fn test_duplicate_subscriptions_are_independent() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();
        let hits = Rc::new(RefCell::new(0));

        let mut ids = Vec::new();
        for _ in 0..2 {
            let hits = hits.clone();
            let id = table
                .on_custom("menu", move || {
                    *hits.borrow_mut() += 1;
                    Ok(())
                })
                .unwrap();
            ids.push(id);
        }

        table.dispatch_custom("menu");
        assert_eq!(*hits.borrow(), 2);

        table.off(&EventKind::Custom("menu".into()), ids[0]);
        table.dispatch_custom("menu");
        assert_eq!(*hits.borrow(), 3);
        assert_eq!(table.dispatch_custom("unknown").invoked, 0);
    }

    #[test]
    fn test_clear_detaches_everything() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();
        table.on_scroll(|_| Ok(()));
        table.on_call(|_, _, _| Ok(()));
        table.on_custom("menu", || Ok(())).unwrap();

        table.clear();
        assert!(!table.is_attached(&EventKind::Scroll));
        assert!(!table.has_call_listeners());
        assert!(!table.is_attached(&EventKind::Custom("menu".into())));
    }

    #[test]
    fn test_builtin_names_are_not_custom_events() {
        let mut table: ListenerTable<FakeElement> = ListenerTable::new();

        assert!(matches!(
            table.on_custom("call", || Ok(())),
            Err(Error::ReservedEvent(name)) if name == "call"
        ));
        assert!(table.on_custom("scroll", || Ok(())).is_err());

        assert!(!table.has_call_listeners());
        assert!(!table.is_attached(&EventKind::Custom("call".into())));
        assert_eq!(table.dispatch_custom("call").invoked, 0);
    }
}
