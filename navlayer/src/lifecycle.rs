//! Host lifecycle events and their dispatch.
//!
//! A [`Lifecycle`] stands in for the screen hosting the navigation UI.
//! Components that must follow the host (start listening when it starts,
//! release resources when it is destroyed) register as
//! [`LifecycleObserver`]s.
//!
//! Observers are held weakly: a component registering itself does not keep
//! itself alive, and dropped observers are pruned on the next dispatch.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Lifecycle transitions delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleEvent::Create => "create",
            LifecycleEvent::Start => "start",
            LifecycleEvent::Resume => "resume",
            LifecycleEvent::Pause => "pause",
            LifecycleEvent::Stop => "stop",
            LifecycleEvent::Destroy => "destroy",
        };
        write!(f, "{}", name)
    }
}

/// State reached after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Initialized,
    Created,
    Started,
    Resumed,
    Destroyed,
}

impl LifecycleState {
    /// State after `event` is handled.
    pub fn after(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::Create | LifecycleEvent::Stop => LifecycleState::Created,
            LifecycleEvent::Start | LifecycleEvent::Pause => LifecycleState::Started,
            LifecycleEvent::Resume => LifecycleState::Resumed,
            LifecycleEvent::Destroy => LifecycleState::Destroyed,
        }
    }
}

/// Receives lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    fn on_event(&self, event: LifecycleEvent);
}

#[derive(Default)]
struct Inner {
    state: LifecycleState,
    observers: Vec<Weak<dyn LifecycleObserver>>,
}

/// Lifecycle owner with weakly held observers.
#[derive(Default)]
pub struct Lifecycle {
    inner: Mutex<Inner>,
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Lifecycle")
            .field("state", &inner.state)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    /// Adds an observer. Adding the same observer twice is a no-op.
    pub fn add_observer(&self, observer: &Arc<dyn LifecycleObserver>) {
        let mut inner = self.inner.lock();
        let weak = Arc::downgrade(observer);
        if inner.observers.iter().any(|o| Weak::ptr_eq(o, &weak)) {
            return;
        }
        inner.observers.push(weak);
    }

    pub fn remove_observer(&self, observer: &Arc<dyn LifecycleObserver>) {
        let weak = Arc::downgrade(observer);
        self.inner.lock().observers.retain(|o| !Weak::ptr_eq(o, &weak));
    }

    /// Number of observers still alive.
    pub fn observer_count(&self) -> usize {
        self.inner
            .lock()
            .observers
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    /// Moves to the state following `event` and dispatches it to every
    /// live observer in registration order.
    ///
    /// Events after `Destroy` are dropped.
    pub fn handle_event(&self, event: LifecycleEvent) {
        let observers: Vec<Arc<dyn LifecycleObserver>> = {
            let mut inner = self.inner.lock();
            if inner.state == LifecycleState::Destroyed {
                tracing::debug!(%event, "Lifecycle event after destroy ignored");
                return;
            }
            inner.state = LifecycleState::after(event);
            inner.observers.retain(|o| o.strong_count() > 0);
            inner.observers.iter().filter_map(Weak::upgrade).collect()
        };

        tracing::trace!(%event, observers = observers.len(), "Lifecycle event");
        for observer in observers {
            observer.on_event(event);
        }

        if event == LifecycleEvent::Destroy {
            self.inner.lock().observers.clear();
        }
    }
}
