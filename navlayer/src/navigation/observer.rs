//! Observer traits and registration bookkeeping.

use std::sync::Arc;

use parking_lot::Mutex;

use super::options::RouteOptions;
use super::route::{DirectionsRoute, Location, RouteProgress};
use crate::directions::DirectionsError;

/// Notified whenever the active route list changes.
pub trait RoutesObserver: Send + Sync {
    fn on_routes_changed(&self, routes: &[DirectionsRoute]);
}

/// Notified on every route progress update.
pub trait RouteProgressObserver: Send + Sync {
    fn on_route_progress_changed(&self, progress: &RouteProgress);
}

/// Notified on every location update of an active trip session.
pub trait LocationObserver: Send + Sync {
    fn on_raw_location_changed(&self, raw_location: &Location);
    fn on_enhanced_location_changed(&self, enhanced_location: &Location);
}

/// Receives the outcome of a single route request.
pub trait RoutesRequestCallback: Send + Sync {
    /// Called with the fetched routes; the returned list becomes active.
    fn on_routes_ready(&self, routes: Vec<DirectionsRoute>) -> Vec<DirectionsRoute>;

    fn on_routes_request_failure(&self, error: &DirectionsError, options: &RouteOptions);

    fn on_routes_request_canceled(&self, options: &RouteOptions);
}

/// Set of registered observers, keyed on `Arc` identity.
///
/// Registration order is preserved for dispatch. Registering the same
/// observer twice, or unregistering one that is not present, is a no-op.
pub struct ObserverRegistry<T: ?Sized> {
    observers: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl<T: ?Sized> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer. Returns false if it was already registered.
    pub fn register(&self, observer: Arc<T>) -> bool {
        let mut observers = self.observers.lock();
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unregister(&self, observer: &Arc<T>) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        observers.len() != before
    }

    pub fn contains(&self, observer: &Arc<T>) -> bool {
        self.observers
            .lock()
            .iter()
            .any(|o| same_observer(o, observer))
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.observers.lock().clear();
    }

    /// Invokes `f` on every observer.
    ///
    /// Dispatch works on a snapshot, so observers may register or
    /// unregister from inside their callback.
    pub fn notify(&self, mut f: impl FnMut(&T)) {
        let snapshot: Vec<Arc<T>> = self.observers.lock().clone();
        for observer in &snapshot {
            f(observer);
        }
    }
}

/// Compares data pointers only; vtable pointers of the same object may
/// differ across codegen units.
fn same_observer<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
