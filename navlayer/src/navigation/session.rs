//! Navigation session: trip state, route requests and observer dispatch.
//!
//! # Threading
//!
//! `Navigation` is shared behind an `Arc`. Internal state sits behind one
//! mutex that is never held while observers run, so observers may call back
//! into the session (e.g. read [`Navigation::routes`]) without deadlocking.
//!
//! # Route Requests
//!
//! ```text
//! request_routes ──► cancel previous ──► spawn_blocking(fetch) ─┬─► on_routes_ready ─► set_routes
//!                                                               ├─► on_routes_request_failure
//!        cancel_route_request / newer request ──────────────────┴─► on_routes_request_canceled
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::observer::{
    LocationObserver, ObserverRegistry, RouteProgressObserver, RoutesObserver,
    RoutesRequestCallback,
};
use super::options::RouteOptions;
use super::progress::{RouteProgressTracker, DEFAULT_ARRIVAL_RADIUS_M};
use super::route::{DirectionsRoute, Location};
use crate::accounts::NavigationAccounts;
use crate::directions::{DirectionsClient, DirectionsError};

/// Session tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationConfig {
    /// Distance at which a maneuver counts as reached, in meters.
    pub arrival_radius_m: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_M,
        }
    }
}

/// How a route request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteRequestOutcome {
    /// Routes were delivered; holds the number that became active.
    Ready(usize),
    /// The request failed and the callback was told so.
    Failed(DirectionsError),
    /// The request was superseded, canceled, or the session was destroyed.
    Canceled,
}

#[derive(Debug)]
struct PendingRequest {
    id: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct SessionState {
    trip_active: bool,
    destroyed: bool,
    routes: Vec<DirectionsRoute>,
    tracker: Option<RouteProgressTracker>,
    last_location: Option<Location>,
    pending: Option<PendingRequest>,
}

/// Entry point of the navigation SDK.
pub struct Navigation {
    config: NavigationConfig,
    directions: Arc<dyn DirectionsClient>,
    accounts: Option<Arc<NavigationAccounts>>,
    routes_observers: ObserverRegistry<dyn RoutesObserver>,
    progress_observers: ObserverRegistry<dyn RouteProgressObserver>,
    location_observers: ObserverRegistry<dyn LocationObserver>,
    state: Mutex<SessionState>,
    next_request_id: AtomicU64,
}

impl std::fmt::Debug for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Navigation {
    pub fn new(config: NavigationConfig, directions: Arc<dyn DirectionsClient>) -> Self {
        Self {
            config,
            directions,
            accounts: None,
            routes_observers: ObserverRegistry::new(),
            progress_observers: ObserverRegistry::new(),
            location_observers: ObserverRegistry::new(),
            state: Mutex::new(SessionState::default()),
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Attaches the accounts component notified of trip start and stop.
    pub fn with_accounts(mut self, accounts: Arc<NavigationAccounts>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    pub fn accounts(&self) -> Option<&Arc<NavigationAccounts>> {
        self.accounts.as_ref()
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Trip session
    // ------------------------------------------------------------------

    /// Starts a trip session. Does nothing if one is already running.
    pub fn start_trip_session(&self) {
        {
            let mut state = self.state.lock();
            if state.trip_active || state.destroyed {
                return;
            }
            state.trip_active = true;
        }
        if let Some(accounts) = &self.accounts {
            accounts.navigation_started(Utc::now());
        }
        tracing::info!("Trip session started");
    }

    /// Stops the trip session. Does nothing if none is running.
    pub fn stop_trip_session(&self) {
        {
            let mut state = self.state.lock();
            if !state.trip_active {
                return;
            }
            state.trip_active = false;
        }
        if let Some(accounts) = &self.accounts {
            accounts.navigation_stopped();
        }
        tracing::info!("Trip session stopped");
    }

    pub fn is_trip_session_active(&self) -> bool {
        self.state.lock().trip_active
    }

    /// Tears the session down: stops the trip, cancels any request and
    /// drops all observers. The instance is unusable afterwards.
    pub fn on_destroy(&self) {
        self.stop_trip_session();
        self.cancel_route_request();
        {
            let mut state = self.state.lock();
            state.destroyed = true;
            state.routes.clear();
            state.tracker = None;
        }
        self.routes_observers.clear();
        self.progress_observers.clear();
        self.location_observers.clear();
        tracing::debug!("Navigation destroyed");
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Registers a routes observer; it immediately receives the current
    /// routes if there are any.
    pub fn register_routes_observer(&self, observer: Arc<dyn RoutesObserver>) {
        if !self.routes_observers.register(observer.clone()) {
            return;
        }
        let routes = self.routes();
        if !routes.is_empty() {
            observer.on_routes_changed(&routes);
        }
    }

    pub fn unregister_routes_observer(&self, observer: &Arc<dyn RoutesObserver>) {
        self.routes_observers.unregister(observer);
    }

    pub fn register_route_progress_observer(&self, observer: Arc<dyn RouteProgressObserver>) {
        self.progress_observers.register(observer);
    }

    pub fn unregister_route_progress_observer(&self, observer: &Arc<dyn RouteProgressObserver>) {
        self.progress_observers.unregister(observer);
    }

    pub fn register_location_observer(&self, observer: Arc<dyn LocationObserver>) {
        self.location_observers.register(observer);
    }

    pub fn unregister_location_observer(&self, observer: &Arc<dyn LocationObserver>) {
        self.location_observers.unregister(observer);
    }

    /// Number of registered observers as (routes, progress, location).
    pub fn observer_counts(&self) -> (usize, usize, usize) {
        (
            self.routes_observers.len(),
            self.progress_observers.len(),
            self.location_observers.len(),
        )
    }

    // ------------------------------------------------------------------
    // Routes
    // ------------------------------------------------------------------

    /// A copy of the active routes; the first one is the primary route.
    pub fn routes(&self) -> Vec<DirectionsRoute> {
        self.state.lock().routes.clone()
    }

    /// Replaces the active routes and notifies routes observers.
    ///
    /// Progress restarts from the first step of the new primary route.
    pub fn set_routes(&self, routes: Vec<DirectionsRoute>) {
        {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.tracker = routes
                .first()
                .map(|primary| RouteProgressTracker::new(primary.clone(), self.config.arrival_radius_m));
            state.routes = routes.clone();
        }
        tracing::debug!(count = routes.len(), "Routes changed");
        self.routes_observers.notify(|o| o.on_routes_changed(&routes));
    }

    /// Requests routes for `options`, reporting the outcome to `callback`.
    ///
    /// Any request still in flight is canceled first. There is no retry.
    /// After [`Navigation::on_destroy`] every request reports `Canceled`
    /// without reaching the directions service.
    pub async fn request_routes(
        &self,
        options: RouteOptions,
        callback: Arc<dyn RoutesRequestCallback>,
    ) -> RouteRequestOutcome {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        {
            let mut state = self.state.lock();
            if state.destroyed {
                drop(state);
                tracing::debug!(request = id, "Route request after destroy ignored");
                callback.on_routes_request_canceled(&options);
                return RouteRequestOutcome::Canceled;
            }
            let previous = state.pending.replace(PendingRequest {
                id,
                token: token.clone(),
            });
            if let Some(previous) = previous {
                tracing::debug!(request = previous.id, "Superseding route request");
                previous.token.cancel();
            }
        }

        let directions = Arc::clone(&self.directions);
        let request_options = options.clone();
        let fetch = tokio::task::spawn_blocking(move || directions.fetch_routes(&request_options));

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            joined = fetch => Some(
                joined
                    .map_err(|e| DirectionsError::Aborted(e.to_string()))
                    .and_then(|routes| routes),
            ),
        };

        let result = {
            let mut state = self.state.lock();
            if state.pending.as_ref().is_some_and(|p| p.id == id) {
                state.pending = None;
            }
            // Destroyed while the fetch was finishing
            if state.destroyed {
                None
            } else {
                result
            }
        };

        match result {
            None => {
                tracing::info!(request = id, "Route request canceled");
                callback.on_routes_request_canceled(&options);
                RouteRequestOutcome::Canceled
            }
            Some(Ok(routes)) => {
                tracing::info!(request = id, count = routes.len(), "Route request succeeded");
                let routes = callback.on_routes_ready(routes);
                let count = routes.len();
                self.set_routes(routes);
                RouteRequestOutcome::Ready(count)
            }
            Some(Err(error)) => {
                tracing::error!(request = id, error = %error, "Route request failed");
                callback.on_routes_request_failure(&error, &options);
                RouteRequestOutcome::Failed(error)
            }
        }
    }

    /// Cancels the route request in flight, if any.
    pub fn cancel_route_request(&self) {
        if let Some(pending) = self.state.lock().pending.take() {
            pending.token.cancel();
        }
    }

    pub fn has_pending_request(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    // ------------------------------------------------------------------
    // Location
    // ------------------------------------------------------------------

    /// Feeds a location fix from the location engine.
    ///
    /// Ignored outside a trip session. Without map matching the enhanced
    /// location equals the raw one.
    pub fn update_location(&self, location: Location) {
        let progress = {
            let mut state = self.state.lock();
            if !state.trip_active {
                tracing::trace!("Location ignored, no trip session");
                return;
            }
            state.last_location = Some(location);
            state.tracker.as_mut().map(|tracker| tracker.update(&location))
        };

        self.location_observers.notify(|o| {
            o.on_raw_location_changed(&location);
            o.on_enhanced_location_changed(&location);
        });

        if let Some(progress) = progress {
            self.progress_observers
                .notify(|o| o.on_route_progress_changed(&progress));
        }
    }

    pub fn last_location(&self) -> Option<Location> {
        self.state.lock().last_location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{BillingModel, MemoryTokenStore};
    use crate::navigation::route::fixtures::straight_route;
    use crate::navigation::{Point, RouteProgress};

    struct StaticDirections(Result<Vec<DirectionsRoute>, DirectionsError>);

    impl DirectionsClient for StaticDirections {
        fn fetch_routes(&self, _options: &RouteOptions) -> Result<Vec<DirectionsRoute>, DirectionsError> {
            self.0.clone()
        }
    }

    /// Blocks until released, to keep a request in flight.
    struct GatedDirections {
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl DirectionsClient for GatedDirections {
        fn fetch_routes(&self, _options: &RouteOptions) -> Result<Vec<DirectionsRoute>, DirectionsError> {
            let _ = self.gate.lock().map(|rx| rx.recv());
            Ok(vec![straight_route()])
        }
    }

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl RoutesRequestCallback for RecordingCallback {
        fn on_routes_ready(&self, routes: Vec<DirectionsRoute>) -> Vec<DirectionsRoute> {
            self.events.lock().push(format!("ready:{}", routes.len()));
            routes
        }

        fn on_routes_request_failure(&self, error: &DirectionsError, _options: &RouteOptions) {
            self.events.lock().push(format!("failure:{}", error));
        }

        fn on_routes_request_canceled(&self, _options: &RouteOptions) {
            self.events.lock().push("canceled".to_string());
        }
    }

    #[derive(Default)]
    struct Recorder {
        routes: Mutex<Vec<usize>>,
        progress: Mutex<Vec<RouteProgress>>,
        raw: Mutex<usize>,
        enhanced: Mutex<usize>,
    }

    impl RoutesObserver for Recorder {
        fn on_routes_changed(&self, routes: &[DirectionsRoute]) {
            self.routes.lock().push(routes.len());
        }
    }

    impl RouteProgressObserver for Recorder {
        fn on_route_progress_changed(&self, progress: &RouteProgress) {
            self.progress.lock().push(progress.clone());
        }
    }

    impl LocationObserver for Recorder {
        fn on_raw_location_changed(&self, _raw_location: &Location) {
            *self.raw.lock() += 1;
        }

        fn on_enhanced_location_changed(&self, _enhanced_location: &Location) {
            *self.enhanced.lock() += 1;
        }
    }

    fn navigation(result: Result<Vec<DirectionsRoute>, DirectionsError>) -> Navigation {
        Navigation::new(NavigationConfig::default(), Arc::new(StaticDirections(result)))
    }

    fn options() -> RouteOptions {
        RouteOptions::new()
            .access_token("pk.test")
            .coordinates(Point::new(13.0, 52.0), vec![], Point::new(13.0, 52.02))
    }

    #[test]
    fn test_trip_session_is_idempotent() {
        let store = Arc::new(MemoryTokenStore::new());
        let accounts = Arc::new(NavigationAccounts::new(store, BillingModel::Trips));
        let nav = navigation(Ok(vec![])).with_accounts(accounts.clone());

        nav.start_trip_session();
        let token = accounts.current_token();
        assert!(!token.is_empty());

        nav.start_trip_session();
        assert_eq!(accounts.current_token(), token);

        nav.stop_trip_session();
        nav.stop_trip_session();
        assert!(!nav.is_trip_session_active());
        assert_eq!(accounts.current_token(), "");
    }

    #[test]
    fn test_set_routes_notifies_observers() {
        let nav = navigation(Ok(vec![]));
        let recorder = Arc::new(Recorder::default());
        nav.register_routes_observer(recorder.clone());

        nav.set_routes(vec![straight_route(), straight_route()]);
        nav.set_routes(vec![]);

        assert_eq!(*recorder.routes.lock(), vec![2, 0]);
    }

    #[test]
    fn test_late_routes_observer_gets_current_routes() {
        let nav = navigation(Ok(vec![]));
        nav.set_routes(vec![straight_route()]);

        let recorder = Arc::new(Recorder::default());
        nav.register_routes_observer(recorder.clone());
        assert_eq!(*recorder.routes.lock(), vec![1]);
    }

    #[test]
    fn test_location_ignored_without_trip() {
        let nav = navigation(Ok(vec![]));
        let recorder = Arc::new(Recorder::default());
        nav.register_location_observer(recorder.clone());

        nav.update_location(Location::new(Point::new(13.0, 52.0), 0));
        assert_eq!(*recorder.raw.lock(), 0);
        assert!(nav.last_location().is_none());
    }

    #[test]
    fn test_location_drives_progress() {
        let nav = navigation(Ok(vec![]));
        let recorder = Arc::new(Recorder::default());
        nav.register_location_observer(recorder.clone());
        nav.register_route_progress_observer(recorder.clone());
        nav.start_trip_session();
        nav.set_routes(vec![straight_route()]);

        nav.update_location(Location::new(Point::new(13.0, 52.0), 0));
        nav.update_location(Location::new(Point::new(13.0, 52.01), 1000));

        assert_eq!(*recorder.raw.lock(), 2);
        assert_eq!(*recorder.enhanced.lock(), 2);
        let progress = recorder.progress.lock();
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].step_index, 0);
        assert_eq!(progress[1].step_index, 1);
    }

    #[test]
    fn test_unregistered_observer_is_silent() {
        let nav = navigation(Ok(vec![]));
        let recorder = Arc::new(Recorder::default());
        let as_routes: Arc<dyn RoutesObserver> = recorder.clone();
        nav.register_routes_observer(as_routes.clone());
        nav.unregister_routes_observer(&as_routes);

        nav.set_routes(vec![straight_route()]);
        assert!(recorder.routes.lock().is_empty());
    }

    #[tokio::test]
    async fn test_request_routes_success_sets_routes() {
        let nav = navigation(Ok(vec![straight_route(), straight_route()]));
        let callback = Arc::new(RecordingCallback::default());

        let outcome = nav.request_routes(options(), callback.clone()).await;

        assert_eq!(outcome, RouteRequestOutcome::Ready(2));
        assert_eq!(nav.routes().len(), 2);
        assert_eq!(*callback.events.lock(), vec!["ready:2".to_string()]);
        assert!(!nav.has_pending_request());
    }

    #[tokio::test]
    async fn test_request_routes_failure() {
        let nav = navigation(Err(DirectionsError::NoRoutes));
        let callback = Arc::new(RecordingCallback::default());

        let outcome = nav.request_routes(options(), callback.clone()).await;

        assert_eq!(outcome, RouteRequestOutcome::Failed(DirectionsError::NoRoutes));
        assert!(nav.routes().is_empty());
        assert_eq!(
            *callback.events.lock(),
            vec!["failure:no routes found".to_string()]
        );
    }

    #[tokio::test]
    async fn test_cancel_route_request() {
        let (release, gate) = std::sync::mpsc::channel();
        let nav = Arc::new(Navigation::new(
            NavigationConfig::default(),
            Arc::new(GatedDirections {
                gate: std::sync::Mutex::new(gate),
            }),
        ));
        let callback = Arc::new(RecordingCallback::default());

        let task = {
            let nav = Arc::clone(&nav);
            let callback = callback.clone();
            tokio::spawn(async move { nav.request_routes(options(), callback).await })
        };

        while !nav.has_pending_request() {
            tokio::task::yield_now().await;
        }
        nav.cancel_route_request();

        assert_eq!(task.await.unwrap(), RouteRequestOutcome::Canceled);
        assert_eq!(*callback.events.lock(), vec!["canceled".to_string()]);
        assert!(nav.routes().is_empty());
        release.send(()).unwrap();
    }

    #[test]
    fn test_destroy_drops_observers() {
        let nav = navigation(Ok(vec![]));
        let recorder = Arc::new(Recorder::default());
        nav.register_routes_observer(recorder.clone());
        nav.register_route_progress_observer(recorder.clone());
        nav.start_trip_session();

        nav.on_destroy();

        assert_eq!(nav.observer_counts(), (0, 0, 0));
        assert!(!nav.is_trip_session_active());
        nav.set_routes(vec![straight_route()]);
        assert!(nav.routes().is_empty());
    }

    /// Counts fetches so a skipped request is observable.
    #[derive(Default)]
    struct CountingDirections {
        fetches: std::sync::atomic::AtomicUsize,
    }

    impl DirectionsClient for CountingDirections {
        fn fetch_routes(&self, _options: &RouteOptions) -> Result<Vec<DirectionsRoute>, DirectionsError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![straight_route()])
        }
    }

    #[tokio::test]
    async fn test_request_after_destroy_is_canceled() {
        let directions = Arc::new(CountingDirections::default());
        let nav = Navigation::new(NavigationConfig::default(), directions.clone());
        let callback = Arc::new(RecordingCallback::default());

        nav.on_destroy();
        let outcome = nav.request_routes(options(), callback.clone()).await;

        assert_eq!(outcome, RouteRequestOutcome::Canceled);
        assert_eq!(directions.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(*callback.events.lock(), vec!["canceled".to_string()]);
        assert!(nav.routes().is_empty());
        assert!(!nav.has_pending_request());
    }
}
