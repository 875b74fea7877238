//! Minimal navigation application flow.
//!
//! `SimpleNavigationApp` wires a [`Navigation`] session to a host lifecycle
//! and a map surface: long-clicking the map requests routes from the last
//! known location to the clicked point and drops a marker there.
//!
//! # Lifecycle
//!
//! ```text
//! Create  ──► start trip session
//! Start   ──► register location, progress and routes observers
//! Stop    ──► unregister them
//! Destroy ──► stop trip session, destroy navigation
//! ```

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::{AppConfig, DEFAULT_ZOOM};
use super::error::AppError;
use crate::accounts::{IniTokenStore, NavigationAccounts};
use crate::directions::{DirectionsError, HttpDirectionsClient, ReqwestClient};
use crate::lifecycle::{LifecycleEvent, LifecycleObserver};
use crate::navigation::{
    DirectionsRoute, Location, LocationObserver, Navigation, Point, RouteOptions, RouteProgress,
    RouteProgressObserver, RouteRequestOutcome, RoutesObserver, RoutesRequestCallback,
};

/// Icon name used for destination markers.
pub const MARKER_ICON: &str = "marker";

/// A symbol placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub point: Point,
    pub icon: String,
}

/// Markers currently shown on the map.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Mutex<Vec<Marker>>,
}

impl MarkerLayer {
    pub fn create(&self, point: Point) {
        self.markers.lock().push(Marker {
            point,
            icon: MARKER_ICON.to_string(),
        });
    }

    pub fn delete_all(&self) {
        self.markers.lock().clear();
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.markers.lock().clone()
    }
}

/// How the camera follows the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    None,
    Tracking,
}

/// Map camera.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraState {
    pub zoom: f64,
    pub mode: CameraMode,
    pub center: Option<Point>,
}

/// State shared with the observers registered on the session.
#[derive(Debug, Default)]
struct MapState {
    markers: MarkerLayer,
    camera: Mutex<CameraState>,
    last_location: Mutex<Option<Location>>,
    displayed_routes: Mutex<Vec<DirectionsRoute>>,
    last_progress: Mutex<Option<RouteProgress>>,
}

impl LocationObserver for MapState {
    fn on_raw_location_changed(&self, raw_location: &Location) {
        *self.last_location.lock() = Some(*raw_location);
        let mut camera = self.camera.lock();
        if camera.mode == CameraMode::Tracking {
            camera.center = Some(raw_location.point);
        }
        debug!(
            lon = raw_location.point.longitude,
            lat = raw_location.point.latitude,
            "Raw location"
        );
    }

    fn on_enhanced_location_changed(&self, enhanced_location: &Location) {
        debug!(
            lon = enhanced_location.point.longitude,
            lat = enhanced_location.point.latitude,
            "Enhanced location"
        );
    }
}

impl RouteProgressObserver for MapState {
    fn on_route_progress_changed(&self, progress: &RouteProgress) {
        debug!(
            leg = progress.leg_index,
            step = progress.step_index,
            remaining_m = progress.distance_remaining_m,
            arrived = progress.arrived,
            "Route progress"
        );
        *self.last_progress.lock() = Some(progress.clone());
    }
}

impl RoutesObserver for MapState {
    fn on_routes_changed(&self, routes: &[DirectionsRoute]) {
        *self.displayed_routes.lock() = routes.to_vec();
        if routes.is_empty() {
            warn!("Empty routes");
        }
        debug!(count = routes.len(), "Routes changed");
    }
}

impl RoutesRequestCallback for MapState {
    fn on_routes_ready(&self, routes: Vec<DirectionsRoute>) -> Vec<DirectionsRoute> {
        info!(count = routes.len(), "Route request success");
        routes
    }

    fn on_routes_request_failure(&self, error: &DirectionsError, _options: &RouteOptions) {
        self.markers.delete_all();
        warn!(error = %error, "Route request failure");
    }

    fn on_routes_request_canceled(&self, _options: &RouteOptions) {
        self.markers.delete_all();
        info!("Route request canceled");
    }
}

/// Example navigation application.
pub struct SimpleNavigationApp {
    config: AppConfig,
    navigation: Arc<Navigation>,
    state: Arc<MapState>,
    runtime: Handle,
}

impl std::fmt::Debug for SimpleNavigationApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleNavigationApp")
            .field("navigation", &self.navigation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SimpleNavigationApp {
    /// Assembles the full stack from `config`: token store, accounts, HTTP
    /// directions client and navigation session.
    ///
    /// Must be called outside of async code; the HTTP client is blocking.
    ///
    /// # Errors
    ///
    /// Fails if the token store or the HTTP client cannot be created.
    pub fn start(config: AppConfig, runtime: Handle) -> Result<Self, AppError> {
        let store = Arc::new(IniTokenStore::open(config.token_store.clone())?);
        let accounts = Arc::new(NavigationAccounts::new(store, config.billing_model));
        accounts.initialize_sku(Utc::now());

        let http = ReqwestClient::with_timeout(config.timeout_secs)?;
        let directions = HttpDirectionsClient::new(http).with_accounts(Arc::clone(&accounts));
        let navigation = Navigation::new(config.navigation.clone(), Arc::new(directions))
            .with_accounts(accounts);

        info!(
            billing = %config.billing_model,
            profile = %config.profile,
            "Navigation app started"
        );
        Ok(Self::with_navigation(config, Arc::new(navigation), runtime))
    }

    /// Wraps an existing session.
    pub fn with_navigation(config: AppConfig, navigation: Arc<Navigation>, runtime: Handle) -> Self {
        Self {
            config,
            navigation,
            state: Arc::new(MapState::default()),
            runtime,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn navigation(&self) -> &Arc<Navigation> {
        &self.navigation
    }

    /// Applies the initial camera once the map is ready.
    pub fn on_map_ready(&self) {
        let mut camera = self.state.camera.lock();
        camera.zoom = DEFAULT_ZOOM;
        camera.mode = CameraMode::Tracking;
    }

    /// Requests routes from the last known location to `point`.
    ///
    /// Returns the request task, or `None` if no location is known yet.
    pub fn on_map_long_click(&self, point: Point) -> Option<JoinHandle<RouteRequestOutcome>> {
        let Some(origin) = *self.state.last_location.lock() else {
            debug!("Long click ignored, no known location");
            return None;
        };

        let options = self
            .config
            .route_options()
            .coordinates(origin.point, Vec::new(), point)
            .alternatives(true);

        let navigation = Arc::clone(&self.navigation);
        let callback: Arc<dyn RoutesRequestCallback> = self.state.clone();
        let task = self
            .runtime
            .spawn(async move { navigation.request_routes(options, callback).await });

        self.state.markers.delete_all();
        self.state.markers.create(point);
        Some(task)
    }

    /// Makes `route` the primary route.
    pub fn on_route_selected(&self, route: &DirectionsRoute) {
        let mut routes = self.navigation.routes();
        routes.retain(|r| r != route);
        routes.insert(0, route.clone());
        self.navigation.set_routes(routes);
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.state.markers.markers()
    }

    pub fn camera(&self) -> CameraState {
        self.state.camera.lock().clone()
    }

    pub fn last_known_location(&self) -> Option<Location> {
        *self.state.last_location.lock()
    }

    /// Routes as last drawn on the map.
    pub fn displayed_routes(&self) -> Vec<DirectionsRoute> {
        self.state.displayed_routes.lock().clone()
    }

    pub fn last_progress(&self) -> Option<RouteProgress> {
        self.state.last_progress.lock().clone()
    }

    fn register_observers(&self) {
        self.navigation.register_location_observer(self.state.clone());
        self.navigation
            .register_route_progress_observer(self.state.clone());
        self.navigation.register_routes_observer(self.state.clone());
    }

    fn unregister_observers(&self) {
        let location: Arc<dyn LocationObserver> = self.state.clone();
        let progress: Arc<dyn RouteProgressObserver> = self.state.clone();
        let routes: Arc<dyn RoutesObserver> = self.state.clone();
        self.navigation.unregister_location_observer(&location);
        self.navigation.unregister_route_progress_observer(&progress);
        self.navigation.unregister_routes_observer(&routes);
    }
}

impl LifecycleObserver for SimpleNavigationApp {
    fn on_event(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Create => self.navigation.start_trip_session(),
            LifecycleEvent::Start => self.register_observers(),
            LifecycleEvent::Stop => self.unregister_observers(),
            LifecycleEvent::Destroy => {
                self.navigation.stop_trip_session();
                self.navigation.on_destroy();
            }
            LifecycleEvent::Resume | LifecycleEvent::Pause => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::DirectionsClient;
    use crate::navigation::fixtures::straight_route;
    use crate::navigation::NavigationConfig;
    use std::path::PathBuf;

    struct FixedDirections(Result<Vec<DirectionsRoute>, DirectionsError>);

    impl DirectionsClient for FixedDirections {
        fn fetch_routes(&self, _options: &RouteOptions) -> Result<Vec<DirectionsRoute>, DirectionsError> {
            self.0.clone()
        }
    }

    fn app(result: Result<Vec<DirectionsRoute>, DirectionsError>) -> SimpleNavigationApp {
        let navigation = Navigation::new(NavigationConfig::default(), Arc::new(FixedDirections(result)));
        SimpleNavigationApp::with_navigation(
            AppConfig::new("pk.test", PathBuf::from("/nonexistent/accounts.ini")),
            Arc::new(navigation),
            Handle::current(),
        )
    }

    fn started(app: &SimpleNavigationApp) {
        app.on_event(LifecycleEvent::Create);
        app.on_event(LifecycleEvent::Start);
        app.on_map_ready();
    }

    #[tokio::test]
    async fn test_map_ready_sets_camera() {
        let app = app(Ok(vec![]));
        app.on_map_ready();
        let camera = app.camera();
        assert_eq!(camera.zoom, 15.0);
        assert_eq!(camera.mode, CameraMode::Tracking);
    }

    #[tokio::test]
    async fn test_long_click_without_location_is_ignored() {
        let app = app(Ok(vec![straight_route()]));
        started(&app);
        assert!(app.on_map_long_click(Point::new(13.0, 52.02)).is_none());
        assert!(app.markers().is_empty());
    }

    #[tokio::test]
    async fn test_long_click_requests_routes() {
        let app = app(Ok(vec![straight_route(), straight_route()]));
        started(&app);
        app.navigation()
            .update_location(Location::new(Point::new(13.0, 52.0), 0));
        assert_eq!(app.camera().center, Some(Point::new(13.0, 52.0)));

        let task = app.on_map_long_click(Point::new(13.0, 52.02)).unwrap();
        assert_eq!(app.markers().len(), 1);

        assert_eq!(task.await.unwrap(), RouteRequestOutcome::Ready(2));
        assert_eq!(app.displayed_routes().len(), 2);
        assert_eq!(app.markers()[0].icon, MARKER_ICON);
    }

    #[tokio::test]
    async fn test_failure_clears_markers() {
        let app = app(Err(DirectionsError::NoRoutes));
        started(&app);
        app.navigation()
            .update_location(Location::new(Point::new(13.0, 52.0), 0));

        let task = app.on_map_long_click(Point::new(13.0, 52.02)).unwrap();
        assert!(matches!(task.await.unwrap(), RouteRequestOutcome::Failed(_)));
        assert!(app.markers().is_empty());
    }

    #[tokio::test]
    async fn test_route_selection_moves_route_to_front() {
        let app = app(Ok(vec![]));
        started(&app);
        let first = straight_route();
        let mut second = straight_route();
        second.distance = 9999.0;
        app.navigation().set_routes(vec![first.clone(), second.clone()]);

        app.on_route_selected(&second);

        let routes = app.navigation().routes();
        assert_eq!(routes, vec![second, first]);
    }

    #[tokio::test]
    async fn test_stop_unregisters_and_destroy_ends_session() {
        let app = app(Ok(vec![]));
        started(&app);
        assert_eq!(app.navigation().observer_counts(), (1, 1, 1));

        app.on_event(LifecycleEvent::Stop);
        assert_eq!(app.navigation().observer_counts(), (0, 0, 0));

        app.on_event(LifecycleEvent::Destroy);
        assert!(!app.navigation().is_trip_session_active());
    }
}
