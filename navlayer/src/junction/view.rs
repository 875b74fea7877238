//! Junction view widget bound to a lifecycle.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::view_model::JunctionViewModel;
use crate::lifecycle::{Lifecycle, LifecycleEvent, LifecycleObserver};
use crate::navigation::{Navigation, RouteProgressObserver, RoutesObserver};

/// Widget visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Gone,
}

#[derive(Default)]
struct ViewState {
    navigation: Option<Arc<Navigation>>,
    image_url: Option<watch::Receiver<Option<String>>>,
    displayed_url: Option<String>,
    visibility: Visibility,
}

/// Displays the junction image of the upcoming maneuver.
///
/// The first [`subscribe`](Self::subscribe) binds the view to a lifecycle
/// and a navigation instance; later calls only re-register the view model.
/// The view unsubscribes itself when the lifecycle is destroyed.
pub struct JunctionView {
    view_model: Arc<JunctionViewModel>,
    state: Mutex<ViewState>,
}

impl std::fmt::Debug for JunctionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("JunctionView")
            .field("bound", &state.navigation.is_some())
            .field("displayed_url", &state.displayed_url)
            .field("visibility", &state.visibility)
            .finish()
    }
}

impl JunctionView {
    pub fn new(view_model: Arc<JunctionViewModel>) -> Arc<Self> {
        Arc::new(Self {
            view_model,
            state: Mutex::new(ViewState::default()),
        })
    }

    pub fn view_model(&self) -> &Arc<JunctionViewModel> {
        &self.view_model
    }

    pub fn subscribe(self: &Arc<Self>, lifecycle: &Lifecycle, navigation: &Arc<Navigation>) {
        let navigation = {
            let mut state = self.state.lock();
            if state.navigation.is_none() {
                state.navigation = Some(Arc::clone(navigation));
                let observer: Arc<dyn LifecycleObserver> = self.clone();
                lifecycle.add_observer(&observer);
                tracing::debug!("Junction view bound to lifecycle");
            }
            state.image_url = Some(self.view_model.junction_image_url());
            state.navigation.clone()
        };

        if let Some(navigation) = navigation {
            navigation.register_routes_observer(self.view_model.clone());
            navigation.register_route_progress_observer(self.view_model.clone());
        }
    }

    /// Unregisters the view model from the bound navigation.
    pub fn unsubscribe(&self) {
        let navigation = {
            let mut state = self.state.lock();
            state.image_url = None;
            state.navigation.clone()
        };
        let Some(navigation) = navigation else {
            return;
        };

        let routes: Arc<dyn RoutesObserver> = self.view_model.clone();
        let progress: Arc<dyn RouteProgressObserver> = self.view_model.clone();
        navigation.unregister_routes_observer(&routes);
        navigation.unregister_route_progress_observer(&progress);
        tracing::debug!("Junction view unsubscribed");
    }

    pub fn show(&self) {
        self.state.lock().visibility = Visibility::Visible;
    }

    pub fn hide(&self) {
        self.state.lock().visibility = Visibility::Gone;
    }

    pub fn visibility(&self) -> Visibility {
        self.state.lock().visibility
    }

    /// Pulls the latest URL from the view model.
    ///
    /// Returns true if the displayed URL changed. Does nothing while
    /// unsubscribed.
    pub fn refresh(&self) -> bool {
        let mut state = self.state.lock();
        let Some(receiver) = state.image_url.as_mut() else {
            return false;
        };
        if !receiver.has_changed().unwrap_or(false) {
            return false;
        }
        let url = receiver.borrow_and_update().clone();
        state.displayed_url = url;
        true
    }

    pub fn displayed_url(&self) -> Option<String> {
        self.state.lock().displayed_url.clone()
    }
}

impl LifecycleObserver for JunctionView {
    fn on_event(&self, event: LifecycleEvent) {
        if event == LifecycleEvent::Destroy {
            self.unsubscribe();
        }
    }
}
