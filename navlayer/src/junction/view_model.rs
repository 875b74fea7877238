//! Junction image state derived from navigation events.

use tokio::sync::watch;

use crate::navigation::{DirectionsRoute, RouteProgress, RouteProgressObserver, RoutesObserver};

/// Publishes the junction image URL for the current step.
///
/// The URL is the guidance-view image of the current step's banner
/// instructions with the access token appended, or `None` when the step has
/// no junction image or there is no active route.
pub struct JunctionViewModel {
    access_token: Option<String>,
    junction_image_url: watch::Sender<Option<String>>,
}

impl std::fmt::Debug for JunctionViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JunctionViewModel")
            .field("junction_image_url", &*self.junction_image_url.borrow())
            .finish_non_exhaustive()
    }
}

impl Default for JunctionViewModel {
    fn default() -> Self {
        Self::new(None)
    }
}

impl JunctionViewModel {
    pub fn new(access_token: Option<String>) -> Self {
        let (junction_image_url, _) = watch::channel(None);
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            junction_image_url,
        }
    }

    /// A receiver tracking the junction image URL.
    pub fn junction_image_url(&self) -> watch::Receiver<Option<String>> {
        self.junction_image_url.subscribe()
    }

    /// The latest published URL.
    pub fn current_url(&self) -> Option<String> {
        self.junction_image_url.borrow().clone()
    }

    fn with_access_token(&self, url: &str) -> String {
        match &self.access_token {
            Some(token) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}access_token={}", url, separator, token)
            }
            None => url.to_string(),
        }
    }

    /// Publishes `image_url` with the access token appended. Only the bare
    /// image URL is logged.
    fn publish(&self, image_url: Option<&str>) {
        let url = image_url.map(|u| self.with_access_token(u));
        self.junction_image_url.send_if_modified(|current| {
            if *current == url {
                return false;
            }
            tracing::debug!(image_url = ?image_url, "Junction image changed");
            *current = url;
            true
        });
    }
}

impl RoutesObserver for JunctionViewModel {
    fn on_routes_changed(&self, routes: &[DirectionsRoute]) {
        if routes.is_empty() {
            self.publish(None);
        }
    }
}

impl RouteProgressObserver for JunctionViewModel {
    fn on_route_progress_changed(&self, progress: &RouteProgress) {
        let image_url = progress
            .current_step()
            .and_then(|step| step.guidance_image_url());
        self.publish(image_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::fixtures::straight_route;
    use crate::navigation::{BannerComponent, BannerInstruction, BannerText, GUIDANCE_VIEW_COMPONENT};

    const IMAGE_URL: &str = "https://api.mapbox.com/guidance-views/v1/1580515200/jct/CA075101";

    fn progress_with_junction(url: Option<&str>) -> RouteProgress {
        let mut route = straight_route();
        if let Some(url) = url {
            route.legs[0].steps[0].banner_instructions.push(BannerInstruction {
                distance_along_geometry: 100.0,
                primary: BannerText::default(),
                view: Some(BannerText {
                    text: "CA075101".to_string(),
                    components: vec![BannerComponent {
                        component_type: GUIDANCE_VIEW_COMPONENT.to_string(),
                        text: "CA075101".to_string(),
                        image_url: Some(url.to_string()),
                    }],
                }),
            });
        }
        RouteProgress {
            route,
            leg_index: 0,
            step_index: 0,
            distance_to_next_maneuver_m: 100.0,
            distance_remaining_m: 1200.0,
            arrived: false,
        }
    }

    #[test]
    fn test_publishes_url_with_token() {
        let vm = JunctionViewModel::new(Some("pk.test".to_string()));
        vm.on_route_progress_changed(&progress_with_junction(Some(IMAGE_URL)));
        assert_eq!(
            vm.current_url(),
            Some(format!("{}?access_token=pk.test", IMAGE_URL))
        );
    }

    #[test]
    fn test_url_with_query_uses_ampersand() {
        let vm = JunctionViewModel::new(Some("pk.test".to_string()));
        vm.on_route_progress_changed(&progress_with_junction(Some("https://x/jct?arrow_ids=1")));
        assert_eq!(
            vm.current_url().as_deref(),
            Some("https://x/jct?arrow_ids=1&access_token=pk.test")
        );
    }

    #[test]
    fn test_no_junction_clears_url() {
        let vm = JunctionViewModel::new(None);
        vm.on_route_progress_changed(&progress_with_junction(Some(IMAGE_URL)));
        assert_eq!(vm.current_url().as_deref(), Some(IMAGE_URL));

        vm.on_route_progress_changed(&progress_with_junction(None));
        assert_eq!(vm.current_url(), None);
    }

    #[test]
    fn test_empty_routes_clear_url() {
        let vm = JunctionViewModel::default();
        vm.on_route_progress_changed(&progress_with_junction(Some(IMAGE_URL)));
        vm.on_routes_changed(&[]);
        assert_eq!(vm.current_url(), None);
    }

    #[test]
    fn test_receiver_sees_changes_once() {
        let vm = JunctionViewModel::default();
        let mut rx = vm.junction_image_url();
        assert!(!rx.has_changed().unwrap());

        vm.on_route_progress_changed(&progress_with_junction(Some(IMAGE_URL)));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        // Same URL again is not a change
        vm.on_route_progress_changed(&progress_with_junction(Some(IMAGE_URL)));
        assert!(!rx.has_changed().unwrap());
    }

    /// Collects formatted log output.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_access_token_not_logged() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let vm = JunctionViewModel::new(Some("pk.secret".to_string()));
        tracing::subscriber::with_default(subscriber, || {
            vm.on_route_progress_changed(&progress_with_junction(Some(IMAGE_URL)));
        });

        let logs = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert!(logs.contains("Junction image changed"), "{}", logs);
        assert!(logs.contains(IMAGE_URL), "{}", logs);
        assert!(!logs.contains("pk.secret"), "{}", logs);
        assert!(vm.current_url().unwrap().ends_with("access_token=pk.secret"));
    }
}
