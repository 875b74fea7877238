//! Route request options.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use thiserror::Error;

use super::route::Point;

/// Default directions service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Default user name segment of the directions path.
pub const DEFAULT_USER: &str = "mapbox";

/// Why a set of options cannot form a request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteOptionsError {
    #[error("at least 2 coordinates required, got {0}")]
    TooFewCoordinates(usize),

    #[error("access token is not set")]
    MissingAccessToken,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Routing profile requested from the directions service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoutingProfile {
    #[default]
    DrivingTraffic,
    Driving,
    Walking,
    Cycling,
}

impl RoutingProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingProfile::DrivingTraffic => "driving-traffic",
            RoutingProfile::Driving => "driving",
            RoutingProfile::Walking => "walking",
            RoutingProfile::Cycling => "cycling",
        }
    }
}

impl fmt::Display for RoutingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "driving-traffic" => Ok(RoutingProfile::DrivingTraffic),
            "driving" => Ok(RoutingProfile::Driving),
            "walking" => Ok(RoutingProfile::Walking),
            "cycling" => Ok(RoutingProfile::Cycling),
            other => Err(format!("unknown routing profile '{}'", other)),
        }
    }
}

/// Parameters of a directions request.
///
/// Built with chained setters:
///
/// ```
/// use navlayer::navigation::{Point, RouteOptions, RoutingProfile};
///
/// let options = RouteOptions::new()
///     .apply_default_params()
///     .access_token("pk.test")
///     .coordinates(Point::new(13.38, 52.51), vec![], Point::new(13.40, 52.52))
///     .alternatives(true)
///     .profile(RoutingProfile::DrivingTraffic);
///
/// assert!(options.request_url().unwrap().contains("/driving-traffic/"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    pub base_url: String,
    pub user: String,
    pub profile: RoutingProfile,
    pub coordinates: Vec<Point>,
    pub alternatives: bool,
    pub steps: bool,
    pub banner_instructions: bool,
    pub continue_straight: Option<bool>,
    pub geometries: String,
    pub overview: String,
    pub language: Option<String>,
    pub access_token: String,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user: DEFAULT_USER.to_string(),
            profile: RoutingProfile::default(),
            coordinates: Vec::new(),
            alternatives: false,
            steps: false,
            banner_instructions: false,
            continue_straight: None,
            geometries: "polyline6".to_string(),
            overview: "full".to_string(),
            language: None,
            access_token: String::new(),
        }
    }
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables everything turn-by-turn guidance needs.
    pub fn apply_default_params(mut self) -> Self {
        self.steps = true;
        self.banner_instructions = true;
        self.continue_straight = Some(true);
        self.geometries = "polyline6".to_string();
        self.overview = "full".to_string();
        self
    }

    /// Sets origin, intermediate waypoints and destination.
    pub fn coordinates(mut self, origin: Point, waypoints: Vec<Point>, destination: Point) -> Self {
        let mut coordinates = Vec::with_capacity(waypoints.len() + 2);
        coordinates.push(origin);
        coordinates.extend(waypoints);
        coordinates.push(destination);
        self.coordinates = coordinates;
        self
    }

    pub fn alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn profile(mut self, profile: RoutingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Query parameters in request order, unencoded.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("alternatives", self.alternatives.to_string()),
            ("geometries", self.geometries.clone()),
            ("overview", self.overview.clone()),
            ("steps", self.steps.to_string()),
        ];
        if self.banner_instructions {
            params.push(("banner_instructions", "true".to_string()));
        }
        if let Some(straight) = self.continue_straight {
            params.push(("continue_straight", straight.to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params.push(("access_token", self.access_token.clone()));
        params
    }

    /// Full request URL with percent-encoded query values.
    pub fn request_url(&self) -> Result<String, RouteOptionsError> {
        if self.coordinates.len() < 2 {
            return Err(RouteOptionsError::TooFewCoordinates(self.coordinates.len()));
        }
        if self.access_token.is_empty() {
            return Err(RouteOptionsError::MissingAccessToken);
        }

        let coordinates = self
            .coordinates
            .iter()
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";");
        let base = format!(
            "{}/directions/v5/{}/{}/{}",
            self.base_url, self.user, self.profile, coordinates
        );

        let mut url = Url::parse(&base).map_err(|e| RouteOptionsError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().extend_pairs(self.query_pairs());
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RouteOptions {
        RouteOptions::new()
            .apply_default_params()
            .access_token("pk.test")
            .coordinates(
                Point::new(13.38, 52.51),
                vec![Point::new(13.39, 52.515)],
                Point::new(13.4, 52.52),
            )
            .alternatives(true)
    }

    #[test]
    fn test_request_url() {
        let url = options().request_url().unwrap();
        assert_eq!(
            url,
            "https://api.mapbox.com/directions/v5/mapbox/driving-traffic/\
             13.38,52.51;13.39,52.515;13.4,52.52\
             ?alternatives=true&geometries=polyline6&overview=full&steps=true\
             &banner_instructions=true&continue_straight=true&access_token=pk.test"
        );
    }

    #[test]
    fn test_custom_base_url_trims_slash() {
        let url = options()
            .base_url("http://localhost:8080/")
            .profile(RoutingProfile::Walking)
            .request_url()
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/directions/v5/mapbox/walking/"));
    }

    #[test]
    fn test_request_url_requires_two_coordinates() {
        let mut opts = options();
        opts.coordinates.truncate(1);
        assert_eq!(opts.request_url(), Err(RouteOptionsError::TooFewCoordinates(1)));
    }

    #[test]
    fn test_request_url_requires_token() {
        let opts = options().access_token("");
        assert_eq!(opts.request_url(), Err(RouteOptionsError::MissingAccessToken));
    }

    #[test]
    fn test_request_url_rejects_bad_base_url() {
        let err = options().base_url("not a url").request_url().unwrap_err();
        assert!(matches!(err, RouteOptionsError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_query_values_are_encoded() {
        let url = options()
            .language("pt BR")
            .access_token("pk.a&b=c")
            .request_url()
            .unwrap();
        assert!(url.contains("&language=pt+BR&"), "{}", url);
        assert!(url.ends_with("&access_token=pk.a%26b%3Dc"), "{}", url);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(
            "driving-traffic".parse::<RoutingProfile>(),
            Ok(RoutingProfile::DrivingTraffic)
        );
        assert_eq!("Cycling".parse::<RoutingProfile>(), Ok(RoutingProfile::Cycling));
        assert!("flying".parse::<RoutingProfile>().is_err());
    }
}
