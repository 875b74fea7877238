//! Route model decoded from directions responses.

use serde::{Deserialize, Serialize};

use crate::maneuver::{self, DrivingSide, ManeuverModifier, ManeuverType, ResolvedIcon};

/// Mean Earth radius used for haversine distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Point::new(value[0], value[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.longitude, point.latitude]
    }
}

impl std::str::FromStr for Point {
    type Err = String;

    /// Parses `"lon,lat"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'lon,lat', got '{}'", s))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude '{}'", lon))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude '{}'", lat))?;

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude out of range: {}", longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude out of range: {}", latitude));
        }
        Ok(Point::new(longitude, latitude))
    }
}

/// Device location sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub point: Point,
    /// Heading in degrees clockwise from north.
    #[serde(default)]
    pub bearing: Option<f64>,
    /// Speed in meters per second.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Horizontal accuracy in meters.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl Location {
    pub fn new(point: Point, timestamp_ms: i64) -> Self {
        Self {
            point,
            bearing: None,
            speed: None,
            accuracy: None,
            timestamp_ms,
        }
    }
}

/// Maneuver at the start of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepManeuver {
    pub location: Point,
    #[serde(rename = "type", default)]
    pub maneuver_type: Option<String>,
    #[serde(default)]
    pub modifier: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub bearing_before: Option<f64>,
    #[serde(default)]
    pub bearing_after: Option<f64>,
}

/// A component of a banner instruction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Component type carrying a junction (guidance view) image.
pub const GUIDANCE_VIEW_COMPONENT: &str = "guidance-view";

/// One line of a banner instruction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BannerText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub components: Vec<BannerComponent>,
}

/// Visual instruction shown ahead of a maneuver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInstruction {
    #[serde(default)]
    pub distance_along_geometry: f64,
    #[serde(default)]
    pub primary: BannerText,
    #[serde(default)]
    pub view: Option<BannerText>,
}

/// One instruction of a route leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegStep {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub driving_side: Option<String>,
    pub maneuver: StepManeuver,
    #[serde(rename = "bannerInstructions", default)]
    pub banner_instructions: Vec<BannerInstruction>,
}

impl LegStep {
    /// Icon and mirroring for this step's maneuver.
    ///
    /// Ramps, forks and roundabouts keep their own icon whatever the
    /// modifier says; the modifier still decides mirroring.
    pub fn maneuver_icon(&self) -> ResolvedIcon {
        let maneuver_type = ManeuverType::parse_opt(self.maneuver.maneuver_type.as_deref());
        let modifier = ManeuverModifier::parse_opt(self.maneuver.modifier.as_deref());
        let driving_side = DrivingSide::from_wire(self.driving_side.as_deref());

        let icon_modifier = if maneuver_type.is_some_and(|t| t.ignores_modifier()) {
            None
        } else {
            modifier
        };
        ResolvedIcon {
            icon: maneuver::resolve_icon(maneuver_type, icon_modifier),
            flip: maneuver::should_flip(maneuver_type, modifier, driving_side),
        }
    }

    /// The junction image referenced by this step's banners, if any.
    pub fn guidance_image_url(&self) -> Option<&str> {
        self.banner_instructions
            .iter()
            .filter_map(|banner| banner.view.as_ref())
            .flat_map(|view| view.components.iter())
            .filter(|c| c.component_type == GUIDANCE_VIEW_COMPONENT)
            .find_map(|c| c.image_url.as_deref())
    }
}

/// Route between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<LegStep>,
}

/// A complete route as returned by the directions service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub geometry: Option<String>,
    #[serde(default)]
    pub weight_name: Option<String>,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

impl DirectionsRoute {
    /// Total number of steps across all legs.
    pub fn step_count(&self) -> usize {
        self.legs.iter().map(|leg| leg.steps.len()).sum()
    }
}

/// Top-level directions response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

/// Navigation state along the active route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteProgress {
    pub route: DirectionsRoute,
    pub leg_index: usize,
    pub step_index: usize,
    /// Distance from the current location to the next maneuver, in meters.
    pub distance_to_next_maneuver_m: f64,
    /// Estimated distance left to the final destination, in meters.
    pub distance_remaining_m: f64,
    /// True once the last maneuver of the last leg has been reached.
    pub arrived: bool,
}

impl RouteProgress {
    /// The step currently being driven.
    pub fn current_step(&self) -> Option<&LegStep> {
        self.route
            .legs
            .get(self.leg_index)
            .and_then(|leg| leg.steps.get(self.step_index))
    }

    /// The step whose maneuver comes next.
    pub fn upcoming_step(&self) -> Option<&LegStep> {
        let leg = self.route.legs.get(self.leg_index)?;
        leg.steps.get(self.step_index + 1).or_else(|| {
            self.route
                .legs
                .get(self.leg_index + 1)
                .and_then(|next| next.steps.first())
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn step(
        lon: f64,
        lat: f64,
        maneuver_type: &str,
        modifier: Option<&str>,
        distance: f64,
    ) -> LegStep {
        LegStep {
            distance,
            duration: distance / 10.0,
            name: String::new(),
            driving_side: Some("right".to_string()),
            maneuver: StepManeuver {
                location: Point::new(lon, lat),
                maneuver_type: Some(maneuver_type.to_string()),
                modifier: modifier.map(str::to_string),
                instruction: None,
                bearing_before: None,
                bearing_after: None,
            },
            banner_instructions: Vec::new(),
        }
    }

    /// Three-step route heading north along a meridian.
    pub fn straight_route() -> DirectionsRoute {
        let steps = vec![
            step(13.0, 52.0, "depart", None, 1112.0),
            step(13.0, 52.01, "turn", Some("right"), 1112.0),
            step(13.0, 52.02, "arrive", None, 0.0),
        ];
        DirectionsRoute {
            distance: 2224.0,
            duration: 222.4,
            geometry: None,
            weight_name: None,
            legs: vec![RouteLeg {
                distance: 2224.0,
                duration: 222.4,
                summary: "Test".to_string(),
                steps,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE_JSON: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 1200.5,
            "duration": 140.2,
            "geometry": "abc",
            "weight_name": "auto",
            "legs": [{
                "distance": 1200.5,
                "duration": 140.2,
                "summary": "Main St",
                "steps": [{
                    "distance": 800.0,
                    "duration": 90.0,
                    "name": "Main St",
                    "driving_side": "left",
                    "maneuver": {
                        "location": [-0.1276, 51.5072],
                        "type": "turn",
                        "modifier": "uturn",
                        "bearing_before": 0,
                        "bearing_after": 180
                    },
                    "bannerInstructions": [{
                        "distanceAlongGeometry": 800.0,
                        "primary": {"text": "Main St", "components": []},
                        "view": {
                            "text": "",
                            "components": [{
                                "type": "guidance-view",
                                "text": "",
                                "imageURL": "https://images.example.com/jct/1"
                            }]
                        }
                    }]
                }]
            }]
        }]
    }"#;

    #[test]
    fn test_decode_response() {
        let response: DirectionsResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        assert_eq!(response.code, "Ok");
        assert_eq!(response.routes.len(), 1);

        let step = &response.routes[0].legs[0].steps[0];
        assert_eq!(step.maneuver.location, Point::new(-0.1276, 51.5072));
        assert_eq!(step.maneuver.maneuver_type.as_deref(), Some("turn"));
        assert_eq!(
            step.guidance_image_url(),
            Some("https://images.example.com/jct/1")
        );
    }

    #[test]
    fn test_step_icon_left_hand_uturn() {
        let response: DirectionsResponse = serde_json::from_str(RESPONSE_JSON).unwrap();
        let icon = response.routes[0].legs[0].steps[0].maneuver_icon();
        assert_eq!(icon.icon, maneuver::ManeuverIcon::Arrow180Right);
        assert!(!icon.flip);
    }

    #[test]
    fn test_fork_keeps_fork_icon() {
        let mut fork = fixtures::step(13.0, 52.0, "fork", Some("slight left"), 100.0);
        let icon = fork.maneuver_icon();
        assert_eq!(icon.icon, maneuver::ManeuverIcon::Fork);
        assert!(icon.flip);

        fork.maneuver.maneuver_type = Some("turn".to_string());
        assert_eq!(fork.maneuver_icon().icon, maneuver::ManeuverIcon::ArrowSlightRight);
    }

    #[test]
    fn test_point_distance() {
        // 0.01° of latitude is roughly 1112 m
        let a = Point::new(13.0, 52.0);
        let b = Point::new(13.0, 52.01);
        let d = a.distance_to(&b);
        assert!((d - 1112.0).abs() < 5.0, "distance {}", d);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_point_parse() {
        let p: Point = "13.4, 52.5".parse().unwrap();
        assert_eq!(p, Point::new(13.4, 52.5));
        assert!("13.4".parse::<Point>().is_err());
        assert!("200,0".parse::<Point>().is_err());
        assert!("0,x".parse::<Point>().is_err());
    }

    #[test]
    fn test_progress_steps() {
        let progress = RouteProgress {
            route: fixtures::straight_route(),
            leg_index: 0,
            step_index: 1,
            distance_to_next_maneuver_m: 0.0,
            distance_remaining_m: 0.0,
            arrived: false,
        };
        assert_eq!(
            progress.current_step().unwrap().maneuver.maneuver_type.as_deref(),
            Some("turn")
        );
        assert_eq!(
            progress.upcoming_step().unwrap().maneuver.maneuver_type.as_deref(),
            Some("arrive")
        );
    }
}
