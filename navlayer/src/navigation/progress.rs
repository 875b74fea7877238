//! Route progress tracking.
//!
//! Progress is derived from raw locations only: the tracker keeps a cursor on
//! the current step and advances it once the device comes within the arrival
//! radius of the next maneuver point. There is no map matching; the location
//! is assumed to be on the route.

use super::route::{DirectionsRoute, LegStep, Location, RouteProgress};

/// Default distance at which a maneuver counts as reached, in meters.
pub const DEFAULT_ARRIVAL_RADIUS_M: f64 = 20.0;

/// Cursor over the steps of a single route.
#[derive(Debug, Clone)]
pub struct RouteProgressTracker {
    route: DirectionsRoute,
    leg_index: usize,
    step_index: usize,
    arrival_radius_m: f64,
    arrived: bool,
}

impl RouteProgressTracker {
    pub fn new(route: DirectionsRoute, arrival_radius_m: f64) -> Self {
        let arrived = route.step_count() == 0;
        Self {
            route,
            leg_index: 0,
            step_index: 0,
            arrival_radius_m,
            arrived,
        }
    }

    pub fn route(&self) -> &DirectionsRoute {
        &self.route
    }

    /// Flattened position of the current step, for comparisons.
    pub fn position(&self) -> (usize, usize) {
        (self.leg_index, self.step_index)
    }

    fn next_position(&self) -> Option<(usize, usize)> {
        let leg = self.route.legs.get(self.leg_index)?;
        if self.step_index + 1 < leg.steps.len() {
            return Some((self.leg_index, self.step_index + 1));
        }
        // First non-empty following leg
        (self.leg_index + 1..self.route.legs.len())
            .find(|&i| !self.route.legs[i].steps.is_empty())
            .map(|i| (i, 0))
    }

    fn step_at(&self, (leg, step): (usize, usize)) -> Option<&LegStep> {
        self.route.legs.get(leg).and_then(|l| l.steps.get(step))
    }

    /// Sum of step distances after `position`, in route order.
    fn distance_after(&self, (leg, step): (usize, usize)) -> f64 {
        self.route
            .legs
            .iter()
            .enumerate()
            .skip(leg)
            .flat_map(|(i, l)| {
                let skip = if i == leg { step } else { 0 };
                l.steps.iter().skip(skip).map(|s| s.distance)
            })
            .sum()
    }

    /// Advances with a new location and returns the resulting progress.
    pub fn update(&mut self, location: &Location) -> RouteProgress {
        while !self.arrived {
            let Some(next) = self.next_position() else {
                break;
            };
            let Some(next_step) = self.step_at(next) else {
                break;
            };

            let distance = location.point.distance_to(&next_step.maneuver.location);
            if distance > self.arrival_radius_m {
                break;
            }

            self.leg_index = next.0;
            self.step_index = next.1;
            tracing::debug!(
                leg = self.leg_index,
                step = self.step_index,
                distance_m = distance,
                "Advanced to next step"
            );

            if self.next_position().is_none() {
                self.arrived = true;
                tracing::info!("Arrived at destination");
            }
        }

        // The cursor already sits on the final step, e.g. a single-step route
        if !self.arrived && self.next_position().is_none() {
            if let Some(last) = self.step_at(self.position()) {
                let distance = location.point.distance_to(&last.maneuver.location);
                if distance <= self.arrival_radius_m {
                    self.arrived = true;
                    tracing::info!(distance_m = distance, "Arrived at destination");
                }
            }
        }

        self.snapshot(location)
    }

    fn snapshot(&self, location: &Location) -> RouteProgress {
        let (to_next, after_next) = match self.next_position().and_then(|p| Some((p, self.step_at(p)?))) {
            Some((position, step)) => (
                location.point.distance_to(&step.maneuver.location),
                self.distance_after(position),
            ),
            None => (0.0, 0.0),
        };

        RouteProgress {
            route: self.route.clone(),
            leg_index: self.leg_index,
            step_index: self.step_index,
            distance_to_next_maneuver_m: to_next,
            distance_remaining_m: to_next + after_next,
            arrived: self.arrived,
        }
    }
}
