//! `navlayer route`: request routes between two points.
//!
//! Drives the example application flow end to end: the origin becomes the
//! last known location, the destination is "long-clicked", and the
//! resulting routes are printed step by step with their maneuver icons.

use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use console::style;
use navlayer::app::{AppConfig, SimpleNavigationApp};
use navlayer::config::ConfigFile;
use navlayer::lifecycle::{Lifecycle, LifecycleEvent, LifecycleObserver};
use navlayer::navigation::{DirectionsRoute, Location, Point, RouteRequestOutcome, RoutingProfile};

use crate::error::CliError;

/// Arguments of the route command.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Origin as LON,LAT
    #[arg(long, value_name = "LON,LAT", allow_hyphen_values = true)]
    pub from: Point,

    /// Destination as LON,LAT
    #[arg(long, value_name = "LON,LAT", allow_hyphen_values = true)]
    pub to: Point,

    /// Also print alternative routes
    #[arg(long)]
    pub alternatives: bool,

    /// Routing profile (driving-traffic, driving, walking, cycling)
    #[arg(long)]
    pub profile: Option<RoutingProfile>,
}

/// Run the route command.
pub fn run(args: RouteArgs) -> Result<(), CliError> {
    let file = ConfigFile::load()?;
    let mut config = AppConfig::from_config_file(&file)?;
    if let Some(profile) = args.profile {
        config.profile = profile;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    // The blocking HTTP client must be created and dropped outside the runtime.
    let app = Arc::new(SimpleNavigationApp::start(config, runtime.handle().clone())?);
    let lifecycle = Lifecycle::new();
    let observer: Arc<dyn LifecycleObserver> = app.clone();
    lifecycle.add_observer(&observer);

    lifecycle.handle_event(LifecycleEvent::Create);
    lifecycle.handle_event(LifecycleEvent::Start);
    app.on_map_ready();
    app.navigation()
        .update_location(Location::new(args.from, Utc::now().timestamp_millis()));

    let outcome = match app.on_map_long_click(args.to) {
        Some(task) => runtime
            .block_on(task)
            .map_err(|e| CliError::Route(e.to_string())),
        None => Err(CliError::Route("origin location was not accepted".to_string())),
    };

    let result = outcome.and_then(|outcome| match outcome {
        RouteRequestOutcome::Ready(_) => {
            let routes = app.displayed_routes();
            let shown = if args.alternatives { routes.len() } else { 1 };
            for (index, route) in routes.iter().take(shown).enumerate() {
                print_route(index, route);
            }
            Ok(())
        }
        RouteRequestOutcome::Failed(e) => Err(CliError::Route(e.to_string())),
        RouteRequestOutcome::Canceled => Err(CliError::Route("request canceled".to_string())),
    });

    lifecycle.handle_event(LifecycleEvent::Stop);
    lifecycle.handle_event(LifecycleEvent::Destroy);
    result
}

fn print_route(index: usize, route: &DirectionsRoute) {
    let title = if index == 0 {
        "Primary route".to_string()
    } else {
        format!("Alternative {}", index)
    };
    println!(
        "{}: {:.1} km, {:.0} min",
        style(title).bold(),
        route.distance / 1000.0,
        route.duration / 60.0
    );

    for (leg_index, leg) in route.legs.iter().enumerate() {
        if route.legs.len() > 1 {
            println!("  Leg {}: {}", leg_index + 1, leg.summary);
        }
        for step in &leg.steps {
            let instruction = step
                .maneuver
                .instruction
                .as_deref()
                .unwrap_or(step.name.as_str());
            println!(
                "  {:>7.0} m  {:<28} {}",
                step.distance,
                style(step.maneuver_icon()).cyan(),
                instruction
            );
        }
    }
    println!();
}
