//! Application configuration for `SimpleNavigationApp`.
//!
//! `AppConfig` gathers everything needed to assemble the navigation stack
//! from the user's `ConfigFile`, so CLI code does not translate settings
//! itself.

use std::path::PathBuf;

use super::error::AppError;
use crate::accounts::BillingModel;
use crate::config::ConfigFile;
use crate::navigation::{
    NavigationConfig, RouteOptions, RoutingProfile, DEFAULT_ARRIVAL_RADIUS_M, DEFAULT_BASE_URL,
};

/// Zoom level applied when the map becomes ready.
pub const DEFAULT_ZOOM: f64 = 15.0;

/// Application configuration combining all component settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Access token for the directions service.
    pub access_token: String,

    /// Directions service base URL.
    pub base_url: String,

    /// Profile used for long-click route requests.
    pub profile: RoutingProfile,

    /// Whether to ask for alternative routes.
    pub alternatives: bool,

    /// Session settings.
    pub navigation: NavigationConfig,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// How navigation is billed.
    pub billing_model: BillingModel,

    /// INI file holding billing tokens.
    pub token_store: PathBuf,
}

impl AppConfig {
    /// Creates a config with defaults for everything but the token.
    pub fn new(access_token: impl Into<String>, token_store: PathBuf) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: RoutingProfile::DrivingTraffic,
            alternatives: true,
            navigation: NavigationConfig {
                arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_M,
            },
            timeout_secs: crate::directions::DEFAULT_TIMEOUT_SECS,
            billing_model: BillingModel::Mau,
            token_store,
        }
    }

    /// Builds the application config from the user's configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if no access token is configured.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        let access_token = config
            .navigation
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "navigation.access_token is not set (use 'navlayer config set')".to_string(),
                )
            })?;

        Ok(Self {
            access_token,
            base_url: config.navigation.base_url.clone(),
            profile: config.navigation.profile,
            alternatives: config.navigation.alternatives,
            navigation: NavigationConfig {
                arrival_radius_m: config.navigation.arrival_radius_m,
            },
            timeout_secs: config.navigation.timeout_secs,
            billing_model: BillingModel::from_manage_sku(config.accounts.manage_sku),
            token_store: config.accounts.token_store.clone(),
        })
    }

    /// Sets the billing model.
    pub fn with_billing_model(mut self, billing_model: BillingModel) -> Self {
        self.billing_model = billing_model;
        self
    }

    /// Base route options: defaults applied, token and profile set.
    pub fn route_options(&self) -> RouteOptions {
        RouteOptions::new()
            .apply_default_params()
            .base_url(self.base_url.clone())
            .access_token(self.access_token.clone())
            .profile(self.profile)
            .alternatives(self.alternatives)
    }
}
