//! Billing (SKU) tokens for service requests
//!
//! Requests to the directions and image services carry a `sku` query
//! parameter identifying how the session is billed. Two billing models exist:
//!
//! - **MAU**: monthly active users; one token valid for an hour and reused
//!   across requests.
//! - **Trips**: per navigation session; a fresh token for every trip,
//!   discarded when the trip ends.
//!
//! Tokens are persisted in a [`TokenStore`] so that they survive restarts
//! within their validity window.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use navlayer::accounts::{BillingModel, MemoryTokenStore, NavigationAccounts};
//!
//! let store = Arc::new(MemoryTokenStore::with_entries([
//!     ("navigation.accounts.mau.skutoken", "abc"),
//! ]));
//! let accounts = NavigationAccounts::new(store, BillingModel::Mau);
//!
//! assert_eq!(
//!     accounts.obtain_sku_token(Some("https://api.example.com/route?a=1"), 3),
//!     "https://api.example.com/route?a=1&sku=abc"
//! );
//! ```

mod store;
mod token;

pub use store::{IniTokenStore, MemoryTokenStore, TokenStore, TokenStoreError, STORE_SECTION};
pub use token::{DigestTokenGenerator, TokenGenerator, TOKEN_LENGTH};

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

/// Query parameter carrying the token.
pub const SKU_QUERY_PARAM: &str = "sku";

/// How long an MAU token stays valid.
pub const MAU_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Billing model selecting which persisted token is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BillingModel {
    #[default]
    Mau,
    Trips,
}

impl BillingModel {
    /// Maps the `manage_sku` configuration flag to a billing model.
    ///
    /// Only an explicit `true` selects trip billing.
    pub fn from_manage_sku(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => BillingModel::Trips,
            _ => BillingModel::Mau,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingModel::Mau => "mau",
            BillingModel::Trips => "trips",
        }
    }

    /// Storage key of this model's token.
    pub fn token_key(&self) -> &'static str {
        match self {
            BillingModel::Mau => "navigation.accounts.mau.skutoken",
            BillingModel::Trips => "navigation.accounts.trips.skutoken",
        }
    }

    /// Storage key of the time this model's token was issued.
    pub fn timestamp_key(&self) -> &'static str {
        match self {
            BillingModel::Mau => "navigation.accounts.mau.timestamp",
            BillingModel::Trips => "navigation.accounts.trips.timestamp",
        }
    }
}

impl fmt::Display for BillingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a resource URL with a billing token.
///
/// - missing or empty URL, or negative `query_size`: the bare token;
/// - `query_size == 0` (URL has no query yet): `url?sku=token`;
/// - otherwise: `url&sku=token`.
pub fn append_sku_token(resource_url: Option<&str>, query_size: i32, token: &str) -> String {
    match resource_url {
        Some(url) if !url.is_empty() && query_size >= 0 => {
            let separator = if query_size == 0 { '?' } else { '&' };
            format!("{}{}{}={}", url, separator, SKU_QUERY_PARAM, token)
        }
        _ => token.to_string(),
    }
}

/// Reads, formats and rotates SKU tokens.
pub struct NavigationAccounts {
    store: Arc<dyn TokenStore>,
    billing_model: BillingModel,
    generator: Box<dyn TokenGenerator>,
    mau_ttl: Duration,
}

impl fmt::Debug for NavigationAccounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationAccounts")
            .field("billing_model", &self.billing_model)
            .field("mau_ttl", &self.mau_ttl)
            .finish_non_exhaustive()
    }
}

impl NavigationAccounts {
    /// Creates the accounts component over `store` with the default token
    /// generator.
    pub fn new(store: Arc<dyn TokenStore>, billing_model: BillingModel) -> Self {
        Self {
            store,
            billing_model,
            generator: Box::new(DigestTokenGenerator::new()),
            mau_ttl: Duration::seconds(MAU_TOKEN_TTL_SECS),
        }
    }

    /// Replaces the token generator.
    pub fn with_generator(mut self, generator: impl TokenGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Overrides the MAU token lifetime.
    pub fn with_mau_ttl(mut self, ttl: Duration) -> Self {
        self.mau_ttl = ttl;
        self
    }

    pub fn billing_model(&self) -> BillingModel {
        self.billing_model
    }

    /// The persisted token for the configured billing model, or an empty
    /// string when none has been issued.
    pub fn current_token(&self) -> String {
        self.token(self.billing_model).unwrap_or_default()
    }

    /// The persisted token for `model`, if one has been issued.
    pub fn token(&self, model: BillingModel) -> Option<String> {
        self.store.get(model.token_key()).filter(|t| !t.is_empty())
    }

    /// Returns the resource URL with the billing token appended, or the
    /// bare token. See [`append_sku_token`] for the exact rules.
    pub fn obtain_sku_token(&self, resource_url: Option<&str>, query_size: i32) -> String {
        let token = self.current_token();
        if token.is_empty() {
            tracing::debug!(model = %self.billing_model, "No SKU token issued yet");
        }
        append_sku_token(resource_url, query_size, &token)
    }

    /// Issues an MAU token if none exists or the stored one has expired.
    ///
    /// Returns true if a new token was issued.
    pub fn initialize_sku(&self, now: DateTime<Utc>) -> bool {
        if self.mau_token_valid(now) {
            return false;
        }
        self.issue(BillingModel::Mau, now);
        true
    }

    /// Called when a trip session starts.
    ///
    /// Trip billing issues a new token for every session; MAU billing only
    /// refreshes an expired token.
    pub fn navigation_started(&self, now: DateTime<Utc>) {
        match self.billing_model {
            BillingModel::Trips => self.issue(BillingModel::Trips, now),
            BillingModel::Mau => {
                self.initialize_sku(now);
            }
        }
    }

    /// Called when a trip session ends. The trip token is discarded.
    pub fn navigation_stopped(&self) {
        if self.billing_model != BillingModel::Trips {
            return;
        }
        for key in [
            BillingModel::Trips.token_key(),
            BillingModel::Trips.timestamp_key(),
        ] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(error = %e, key, "Failed to remove trip token");
            }
        }
        tracing::debug!("Trip token discarded");
    }

    /// When the token for `model` was issued, if known.
    pub fn issued_at(&self, model: BillingModel) -> Option<DateTime<Utc>> {
        self.store
            .get(model.timestamp_key())
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    fn mau_token_valid(&self, now: DateTime<Utc>) -> bool {
        let has_token = self
            .store
            .get(BillingModel::Mau.token_key())
            .is_some_and(|t| !t.is_empty());
        match self.issued_at(BillingModel::Mau) {
            Some(issued) if has_token => now.signed_duration_since(issued) < self.mau_ttl,
            _ => false,
        }
    }

    fn issue(&self, model: BillingModel, now: DateTime<Utc>) {
        let token = self.generator.generate(model, now);
        let stamp = now.timestamp_millis().to_string();

        let result = self
            .store
            .set(model.token_key(), &token)
            .and_then(|_| self.store.set(model.timestamp_key(), &stamp));
        match result {
            Ok(()) => tracing::info!(model = %model, "Issued SKU token"),
            Err(e) => tracing::warn!(model = %model, error = %e, "Failed to persist SKU token"),
        }
    }
}
