//! SKU token generation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::BillingModel;

/// Length of a generated token in hex characters.
pub const TOKEN_LENGTH: usize = 32;

/// Produces fresh SKU tokens.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, model: BillingModel, now: DateTime<Utc>) -> String;
}

/// Generates tokens by hashing the model, time, a per-process seed and a
/// monotonically increasing counter.
#[derive(Debug)]
pub struct DigestTokenGenerator {
    seed: String,
    counter: AtomicU64,
}

impl DigestTokenGenerator {
    pub fn new() -> Self {
        Self::with_seed(format!("pid-{}", std::process::id()))
    }

    pub fn with_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for DigestTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator for DigestTokenGenerator {
    fn generate(&self, model: BillingModel, now: DateTime<Utc>) -> String {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut hasher = Sha256::new();
        hasher.update(model.as_str().as_bytes());
        hasher.update(now.timestamp_millis().to_be_bytes());
        hasher.update(count.to_be_bytes());
        hasher.update(self.seed.as_bytes());

        let digest = format!("{:x}", hasher.finalize());
        digest[..TOKEN_LENGTH].to_string()
    }
}
