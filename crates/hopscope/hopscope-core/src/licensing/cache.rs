//! Verification cache for byte-identical credentials.
//!
//! Only the time-independent step (signature + structure) is cached.
//! Expiry, not-before and revocation run on every resolution, so a cached
//! entry can never outlive its credential.

use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use moka::sync::Cache;

use crate::errors::CredentialError;

use super::credential::{LicenseClaims, LicenseCredential};

/// Outcome of signature verification for one credential.
pub type VerificationOutcome = Result<LicenseClaims, CredentialError>;

/// Trust anchor bytes plus raw credential text. A cache shared between
/// validators never hands one key's verdict to another.
type CacheKey = ([u8; 32], String);

/// Bounded, TTL-based cache keyed by trust anchor and raw credential text.
#[derive(Clone)]
pub struct ResolutionCache {
    inner: Cache<CacheKey, VerificationOutcome>,
}

impl ResolutionCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Return the cached outcome for `credential` under `key`, computing it
    /// with `verify` on a miss.
    pub fn get_or_verify<F>(
        &self,
        key: &VerifyingKey,
        credential: &LicenseCredential,
        verify: F,
    ) -> VerificationOutcome
    where
        F: FnOnce() -> VerificationOutcome,
    {
        self.inner
            .get_with((key.to_bytes(), credential.as_str().to_string()), verify)
    }

    /// Number of cached entries (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
