//! LicenseValidator: verify a credential and resolve the effective tier.
//!
//! Fail-closed: every failure resolves to Community with a reason. Nothing
//! here returns an error or panics on caller input.

use std::sync::Arc;
use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::license_config::{LicenseConfig, LicenseTier};
use crate::errors::ConfigError;

use super::cache::ResolutionCache;
use super::credential::{self, decode_public_key, LicenseClaims, LicenseCredential};

/// Injected revocation lookup. Must be synchronous and cheap; any list
/// fetching happens in the collaborator before it is handed over.
pub trait RevocationCheck: Send + Sync {
    fn is_revoked(&self, claims: &LicenseClaims) -> bool;
}

impl<F> RevocationCheck for F
where
    F: Fn(&LicenseClaims) -> bool + Send + Sync,
{
    fn is_revoked(&self, claims: &LicenseClaims) -> bool {
        self(claims)
    }
}

/// Why a resolution landed where it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionReason {
    NoCredential,
    SignatureInvalid,
    MissingClaim(&'static str),
    UnknownTier(String),
    IssuerMismatch,
    AudienceMismatch,
    NotYetValid,
    Expired,
    Revoked,
}

impl std::fmt::Display for ResolutionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCredential => f.write_str("no credential"),
            Self::SignatureInvalid => f.write_str("signature invalid"),
            Self::MissingClaim(name) => write!(f, "missing claim: {}", name),
            Self::UnknownTier(tier) => write!(f, "unknown tier: {}", tier),
            Self::IssuerMismatch => f.write_str("issuer mismatch"),
            Self::AudienceMismatch => f.write_str("audience mismatch"),
            Self::NotYetValid => f.write_str("not yet valid"),
            Self::Expired => f.write_str("expired"),
            Self::Revoked => f.write_str("revoked"),
        }
    }
}

/// Effective tier for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierResolution {
    pub tier: LicenseTier,
    pub valid: bool,
    pub reason: Option<ResolutionReason>,
}

impl TierResolution {
    fn granted(tier: LicenseTier) -> Self {
        Self {
            tier,
            valid: true,
            reason: None,
        }
    }

    fn anonymous() -> Self {
        Self {
            tier: LicenseTier::Community,
            valid: true,
            reason: Some(ResolutionReason::NoCredential),
        }
    }

    fn fallback(reason: ResolutionReason) -> Self {
        Self {
            tier: LicenseTier::Community,
            valid: false,
            reason: Some(reason),
        }
    }

    /// True when a supplied credential was rejected.
    pub fn is_fallback(&self) -> bool {
        !self.valid
    }
}

/// Stateless resolver from credential to tier. `Send + Sync`; share one
/// instance across all request workers.
pub struct LicenseValidator {
    verifying_key: VerifyingKey,
    expected_issuer: Option<String>,
    expected_audience: Option<String>,
    revocation: Option<Arc<dyn RevocationCheck>>,
    cache: Option<ResolutionCache>,
}

impl LicenseValidator {
    /// Validator trusting `verifying_key`, with no issuer/audience pinning,
    /// no revocation and no cache.
    pub fn new(verifying_key: VerifyingKey) -> Self {
        Self {
            verifying_key,
            expected_issuer: None,
            expected_audience: None,
            revocation: None,
            cache: None,
        }
    }

    /// Build from the `[licensing]` config section.
    pub fn from_config(config: &LicenseConfig) -> Result<Self, ConfigError> {
        let encoded = config
            .public_key
            .as_deref()
            .ok_or_else(|| ConfigError::ValidationFailed {
                field: "licensing.public_key".to_string(),
                message: "a trust anchor is required to verify credentials".to_string(),
            })?;
        let mut validator = Self::new(decode_public_key(encoded)?);
        validator.expected_issuer = config.issuer.clone();
        validator.expected_audience = config.audience.clone();
        let capacity = config.effective_cache_capacity();
        if capacity > 0 {
            validator.cache = Some(ResolutionCache::new(
                capacity,
                Duration::from_secs(config.effective_cache_ttl_secs()),
            ));
        }
        Ok(validator)
    }

    pub fn with_expected_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    pub fn with_expected_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    pub fn with_revocation(mut self, check: Arc<dyn RevocationCheck>) -> Self {
        self.revocation = Some(check);
        self
    }

    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&ResolutionCache> {
        self.cache.as_ref()
    }

    /// Resolve the effective tier. `now` is Unix seconds from the caller's clock.
    pub fn resolve(&self, credential: Option<&LicenseCredential>, now: u64) -> TierResolution {
        let Some(credential) = credential else {
            debug!("no license credential supplied, using community tier");
            return TierResolution::anonymous();
        };

        let verified = match &self.cache {
            Some(cache) => cache.get_or_verify(&self.verifying_key, credential, || {
                credential::verify_credential(credential, &self.verifying_key)
            }),
            None => credential::verify_credential(credential, &self.verifying_key),
        };

        let claims = match verified {
            Ok(claims) => claims,
            Err(err) => {
                warn!(
                    error = %err,
                    "license signature verification failed, downgrading to community"
                );
                return TierResolution::fallback(ResolutionReason::SignatureInvalid);
            }
        };

        let resolution = self.check_claims(&claims, now);
        match &resolution.reason {
            Some(reason) => warn!(
                jti = claims.jti.as_deref().unwrap_or("-"),
                reason = %reason,
                "license rejected, downgrading to community"
            ),
            None => info!(
                jti = claims.jti.as_deref().unwrap_or("-"),
                tier = resolution.tier.as_str(),
                "license accepted"
            ),
        }
        resolution
    }

    fn check_claims(&self, claims: &LicenseClaims, now: u64) -> TierResolution {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        if !present(&claims.sub) {
            return TierResolution::fallback(ResolutionReason::MissingClaim("sub"));
        }
        if !present(&claims.iss) {
            return TierResolution::fallback(ResolutionReason::MissingClaim("iss"));
        }
        if !present(&claims.aud) {
            return TierResolution::fallback(ResolutionReason::MissingClaim("aud"));
        }
        let Some(tier_name) = claims.tier.as_deref().filter(|t| !t.is_empty()) else {
            return TierResolution::fallback(ResolutionReason::MissingClaim("tier"));
        };
        let Some(tier) = LicenseTier::parse(tier_name) else {
            return TierResolution::fallback(ResolutionReason::UnknownTier(tier_name.to_string()));
        };

        if let Some(ref expected) = self.expected_issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return TierResolution::fallback(ResolutionReason::IssuerMismatch);
            }
        }
        if let Some(ref expected) = self.expected_audience {
            if claims.aud.as_deref() != Some(expected.as_str()) {
                return TierResolution::fallback(ResolutionReason::AudienceMismatch);
            }
        }

        // No grace period: expiry downgrades immediately.
        if claims.nbf.is_some_and(|nbf| now < nbf) {
            return TierResolution::fallback(ResolutionReason::NotYetValid);
        }
        if claims.exp.is_some_and(|exp| now >= exp) {
            return TierResolution::fallback(ResolutionReason::Expired);
        }

        if let Some(ref revocation) = self.revocation {
            if revocation.is_revoked(claims) {
                return TierResolution::fallback(ResolutionReason::Revoked);
            }
        }

        TierResolution::granted(tier)
    }
}

impl std::fmt::Debug for LicenseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseValidator")
            .field("expected_issuer", &self.expected_issuer)
            .field("expected_audience", &self.expected_audience)
            .field("revocation", &self.revocation.is_some())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
