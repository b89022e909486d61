//! License configuration.

use serde::{Deserialize, Serialize};

/// License tier for capability gating. Ordered: Community < Pro < Enterprise.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    #[default]
    Community,
    Pro,
    Enterprise,
}

impl LicenseTier {
    /// All tiers in ascending order.
    pub const ALL: [LicenseTier; 3] = [Self::Community, Self::Pro, Self::Enterprise];

    /// Tier name as used in claims, config and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parse a tier name. Exact lowercase match only.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "community" => Some(Self::Community),
            "pro" => Some(Self::Pro),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Position in [`LicenseTier::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Community => 0,
            Self::Pro => 1,
            Self::Enterprise => 2,
        }
    }
}

impl std::fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the licensing subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LicenseConfig {
    /// Expected `iss` claim. Unset = any issuer accepted once signed.
    pub issuer: Option<String>,
    /// Expected `aud` claim. Unset = any audience accepted once signed.
    pub audience: Option<String>,
    /// Base64 (standard alphabet) Ed25519 public key, 32 bytes decoded.
    pub public_key: Option<String>,
    /// Max cached verification entries. Default: 1024. 0 disables the cache.
    pub cache_capacity: Option<u64>,
    /// Verification cache TTL in seconds. Default: 300.
    pub cache_ttl_secs: Option<u64>,
}

impl LicenseConfig {
    /// Returns the effective cache capacity, defaulting to 1024.
    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(1024)
    }

    /// Returns the effective cache TTL, defaulting to 300 seconds.
    pub fn effective_cache_ttl_secs(&self) -> u64 {
        self.cache_ttl_secs.unwrap_or(300)
    }
}
