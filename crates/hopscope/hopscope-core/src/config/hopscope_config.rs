//! Top-level hopscope configuration with layered resolution.

use serde::{Deserialize, Serialize};

use super::{LicenseConfig, LicenseTier, SearchConfig, TierTableConfig};
use crate::errors::ConfigError;
use crate::licensing::{decode_public_key, TierPolicyRegistry};

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (`ConfigOverrides`)
/// 2. Environment variables (`HOPSCOPE_*`)
/// 3. TOML text handed over by the host
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HopscopeConfig {
    pub licensing: LicenseConfig,
    pub search: SearchConfig,
    pub tiers: TierTableConfig,
}

/// Host-supplied overrides applied after every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub license_issuer: Option<String>,
    pub license_audience: Option<String>,
    pub license_public_key: Option<String>,
    pub search_time_budget_ms: Option<u64>,
    pub search_max_expansions: Option<usize>,
}

impl HopscopeConfig {
    /// Resolve configuration from TOML text, the process environment and
    /// overrides, then validate the result.
    pub fn resolve(
        toml_text: Option<&str>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with_env(toml_text, overrides, |key| std::env::var(key).ok())
    }

    /// Same as [`HopscopeConfig::resolve`] with an explicit environment lookup.
    pub fn resolve_with_env<F>(
        toml_text: Option<&str>,
        overrides: Option<&ConfigOverrides>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match toml_text {
            Some(text) => Self::from_toml(text)?,
            None => Self::default(),
        };

        Self::apply_env_overrides(&mut config, env);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string. Unknown keys are ignored.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            source_name: "<toml>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &HopscopeConfig) -> Result<(), ConfigError> {
        if let Some(score) = config.search.semantic_min_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(ConfigError::ValidationFailed {
                    field: "search.semantic_min_score".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if config.search.time_budget_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "search.time_budget_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.search.budget_check_interval == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "search.budget_check_interval".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.licensing.cache_ttl_secs == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "licensing.cache_ttl_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(ref key) = config.licensing.public_key {
            decode_public_key(key)?;
        }
        TierPolicyRegistry::from_config(&config.tiers)?;
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Pattern: `HOPSCOPE_LICENSE_ISSUER`, `HOPSCOPE_SEARCH_TIME_BUDGET_MS`, etc.
    fn apply_env_overrides<F>(config: &mut HopscopeConfig, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env("HOPSCOPE_LICENSE_ISSUER") {
            config.licensing.issuer = Some(val);
        }
        if let Some(val) = env("HOPSCOPE_LICENSE_AUDIENCE") {
            config.licensing.audience = Some(val);
        }
        if let Some(val) = env("HOPSCOPE_LICENSE_PUBLIC_KEY") {
            config.licensing.public_key = Some(val);
        }
        if let Some(val) = env("HOPSCOPE_SEARCH_TIME_BUDGET_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.search.time_budget_ms = Some(v);
            }
        }
        if let Some(val) = env("HOPSCOPE_SEARCH_MAX_EXPANSIONS") {
            if let Ok(v) = val.parse::<usize>() {
                config.search.max_expansions = Some(v);
            }
        }
        if let Some(val) = env("HOPSCOPE_SEMANTIC_MIN_SCORE") {
            if let Ok(v) = val.parse::<f64>() {
                config.search.semantic_min_score = Some(v);
            }
        }
        for tier in LicenseTier::ALL {
            let upper = tier.as_str().to_ascii_uppercase();
            if let Some(val) = env(&format!("HOPSCOPE_TIER_{upper}_MAX_HOPS")) {
                if let Ok(v) = val.parse::<u32>() {
                    config.tiers.for_tier_mut(tier).max_hops = Some(v);
                }
            }
            if let Some(val) = env(&format!("HOPSCOPE_TIER_{upper}_MAX_NODES")) {
                if let Ok(v) = val.parse::<usize>() {
                    config.tiers.for_tier_mut(tier).max_nodes = Some(v);
                }
            }
        }
    }

    /// Apply host overrides (highest priority).
    fn apply_overrides(config: &mut HopscopeConfig, overrides: &ConfigOverrides) {
        if let Some(ref v) = overrides.license_issuer {
            config.licensing.issuer = Some(v.clone());
        }
        if let Some(ref v) = overrides.license_audience {
            config.licensing.audience = Some(v.clone());
        }
        if let Some(ref v) = overrides.license_public_key {
            config.licensing.public_key = Some(v.clone());
        }
        if let Some(v) = overrides.search_time_budget_ms {
            config.search.time_budget_ms = Some(v);
        }
        if let Some(v) = overrides.search_max_expansions {
            config.search.max_expansions = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            source_name: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}
