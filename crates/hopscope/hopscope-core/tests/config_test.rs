//! Configuration resolution tests: TOML parsing, env overrides, host
//! overrides and validation.

use std::collections::HashMap;

use ed25519_dalek::SigningKey;
use hopscope_core::config::{ConfigOverrides, HopscopeConfig};
use hopscope_core::errors::ConfigError;
use hopscope_core::licensing::{encode_public_key, LicenseValidator, TierPolicyRegistry};
use hopscope_core::LicenseTier;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env() -> impl Fn(&str) -> Option<String> {
    |_| None
}

fn public_key() -> String {
    encode_public_key(&SigningKey::from_bytes(&[5u8; 32]).verifying_key())
}

#[test]
fn defaults_without_any_layer() {
    let config = HopscopeConfig::resolve_with_env(None, None, no_env()).unwrap();
    assert_eq!(config.search.effective_time_budget_ms(), 2000);
    assert_eq!(config.search.effective_budget_check_interval(), 256);
    assert_eq!(config.search.effective_semantic_min_score(), 0.6);
    assert_eq!(config.search.effective_semantic_max_per_node(), 3);
    assert_eq!(config.licensing.effective_cache_capacity(), 1024);
    assert_eq!(config.licensing.effective_cache_ttl_secs(), 300);
    assert!(config.search.max_expansions.is_none());
}

#[test]
fn toml_sections_are_parsed() {
    let toml = format!(
        r#"
[licensing]
issuer = "hopscope-licensing"
audience = "hopscope"
public_key = "{}"

[search]
time_budget_ms = 500
semantic_min_score = 0.75

[tiers.pro]
max_hops = 5
max_nodes = 800
"#,
        public_key()
    );
    let config = HopscopeConfig::resolve_with_env(Some(&toml), None, no_env()).unwrap();
    assert_eq!(config.licensing.issuer.as_deref(), Some("hopscope-licensing"));
    assert_eq!(config.search.effective_time_budget_ms(), 500);
    assert_eq!(config.search.effective_semantic_min_score(), 0.75);

    let registry = TierPolicyRegistry::from_config(&config.tiers).unwrap();
    assert_eq!(registry.policy_for(LicenseTier::Pro).max_hops, 5);
    assert_eq!(registry.policy_for(LicenseTier::Pro).max_nodes, 800);
    assert_eq!(registry.policy_for(LicenseTier::Community).max_hops, 2);

    let validator = LicenseValidator::from_config(&config.licensing).unwrap();
    assert!(validator.cache().is_some());
}

#[test]
fn unknown_keys_are_ignored() {
    let config = HopscopeConfig::from_toml("[search]\ncolour = \"blue\"\n").unwrap();
    assert!(config.search.time_budget_ms.is_none());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = HopscopeConfig::from_toml("[search\ntime_budget_ms = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn env_overrides_toml() {
    let toml = "[search]\ntime_budget_ms = 500\n";
    let env = env_from(&[
        ("HOPSCOPE_SEARCH_TIME_BUDGET_MS", "750"),
        ("HOPSCOPE_LICENSE_ISSUER", "env-issuer"),
        ("HOPSCOPE_TIER_ENTERPRISE_MAX_NODES", "9000"),
        ("HOPSCOPE_SEARCH_MAX_EXPANSIONS", "not-a-number"),
    ]);
    let config = HopscopeConfig::resolve_with_env(Some(toml), None, env).unwrap();
    assert_eq!(config.search.time_budget_ms, Some(750));
    assert_eq!(config.licensing.issuer.as_deref(), Some("env-issuer"));
    assert_eq!(config.tiers.enterprise.max_nodes, Some(9000));
    // Unparseable values leave the lower layer untouched.
    assert!(config.search.max_expansions.is_none());
}

#[test]
fn host_overrides_win_over_env() {
    let env = env_from(&[("HOPSCOPE_SEARCH_TIME_BUDGET_MS", "750")]);
    let overrides = ConfigOverrides {
        search_time_budget_ms: Some(100),
        search_max_expansions: Some(10),
        license_audience: Some("override-aud".to_string()),
        ..Default::default()
    };
    let config = HopscopeConfig::resolve_with_env(None, Some(&overrides), env).unwrap();
    assert_eq!(config.search.time_budget_ms, Some(100));
    assert_eq!(config.search.max_expansions, Some(10));
    assert_eq!(config.licensing.audience.as_deref(), Some("override-aud"));
}

#[test]
fn validation_rejects_bad_values() {
    for toml in [
        "[search]\nsemantic_min_score = 1.5\n",
        "[search]\ntime_budget_ms = 0\n",
        "[search]\nbudget_check_interval = 0\n",
        "[licensing]\ncache_ttl_secs = 0\n",
        "[licensing]\npublic_key = \"not base64!\"\n",
        "[tiers.pro]\nmax_hops = 1\n",
        "[tiers.community]\nmax_nodes = 0\n",
    ] {
        let result = HopscopeConfig::resolve_with_env(Some(toml), None, no_env());
        assert!(result.is_err(), "expected rejection for {:?}", toml);
    }
}

#[test]
fn validator_requires_public_key() {
    let config = HopscopeConfig::default();
    let err = LicenseValidator::from_config(&config.licensing).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn toml_roundtrip_preserves_values() {
    let overrides = ConfigOverrides {
        license_issuer: Some("iss".to_string()),
        search_time_budget_ms: Some(42),
        ..Default::default()
    };
    let config = HopscopeConfig::resolve_with_env(None, Some(&overrides), no_env()).unwrap();
    let text = config.to_toml().unwrap();
    let reparsed = HopscopeConfig::from_toml(&text).unwrap();
    assert_eq!(reparsed.licensing.issuer.as_deref(), Some("iss"));
    assert_eq!(reparsed.search.time_budget_ms, Some(42));
}
