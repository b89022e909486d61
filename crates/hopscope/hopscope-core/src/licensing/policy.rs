//! Tier policy registry: the immutable tier → limits/capabilities table.

use serde::Serialize;

use crate::config::license_config::LicenseTier;
use crate::config::tier_config::TierTableConfig;
use crate::errors::ConfigError;

use super::features::{Capability, CapabilitySet};

/// Limits and capabilities for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierPolicy {
    pub tier: LicenseTier,
    pub max_hops: u32,
    pub max_nodes: usize,
    pub capabilities: CapabilitySet,
}

impl TierPolicy {
    /// Compiled default policy for `tier`.
    pub fn default_for(tier: LicenseTier) -> Self {
        let (max_hops, max_nodes) = match tier {
            LicenseTier::Community => (2, 50),
            LicenseTier::Pro => (4, 500),
            LicenseTier::Enterprise => (8, 5000),
        };
        Self {
            tier,
            max_hops,
            max_nodes,
            capabilities: CapabilitySet::default_for(tier),
        }
    }

    /// Check if this policy grants a capability.
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Immutable table of the three tier policies.
///
/// Built once at startup and shared by reference (`Arc`). There is no
/// mutation API; tests build alternate registries instead of patching one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicyRegistry {
    policies: [TierPolicy; 3],
}

impl TierPolicyRegistry {
    /// Build a registry, enforcing that limits and capability sets never
    /// shrink from Community to Pro to Enterprise.
    pub fn new(
        community: TierPolicy,
        pro: TierPolicy,
        enterprise: TierPolicy,
    ) -> Result<Self, ConfigError> {
        let policies = [community, pro, enterprise];

        for (expected, policy) in LicenseTier::ALL.iter().zip(policies.iter()) {
            if policy.tier != *expected {
                return Err(ConfigError::InvalidValue {
                    field: format!("tiers.{}", expected),
                    message: format!("policy slot holds tier {}", policy.tier),
                });
            }
            if policy.max_nodes == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: format!("tiers.{}.max_nodes", expected),
                    message: "must be greater than 0".to_string(),
                });
            }
            for base in Capability::BASE {
                if !policy.allows(base) {
                    return Err(ConfigError::ValidationFailed {
                        field: format!("tiers.{}.capabilities", expected),
                        message: format!("must include {}", base),
                    });
                }
            }
        }

        for pair in policies.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            if higher.max_hops < lower.max_hops || higher.max_nodes < lower.max_nodes {
                return Err(ConfigError::ValidationFailed {
                    field: format!("tiers.{}", higher.tier),
                    message: format!("limits must not be lower than tier {}", lower.tier),
                });
            }
            if !higher.capabilities.is_superset(&lower.capabilities) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("tiers.{}.capabilities", higher.tier),
                    message: format!("must include every capability of tier {}", lower.tier),
                });
            }
        }

        Ok(Self { policies })
    }

    /// Registry with the compiled default table.
    pub fn defaults() -> Self {
        Self {
            policies: LicenseTier::ALL.map(TierPolicy::default_for),
        }
    }

    /// Build from the `[tiers]` config table layered over the defaults.
    pub fn from_config(config: &TierTableConfig) -> Result<Self, ConfigError> {
        let mut policies = LicenseTier::ALL.map(TierPolicy::default_for);

        for policy in policies.iter_mut() {
            let overrides = config.for_tier(policy.tier);
            if let Some(max_hops) = overrides.max_hops {
                policy.max_hops = max_hops;
            }
            if let Some(max_nodes) = overrides.max_nodes {
                policy.max_nodes = max_nodes;
            }
            if let Some(ref names) = overrides.capabilities {
                let mut capabilities = CapabilitySet::new();
                for name in names {
                    let capability =
                        Capability::parse(name).ok_or_else(|| ConfigError::InvalidValue {
                            field: format!("tiers.{}.capabilities", policy.tier),
                            message: format!("unknown capability '{}'", name),
                        })?;
                    capabilities.insert(capability);
                }
                policy.capabilities = capabilities;
            }
        }

        let [community, pro, enterprise] = policies;
        Self::new(community, pro, enterprise)
    }

    /// Policy for a tier. Total; never fails.
    pub fn policy_for(&self, tier: LicenseTier) -> &TierPolicy {
        &self.policies[tier.index()]
    }

    /// Lowest tier whose policy grants `capability`.
    pub fn min_tier_for(&self, capability: Capability) -> Option<LicenseTier> {
        self.policies
            .iter()
            .find(|p| p.allows(capability))
            .map(|p| p.tier)
    }

    /// Lowest tier above `tier` with a strictly larger hop limit.
    pub fn next_tier_with_more_hops(&self, tier: LicenseTier) -> Option<&TierPolicy> {
        let current = self.policy_for(tier).max_hops;
        self.policies
            .iter()
            .find(|p| p.tier > tier && p.max_hops > current)
    }

    /// Lowest tier above `tier` with a strictly larger node limit.
    pub fn next_tier_with_more_nodes(&self, tier: LicenseTier) -> Option<&TierPolicy> {
        let current = self.policy_for(tier).max_nodes;
        self.policies
            .iter()
            .find(|p| p.tier > tier && p.max_nodes > current)
    }

    /// All policies in ascending tier order.
    pub fn iter(&self) -> impl Iterator<Item = &TierPolicy> {
        self.policies.iter()
    }
}

impl Default for TierPolicyRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}
