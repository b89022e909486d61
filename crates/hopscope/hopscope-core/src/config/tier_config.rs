//! Tier policy table configuration.

use serde::{Deserialize, Serialize};

use super::LicenseTier;

/// Per-tier overrides. Unset fields keep the compiled default.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TierLimitsConfig {
    pub max_hops: Option<u32>,
    pub max_nodes: Option<usize>,
    /// Full capability list for the tier, by name (e.g. "semantic_neighbors").
    pub capabilities: Option<Vec<String>>,
}

/// The `[tiers]` table.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TierTableConfig {
    pub community: TierLimitsConfig,
    pub pro: TierLimitsConfig,
    pub enterprise: TierLimitsConfig,
}

impl TierTableConfig {
    /// Overrides for one tier.
    pub fn for_tier(&self, tier: LicenseTier) -> &TierLimitsConfig {
        match tier {
            LicenseTier::Community => &self.community,
            LicenseTier::Pro => &self.pro,
            LicenseTier::Enterprise => &self.enterprise,
        }
    }

    pub(crate) fn for_tier_mut(&mut self, tier: LicenseTier) -> &mut TierLimitsConfig {
        match tier {
            LicenseTier::Community => &mut self.community,
            LicenseTier::Pro => &mut self.pro,
            LicenseTier::Enterprise => &mut self.enterprise,
        }
    }
}
