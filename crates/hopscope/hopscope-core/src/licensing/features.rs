//! Gated capabilities and the capability set carried by each tier policy.
//!
//! Community: neighborhood search, confidence filtering
//! Pro: + semantic neighbor inference
//! Enterprise: + predicate query language

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::license_config::LicenseTier;

/// All gated capabilities in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    // ── Community ──────────────────────────────────────────────
    NeighborhoodSearch,
    ConfidenceFilter,

    // ── Pro ────────────────────────────────────────────────────
    SemanticNeighbors,

    // ── Enterprise ─────────────────────────────────────────────
    QueryLanguage,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Capability; 4] = [
        Self::NeighborhoodSearch,
        Self::ConfidenceFilter,
        Self::SemanticNeighbors,
        Self::QueryLanguage,
    ];

    /// Capabilities every tier must carry; search cannot run without them.
    pub const BASE: [Capability; 2] = [Self::NeighborhoodSearch, Self::ConfidenceFilter];

    /// Tier that grants this capability in the compiled default table.
    /// Runtime gating goes through `TierPolicyRegistry::min_tier_for`.
    pub fn default_min_tier(&self) -> LicenseTier {
        match self {
            Self::NeighborhoodSearch | Self::ConfidenceFilter => LicenseTier::Community,
            Self::SemanticNeighbors => LicenseTier::Pro,
            Self::QueryLanguage => LicenseTier::Enterprise,
        }
    }

    /// Capability name as string (for config, logging, responses).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeighborhoodSearch => "neighborhood_search",
            Self::ConfidenceFilter => "confidence_filter",
            Self::SemanticNeighbors => "semantic_neighbors",
            Self::QueryLanguage => "query_language",
        }
    }

    /// Parse capability from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "neighborhood_search" => Some(Self::NeighborhoodSearch),
            "confidence_filter" => Some(Self::ConfidenceFilter),
            "semantic_neighbors" => Some(Self::SemanticNeighbors),
            "query_language" => Some(Self::QueryLanguage),
            _ => None,
        }
    }

    /// One-line reason used in upgrade hints.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NeighborhoodSearch => "Bounded k-hop neighborhood search",
            Self::ConfidenceFilter => "Edge confidence threshold filtering",
            Self::SemanticNeighbors => "Similarity-based neighbor inference",
            Self::QueryLanguage => "WHERE / ORDER BY / LIMIT predicate queries over results",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of capabilities. Iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_superset(&self, other: &CapabilitySet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Capability names in stable order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.as_str().to_string()).collect()
    }

    /// Capabilities granted to `tier` by the compiled default table.
    pub fn default_for(tier: LicenseTier) -> Self {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| c.default_min_tier() <= tier)
            .collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sets_are_nested() {
        let community = CapabilitySet::default_for(LicenseTier::Community);
        let pro = CapabilitySet::default_for(LicenseTier::Pro);
        let enterprise = CapabilitySet::default_for(LicenseTier::Enterprise);
        assert_eq!(community.len(), 2);
        assert_eq!(pro.len(), 3);
        assert_eq!(enterprise.len(), 4);
        assert!(pro.is_superset(&community));
        assert!(enterprise.is_superset(&pro));
    }

    #[test]
    fn capability_str_roundtrip() {
        for capability in Capability::ALL {
            assert_eq!(Capability::parse(capability.as_str()), Some(capability));
        }
        assert_eq!(Capability::parse("taint_analysis"), None);
    }
}
