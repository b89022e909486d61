//! Response assembly: tier metadata, warnings, upgrade hints, errors.

use hopscope_core::errors::NeighborhoodError;
use hopscope_core::licensing::{Capability, TierPolicyRegistry, TierResolution};
use hopscope_core::LicenseTier;
use serde::Serialize;

use crate::graph::GraphEdge;
use crate::neighborhood::{NeighborhoodRequest, NeighborhoodResult, NodeWithDepth, SearchWarning};

/// A feature or limit available at a higher tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeHint {
    pub required_tier: LicenseTier,
    pub feature: String,
    pub reason: String,
}

/// Error payload carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

impl From<&NeighborhoodError> for ErrorPayload {
    fn from(err: &NeighborhoodError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outbound response.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NeighborhoodResponse {
    pub nodes: Vec<NodeWithDepth>,
    pub edges: Vec<GraphEdge>,
    pub truncated: bool,
    pub hops_reached: u32,
    /// Omitted for Community.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<LicenseTier>,
    pub capabilities_applied: Vec<String>,
    pub upgrade_hints: Vec<UpgradeHint>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl NeighborhoodResponse {
    /// An otherwise empty response carrying `err`.
    pub fn from_error(err: &NeighborhoodError) -> Self {
        Self {
            error: Some(ErrorPayload::from(err)),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// What the caller asked for beyond a plain search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestedFeatures {
    pub query: bool,
    /// Only an explicit opt-in counts.
    pub semantic: bool,
}

impl RequestedFeatures {
    pub fn from_request(request: &NeighborhoodRequest) -> Self {
        Self {
            query: request.query.is_some(),
            semantic: request.include_semantic == Some(true),
        }
    }
}

/// Compose the final response for a successful pipeline run.
pub fn assemble(
    result: NeighborhoodResult,
    resolution: &TierResolution,
    registry: &TierPolicyRegistry,
    requested: RequestedFeatures,
) -> NeighborhoodResponse {
    let tier = resolution.tier;
    let mut warnings = Vec::with_capacity(result.warnings.len() + 1);
    if resolution.is_fallback() {
        if let Some(reason) = &resolution.reason {
            warnings.push(format!(
                "license credential rejected ({}); using community tier",
                reason
            ));
        }
    }
    warnings.extend(result.warnings.iter().map(ToString::to_string));

    let upgrade_hints = upgrade_hints(&result.warnings, tier, registry, requested);

    NeighborhoodResponse {
        nodes: result.nodes,
        edges: result.edges,
        truncated: result.truncated,
        hops_reached: result.hops_reached,
        tier: (tier != LicenseTier::Community).then_some(tier),
        capabilities_applied: result.capabilities_applied.names(),
        upgrade_hints,
        warnings,
        error: None,
    }
}

fn upgrade_hints(
    warnings: &[SearchWarning],
    tier: LicenseTier,
    registry: &TierPolicyRegistry,
    requested: RequestedFeatures,
) -> Vec<UpgradeHint> {
    let policy = registry.policy_for(tier);
    let mut hints = Vec::new();

    let mut capability_hint = |capability: Capability| {
        if policy.allows(capability) {
            return;
        }
        if let Some(required_tier) = registry.min_tier_for(capability).filter(|t| *t > tier) {
            hints.push(UpgradeHint {
                required_tier,
                feature: capability.as_str().to_string(),
                reason: capability.description().to_string(),
            });
        }
    };
    if requested.query {
        capability_hint(Capability::QueryLanguage);
    }
    if requested.semantic {
        capability_hint(Capability::SemanticNeighbors);
    }

    for warning in warnings {
        match warning {
            SearchWarning::HopsClamped { requested, .. } => {
                if let Some(next) = registry.next_tier_with_more_hops(tier) {
                    hints.push(UpgradeHint {
                        required_tier: next.tier,
                        feature: "max_hops".to_string(),
                        reason: format!(
                            "{} hops requested; the {} tier allows up to {}",
                            requested, next.tier, next.max_hops
                        ),
                    });
                }
            }
            SearchWarning::NodeCapClamped { requested, .. } => {
                if let Some(next) = registry.next_tier_with_more_nodes(tier) {
                    hints.push(UpgradeHint {
                        required_tier: next.tier,
                        feature: "max_nodes".to_string(),
                        reason: format!(
                            "{} nodes requested; the {} tier allows up to {}",
                            requested, next.tier, next.max_nodes
                        ),
                    });
                }
            }
            _ => {}
        }
    }
    hints
}
