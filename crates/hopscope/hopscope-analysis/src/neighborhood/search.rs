//! Bounded level-by-level BFS over a graph snapshot.

use hopscope_core::errors::{HopscopeResult, NeighborhoodError};
use hopscope_core::licensing::{Capability, CapabilitySet, TierPolicy};
use hopscope_core::types::collections::{FxHashSet, SmallVec8};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::Direction;
use tracing::{debug, warn};

use crate::graph::{GraphEdge, GraphSnapshot};

use super::budget::SearchBudget;
use super::types::{NeighborhoodRequest, NeighborhoodResult, NodeWithDepth, SearchWarning};

/// Effective limits after clamping a request to its tier policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveLimits {
    pub hops: u32,
    pub node_cap: usize,
}

/// Clamp requested hops and node cap to the policy, returning the warnings
/// for whatever was reduced.
pub fn clamp_limits(
    request: &NeighborhoodRequest,
    policy: &TierPolicy,
) -> (EffectiveLimits, SmallVec8<SearchWarning>) {
    let mut warnings = SmallVec8::new();

    let hops = request.requested_hops.min(policy.max_hops);
    if hops < request.requested_hops {
        warnings.push(SearchWarning::HopsClamped {
            requested: request.requested_hops,
            allowed: policy.max_hops,
        });
    }

    let requested_cap = request.requested_node_cap.unwrap_or(policy.max_nodes);
    let node_cap = requested_cap.min(policy.max_nodes);
    if node_cap < requested_cap {
        warnings.push(SearchWarning::NodeCapClamped {
            requested: requested_cap,
            allowed: policy.max_nodes,
        });
    }

    (EffectiveLimits { hops, node_cap }, warnings)
}

/// Extract the neighborhood of `request.center_node_id`.
///
/// Depth is the first-discovery level, i.e. the shortest path length over
/// the edges that pass the direction and confidence filters. Each level's
/// new nodes are sorted by id, so output order is (depth, id).
pub fn search(
    snapshot: &GraphSnapshot,
    request: &NeighborhoodRequest,
    policy: &TierPolicy,
    budget: &mut SearchBudget,
) -> HopscopeResult<NeighborhoodResult> {
    request.validate()?;
    let (limits, clamp_warnings) = clamp_limits(request, policy);

    let center = snapshot
        .node_index(&request.center_node_id)
        .ok_or_else(|| NeighborhoodError::NodeNotFound {
            id: request.center_node_id.clone(),
        })?;

    let directions = request.direction.petgraph_directions();
    let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut kept: Vec<(NodeIndex, u32)> = vec![(center, 0)];
    let mut frontier: Vec<NodeIndex> = vec![center];
    let mut truncated = false;
    let mut timed_out = false;
    visited.insert(center);

    let mut depth = 0u32;
    while depth < limits.hops && !frontier.is_empty() {
        let mut next: Vec<NodeIndex> = Vec::new();

        for &node in &frontier {
            if !budget.try_expand() {
                timed_out = true;
                break;
            }
            for &direction in &directions {
                for (_, neighbor, edge) in snapshot.neighbors(node, direction) {
                    if edge.confidence < request.min_confidence {
                        continue;
                    }
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
        }

        depth += 1;
        next.sort_by(|a, b| snapshot.node(*a).id.cmp(&snapshot.node(*b).id));

        let room = limits.node_cap.saturating_sub(kept.len());
        if next.len() > room {
            next.truncate(room);
            truncated = true;
        }
        kept.extend(next.iter().map(|&idx| (idx, depth)));

        if truncated || timed_out {
            break;
        }
        frontier = next;
    }

    let edges = induced_edges(snapshot, &kept, &directions, request.min_confidence);

    let mut capabilities_applied = CapabilitySet::new();
    capabilities_applied.insert(Capability::NeighborhoodSearch);
    if request.min_confidence > 0.0 {
        capabilities_applied.insert(Capability::ConfidenceFilter);
    }

    let mut warnings: Vec<SearchWarning> = clamp_warnings.into_iter().collect();
    if truncated {
        warn!(
            center = %request.center_node_id,
            cap = limits.node_cap,
            "neighborhood truncated at node cap"
        );
        warnings.push(SearchWarning::Truncated {
            cap: limits.node_cap,
        });
    }
    if timed_out {
        warn!(
            center = %request.center_node_id,
            expansions = budget.expansions(),
            "neighborhood search budget exhausted"
        );
        warnings.push(SearchWarning::TimedOut {
            expansions: budget.expansions(),
        });
    }

    let mut result = NeighborhoodResult {
        nodes: kept
            .iter()
            .map(|&(idx, d)| NodeWithDepth::new(snapshot.node(idx), d))
            .collect(),
        edges,
        truncated: truncated || timed_out,
        hops_reached: 0,
        capabilities_applied,
        warnings,
    };
    result.refresh_hops_reached();

    debug!(
        center = %request.center_node_id,
        direction = %request.direction,
        hops = limits.hops,
        nodes = result.nodes.len(),
        edges = result.edges.len(),
        expansions = budget.expansions(),
        "neighborhood search complete"
    );

    Ok(result)
}

/// Every filtered edge whose endpoints are both kept, including edges that
/// leave the last level reached.
fn induced_edges(
    snapshot: &GraphSnapshot,
    kept: &[(NodeIndex, u32)],
    directions: &[Direction],
    min_confidence: f64,
) -> Vec<GraphEdge> {
    let kept_set: FxHashSet<NodeIndex> = kept.iter().map(|(idx, _)| *idx).collect();
    let mut seen: FxHashSet<EdgeIndex> = FxHashSet::default();
    for &(node, _) in kept {
        for &direction in directions {
            for (edge_idx, neighbor, edge) in snapshot.neighbors(node, direction) {
                if edge.confidence >= min_confidence && kept_set.contains(&neighbor) {
                    seen.insert(edge_idx);
                }
            }
        }
    }
    let mut edges: Vec<GraphEdge> = seen
        .into_iter()
        .map(|idx| snapshot.edge(idx).clone())
        .collect();
    edges.sort_by(GraphEdge::sort_key_cmp);
    edges
}
