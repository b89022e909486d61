//! Merge similarity-derived neighbors into a search result.

use hopscope_core::config::SearchConfig;
use hopscope_core::licensing::{Capability, TierPolicy};
use hopscope_core::types::collections::FxHashSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::graph::{GraphEdge, GraphSnapshot};
use crate::neighborhood::{NeighborhoodResult, NodeWithDepth, SearchBudget, SearchWarning};

/// Edge kind for every inferred edge.
pub const SEMANTIC_EDGE_KIND: &str = "semantic";

/// Tuning for [`augment`].
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticOptions {
    /// Candidates scoring below this are dropped.
    pub min_score: f64,
    /// Candidates kept per source node.
    pub max_per_node: usize,
    /// Requested node cap; the policy limit still applies on top.
    pub node_cap: Option<usize>,
    /// Effective hop count of the search. Only sources shallower than this
    /// may pull in new nodes; deeper ones can still link existing nodes.
    /// `None` means the policy's hop limit.
    pub max_depth: Option<u32>,
}

impl SemanticOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            min_score: config.effective_semantic_min_score(),
            max_per_node: config.effective_semantic_max_per_node(),
            node_cap: None,
            max_depth: None,
        }
    }
}

impl Default for SemanticOptions {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

#[derive(Debug, Clone)]
struct Proposal {
    score: f64,
    source: String,
    target: String,
    source_depth: u32,
}

/// Add `"semantic"` edges (and the nodes they reach) to `base`.
///
/// Passes `base` through untouched when the policy lacks the capability.
/// Each source node's candidate scan claims one unit of `budget`; once it
/// is spent the remaining sources are skipped and the result is marked
/// truncated. Proposals merge in descending score order, then target id,
/// then source id. A proposal whose target is new is only merged while the
/// node cap has room; otherwise the result is marked truncated.
pub fn augment(
    snapshot: &GraphSnapshot,
    base: NeighborhoodResult,
    policy: &TierPolicy,
    options: &SemanticOptions,
    budget: &mut SearchBudget,
) -> NeighborhoodResult {
    if !policy.allows(Capability::SemanticNeighbors) {
        return base;
    }
    let mut result = base;
    let node_cap = options
        .node_cap
        .unwrap_or(policy.max_nodes)
        .min(policy.max_nodes);
    let max_depth = options
        .max_depth
        .unwrap_or(policy.max_hops)
        .min(policy.max_hops);

    let mut present: FxHashSet<String> = result.nodes.iter().map(|n| n.id.clone()).collect();

    // One scan per worker per wave; the budget is charged before each wave.
    let wave = rayon::current_num_threads().max(1);
    let mut proposals: Vec<Proposal> = Vec::new();
    let mut timed_out = false;
    for sources in result.nodes.chunks(wave) {
        let mut claimed = 0;
        while claimed < sources.len() && budget.try_expand_checked() {
            claimed += 1;
        }
        let per_node: Vec<Vec<Proposal>> = sources[..claimed]
            .par_iter()
            .map(|node| propose(snapshot, node, options, node.depth < max_depth, &present))
            .collect();
        proposals.extend(per_node.into_iter().flatten());
        if claimed < sources.len() {
            timed_out = true;
            break;
        }
    }
    proposals.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.target.cmp(&b.target))
            .then_with(|| a.source.cmp(&b.source))
    });

    let mut linked: FxHashSet<(String, String)> = FxHashSet::default();
    let mut added_nodes = 0usize;
    let mut added_edges = Vec::new();
    let mut truncated = false;

    for proposal in proposals {
        let pair = if proposal.source <= proposal.target {
            (proposal.source.clone(), proposal.target.clone())
        } else {
            (proposal.target.clone(), proposal.source.clone())
        };
        if linked.contains(&pair) {
            continue;
        }
        if !present.contains(&proposal.target) {
            if present.len() >= node_cap {
                truncated = true;
                continue;
            }
            let Some(node) = snapshot.node_by_id(&proposal.target) else {
                continue;
            };
            present.insert(node.id.clone());
            added_nodes += 1;
            result
                .nodes
                .push(NodeWithDepth::new(node, proposal.source_depth + 1));
        }
        linked.insert(pair);
        added_edges.push(GraphEdge::new(
            proposal.source,
            proposal.target,
            proposal.score,
            SEMANTIC_EDGE_KIND,
        ));
    }

    debug!(
        edges = added_edges.len(),
        nodes = added_nodes,
        "semantic neighbors merged"
    );

    result.edges.extend(added_edges);
    result.capabilities_applied.insert(Capability::SemanticNeighbors);
    if truncated {
        result.truncated = true;
        result.push_warning(SearchWarning::Truncated { cap: node_cap });
    }
    if timed_out {
        warn!(
            expansions = budget.expansions(),
            "semantic augmentation budget exhausted"
        );
        result.truncated = true;
        result.push_warning(SearchWarning::TimedOut {
            expansions: budget.expansions(),
        });
    }
    result.refresh_hops_reached();
    result
}

/// Best candidates for one source node, highest score first. Without
/// `can_grow` only nodes already in the result are candidates.
fn propose(
    snapshot: &GraphSnapshot,
    source: &NodeWithDepth,
    options: &SemanticOptions,
    can_grow: bool,
    present: &FxHashSet<String>,
) -> Vec<Proposal> {
    let Some(source_node) = snapshot.node_by_id(&source.id) else {
        return Vec::new();
    };
    let mut scored: Vec<(f64, &str)> = snapshot
        .nodes()
        .filter(|candidate| candidate.id != source.id)
        .filter(|candidate| can_grow || present.contains(&candidate.id))
        .map(|candidate| {
            (
                super::similarity::similarity(source_node, candidate),
                candidate.id.as_str(),
            )
        })
        .filter(|(score, _)| *score >= options.min_score && *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.truncate(options.max_per_node);

    scored
        .into_iter()
        .map(|(score, target)| Proposal {
            score,
            source: source.id.clone(),
            target: target.to_string(),
            source_depth: source.depth,
        })
        .collect()
}
