//! Neighborhood search configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the search engine and its tier-gated extensions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per search in milliseconds. Default: 2000.
    pub time_budget_ms: Option<u64>,
    /// Node expansions between budget checks. Default: 256.
    pub budget_check_interval: Option<usize>,
    /// Hard ceiling on node expansions per search. Default: unbounded.
    pub max_expansions: Option<usize>,
    /// Minimum similarity score for semantic neighbors. Default: 0.6.
    pub semantic_min_score: Option<f64>,
    /// Semantic neighbors kept per source node. Default: 3.
    pub semantic_max_per_node: Option<usize>,
}

impl SearchConfig {
    /// Returns the effective time budget, defaulting to 2000ms.
    pub fn effective_time_budget_ms(&self) -> u64 {
        self.time_budget_ms.unwrap_or(2000)
    }

    /// Returns the effective check interval, defaulting to 256 expansions.
    pub fn effective_budget_check_interval(&self) -> usize {
        self.budget_check_interval.unwrap_or(256).max(1)
    }

    /// Returns the effective semantic threshold, defaulting to 0.6.
    pub fn effective_semantic_min_score(&self) -> f64 {
        self.semantic_min_score.unwrap_or(0.6)
    }

    /// Returns the effective semantic fan-out, defaulting to 3.
    pub fn effective_semantic_max_per_node(&self) -> usize {
        self.semantic_max_per_node.unwrap_or(3)
    }
}
