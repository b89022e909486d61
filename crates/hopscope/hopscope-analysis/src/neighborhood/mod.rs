//! Neighborhood search engine: bounded BFS with direction and confidence
//! filters, tier-derived limits, and a cooperative work budget.

pub mod budget;
pub mod search;
pub mod types;

pub use budget::SearchBudget;
pub use search::{clamp_limits, search, EffectiveLimits};
pub use types::{
    NeighborhoodRequest, NeighborhoodResult, NodeWithDepth, RequestParams, SearchWarning,
    TraversalDirection,
};
