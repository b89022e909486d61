//! Neighborhood request/result types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use hopscope_core::errors::{HopscopeResult, NeighborhoodError};
use hopscope_core::licensing::{Capability, CapabilitySet};
use hopscope_core::LicenseTier;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::graph::{AttrValue, GraphEdge, GraphNode};

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalDirection {
    #[default]
    Outgoing,
    Incoming,
    Both,
}

impl TraversalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
            Self::Both => "both",
        }
    }

    /// petgraph directions to scan from each expanded node.
    pub fn petgraph_directions(&self) -> SmallVec<[Direction; 2]> {
        match self {
            Self::Outgoing => smallvec![Direction::Outgoing],
            Self::Incoming => smallvec![Direction::Incoming],
            Self::Both => smallvec![Direction::Outgoing, Direction::Incoming],
        }
    }
}

impl fmt::Display for TraversalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraversalDirection {
    type Err = NeighborhoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outgoing" => Ok(Self::Outgoing),
            "incoming" => Ok(Self::Incoming),
            "both" => Ok(Self::Both),
            other => Err(NeighborhoodError::validation(
                "direction",
                format!("expected outgoing, incoming or both, got '{}'", other),
            )),
        }
    }
}

/// Wire-level request parameters as handed over by the transport layer.
///
/// Deliberately loose (signed integers, free-form direction) so that every
/// malformed value is reported as a validation error instead of a decode
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    pub center_node_id: String,
    pub hops: i64,
    pub direction: String,
    pub min_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_credential: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_semantic: Option<bool>,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            center_node_id: String::new(),
            hops: 1,
            direction: TraversalDirection::Outgoing.as_str().to_string(),
            min_confidence: 0.0,
            max_nodes: None,
            query: None,
            license_credential: None,
            include_semantic: None,
        }
    }
}

/// A validated neighborhood request.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodRequest {
    pub center_node_id: String,
    pub requested_hops: u32,
    pub direction: TraversalDirection,
    pub min_confidence: f64,
    pub requested_node_cap: Option<usize>,
    pub query: Option<String>,
    /// `Some(false)` opts out of semantic neighbors; `Some(true)` asks for
    /// them explicitly (and earns an upgrade hint when the tier lacks them).
    pub include_semantic: Option<bool>,
}

impl NeighborhoodRequest {
    pub fn new(center_node_id: impl Into<String>, requested_hops: u32) -> Self {
        Self {
            center_node_id: center_node_id.into(),
            requested_hops,
            direction: TraversalDirection::Outgoing,
            min_confidence: 0.0,
            requested_node_cap: None,
            query: None,
            include_semantic: None,
        }
    }

    pub fn with_direction(mut self, direction: TraversalDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_node_cap(mut self, cap: usize) -> Self {
        self.requested_node_cap = Some(cap);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_semantic(mut self, include: bool) -> Self {
        self.include_semantic = Some(include);
        self
    }

    /// Reject malformed values before any graph work.
    pub fn validate(&self) -> HopscopeResult<()> {
        if self.center_node_id.trim().is_empty() {
            return Err(NeighborhoodError::validation(
                "center_node_id",
                "must not be empty",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(NeighborhoodError::validation(
                "min_confidence",
                format!("{} is outside [0, 1]", self.min_confidence),
            ));
        }
        if self.requested_node_cap == Some(0) {
            return Err(NeighborhoodError::validation(
                "max_nodes",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl TryFrom<&RequestParams> for NeighborhoodRequest {
    type Error = NeighborhoodError;

    fn try_from(params: &RequestParams) -> Result<Self, Self::Error> {
        if params.hops < 0 {
            return Err(NeighborhoodError::validation(
                "hops",
                format!("{} is negative", params.hops),
            ));
        }
        let requested_node_cap = match params.max_nodes {
            Some(n) if n < 0 => {
                return Err(NeighborhoodError::validation(
                    "max_nodes",
                    format!("{} is negative", n),
                ))
            }
            Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
            None => None,
        };

        let request = Self {
            center_node_id: params.center_node_id.clone(),
            requested_hops: u32::try_from(params.hops).unwrap_or(u32::MAX),
            direction: params.direction.parse()?,
            min_confidence: params.min_confidence,
            requested_node_cap,
            query: params.query.clone(),
            include_semantic: params.include_semantic,
        };
        request.validate()?;
        Ok(request)
    }
}

/// A returned node with the depth at which it was first reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeWithDepth {
    pub id: String,
    pub attributes: BTreeMap<String, AttrValue>,
    pub depth: u32,
}

impl NodeWithDepth {
    pub fn new(node: &GraphNode, depth: u32) -> Self {
        Self {
            id: node.id.clone(),
            attributes: node.attributes.clone(),
            depth,
        }
    }
}

/// Non-fatal conditions attached to a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchWarning {
    HopsClamped { requested: u32, allowed: u32 },
    NodeCapClamped { requested: usize, allowed: usize },
    Truncated { cap: usize },
    TimedOut { expansions: usize },
    CapabilityDenied {
        capability: Capability,
        required_tier: Option<LicenseTier>,
    },
}

impl fmt::Display for SearchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HopsClamped { requested, allowed } => write!(
                f,
                "requested {} hops, clamped to the tier limit of {}",
                requested, allowed
            ),
            Self::NodeCapClamped { requested, allowed } => write!(
                f,
                "requested up to {} nodes, clamped to the tier limit of {}",
                requested, allowed
            ),
            Self::Truncated { cap } => write!(f, "result truncated at {} nodes", cap),
            Self::TimedOut { expansions } => write!(
                f,
                "search timed out after {} node expansions; partial result returned",
                expansions
            ),
            Self::CapabilityDenied {
                capability,
                required_tier: Some(tier),
            } => write!(f, "{} requires the {} tier; ignored", capability, tier),
            Self::CapabilityDenied {
                capability,
                required_tier: None,
            } => write!(f, "{} is not available; ignored", capability),
        }
    }
}

/// Search output, refined in turn by semantic augmentation and the query
/// engine before the response assembler sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodResult {
    /// Ordered by (depth, id) straight out of the search.
    pub nodes: Vec<NodeWithDepth>,
    pub edges: Vec<GraphEdge>,
    pub truncated: bool,
    pub hops_reached: u32,
    pub capabilities_applied: CapabilitySet,
    pub warnings: Vec<SearchWarning>,
}

impl NeighborhoodResult {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Recompute `hops_reached` from the current node set.
    pub(crate) fn refresh_hops_reached(&mut self) {
        self.hops_reached = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    }

    pub(crate) fn push_warning(&mut self, warning: SearchWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}
