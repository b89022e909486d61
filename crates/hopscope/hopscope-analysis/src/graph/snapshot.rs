//! GraphSnapshot: immutable arena graph the engine searches.
//!
//! Nodes and edges live in a petgraph `DiGraph`; callers address them by
//! string id through a sorted index, so every iteration over the snapshot is
//! in id order.

use std::collections::BTreeMap;

use hopscope_core::errors::{HopscopeResult, NeighborhoodError};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A node in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// A directed, weighted edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub confidence: f64,
    pub kind: String,
}

impl GraphEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        confidence: f64,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            confidence,
            kind: kind.into(),
        }
    }

    /// Canonical ordering: (source, target, kind), then confidence.
    pub fn sort_key_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.confidence.total_cmp(&other.confidence))
    }
}

/// Read-only graph shared across requests behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    graph: DiGraph<GraphNode, GraphEdge>,
    index: BTreeMap<String, NodeIndex>,
}

/// JSON document accepted by [`GraphSnapshot::from_json`].
#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    nodes: Vec<GraphNode>,
    #[serde(default)]
    edges: Vec<GraphEdge>,
}

impl GraphSnapshot {
    pub fn builder() -> GraphSnapshotBuilder {
        GraphSnapshotBuilder::default()
    }

    /// Load a `{"nodes": [...], "edges": [...]}` document.
    pub fn from_json(text: &str) -> HopscopeResult<Self> {
        let doc: SnapshotDocument = serde_json::from_str(text)
            .map_err(|e| NeighborhoodError::validation("snapshot", e.to_string()))?;
        let mut builder = Self::builder();
        for node in doc.nodes {
            builder.add_node(node)?;
        }
        for edge in doc.edges {
            builder.add_edge(edge)?;
        }
        Ok(builder.build())
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.graph[idx]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn edge(&self, idx: EdgeIndex) -> &GraphEdge {
        &self.graph[idx]
    }

    pub fn edge_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.index.values().map(move |&idx| &self.graph[idx])
    }

    /// Edges touching `idx` in `direction`, with the node on the far end.
    pub fn neighbors(
        &self,
        idx: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = (EdgeIndex, NodeIndex, &GraphEdge)> + '_ {
        use petgraph::visit::EdgeRef;

        self.graph.edges_directed(idx, direction).map(move |edge| {
            let far = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            (edge.id(), far, edge.weight())
        })
    }
}

/// Incremental, validating snapshot construction.
#[derive(Debug, Default)]
pub struct GraphSnapshotBuilder {
    graph: DiGraph<GraphNode, GraphEdge>,
    index: BTreeMap<String, NodeIndex>,
}

impl GraphSnapshotBuilder {
    /// Add a node. Ids must be non-empty and unique.
    pub fn add_node(&mut self, node: GraphNode) -> HopscopeResult<NodeIndex> {
        if node.id.is_empty() {
            return Err(NeighborhoodError::validation("node.id", "must not be empty"));
        }
        if self.index.contains_key(&node.id) {
            return Err(NeighborhoodError::validation(
                "node.id",
                format!("duplicate node id '{}'", node.id),
            ));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Add an edge between two existing nodes.
    pub fn add_edge(&mut self, edge: GraphEdge) -> HopscopeResult<EdgeIndex> {
        if !(0.0..=1.0).contains(&edge.confidence) {
            return Err(NeighborhoodError::validation(
                "edge.confidence",
                format!(
                    "{} -> {}: confidence {} outside [0, 1]",
                    edge.source, edge.target, edge.confidence
                ),
            ));
        }
        let source = self.endpoint(&edge.source, "edge.source")?;
        let target = self.endpoint(&edge.target, "edge.target")?;
        Ok(self.graph.add_edge(source, target, edge))
    }

    pub fn node(mut self, node: GraphNode) -> HopscopeResult<Self> {
        self.add_node(node)?;
        Ok(self)
    }

    pub fn edge(mut self, edge: GraphEdge) -> HopscopeResult<Self> {
        self.add_edge(edge)?;
        Ok(self)
    }

    pub fn build(self) -> GraphSnapshot {
        GraphSnapshot {
            graph: self.graph,
            index: self.index,
        }
    }

    fn endpoint(&self, id: &str, field: &str) -> HopscopeResult<NodeIndex> {
        self.index.get(id).copied().ok_or_else(|| {
            NeighborhoodError::validation(field, format!("unknown node id '{}'", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_duplicates_and_dangling_edges() {
        let mut builder = GraphSnapshot::builder();
        builder.add_node(GraphNode::new("a")).unwrap();
        assert!(builder.add_node(GraphNode::new("a")).is_err());
        assert!(builder.add_node(GraphNode::new("")).is_err());
        assert!(builder.add_edge(GraphEdge::new("a", "ghost", 0.5, "calls")).is_err());
        assert!(builder.add_edge(GraphEdge::new("a", "a", 1.5, "calls")).is_err());
        assert!(builder.add_edge(GraphEdge::new("a", "a", f64::NAN, "calls")).is_err());
        assert!(builder.add_edge(GraphEdge::new("a", "a", 1.0, "calls")).is_ok());
    }

    #[test]
    fn nodes_iterate_in_id_order() {
        let snapshot = GraphSnapshot::builder()
            .node(GraphNode::new("c"))
            .and_then(|b| b.node(GraphNode::new("a")))
            .and_then(|b| b.node(GraphNode::new("b")))
            .unwrap()
            .build();
        let ids: Vec<&str> = snapshot.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn from_json_loads_attributes() {
        let snapshot = GraphSnapshot::from_json(
            r#"{
                "nodes": [
                    {"id": "auth::login", "attributes": {"name": "login", "loc": 42, "exported": true}},
                    {"id": "auth::hash"}
                ],
                "edges": [
                    {"source": "auth::login", "target": "auth::hash", "confidence": 0.8, "kind": "calls"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.edge_count(), 1);
        let login = snapshot.node_by_id("auth::login").unwrap();
        assert_eq!(login.attr("loc"), Some(&AttrValue::Number(42.0)));
        assert_eq!(login.attr("exported"), Some(&AttrValue::Bool(true)));
        assert_eq!(login.attr("name").and_then(AttrValue::as_str), Some("login"));
    }

    #[test]
    fn from_json_rejects_bad_documents() {
        assert!(GraphSnapshot::from_json("not json").is_err());
        assert!(GraphSnapshot::from_json(
            r#"{"nodes": [{"id": "a"}], "edges": [{"source": "a", "target": "b", "confidence": 0.5, "kind": "calls"}]}"#
        )
        .is_err());
    }
}
