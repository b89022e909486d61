//! Predicate query tests: QRY-01 through QRY-07.

use hopscope_analysis::graph::{GraphEdge, GraphNode, GraphSnapshot};
use hopscope_analysis::neighborhood::{search, NeighborhoodRequest, SearchBudget};
use hopscope_analysis::query::evaluate;
use hopscope_analysis::NeighborhoodResult;
use hopscope_core::errors::NeighborhoodError;
use hopscope_core::licensing::{Capability, TierPolicy};
use hopscope_core::LicenseTier;

/// `c` fans out to five callees with distinct confidences; `a` calls `g`.
fn neighborhood() -> NeighborhoodResult {
    let mut builder = GraphSnapshot::builder();
    builder
        .add_node(GraphNode::new("c").with_attr("module", "auth").with_attr("loc", 120i64))
        .unwrap();
    builder
        .add_node(
            GraphNode::new("a")
                .with_attr("module", "auth")
                .with_attr("loc", 40i64)
                .with_attr("exported", true),
        )
        .unwrap();
    builder
        .add_node(GraphNode::new("b").with_attr("module", "billing").with_attr("loc", 75i64))
        .unwrap();
    builder
        .add_node(
            GraphNode::new("d")
                .with_attr("module", "auth_admin")
                .with_attr("exported", false),
        )
        .unwrap();
    builder.add_node(GraphNode::new("e").with_attr("module", "core")).unwrap();
    builder
        .add_node(GraphNode::new("f").with_attr("module", "billing").with_attr("loc", 10i64))
        .unwrap();
    builder.add_node(GraphNode::new("g").with_attr("module", "auth")).unwrap();

    for (target, confidence) in [("a", 0.95), ("b", 0.85), ("d", 0.9), ("e", 0.5), ("f", 0.81)] {
        builder
            .add_edge(GraphEdge::new("c", target, confidence, "calls"))
            .unwrap();
    }
    builder.add_edge(GraphEdge::new("a", "g", 1.0, "imports")).unwrap();
    let snapshot = builder.build();

    search(
        &snapshot,
        &NeighborhoodRequest::new("c", 2),
        &TierPolicy::default_for(LicenseTier::Enterprise),
        &mut SearchBudget::unlimited(),
    )
    .unwrap()
}

fn node_ids(result: &NeighborhoodResult) -> Vec<&str> {
    result.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn edge_pairs(result: &NeighborhoodResult) -> Vec<(&str, &str)> {
    result
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect()
}

// ---- QRY-01: Edge-scoped filter, sort, limit ----

#[test]
fn qry_01_top_edges_by_confidence() {
    let result = evaluate(
        "WHERE confidence > 0.8 ORDER BY confidence DESC LIMIT 2",
        neighborhood(),
    )
    .unwrap();
    assert_eq!(edge_pairs(&result), vec![("c", "a"), ("c", "d")]);
    // Endpoints keep their original (depth, id) order.
    assert_eq!(node_ids(&result), vec!["c", "a", "d"]);
    assert!(result.capabilities_applied.contains(Capability::QueryLanguage));
    assert_eq!(result.hops_reached, 1);
}

#[test]
fn qry_01b_edge_kind_and_id() {
    let result = evaluate("WHERE kind = 'imports'", neighborhood()).unwrap();
    assert_eq!(edge_pairs(&result), vec![("a", "g")]);
    assert_eq!(node_ids(&result), vec!["a", "g"]);

    let result = evaluate("WHERE id = 'c->b' AND kind = 'calls'", neighborhood()).unwrap();
    assert_eq!(edge_pairs(&result), vec![("c", "b")]);
}

// ---- QRY-02: Node-scoped queries ----

#[test]
fn qry_02_node_attribute_filter_prunes_edges() {
    let result = evaluate("WHERE module = 'auth'", neighborhood()).unwrap();
    assert_eq!(node_ids(&result), vec!["c", "a", "g"]);
    assert_eq!(edge_pairs(&result), vec![("a", "g"), ("c", "a")]);
    assert_eq!(result.hops_reached, 2);
}

#[test]
fn qry_02b_contains_and_conjunction() {
    let result = evaluate(
        "WHERE module CONTAINS 'auth' AND depth = 1",
        neighborhood(),
    )
    .unwrap();
    assert_eq!(node_ids(&result), vec!["a", "d"]);
    assert!(result.edges.is_empty());
}

#[test]
fn qry_02c_depth_filter_refreshes_hops_reached() {
    let result = evaluate("where depth = 0", neighborhood()).unwrap();
    assert_eq!(node_ids(&result), vec!["c"]);
    assert_eq!(result.hops_reached, 0);
}

// ---- QRY-03: Sorting ----

#[test]
fn qry_03_missing_values_sort_last() {
    let asc = evaluate("WHERE depth < 5 ORDER BY loc", neighborhood()).unwrap();
    assert_eq!(node_ids(&asc), vec!["f", "a", "b", "c", "d", "e", "g"]);

    let desc = evaluate("WHERE depth < 5 ORDER BY loc DESC LIMIT 4", neighborhood()).unwrap();
    assert_eq!(node_ids(&desc), vec!["c", "b", "a", "f"]);
}

#[test]
fn qry_03b_ties_break_on_id() {
    let result = evaluate("WHERE depth > 0 ORDER BY module DESC", neighborhood()).unwrap();
    assert_eq!(node_ids(&result), vec!["e", "b", "f", "d", "a", "g"]);
}

// ---- QRY-04: Type mismatches never match ----

#[test]
fn qry_04_mismatched_types_do_not_match() {
    let result = evaluate("WHERE loc = 'forty'", neighborhood()).unwrap();
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());

    let result = evaluate("WHERE exported = true", neighborhood()).unwrap();
    assert_eq!(node_ids(&result), vec!["a"]);

    // Booleans only support equality.
    let result = evaluate("WHERE exported > false", neighborhood()).unwrap();
    assert!(result.nodes.is_empty());
}

// ---- QRY-05: LIMIT 0 ----

#[test]
fn qry_05_limit_zero_empties_result() {
    let result = evaluate("WHERE depth < 5 LIMIT 0", neighborhood()).unwrap();
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
    assert_eq!(result.hops_reached, 0);
}

// ---- QRY-06: Syntax errors ----

#[test]
fn qry_06_syntax_error_fails() {
    let err = evaluate("WHERE confidence >> 0.8", neighborhood()).unwrap_err();
    match &err {
        NeighborhoodError::QuerySyntax { token, position, .. } => {
            assert_eq!(token, ">");
            assert_eq!(*position, 18);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), "query_syntax");
}

#[test]
fn qry_06b_mixed_scope_is_rejected() {
    let err = evaluate("WHERE module = 'auth' AND confidence > 0.5", neighborhood()).unwrap_err();
    assert!(matches!(
        err,
        NeighborhoodError::QuerySyntax { ref token, .. } if token == "confidence"
    ));
}

// ---- QRY-07: Purity ----

#[test]
fn qry_07_evaluation_is_repeatable() {
    let query = "WHERE confidence > 0.5 ORDER BY target DESC";
    let first = evaluate(query, neighborhood()).unwrap();
    let second = evaluate(query, neighborhood()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        edge_pairs(&first),
        vec![("a", "g"), ("c", "f"), ("c", "d"), ("c", "b"), ("c", "a")]
    );
}
