//! Pure evaluator: filter, then stable sort, then limit.

use std::cmp::Ordering;

use hopscope_core::errors::HopscopeResult;
use hopscope_core::licensing::Capability;
use hopscope_core::types::collections::FxHashSet;
use tracing::debug;

use crate::graph::{AttrValue, GraphEdge};
use crate::neighborhood::{NeighborhoodResult, NodeWithDepth};

use super::ast::{CompareOp, Expr, Field, Literal, Query, QueryScope, SortOrder};
use super::parser::parse;

/// A resolved field value.
#[derive(Debug, Clone, PartialEq)]
enum Value<'a> {
    Number(f64),
    Str(&'a str),
    Bool(bool),
}

impl Value<'_> {
    fn rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::Str(_) => 1,
            Value::Bool(_) => 2,
        }
    }

    /// Total order for sorting; values of different types order by type.
    fn sort_cmp(&self, other: &Value<'_>) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn matches(&self, op: CompareOp, literal: &Literal) -> bool {
        match (self, literal) {
            (Value::Number(a), Literal::Number(b)) => match op {
                CompareOp::Eq => a == b,
                CompareOp::Lt => a < b,
                CompareOp::Gt => a > b,
                CompareOp::Contains => false,
            },
            (Value::Str(a), Literal::String(b)) => match op {
                CompareOp::Eq => *a == b.as_str(),
                CompareOp::Lt => *a < b.as_str(),
                CompareOp::Gt => *a > b.as_str(),
                CompareOp::Contains => a.contains(b.as_str()),
            },
            (Value::Bool(a), Literal::Bool(b)) => op == CompareOp::Eq && a == b,
            _ => false,
        }
    }
}

impl<'a> From<&'a AttrValue> for Value<'a> {
    fn from(value: &'a AttrValue) -> Self {
        match value {
            AttrValue::Number(n) => Value::Number(*n),
            AttrValue::String(s) => Value::Str(s),
            AttrValue::Bool(b) => Value::Bool(*b),
        }
    }
}

fn node_value<'a>(node: &'a NodeWithDepth, field: &Field) -> Option<Value<'a>> {
    match field {
        Field::Id => Some(Value::Str(&node.id)),
        Field::Depth => Some(Value::Number(f64::from(node.depth))),
        Field::Attribute(name) => node.attributes.get(name).map(Value::from),
        Field::Confidence | Field::Kind | Field::Source | Field::Target => None,
    }
}

/// Edge `id` compares against `source->target`.
fn edge_value<'a>(edge: &'a GraphEdge, id: &'a str, field: &Field) -> Option<Value<'a>> {
    match field {
        Field::Id => Some(Value::Str(id)),
        Field::Confidence => Some(Value::Number(edge.confidence)),
        Field::Kind => Some(Value::Str(&edge.kind)),
        Field::Source => Some(Value::Str(&edge.source)),
        Field::Target => Some(Value::Str(&edge.target)),
        Field::Depth | Field::Attribute(_) => None,
    }
}

fn eval<'a, F>(expr: &Expr, lookup: &F) -> bool
where
    F: Fn(&Field) -> Option<Value<'a>>,
{
    match expr {
        Expr::Comparison { field, op, value } => {
            lookup(field).is_some_and(|v| v.matches(*op, value))
        }
        Expr::And(left, right) => eval(left, lookup) && eval(right, lookup),
    }
}

/// Missing values sort last regardless of direction.
fn compare_keys(a: Option<&Value<'_>>, b: Option<&Value<'_>>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => x.sort_cmp(y),
            SortOrder::Desc => y.sort_cmp(x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse and apply `query` to `result`.
pub fn evaluate(query: &str, result: NeighborhoodResult) -> HopscopeResult<NeighborhoodResult> {
    let parsed = parse(query)?;
    Ok(apply(&parsed, result))
}

/// Apply an already parsed query.
pub fn apply(query: &Query, result: NeighborhoodResult) -> NeighborhoodResult {
    let mut result = match query.scope {
        QueryScope::Node => apply_to_nodes(query, result),
        QueryScope::Edge => apply_to_edges(query, result),
    };
    result.capabilities_applied.insert(Capability::QueryLanguage);
    result.refresh_hops_reached();
    debug!(
        nodes = result.nodes.len(),
        edges = result.edges.len(),
        "query applied"
    );
    result
}

fn apply_to_nodes(query: &Query, mut result: NeighborhoodResult) -> NeighborhoodResult {
    let mut nodes: Vec<NodeWithDepth> = std::mem::take(&mut result.nodes)
        .into_iter()
        .filter(|node| eval(&query.predicate, &|f: &Field| node_value(node, f)))
        .collect();

    if let Some(sort) = &query.order_by {
        nodes.sort_by(|a, b| {
            compare_keys(
                node_value(a, &sort.field).as_ref(),
                node_value(b, &sort.field).as_ref(),
                sort.order,
            )
            .then_with(|| a.id.cmp(&b.id))
        });
    }
    if let Some(limit) = query.limit {
        nodes.truncate(limit);
    }

    let kept: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    result
        .edges
        .retain(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()));
    result.nodes = nodes;
    result
}

fn apply_to_edges(query: &Query, mut result: NeighborhoodResult) -> NeighborhoodResult {
    let mut edges: Vec<(String, GraphEdge)> = std::mem::take(&mut result.edges)
        .into_iter()
        .map(|e| (format!("{}->{}", e.source, e.target), e))
        .filter(|(id, edge)| eval(&query.predicate, &|f: &Field| edge_value(edge, id, f)))
        .collect();

    if let Some(sort) = &query.order_by {
        edges.sort_by(|(ida, a), (idb, b)| {
            compare_keys(
                edge_value(a, ida, &sort.field).as_ref(),
                edge_value(b, idb, &sort.field).as_ref(),
                sort.order,
            )
            .then_with(|| {
                (a.source.as_str(), a.target.as_str(), a.kind.as_str()).cmp(&(
                    b.source.as_str(),
                    b.target.as_str(),
                    b.kind.as_str(),
                ))
            })
        });
    }
    if let Some(limit) = query.limit {
        edges.truncate(limit);
    }

    let edges: Vec<GraphEdge> = edges.into_iter().map(|(_, e)| e).collect();
    let endpoints: FxHashSet<&str> = edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();
    result.nodes.retain(|n| endpoints.contains(n.id.as_str()));
    result.edges = edges;
    result
}
