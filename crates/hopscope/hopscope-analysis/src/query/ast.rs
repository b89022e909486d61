//! Query AST.

use std::fmt;

/// A field reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Id,
    Depth,
    Confidence,
    Kind,
    Source,
    Target,
    /// Node attribute, written bare (`module`) or qualified (`attr.module`).
    Attribute(String),
}

impl Field {
    /// Resolve a field name. Built-in names are case-sensitive.
    pub fn from_name(name: &str) -> Self {
        match name {
            "id" => Self::Id,
            "depth" => Self::Depth,
            "confidence" => Self::Confidence,
            "kind" => Self::Kind,
            "source" => Self::Source,
            "target" => Self::Target,
            other => Self::Attribute(other.strip_prefix("attr.").unwrap_or(other).to_string()),
        }
    }

    /// Scope this field forces, or `None` for `id` which exists on both.
    pub fn scope(&self) -> Option<QueryScope> {
        match self {
            Self::Id => None,
            Self::Depth | Self::Attribute(_) => Some(QueryScope::Node),
            Self::Confidence | Self::Kind | Self::Source | Self::Target => Some(QueryScope::Edge),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Depth => f.write_str("depth"),
            Self::Confidence => f.write_str("confidence"),
            Self::Kind => f.write_str("kind"),
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
            Self::Attribute(name) => write!(f, "attr.{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
}

/// Predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Comparison {
        field: Field,
        op: CompareOp,
        value: Literal,
    },
    And(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Every field referenced by the predicate, left to right.
    pub fn fields(&self) -> Vec<&Field> {
        match self {
            Self::Comparison { field, .. } => vec![field],
            Self::And(left, right) => {
                let mut fields = left.fields();
                fields.extend(right.fields());
                fields
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    pub field: Field,
    pub order: SortOrder,
}

/// Whether a query filters nodes or edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    Node,
    Edge,
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub predicate: Expr,
    pub order_by: Option<SortClause>,
    pub limit: Option<usize>,
    pub scope: QueryScope,
}
