//! Predicate query language (Enterprise).
//!
//! `WHERE <predicate> [ORDER BY <field> [ASC|DESC]] [LIMIT <n>]`, parsed by
//! a recursive-descent parser into an AST and applied by a pure evaluator.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::{CompareOp, Expr, Field, Literal, Query, QueryScope, SortClause, SortOrder};
pub use evaluator::{apply, evaluate};
pub use parser::parse;
