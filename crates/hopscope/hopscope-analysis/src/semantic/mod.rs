//! Semantic neighbor inference (Pro and above).

pub mod augment;
pub mod similarity;

pub use augment::{augment, SemanticOptions, SEMANTIC_EDGE_KIND};
pub use similarity::similarity;
