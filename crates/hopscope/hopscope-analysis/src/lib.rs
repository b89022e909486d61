//! # hopscope-analysis
//!
//! Neighborhood engine for hopscope.
//! Contains the graph snapshot, bounded neighborhood search, semantic
//! augmentation, the predicate query language, response assembly, and the
//! request service that wires them together.

pub mod graph;
pub mod neighborhood;
pub mod query;
pub mod response;
pub mod semantic;
pub mod service;

pub use graph::{AttrValue, GraphEdge, GraphNode, GraphSnapshot};
pub use neighborhood::{NeighborhoodRequest, NeighborhoodResult, RequestParams, TraversalDirection};
pub use response::NeighborhoodResponse;
pub use service::NeighborhoodService;
