//! Graph snapshot: the immutable node/edge arena searched by every request.

pub mod snapshot;

pub use snapshot::{AttrValue, GraphEdge, GraphNode, GraphSnapshot, GraphSnapshotBuilder};
