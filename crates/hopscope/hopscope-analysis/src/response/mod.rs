//! Response assembler.

pub mod assembler;

pub use assembler::{assemble, ErrorPayload, NeighborhoodResponse, RequestedFeatures, UpgradeHint};
