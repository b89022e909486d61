//! Re-exports of performance-oriented collection types.

pub use rustc_hash::FxHashSet;
pub use smallvec::SmallVec;

/// SmallVec sized for per-request warning lists (usually <8).
pub type SmallVec8<T> = SmallVec<[T; 8]>;
