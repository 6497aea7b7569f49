//! layerwise: hierarchical navigable small-world graphs for approximate
//! nearest neighbor search.
//!
//! - [`hnsw`]: the index (`insert`, `search`) and its building blocks
//! - [`random`]: reproducible uniform draws for level assignment
//! - [`distance`]: Euclidean distance
//! - [`benchmark`]: recall metrics, exact ground truth, synthetic datasets
//!
//! # Quick start
//!
//! ```rust
//! use layerwise::{HnswIndex, HnswParams};
//!
//! # fn main() -> Result<(), layerwise::RetrieveError> {
//! let mut index = HnswIndex::new(2, HnswParams::with_m(4))?;
//! index.insert(&[0.0, 0.0])?;
//! index.insert(&[1.0, 0.0])?;
//!
//! let hits = index.search(&[0.1, 0.0], 1)?;
//! assert_eq!(hits[0].1, 0);
//! # Ok(())
//! # }
//! ```
//!
//! # Critical Nuances
//!
//! ## Recall is tunable, not guaranteed
//!
//! Search stops when the closest unexplored point is farther than the worst
//! of the `ef` results kept so far. That bound is a heuristic: a wider beam
//! (`ef`) explores more of the graph and raises recall at the cost of more
//! distance computations. Measure with [`benchmark::recall_at_k`] against
//! [`benchmark::exact_knn`] before trusting a setting.
//!
//! ## Edges are not symmetric
//!
//! Insertion always links both directions, but a later re-prune of a full
//! neighbor list can drop the edge on one side only.

pub mod benchmark;
pub mod distance;
pub mod error;
pub mod hnsw;
pub mod random;

// Re-exports
pub use error::{Result, RetrieveError};
#[cfg(feature = "hnsw")]
pub use hnsw::{HnswIndex, HnswParams};
