//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor search.
//!
//! # Algorithm
//!
//! HNSW constructs a multi-layer graph where:
//! - **Upper layers**: Sparse, long-range connections for fast navigation
//! - **Lower layers**: Dense, local connections for precise search
//! - **Search**: Start at top layer, descend greedily, finish with a beam search
//!   at the base layer
//!
//! Each inserted point draws a level `L` from a geometric distribution
//! (`P(L = l) ∝ M^-l`). It is linked into every level `0..=L`: a beam search of
//! width `ef_construction` gathers candidates, relative-neighborhood pruning
//! keeps a diverse subset of at most `2M` (level 0) or `M` (above), and edges
//! are added in both directions. A full neighbor run absorbs a new edge by
//! re-pruning itself, so degree bounds hold after every insertion.
//!
//! # Memory layout
//!
//! - Vectors: one contiguous `Vec<f32>` (struct-of-arrays)
//! - Edges: one contiguous `Vec<u32>` of fixed-capacity runs per (point, level),
//!   padded with a sentinel, addressed by precomputed offsets
//!
//! # Determinism
//!
//! Levels come from a seeded [`LcgSource`](crate::random::LcgSource) by default.
//! The same seed, parameters, and insertion order always produce the same graph,
//! slot for slot.
//!
//! # Usage
//!
//! ```rust
//! use layerwise::hnsw::{HnswIndex, HnswParams};
//!
//! # fn main() -> Result<(), layerwise::RetrieveError> {
//! let params = HnswParams::with_m(16).ef_construction(100).ef_search(32);
//! let mut index = HnswIndex::new(8, params)?;
//!
//! for i in 0..100 {
//!     index.insert(&[i as f32; 8])?;
//! }
//!
//! let results = index.search(&[42.2; 8], 5)?;
//! assert_eq!(results[0].1, 42);
//!
//! // Wider beam for a single query
//! let results = index.search_with_ef(&[42.2; 8], 5, 128)?;
//! assert_eq!(results.len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! None. `insert` needs `&mut self` and completes all linking before it
//! returns; share an index across threads only behind your own lock.
//!
//! # References
//!
//! - Malkov & Yashunin (2016): "Efficient and robust approximate nearest neighbor search
//!   using Hierarchical Navigable Small World graphs"

#[cfg(feature = "hnsw")]
pub(crate) mod arena;
#[cfg(feature = "hnsw")]
pub(crate) mod graph;
#[cfg(feature = "hnsw")]
pub mod levels;
#[cfg(feature = "hnsw")]
pub mod params;
#[cfg(feature = "hnsw")]
pub(crate) mod search;
#[cfg(feature = "hnsw")]
pub mod select;
#[cfg(feature = "hnsw")]
pub mod store;

#[cfg(feature = "hnsw")]
pub use arena::NO_NEIGHBOR;
#[cfg(feature = "hnsw")]
pub use graph::{GraphViolation, HnswIndex};
#[cfg(feature = "hnsw")]
pub use levels::LevelAssigner;
#[cfg(feature = "hnsw")]
pub use params::HnswParams;
#[cfg(feature = "hnsw")]
pub use search::SearchStats;
#[cfg(feature = "hnsw")]
pub use select::select_neighbors;
#[cfg(feature = "hnsw")]
pub use store::VectorStore;
