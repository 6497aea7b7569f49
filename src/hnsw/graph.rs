//! The HNSW index: insertion, search, and structural checks.

use crate::error::{ensure_dimension, ensure_in_range};
use crate::hnsw::arena::{LinkOutcome, NeighborArena, NO_NEIGHBOR};
use crate::hnsw::levels::LevelAssigner;
use crate::hnsw::params::HnswParams;
use crate::hnsw::search::{by_distance_then_id, greedy_descent, search_layer, SearchStats};
use crate::hnsw::select::select_neighbors;
use crate::hnsw::store::{ensure_room, VectorStore};
use crate::random::{LcgSource, UniformSource};
use crate::{Result, RetrieveError};
use smallvec::SmallVec;
use std::collections::{HashSet, VecDeque};
use std::ops::Range;
use thiserror::Error;
use tracing::{debug, trace};

/// Hierarchical navigable small-world index over Euclidean vectors.
///
/// Points get sequential ids from 0 in insertion order. Construction is
/// strictly sequential: `insert` takes `&mut self`, and each call finishes all
/// of its linking and re-pruning before returning. Queries take `&self`.
///
/// ```
/// use layerwise::hnsw::{HnswIndex, HnswParams};
///
/// # fn main() -> Result<(), layerwise::RetrieveError> {
/// let mut index = HnswIndex::new(2, HnswParams::with_m(4))?;
/// index.insert(&[0.0, 0.0])?;
/// index.insert(&[1.0, 0.0])?;
/// index.insert(&[5.0, 5.0])?;
///
/// let hits = index.search(&[0.9, 0.1], 2)?;
/// assert_eq!(hits[0].1, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HnswIndex<S = LcgSource> {
    params: HnswParams,
    store: VectorStore,
    arena: NeighborArena,
    entry_point: Option<u32>,
    max_level: usize,
    source: S,
}

impl HnswIndex<LcgSource> {
    /// Create an empty index whose levels come from an [`LcgSource`] seeded
    /// with `params.seed`.
    pub fn new(dimension: usize, params: HnswParams) -> Result<Self> {
        let source = LcgSource::new(params.seed);
        Self::with_source(dimension, params, source)
    }
}

impl<S: UniformSource> HnswIndex<S> {
    /// Create an empty index drawing levels from `source`.
    pub fn with_source(dimension: usize, params: HnswParams, source: S) -> Result<Self> {
        params.validate(dimension)?;
        let layout = LevelAssigner::new(params.m)?;
        let store = VectorStore::new(dimension)?;
        debug!(
            dimension,
            m = params.m,
            ef_construction = params.ef_construction,
            ef_search = params.ef_search,
            levels = layout.probabilities().len(),
            "created HNSW index"
        );
        Ok(Self {
            store,
            arena: NeighborArena::new(layout),
            entry_point: None,
            max_level: 0,
            params,
            source,
        })
    }

    /// Insert a vector and return its id.
    ///
    /// Fails with [`RetrieveError::InvalidDimension`],
    /// [`RetrieveError::InvalidConfiguration`] (a non-finite component, or one
    /// beyond [`max_component`](crate::error::max_component)), or
    /// [`RetrieveError::IndexFull`] before anything is modified.
    pub fn insert(&mut self, vector: &[f32]) -> Result<u32> {
        ensure_dimension(vector, self.store.dimension())?;
        ensure_in_range(vector)?;
        ensure_room(self.len(), 1)?;
        self.insert_unchecked(vector)
    }

    /// Insert several vectors in order, returning their id range.
    ///
    /// Every vector is validated first; on error nothing is inserted.
    pub fn insert_batch<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<Range<u32>> {
        for vector in vectors {
            let vector = vector.as_ref();
            ensure_dimension(vector, self.store.dimension())?;
            ensure_in_range(vector)?;
        }
        ensure_room(self.len(), vectors.len())?;

        // Both ends are at most MAX_POINTS, which fits in a u32.
        let start = self.len() as u32;
        for vector in vectors {
            self.insert_unchecked(vector.as_ref())?;
        }
        Ok(start..self.len() as u32)
    }

    fn insert_unchecked(&mut self, vector: &[f32]) -> Result<u32> {
        let id = self.store.push(vector)?;
        let level = self.arena.layout().draw_level(&mut self.source);
        let allocated = self.arena.allocate(level)?;
        debug_assert_eq!(id, allocated);
        trace!(id, level, "inserting point");

        let Some(entry_point) = self.entry_point else {
            self.entry_point = Some(id);
            self.max_level = level;
            debug!(id, level, "first point became the entry point");
            return Ok(id);
        };

        // Construction work is not reported anywhere.
        let mut stats = SearchStats::default();

        let start = (self.store.distance_to(entry_point, vector), entry_point);
        let mut nearest = greedy_descent(
            &self.store,
            &self.arena,
            vector,
            start,
            self.max_level,
            level,
            &mut stats,
        );

        for lvl in (0..=level.min(self.max_level)).rev() {
            let candidates = search_layer(
                &self.store,
                &self.arena,
                vector,
                &[nearest],
                lvl,
                self.params.ef_construction,
                &mut stats,
            );

            let capacity = self.arena.capacity(lvl);
            let selected = select_neighbors(&self.store, id, &candidates, capacity, lvl == 0);
            for &neighbor in &selected {
                self.add_link(id, neighbor, lvl);
                self.add_link(neighbor, id, lvl);
            }

            if let Some(&best) = candidates.first() {
                nearest = best;
            }
        }

        if level > self.max_level {
            debug!(
                id,
                level,
                previous_max_level = self.max_level,
                "new entry point"
            );
            self.max_level = level;
            self.entry_point = Some(id);
        }

        Ok(id)
    }

    /// Add `dest` to the run of `(src, level)`, re-pruning the run if it is
    /// full.
    fn add_link(&mut self, src: u32, dest: u32, level: usize) {
        if src == dest {
            return;
        }
        match self.arena.try_link(src, level, dest) {
            LinkOutcome::Present | LinkOutcome::Filled => {}
            LinkOutcome::Full => self.reprune(src, level, dest),
        }
    }

    /// Re-select the full run of `(owner, level)` together with `incoming`.
    fn reprune(&mut self, owner: u32, level: usize, incoming: u32) {
        let mut candidates: SmallVec<[(f32, u32); 64]> = self
            .arena
            .neighbors(owner, level)
            .iter()
            .map(|&n| (self.store.distance(owner, n), n))
            .collect();
        candidates.push((self.store.distance(owner, incoming), incoming));
        candidates.sort_by(|a, b| by_distance_then_id(*a, *b));

        let capacity = self.arena.capacity(level);
        let kept = select_neighbors(&self.store, owner, &candidates, capacity, level == 0);
        trace!(owner, level, kept = kept.len(), "re-pruned full neighbor run");
        self.arena.overwrite(owner, level, &kept);
    }
}

impl<S> HnswIndex<S> {
    /// Top-`k` approximate neighbors of `query` with the default `ef_search`.
    ///
    /// Returns `(distance, id)` pairs, ascending by distance.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, u32)>> {
        self.search_with_ef(query, k, self.params.ef_search)
    }

    /// Like [`search`](Self::search) with an explicit beam width.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<(f32, u32)>> {
        self.search_with_stats(query, k, ef).map(|(results, _)| results)
    }

    /// Search and report how much work the query took.
    ///
    /// The level-0 beam is `max(ef, k)` wide, so `k` results come back
    /// whenever the index holds at least `k` reachable points.
    pub fn search_with_stats(
        &self,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Result<(Vec<(f32, u32)>, SearchStats)> {
        if k == 0 {
            return Err(RetrieveError::InvalidConfiguration(
                "k must be positive".to_string(),
            ));
        }
        if ef == 0 {
            return Err(RetrieveError::InvalidConfiguration(
                "ef_search must be at least 1".to_string(),
            ));
        }
        ensure_dimension(query, self.store.dimension())?;
        ensure_in_range(query)?;
        let entry_point = self.entry_point.ok_or(RetrieveError::EmptyIndex)?;

        let mut stats = SearchStats {
            distance_computations: 1,
            ..SearchStats::default()
        };
        let start = (self.store.distance_to(entry_point, query), entry_point);
        let nearest = greedy_descent(
            &self.store,
            &self.arena,
            query,
            start,
            self.max_level,
            0,
            &mut stats,
        );

        let mut results = search_layer(
            &self.store,
            &self.arena,
            query,
            &[nearest],
            0,
            ef.max(k),
            &mut stats,
        );
        results.truncate(k);
        Ok((results, stats))
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    /// Current search root; `None` while the index is empty.
    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    /// Highest occupied level (0 while empty).
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Level drawn for `id`.
    pub fn level_of(&self, id: u32) -> Option<usize> {
        ((id as usize) < self.arena.len()).then(|| self.arena.level(id))
    }

    /// Valid neighbors of `id` at `level`, or `None` if `id` has no such level.
    pub fn neighbors(&self, id: u32, level: usize) -> Option<&[u32]> {
        let own = self.level_of(id)?;
        (level <= own).then(|| self.arena.neighbors(id, level))
    }

    /// Stored vector of `id`.
    pub fn vector(&self, id: u32) -> Option<&[f32]> {
        ((id as usize) < self.store.len()).then(|| self.store.get(id))
    }

    /// The raw slot store (all runs, sentinels included) in id order.
    pub fn arena_slots(&self) -> &[u32] {
        self.arena.slots()
    }

    /// Level assignment probabilities for this index's `M`.
    pub fn level_probabilities(&self) -> &[f64] {
        self.arena.layout().probabilities()
    }

    /// Check every structural invariant of the graph, returning all
    /// violations found (empty when the graph is well formed).
    pub fn validate(&self) -> Vec<GraphViolation> {
        let mut violations = Vec::new();
        let n = self.arena.len();
        let layout = self.arena.layout();

        for id in 0..n as u32 {
            let own_level = self.arena.level(id);
            let offsets = self.arena.offsets();
            let actual = offsets[id as usize + 1] - offsets[id as usize];
            let expected = layout.slots_for(own_level);
            if actual != expected {
                violations.push(GraphViolation::BlockSize {
                    id,
                    expected,
                    actual,
                });
                continue;
            }

            for level in 0..=own_level {
                let run = self.arena.run(id, level);
                let valid = self.arena.neighbors(id, level);
                if run[valid.len()..].iter().any(|&slot| slot != NO_NEIGHBOR) {
                    violations.push(GraphViolation::SentinelGap { id, level });
                }

                let mut seen = HashSet::with_capacity(valid.len());
                for &neighbor in valid {
                    if neighbor == id {
                        violations.push(GraphViolation::SelfLoop { id, level });
                    } else if neighbor as usize >= n {
                        violations.push(GraphViolation::OutOfRange {
                            id,
                            level,
                            neighbor,
                        });
                        continue;
                    } else if self.arena.level(neighbor) < level {
                        violations.push(GraphViolation::NeighborBelowLevel {
                            id,
                            level,
                            neighbor,
                        });
                    }
                    if !seen.insert(neighbor) {
                        violations.push(GraphViolation::DuplicateNeighbor {
                            id,
                            level,
                            neighbor,
                        });
                    }
                }
            }
        }

        if let Some(entry_point) = self.entry_point {
            let level = self.arena.level(entry_point);
            if level != self.max_level {
                violations.push(GraphViolation::EntryPointLevel {
                    entry_point,
                    level,
                    max_level: self.max_level,
                });
            }
        }

        violations
    }

    /// Points at `level` reachable from the entry point by following that
    /// level's runs, and how many points at the level are not.
    ///
    /// Returns `(reachable, orphans)`; `(0, 0)` for an empty index.
    pub fn connectivity(&self, level: usize) -> (usize, usize) {
        let Some(entry_point) = self.entry_point else {
            return (0, 0);
        };
        if level > self.max_level {
            return (0, 0);
        }

        let mut visited: HashSet<u32> = HashSet::new();
        let mut queue: VecDeque<u32> = VecDeque::from([entry_point]);
        visited.insert(entry_point);
        while let Some(node) = queue.pop_front() {
            for &neighbor in self.arena.neighbors(node, level) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let at_level = (0..self.arena.len() as u32)
            .filter(|&id| self.arena.level(id) >= level)
            .count();
        let reachable = visited.len();
        (reachable, at_level.saturating_sub(reachable))
    }
}

/// A broken structural invariant reported by [`HnswIndex::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphViolation {
    #[error("point {id}: slot block holds {actual} slots, its level needs {expected}")]
    BlockSize {
        id: u32,
        expected: usize,
        actual: usize,
    },
    #[error("point {id} level {level}: sentinel before a valid neighbor")]
    SentinelGap { id: u32, level: usize },
    #[error("point {id} level {level}: links to itself")]
    SelfLoop { id: u32, level: usize },
    #[error("point {id} level {level}: neighbor {neighbor} does not exist")]
    OutOfRange { id: u32, level: usize, neighbor: u32 },
    #[error("point {id} level {level}: neighbor {neighbor} listed twice")]
    DuplicateNeighbor { id: u32, level: usize, neighbor: u32 },
    #[error("point {id} level {level}: neighbor {neighbor} does not reach this level")]
    NeighborBelowLevel { id: u32, level: usize, neighbor: u32 },
    #[error("entry point {entry_point} is at level {level}, max level is {max_level}")]
    EntryPointLevel {
        entry_point: u32,
        level: usize,
        max_level: usize,
    },
}
