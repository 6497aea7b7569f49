//! Single-level graph traversal: greedy descent and bounded beam search.

use crate::hnsw::arena::NeighborArena;
use crate::hnsw::store::VectorStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Work counters for one traversal (or the sum of several).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Query-to-point distance evaluations.
    pub distance_computations: usize,
    /// Points marked visited by beam searches.
    pub visited: usize,
    /// Neighbor runs scanned.
    pub hops: usize,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.distance_computations += other.distance_computations;
        self.visited += other.visited;
        self.hops += other.hops;
    }
}

/// Order by distance, then by id, so equal distances resolve the same way
/// on every run.
#[inline]
pub(crate) fn by_distance_then_id(a: (f32, u32), b: (f32, u32)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

/// Frontier entry (min-heap: nearest pops first).
#[derive(Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) id: u32,
    pub(crate) distance: f32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        by_distance_then_id((self.distance, self.id), (other.distance, other.id)).reverse()
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Kept result (max-heap: the worst kept result sits on top).
#[derive(Clone, Copy, PartialEq)]
pub(crate) struct ResultEntry {
    pub(crate) id: u32,
    pub(crate) distance: f32,
}

impl Eq for ResultEntry {}

impl Ord for ResultEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        by_distance_then_id((self.distance, self.id), (other.distance, other.id))
    }
}

impl PartialOrd for ResultEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy single-best descent through levels `from_level` down to
/// `above_level + 1`.
///
/// At each level, the current nearest point's run is scanned and any strictly
/// closer neighbor becomes the new nearest; the scan repeats until a full pass
/// brings no improvement. Returns the final `(distance, id)`.
pub(crate) fn greedy_descent(
    store: &VectorStore,
    arena: &NeighborArena,
    query: &[f32],
    start: (f32, u32),
    from_level: usize,
    above_level: usize,
    stats: &mut SearchStats,
) -> (f32, u32) {
    let (mut nearest_dist, mut nearest) = start;

    for level in (above_level + 1..=from_level).rev() {
        loop {
            let mut changed = false;
            let current = nearest;
            stats.hops += 1;
            for &neighbor in arena.neighbors(current, level) {
                let d = store.distance_to(neighbor, query);
                stats.distance_computations += 1;
                if d < nearest_dist {
                    nearest_dist = d;
                    nearest = neighbor;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    (nearest_dist, nearest)
}

/// Bounded best-first search of one level.
///
/// Standard HNSW beam search (Malkov & Yashunin):
/// - a min-heap frontier of unexplored points (closest first)
/// - a max-heap of at most `width` results (worst on top)
/// - stop once the result set is full and the closest unexplored point is
///   farther than the worst kept result
///
/// `entry_points` are `(distance, id)` seeds. Returns up to `width` results,
/// ascending by distance (ties by id).
pub(crate) fn search_layer(
    store: &VectorStore,
    arena: &NeighborArena,
    query: &[f32],
    entry_points: &[(f32, u32)],
    level: usize,
    width: usize,
    stats: &mut SearchStats,
) -> Vec<(f32, u32)> {
    debug_assert!(width >= 1);
    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(width * 2);
    let mut results: BinaryHeap<ResultEntry> = BinaryHeap::with_capacity(width + 1);
    let mut visited: HashSet<u32> = HashSet::with_capacity(width * 2);

    for &(distance, id) in entry_points {
        if !visited.insert(id) {
            continue;
        }
        candidates.push(Candidate { id, distance });
        results.push(ResultEntry { id, distance });
        if results.len() > width {
            results.pop();
        }
    }

    while let Some(candidate) = candidates.pop() {
        // Only a full result set has a meaningful worst bound.
        if results.len() >= width {
            let worst = results.peek().map_or(f32::INFINITY, |r| r.distance);
            if candidate.distance > worst {
                break;
            }
        }

        stats.hops += 1;
        for &neighbor in arena.neighbors(candidate.id, level) {
            if !visited.insert(neighbor) {
                continue;
            }
            let distance = store.distance_to(neighbor, query);
            stats.distance_computations += 1;

            let admit = results.len() < width
                || results.peek().is_some_and(|worst| distance < worst.distance);
            if admit {
                candidates.push(Candidate {
                    id: neighbor,
                    distance,
                });
                results.push(ResultEntry {
                    id: neighbor,
                    distance,
                });
                if results.len() > width {
                    results.pop();
                }
            }
        }
    }

    stats.visited += visited.len();

    results
        .into_sorted_vec()
        .into_iter()
        .map(|r| (r.distance, r.id))
        .collect()
}
