//! Neighbor selection with relative-neighborhood diversification (RND).

use crate::hnsw::store::VectorStore;

/// Prune a distance-sorted candidate list to at most `capacity` neighbors.
///
/// `candidates` holds `(distance to query, id)` sorted ascending (ties by id).
/// A candidate `c` is kept only if no already-kept neighbor `s` is strictly
/// closer to it than the query is: `dist(c, s) >= dist(q, c)` for every kept
/// `s`. Scanning stops as soon as `capacity` neighbors are kept.
///
/// With `keep_capacity_full`, rejected candidates ("outsiders") backfill any
/// remaining slots in their original order, so the run never ends up sparser
/// than the candidate pool allows. Output order: diverse picks first, in
/// acceptance order, then backfill.
pub fn select_neighbors(
    store: &VectorStore,
    query: u32,
    candidates: &[(f32, u32)],
    capacity: usize,
    keep_capacity_full: bool,
) -> Vec<u32> {
    if capacity == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut selected: Vec<u32> = Vec::with_capacity(capacity.min(candidates.len()));
    let mut outsiders: Vec<u32> = Vec::new();

    for &(query_to_candidate, candidate) in candidates {
        if candidate == query {
            continue;
        }

        let diverse = selected
            .iter()
            .all(|&kept| store.distance(candidate, kept) >= query_to_candidate);

        if diverse {
            selected.push(candidate);
            if selected.len() >= capacity {
                return selected;
            }
        } else if keep_capacity_full {
            outsiders.push(candidate);
        }
    }

    if keep_capacity_full {
        let room = capacity - selected.len();
        selected.extend(outsiders.into_iter().take(room));
    }

    selected
}
