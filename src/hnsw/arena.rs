//! Flattened, sentinel-terminated neighbor storage.
//!
//! Every point owns one contiguous block of slots holding a run per level
//! `0..=L`: `2M` slots at level 0 and `M` above. Blocks are laid out in id
//! order and addressed through `offsets`, so the whole graph is a single
//! `Vec<u32>` with no per-node allocation. Unused slots hold [`NO_NEIGHBOR`]
//! and always trail the valid entries of a run.

use crate::hnsw::levels::LevelAssigner;
use crate::hnsw::store::point_id;
use crate::Result;
use std::ops::Range;

/// Sentinel marking an unused slot.
pub const NO_NEIGHBOR: u32 = u32::MAX;

/// Result of trying to append a neighbor to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The neighbor was already in the run.
    Present,
    /// The neighbor took the first free slot.
    Filled,
    /// Every slot is taken; the caller must re-prune.
    Full,
}

/// Append-only arena of per-point, per-level neighbor runs.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborArena {
    layout: LevelAssigner,
    slots: Vec<u32>,
    /// Block start of each point, plus one trailing end offset.
    offsets: Vec<usize>,
    levels: Vec<u8>,
}

impl NeighborArena {
    pub fn new(layout: LevelAssigner) -> Self {
        Self {
            layout,
            slots: Vec::new(),
            offsets: vec![0],
            levels: Vec::new(),
        }
    }

    #[inline]
    pub fn layout(&self) -> &LevelAssigner {
        &self.layout
    }

    /// Number of allocated points.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Allocate a sentinel-filled block for a new point at `level`.
    pub fn allocate(&mut self, level: usize) -> Result<u32> {
        let id = point_id(self.levels.len())?;
        let end = self.slots.len() + self.layout.slots_for(level);
        self.slots.resize(end, NO_NEIGHBOR);
        self.offsets.push(end);
        self.levels.push(level as u8);
        Ok(id)
    }

    /// Level assigned to `id`.
    #[inline]
    pub fn level(&self, id: u32) -> usize {
        usize::from(self.levels[id as usize])
    }

    /// Capacity of a run at `level`.
    #[inline]
    pub fn capacity(&self, level: usize) -> usize {
        self.layout.capacity(level)
    }

    /// Absolute slot range of `(id, level)`.
    #[inline]
    fn bounds(&self, id: u32, level: usize) -> Range<usize> {
        debug_assert!(level <= self.level(id), "level {level} above point {id}");
        let base = self.offsets[id as usize];
        let rel = self.layout.run_range(level);
        base + rel.start..base + rel.end
    }

    /// Full run of `(id, level)`, trailing sentinels included.
    #[inline]
    pub fn run(&self, id: u32, level: usize) -> &[u32] {
        &self.slots[self.bounds(id, level)]
    }

    /// Valid neighbors of `(id, level)`: the run up to its first sentinel.
    #[inline]
    pub fn neighbors(&self, id: u32, level: usize) -> &[u32] {
        let run = self.run(id, level);
        let len = run
            .iter()
            .position(|&n| n == NO_NEIGHBOR)
            .unwrap_or(run.len());
        &run[..len]
    }

    /// Put `dest` in the first free slot of `(id, level)` unless it is
    /// already present or the run is full.
    pub fn try_link(&mut self, id: u32, level: usize, dest: u32) -> LinkOutcome {
        let range = self.bounds(id, level);
        for slot in &mut self.slots[range] {
            if *slot == dest {
                return LinkOutcome::Present;
            }
            if *slot == NO_NEIGHBOR {
                *slot = dest;
                return LinkOutcome::Filled;
            }
        }
        LinkOutcome::Full
    }

    /// Replace the run of `(id, level)` with `neighbors`, resetting the rest to
    /// sentinels.
    ///
    /// # Panics
    ///
    /// Panics if `neighbors` is longer than the run.
    pub fn overwrite(&mut self, id: u32, level: usize, neighbors: &[u32]) {
        let range = self.bounds(id, level);
        assert!(
            neighbors.len() <= range.len(),
            "{} neighbors exceed capacity {} at level {level}",
            neighbors.len(),
            range.len()
        );
        let run = &mut self.slots[range];
        run[..neighbors.len()].copy_from_slice(neighbors);
        run[neighbors.len()..].fill(NO_NEIGHBOR);
    }

    /// The raw slot store, sentinels included.
    #[inline]
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Per-point block offsets (one longer than the number of points).
    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(m: usize) -> NeighborArena {
        NeighborArena::new(LevelAssigner::new(m).unwrap())
    }

    #[test]
    fn allocation_extends_with_sentinels() {
        let mut a = arena(4);
        assert_eq!(a.allocate(0), Ok(0));
        assert_eq!(a.allocate(2), Ok(1));
        assert_eq!(a.offsets(), &[0, 8, 24]);
        assert_eq!(a.slots().len(), 24);
        assert!(a.slots().iter().all(|&s| s == NO_NEIGHBOR));
        assert_eq!(a.level(1), 2);
        assert_eq!(a.run(1, 0).len(), 8);
        assert_eq!(a.run(1, 2).len(), 4);
        assert!(a.neighbors(1, 2).is_empty());
    }

    #[test]
    fn links_fill_in_order_and_dedupe() {
        let mut a = arena(2);
        a.allocate(1).unwrap();
        for dest in 1..=2 {
            assert_eq!(a.try_link(0, 1, dest), LinkOutcome::Filled);
        }
        assert_eq!(a.try_link(0, 1, 1), LinkOutcome::Present);
        assert_eq!(a.try_link(0, 1, 3), LinkOutcome::Full);
        assert_eq!(a.neighbors(0, 1), &[1, 2]);
        // Level 0 untouched.
        assert!(a.neighbors(0, 0).is_empty());
    }

    #[test]
    fn overwrite_compacts_run() {
        let mut a = arena(2);
        a.allocate(0).unwrap();
        for dest in [5, 6, 7, 8] {
            a.try_link(0, 0, dest);
        }
        a.overwrite(0, 0, &[7, 5]);
        assert_eq!(a.run(0, 0), &[7, 5, NO_NEIGHBOR, NO_NEIGHBOR]);
        assert_eq!(a.neighbors(0, 0), &[7, 5]);
    }

    #[test]
    #[should_panic(expected = "exceed capacity")]
    fn overwrite_rejects_oversized_runs() {
        let mut a = arena(2);
        a.allocate(1).unwrap();
        a.overwrite(0, 1, &[1, 2, 3]);
    }
}
