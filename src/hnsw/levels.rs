//! Level assignment and per-level neighbor capacities.
//!
//! With `lambda = 1 / ln(M)`, the probability of drawing level `l` is
//! `exp(-l / lambda) * (1 - exp(-1 / lambda))`, i.e. `M^-l * (1 - 1/M)`: a
//! geometric distribution where each level holds roughly `1/M` of the points
//! of the level below. The table stops at the first level whose probability
//! falls under [`MIN_LEVEL_PROBABILITY`]; any leftover mass lands on the last
//! level.

use crate::random::UniformSource;
use crate::{Result, RetrieveError};
use std::ops::Range;

/// Levels with a smaller assignment probability are not tabulated.
pub const MIN_LEVEL_PROBABILITY: f64 = 1e-9;

/// Hard bound on the table length, whatever `M` is.
const MAX_TABULATED_LEVELS: usize = 100;

/// Precomputed level distribution and cumulative slot layout for one `M`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAssigner {
    assign_probas: Vec<f64>,
    /// `cum_neighbors[l]` = total slots for levels `0..l`; one entry longer
    /// than `assign_probas`.
    cum_neighbors: Vec<usize>,
}

impl LevelAssigner {
    /// Build the tables for branching factor `m`.
    ///
    /// Fails with [`RetrieveError::InvalidConfiguration`] for `m < 2`, where
    /// `1 / ln(m)` is undefined or negative.
    pub fn new(m: usize) -> Result<Self> {
        if m < 2 {
            return Err(RetrieveError::InvalidConfiguration(format!(
                "M must be at least 2, got {m}"
            )));
        }
        let lambda = 1.0 / (m as f64).ln();

        let mut assign_probas = Vec::new();
        let mut cum_neighbors = vec![0];
        let mut total = 0;
        for level in 0..MAX_TABULATED_LEVELS {
            let proba = (-(level as f64) / lambda).exp() * (1.0 - (-1.0 / lambda).exp());
            if proba < MIN_LEVEL_PROBABILITY {
                break;
            }
            assign_probas.push(proba);
            total += if level == 0 { m * 2 } else { m };
            cum_neighbors.push(total);
        }

        Ok(Self {
            assign_probas,
            cum_neighbors,
        })
    }

    /// Draw a level for a new point.
    pub fn draw_level<S: UniformSource + ?Sized>(&self, source: &mut S) -> usize {
        self.level_for(source.next_uniform())
    }

    /// Map a uniform value in `[0, 1)` to a level.
    pub fn level_for(&self, mut f: f64) -> usize {
        for (level, &proba) in self.assign_probas.iter().enumerate() {
            if f < proba {
                return level;
            }
            f -= proba;
        }
        self.top_level()
    }

    /// Per-level assignment probabilities.
    pub fn probabilities(&self) -> &[f64] {
        &self.assign_probas
    }

    /// Highest level that can be drawn.
    pub fn top_level(&self) -> usize {
        self.assign_probas.len().saturating_sub(1)
    }

    /// Slots a point at `level` occupies in the arena (levels `0..=level`).
    #[inline]
    pub fn slots_for(&self, level: usize) -> usize {
        self.cum_neighbors[level + 1]
    }

    /// Slot range of `level` relative to the start of a point's block.
    #[inline]
    pub fn run_range(&self, level: usize) -> Range<usize> {
        self.cum_neighbors[level]..self.cum_neighbors[level + 1]
    }

    /// Capacity of a run at `level`.
    #[inline]
    pub fn capacity(&self, level: usize) -> usize {
        self.cum_neighbors[level + 1] - self.cum_neighbors[level]
    }
}
