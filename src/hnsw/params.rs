//! HNSW construction and query parameters.

use crate::random::DEFAULT_SEED;
use crate::{Result, RetrieveError};
use serde::{Deserialize, Serialize};

/// Default branching factor.
pub const DEFAULT_M: usize = 32;
/// Default insertion beam width.
pub const DEFAULT_EF_CONSTRUCTION: usize = 40;
/// Default query beam width.
pub const DEFAULT_EF_SEARCH: usize = 16;

/// Parameters for an [`HnswIndex`](crate::hnsw::HnswIndex).
///
/// Missing fields fall back to [`Default`] when deserializing, so a config
/// document only needs the values it overrides:
///
/// ```
/// use layerwise::hnsw::HnswParams;
///
/// let params: HnswParams = serde_json::from_str(r#"{ "m": 8 }"#).unwrap();
/// assert_eq!(params.m, 8);
/// assert_eq!(params.ef_construction, 40);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswParams {
    /// Branching factor: degree bound above level 0 (level 0 allows `2 * m`).
    pub m: usize,
    /// Beam width used while inserting.
    pub ef_construction: usize,
    /// Default beam width for queries (overridable per call).
    pub ef_search: usize,
    /// Seed for the level-assignment generator.
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: DEFAULT_M,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            ef_search: DEFAULT_EF_SEARCH,
            seed: DEFAULT_SEED,
        }
    }
}

impl HnswParams {
    /// Default parameters with branching factor `m`.
    pub fn with_m(m: usize) -> Self {
        Self {
            m,
            ..Self::default()
        }
    }

    pub fn ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = ef;
        self
    }

    pub fn ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Degree bound of a neighbor run at `level`.
    #[inline]
    pub fn max_neighbors(&self, level: usize) -> usize {
        if level == 0 {
            self.m * 2
        } else {
            self.m
        }
    }

    /// Check parameters for an index of the given dimension.
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if dimension == 0 {
            return Err(RetrieveError::InvalidConfiguration(
                "dimension must be positive".to_string(),
            ));
        }
        if self.m < 2 {
            return Err(RetrieveError::InvalidConfiguration(format!(
                "M must be at least 2, got {}",
                self.m
            )));
        }
        if self.ef_construction < 1 {
            return Err(RetrieveError::InvalidConfiguration(
                "ef_construction must be at least 1".to_string(),
            ));
        }
        if self.ef_search < 1 {
            return Err(RetrieveError::InvalidConfiguration(
                "ef_search must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
