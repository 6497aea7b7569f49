//! Append-only vector storage.
//!
//! Vectors live back to back in one `Vec<f32>` (struct-of-arrays layout), so
//! point `i` occupies `data[i * dimension..(i + 1) * dimension]`.

use crate::distance::finite_l2;
use crate::{Result, RetrieveError};

/// Most points an index can hold. Ids are `u32` and `u32::MAX` is reserved
/// as the empty-slot sentinel, so valid ids stop one short of it.
pub const MAX_POINTS: usize = u32::MAX as usize;

/// Id for the point stored at position `index`.
pub(crate) fn point_id(index: usize) -> Result<u32> {
    if index >= MAX_POINTS {
        return Err(RetrieveError::IndexFull {
            capacity: MAX_POINTS,
        });
    }
    u32::try_from(index).map_err(|_| RetrieveError::IndexFull {
        capacity: MAX_POINTS,
    })
}

/// Check that `additional` more points fit next to `len` existing ones.
pub(crate) fn ensure_room(len: usize, additional: usize) -> Result<()> {
    if additional > MAX_POINTS.saturating_sub(len) {
        return Err(RetrieveError::IndexFull {
            capacity: MAX_POINTS,
        });
    }
    Ok(())
}

/// Owns every inserted vector; ids are assigned sequentially from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorStore {
    /// Empty store for vectors of `dimension` components (must be positive).
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RetrieveError::InvalidConfiguration(
                "dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a vector and return its id. The caller checks the length.
    ///
    /// Fails with [`RetrieveError::IndexFull`] once every id is taken.
    pub fn push(&mut self, vector: &[f32]) -> Result<u32> {
        debug_assert_eq!(vector.len(), self.dimension);
        let id = point_id(self.len())?;
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    /// Vector of point `id`.
    #[inline]
    pub fn get(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Euclidean distance between two stored points.
    #[inline]
    pub fn distance(&self, a: u32, b: u32) -> f32 {
        finite_l2(self.get(a), self.get(b))
    }

    /// Euclidean distance between a stored point and an external vector.
    #[inline]
    pub fn distance_to(&self, id: u32, query: &[f32]) -> f32 {
        finite_l2(self.get(id), query)
    }
}
