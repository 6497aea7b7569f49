//! Error types for layerwise.

use thiserror::Error;

/// Errors that can occur during indexing/search operations.
///
/// Every check that produces one of these runs before the index is touched,
/// so a rejected call leaves the index exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrieveError {
    /// Vector length does not match the index dimension.
    #[error("dimension mismatch: index expects {expected} dimensions, vector has {got}")]
    InvalidDimension { expected: usize, got: usize },

    /// Rejected parameter or input value (never silently clamped).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Search issued before any point was inserted.
    #[error("index is empty")]
    EmptyIndex,

    /// Every assignable point id is taken.
    #[error("index is full: at most {capacity} points")]
    IndexFull { capacity: usize },
}

pub type Result<T> = std::result::Result<T, RetrieveError>;

/// Reject vectors containing NaN or infinite components.
pub(crate) fn ensure_finite(vector: &[f32]) -> Result<()> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(pos) => Err(RetrieveError::InvalidConfiguration(format!(
            "vector component {pos} is not finite ({})",
            vector[pos]
        ))),
        None => Ok(()),
    }
}

/// Largest component magnitude a `dimension`-long vector may carry.
///
/// Two vectors within this bound are at most `2 * bound` apart per
/// component, so the squared distance summed in `f32` stays below
/// `f32::MAX / 2` and can never overflow to infinity.
pub fn max_component(dimension: usize) -> f32 {
    (f32::MAX / (8.0 * dimension.max(1) as f32)).sqrt()
}

/// Reject vectors containing NaN or infinite components, or finite
/// components large enough to overflow a distance computation.
pub(crate) fn ensure_in_range(vector: &[f32]) -> Result<()> {
    ensure_finite(vector)?;
    let bound = max_component(vector.len());
    match vector.iter().position(|x| x.abs() > bound) {
        Some(pos) => Err(RetrieveError::InvalidConfiguration(format!(
            "vector component {pos} ({}) exceeds the magnitude limit {bound:e}",
            vector[pos]
        ))),
        None => Ok(()),
    }
}

/// Reject vectors whose length differs from `expected`.
pub(crate) fn ensure_dimension(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(RetrieveError::InvalidDimension {
            expected,
            got: vector.len(),
        });
    }
    Ok(())
}
