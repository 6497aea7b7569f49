//! Euclidean distance for dense vectors.
//!
//! The graph only ever uses the true L2 norm of the difference (not its
//! square): neighbor diversification compares distances between *different*
//! pairs of points and relies on the triangle inequality holding.

/// L2 (Euclidean) distance.
///
/// If dimensions mismatch, this returns `f32::INFINITY` (so it is never selected as a
/// nearest neighbor).
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    l2_distance_squared(a, b).sqrt()
}

/// L2 distance squared (cheaper when only ranking against a single query).
#[inline]
#[must_use]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// L2 distance that must be finite.
///
/// Inputs are validated on the way into the index, so a non-finite result
/// means the index state itself is broken.
///
/// # Panics
///
/// Panics if the distance is NaN or infinite.
#[inline]
pub(crate) fn finite_l2(a: &[f32], b: &[f32]) -> f32 {
    let d = l2_distance(a, b);
    assert!(
        d.is_finite(),
        "non-finite distance ({d}) between stored vectors: index is corrupted"
    );
    d
}
