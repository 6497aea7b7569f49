//! Synthetic datasets and exact ground truth for benchmarking.

use crate::distance::l2_distance;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A dataset for ANN benchmarking.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Training vectors (the database to index)
    pub train: Vec<Vec<f32>>,
    /// Test/query vectors
    pub test: Vec<Vec<f32>>,
    /// Vector dimensionality
    pub dimension: usize,
}

impl Dataset {
    /// Number of training vectors.
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    /// Number of test vectors.
    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Create a synthetic benchmark dataset with vectors uniform in `[0, 1]^d`.
pub fn create_benchmark_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    seed: u64,
) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample = |n: usize| -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
            .collect()
    };

    let train = sample(n_train);
    let test = sample(n_test);
    Dataset {
        train,
        test,
        dimension,
    }
}

/// Create a clustered dataset (more realistic than uniform random).
///
/// Generates `n_clusters` centers in `[0, 1]^d`, then samples every point
/// around a random center with Gaussian noise of `cluster_std`, clamped to
/// the unit cube.
///
/// # Panics
///
/// Panics if `n_clusters` is zero.
pub fn create_clustered_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    n_clusters: usize,
    cluster_std: f32,
    seed: u64,
) -> Dataset {
    assert!(n_clusters > 0, "need at least one cluster");
    let mut rng = StdRng::seed_from_u64(seed);

    let centers: Vec<Vec<f32>> = (0..n_clusters)
        .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
        .collect();

    let mut sample = |n: usize| -> Vec<Vec<f32>> {
        (0..n)
            .map(|_| {
                let center = &centers[rng.random_range(0..n_clusters)];
                center
                    .iter()
                    .map(|&c| {
                        // Box-Muller for Gaussian; 1 - u keeps ln() finite.
                        let u1: f32 = 1.0 - rng.random::<f32>();
                        let u2: f32 = rng.random();
                        let z = (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos();
                        (c + z * cluster_std).clamp(0.0, 1.0)
                    })
                    .collect()
            })
            .collect()
    };

    let train = sample(n_train);
    let test = sample(n_test);
    Dataset {
        train,
        test,
        dimension,
    }
}

/// Exact k nearest neighbors by brute force, as `(distance, id)` ascending
/// (ties by id).
pub fn exact_knn<V: AsRef<[f32]>>(query: &[f32], database: &[V], k: usize) -> Vec<(f32, u32)> {
    let mut distances: Vec<(f32, u32)> = database
        .iter()
        .enumerate()
        .map(|(i, v)| (l2_distance(query, v.as_ref()), i as u32))
        .collect();

    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    distances.truncate(k);
    distances
}

/// Ground-truth ids for every test query of `dataset`.
pub fn compute_all_ground_truth(dataset: &Dataset, k: usize) -> Vec<Vec<u32>> {
    dataset
        .test
        .iter()
        .map(|query| {
            exact_knn(query, &dataset.train, k)
                .into_iter()
                .map(|(_, id)| id)
                .collect()
        })
        .collect()
}
