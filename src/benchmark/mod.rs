//! Evaluation utilities for measuring index quality.
//!
//! - **Accuracy**: recall@k, false-negative rate
//! - **Ground truth**: exact k-NN by brute force
//! - **Data**: seeded synthetic datasets (uniform and clustered)
//!
//! Dataset files, parameter sweeps and reporting live outside this crate;
//! they only need `insert`, `search`, and the functions here.

pub mod datasets;
pub mod metrics;

pub use datasets::{
    compute_all_ground_truth, create_benchmark_dataset, create_clustered_dataset, exact_knn,
    Dataset,
};
pub use metrics::{false_negative_rate, mean_recall, recall_at_k};
