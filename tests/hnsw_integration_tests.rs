//! Integration tests for the HNSW index.
//!
//! Tests the full lifecycle: build, query, structural checks, determinism.
//!
//! Note: ids are assigned sequentially (0, 1, 2, ...) in insertion order and
//! all distances are Euclidean.

#![cfg(feature = "hnsw")]

use layerwise::benchmark::exact_knn;
use layerwise::hnsw::{HnswIndex, HnswParams, NO_NEIGHBOR};
use layerwise::random::{LcgSource, RngSource, UniformSource};
use layerwise::RetrieveError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Deterministic points in the unit square, spread without a pattern the
/// graph could exploit.
fn scattered_points(n: usize) -> Vec<[f32; 2]> {
    (0..n)
        .map(|i| {
            [
                (((i * 37) % 101) as f64 / 101.0) as f32,
                (((i * 59 + 13) % 97) as f64 / 97.0) as f32,
            ]
        })
        .collect()
}

fn random_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut source = LcgSource::new(seed);
    (0..n)
        .map(|_| {
            (0..dim)
                .map(|_| (source.next_uniform() * 2.0 - 1.0) as f32)
                .collect()
        })
        .collect()
}

fn build(params: HnswParams, vectors: &[Vec<f32>]) -> HnswIndex {
    let dim = vectors[0].len();
    let mut index = HnswIndex::new(dim, params).expect("valid params");
    for v in vectors {
        index.insert(v).expect("insert");
    }
    index
}

#[test]
fn test_first_two_points_link_each_other() {
    let mut index = HnswIndex::new(2, HnswParams::with_m(4)).unwrap();

    assert_eq!(index.insert(&[0.0, 0.0]).unwrap(), 0);
    assert_eq!(index.entry_point(), Some(0));
    let top = index.level_of(0).unwrap();
    for level in 0..=top {
        assert_eq!(index.neighbors(0, level), Some(&[][..]));
    }

    assert_eq!(index.insert(&[1.0, 0.0]).unwrap(), 1);
    assert!(index.neighbors(0, 0).unwrap().contains(&1));
    assert!(index.neighbors(1, 0).unwrap().contains(&0));
}

#[test]
fn test_basic_build_and_query() {
    let vectors = random_vectors(500, 16, 7);
    let index = build(HnswParams::with_m(8).ef_construction(64), &vectors);
    assert_eq!(index.len(), 500);
    assert!(index.validate().is_empty(), "{:?}", index.validate());

    for (i, v) in vectors.iter().enumerate().step_by(25) {
        let hits = index.search_with_ef(v, 1, 64).unwrap();
        assert_eq!(hits[0].1, i as u32, "query {i} should find itself");
        assert_eq!(hits[0].0, 0.0);
    }
}

#[test]
fn test_results_sorted_and_bounded_by_k() {
    let vectors = random_vectors(300, 8, 11);
    let index = build(HnswParams::with_m(6), &vectors);
    let query = random_vectors(1, 8, 99).remove(0);

    for k in [1, 5, 10, 40] {
        let hits = index.search(&query, k).unwrap();
        assert_eq!(hits.len(), k, "beam widens to k so k results come back");
        for pair in hits.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
        }
        let mut ids: Vec<u32> = hits.iter().map(|h| h.1).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), k, "no duplicate ids");
    }
}

#[test]
fn test_full_width_search_is_exact() {
    let points: Vec<Vec<f32>> = scattered_points(120).iter().map(|p| p.to_vec()).collect();
    let index = build(HnswParams::with_m(4).ef_construction(16), &points);
    assert_eq!(index.connectivity(0), (120, 0));

    // A beam as wide as the index never fills before exploring every
    // reachable point, so the answer is the exact one.
    for query in [[0.5f32, 0.5], [0.05, 0.9], [1.2, -0.3]] {
        let hits = index.search_with_ef(&query, 10, 120).unwrap();
        let expected = exact_knn(&query, &points, 10);
        let hit_ids: Vec<u32> = hits.iter().map(|h| h.1).collect();
        let expected_ids: Vec<u32> = expected.iter().map(|h| h.1).collect();
        assert_eq!(hit_ids, expected_ids);
    }
}

#[test]
fn test_structure_holds_under_heavy_repruning() {
    // Small M and a cluster of near-duplicates force many full runs.
    let mut vectors = random_vectors(400, 4, 3);
    for i in 0..100 {
        let eps = i as f32 * 1e-4;
        vectors.push(vec![0.5 + eps, 0.5, 0.5 - eps, 0.5]);
    }
    let index = build(HnswParams::with_m(2).ef_construction(8), &vectors);

    assert!(index.validate().is_empty(), "{:?}", index.validate());
    for id in 0..index.len() as u32 {
        let top = index.level_of(id).unwrap();
        for level in 0..=top {
            let cap = index.params().max_neighbors(level);
            assert!(index.neighbors(id, level).unwrap().len() <= cap);
        }
        assert_eq!(index.neighbors(id, top + 1), None);
    }
    let entry = index.entry_point().unwrap();
    assert_eq!(index.level_of(entry), Some(index.max_level()));
}

#[test]
fn test_level_sequence_is_reproducible() {
    // Level draws depend only on the seed and M, never on the vectors.
    let m4: [usize; 40] = [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 3, 1, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0,
        1, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    let m2: [usize; 40] = [
        1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 2, 0, 0, 1, 2, 6, 2, 0, 1, 1, 0, 1, 1, 5, 0, 0, 1, 1, 0, 0,
        2, 0, 1, 0, 1, 1, 0, 0, 1, 1,
    ];

    for (m, expected) in [(4, m4), (2, m2)] {
        let vectors = random_vectors(40, 3, 5);
        let index = build(HnswParams::with_m(m), &vectors);
        let levels: Vec<usize> = (0..40).map(|id| index.level_of(id).unwrap()).collect();
        assert_eq!(levels, expected, "M = {m}");
    }
}

#[test]
fn test_graph_is_identical_slot_for_slot() {
    const N: u32 = NO_NEIGHBOR;
    let params = HnswParams::with_m(2).ef_construction(4);
    let mut index = HnswIndex::new(2, params).unwrap();
    for p in scattered_points(16) {
        index.insert(&p).unwrap();
    }

    assert_eq!(index.entry_point(), Some(15));
    assert_eq!(index.max_level(), 6);
    #[rustfmt::skip]
    let expected: [u32; 94] = [
        4, 6, 1, 2, 4, N,
        9, 6, 4, 14,
        10, 7, 5, 15, 10, 4,
        11, 1, 6, 4,
        12, 9, 2, 7, 15, 6,
        13, 10, 2, 8,
        14, 11, 1, 3, 4, 14,
        15, 2, 12, 4,
        13, 5, 10, 2,
        1, 14, 4, 12,
        2, 15, 5, 7, 2, 15, 14, 15,
        3, 6, 14, 9,
        4, 7, 9, 15,
        5, 8, 10, 2, 10, N,
        6, 9, 11, 1, 6, 2, 10, 15,
        7, 10, 12, 2, 10, 4, 10, 14, N, N, N, N, N, N, N, N,
    ];
    assert_eq!(index.arena_slots(), &expected[..]);

    // Point 15 sits alone above level 2.
    for level in 3..=6 {
        assert_eq!(index.neighbors(15, level), Some(&[][..]));
    }
}

#[test]
fn test_same_seed_same_graph() {
    let vectors = random_vectors(200, 6, 21);
    let params = HnswParams::with_m(5).ef_construction(20).seed(777);
    let a = build(params.clone(), &vectors);
    let b = build(params, &vectors);
    assert_eq!(a.arena_slots(), b.arena_slots());
    assert_eq!(a.entry_point(), b.entry_point());

    let query = [0.1, -0.2, 0.3, 0.0, 0.5, -0.5];
    assert_eq!(a.search(&query, 10).unwrap(), b.search(&query, 10).unwrap());
}

#[test]
fn test_custom_source_is_deterministic() {
    let vectors = random_vectors(150, 4, 8);
    let make = || {
        let source = RngSource::new(StdRng::seed_from_u64(42));
        let mut index = HnswIndex::with_source(4, HnswParams::with_m(4), source).unwrap();
        index.insert_batch(&vectors).unwrap();
        index
    };
    let a = make();
    let b = make();
    assert_eq!(a.arena_slots(), b.arena_slots());
    assert!(a.validate().is_empty());
}

#[test]
fn test_errors_surface_without_side_effects() {
    let mut index = HnswIndex::new(3, HnswParams::with_m(4)).unwrap();
    assert_eq!(index.search(&[0.0; 3], 1), Err(RetrieveError::EmptyIndex));

    index.insert(&[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(
        index.insert(&[1.0, 2.0]),
        Err(RetrieveError::InvalidDimension {
            expected: 3,
            got: 2
        })
    );
    assert!(index.insert(&[1.0, f32::NEG_INFINITY, 0.0]).is_err());
    assert_eq!(index.len(), 1);

    let err = index.search(&[0.0; 3], 0).unwrap_err();
    assert!(matches!(err, RetrieveError::InvalidConfiguration(_)));
}

#[test]
fn test_params_from_partial_config() {
    let params: HnswParams = serde_json::from_str(r#"{"m": 8, "ef_search": 64}"#).unwrap();
    assert_eq!(params.m, 8);
    assert_eq!(params.ef_search, 64);
    assert_eq!(params.ef_construction, HnswParams::default().ef_construction);
    assert_eq!(params.seed, HnswParams::default().seed);

    let index = HnswIndex::new(4, params).unwrap();
    assert!((index.level_probabilities()[0] - 0.875).abs() < 1e-12);
    assert_eq!(index.params().max_neighbors(0), 16);
    assert_eq!(index.params().max_neighbors(1), 8);
}

#[derive(Clone)]
struct TestLogWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for TestLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .expect("log buffer lock poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<R>(run: impl FnOnce() -> R) -> (R, String) {
    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let writer_buffer = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || TestLogWriter {
            buffer: Arc::clone(&writer_buffer),
        })
        .finish();
    let result = tracing::subscriber::with_default(subscriber, run);
    let logs = {
        let guard = buffer.lock().expect("log buffer lock poisoned");
        String::from_utf8_lossy(&guard).into_owned()
    };
    (result, logs)
}

#[test]
fn test_entry_point_promotion_is_logged() {
    let (index, logs) = with_captured_logs(|| {
        let mut index = HnswIndex::new(2, HnswParams::with_m(2)).unwrap();
        for p in scattered_points(16) {
            index.insert(&p).unwrap();
        }
        index
    });

    assert_eq!(index.entry_point(), Some(15));
    assert!(logs.contains("created HNSW index"), "logs: {logs}");
    assert!(logs.contains("new entry point"), "logs: {logs}");
    // Per-insert events are trace level and stay out of a debug subscriber.
    assert!(!logs.contains("inserting point"), "logs: {logs}");
}
