//! Shared-memory thread-parallel search loop.
//!
//! [`SharedMemoryRunner`] splits one population into contiguous chunks,
//! one per worker thread of a rayon pool. Each iteration is a fork-join
//! region:
//!
//! 1. Every worker walks its chunk with its own random stream, tracking a
//!    best route local to this iteration and perturbing every route.
//! 2. The region joins; the per-worker bests are folded in worker order
//!    into the iteration best.
//! 3. The iteration best is compared against the run-wide best.
//!
//! Chunks are disjoint, so perturbation writes need no synchronization, and
//! step 3 happens on the orchestrating thread only, so the run-wide best has
//! exactly one writer.
//!
//! # Promotion granularity
//!
//! Unlike [`SequentialRunner`](super::SequentialRunner), the run-wide best
//! is only updated once per iteration, from the best route seen during that
//! iteration. Given identical random draws the two loops therefore follow
//! different trajectories; this is intentional and preserved.

use super::config::JsaConfig;
use super::operators::initialize_population;
use super::sweep::sweep;
use super::types::{cost_or_worst, promote, BestSolution, SearchResult};
use crate::error::{JsaError, Result};
use crate::matrix::DistanceMatrix;
use crate::random::{resolve_seed, seeded_stream, MASTER_STREAM};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Executes the shared-memory parallel Jellyfish Search loop.
///
/// The population is built sequentially from the master stream, so for a
/// fixed seed the result does not depend on thread scheduling. Worker `w`
/// draws its perturbations from stream `1 + w`.
pub struct SharedMemoryRunner;

impl SharedMemoryRunner {
    /// Runs the search on a dedicated pool of `config.workers` threads.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or the pool cannot be built.
    pub fn run(matrix: &DistanceMatrix, config: &JsaConfig) -> Result<SearchResult> {
        config.validate()?;
        let seed = resolve_seed(config.seed);
        let workers = config.workers;

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("jsa-worker-{i}"))
            .build()
            .map_err(|e| JsaError::ThreadPool(e.to_string()))?;

        let start = Instant::now();
        info!(
            event = "search_start",
            variant = "shared_memory",
            population = config.population_size,
            clients = matrix.len(),
            iterations = config.max_iterations,
            workers,
            seed,
        );

        let mut master = seeded_stream(seed, MASTER_STREAM);
        let mut population = initialize_population(config.population_size, matrix.len(), &mut master)?;

        let chunk_size = config.population_size.div_ceil(workers);
        let mut worker_rngs: Vec<ChaCha8Rng> = (0..workers as u64)
            .map(|w| seeded_stream(seed, MASTER_STREAM + 1 + w))
            .collect();

        let mut best: Option<BestSolution> = None;
        let mut improvements = 0usize;
        let mut cost_history = Vec::with_capacity(config.max_iterations);

        for iteration in 0..config.max_iterations {
            // fork: one chunk per worker, bests local to this iteration
            let local_bests: Vec<Option<BestSolution>> = pool.install(|| {
                population
                    .par_chunks_mut(chunk_size)
                    .zip(worker_rngs.par_iter_mut())
                    .map(|(chunk, rng)| {
                        let mut local = None;
                        sweep(chunk, matrix, config.parallel_cost, &mut local, rng)?;
                        Ok(local)
                    })
                    .collect::<Result<Vec<_>>>()
            })?;

            // join: merge into the iteration best, then into the run-wide best
            let iteration_best = merge_bests(local_bests);
            if let Some(candidate) = iteration_best {
                if promote(&mut best, candidate.cost, &candidate.route) {
                    improvements += 1;
                    debug!(event = "best_improved", iteration, cost = candidate.cost);
                }
            }

            let current = cost_or_worst(&best);
            trace!(event = "iteration_end", iteration, best = current);
            cost_history.push(current);
        }

        let best = best.ok_or_else(|| JsaError::Config("search evaluated no route".into()))?;
        let elapsed = start.elapsed();

        info!(
            event = "search_end",
            variant = "shared_memory",
            cost = best.cost,
            improvements,
            workers,
            duration_ms = elapsed.as_millis() as u64,
        );

        Ok(SearchResult {
            best,
            iterations: config.max_iterations,
            improvements,
            cost_history,
            seed: Some(seed),
            elapsed,
        })
    }
}

/// Folds per-worker bests in worker order, keeping the first strictly
/// lowest cost.
fn merge_bests(local_bests: Vec<Option<BestSolution>>) -> Option<BestSolution> {
    local_bests
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<BestSolution>, candidate| match acc {
            Some(current) if !current.is_improved_by(candidate.cost) => Some(current),
            _ => Some(candidate),
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsa::operators::{is_permutation, route_cost};
    use crate::jsa::SequentialRunner;

    fn random_matrix(n: usize, seed: u64) -> DistanceMatrix {
        let mut rng = seeded_stream(seed, 99);
        DistanceMatrix::random(n, 1..=100, &mut rng).unwrap()
    }

    #[test]
    fn test_merge_bests_picks_minimum() {
        let merged = merge_bests(vec![
            Some(BestSolution::new(5.0, vec![0, 1])),
            None,
            Some(BestSolution::new(3.0, vec![1, 0])),
            Some(BestSolution::new(4.0, vec![0, 1])),
        ]);
        assert_eq!(merged, Some(BestSolution::new(3.0, vec![1, 0])));
    }

    #[test]
    fn test_merge_bests_tie_keeps_first() {
        let merged = merge_bests(vec![
            Some(BestSolution::new(3.0, vec![0, 1, 2])),
            Some(BestSolution::new(3.0, vec![2, 1, 0])),
        ]);
        assert_eq!(merged.unwrap().route, vec![0, 1, 2]);
    }

    #[test]
    fn test_merge_bests_empty() {
        assert_eq!(merge_bests(vec![None, None]), None);
        assert_eq!(merge_bests(vec![]), None);
    }

    #[test]
    fn test_ring_of_four_finds_optimum() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 10.0, 1.0],
            vec![1.0, 0.0, 1.0, 10.0],
            vec![10.0, 1.0, 0.0, 1.0],
            vec![1.0, 10.0, 1.0, 0.0],
        ])
        .unwrap();
        let config = JsaConfig::default()
            .with_population_size(20)
            .with_max_iterations(200)
            .with_workers(4)
            .with_seed(42);

        let result = SharedMemoryRunner::run(&matrix, &config).unwrap();
        assert_eq!(result.best.cost, 4.0);
    }

    #[test]
    fn test_result_is_consistent() {
        let matrix = random_matrix(25, 4);
        let config = JsaConfig::default()
            .with_population_size(40)
            .with_max_iterations(60)
            .with_workers(3)
            .with_seed(42);

        let result = SharedMemoryRunner::run(&matrix, &config).unwrap();

        assert!(is_permutation(&result.best.route));
        assert_eq!(route_cost(&result.best.route, &matrix), result.best.cost);
        assert_eq!(result.cost_history.len(), 60);
        for window in result.cost_history.windows(2) {
            assert!(window[1] <= window[0]);
        }
        assert!(result.improvements <= 60);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let matrix = random_matrix(20, 6);
        let config = JsaConfig::default()
            .with_population_size(33)
            .with_max_iterations(50)
            .with_workers(4)
            .with_seed(77);

        let a = SharedMemoryRunner::run(&matrix, &config).unwrap();
        let b = SharedMemoryRunner::run(&matrix, &config).unwrap();

        assert_eq!(a.best, b.best);
        assert_eq!(a.cost_history, b.cost_history);
    }

    #[test]
    fn test_more_workers_than_routes() {
        let matrix = random_matrix(8, 2);
        let config = JsaConfig::default()
            .with_population_size(3)
            .with_max_iterations(20)
            .with_workers(8)
            .with_seed(42);

        let result = SharedMemoryRunner::run(&matrix, &config).unwrap();
        assert!(is_permutation(&result.best.route));
    }

    #[test]
    fn test_parallel_cost_inside_workers() {
        let matrix = random_matrix(64, 12);
        let config = JsaConfig::default()
            .with_population_size(16)
            .with_max_iterations(10)
            .with_workers(2)
            .with_seed(42);

        let a = SharedMemoryRunner::run(&matrix, &config).unwrap();
        let b = SharedMemoryRunner::run(&matrix, &config.clone().with_parallel_cost(true)).unwrap();
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn test_first_iteration_matches_sequential_initial_best() {
        // Both loops build the population from the master stream, and the
        // first iteration evaluates that population before any perturbation
        // lands, so the best after iteration one must coincide.
        let matrix = random_matrix(12, 9);
        let config = JsaConfig::default()
            .with_population_size(24)
            .with_max_iterations(1)
            .with_workers(4)
            .with_seed(5);

        let seq = SequentialRunner::run(&matrix, &config).unwrap();
        let par = SharedMemoryRunner::run(&matrix, &config).unwrap();

        assert_eq!(seq.best.cost, par.best.cost);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let matrix = random_matrix(4, 1);
        let config = JsaConfig::default().with_workers(0);
        assert!(matches!(
            SharedMemoryRunner::run(&matrix, &config),
            Err(JsaError::Config(_))
        ));
    }
}
