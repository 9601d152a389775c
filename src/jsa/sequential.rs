//! Single-threaded search loop.
//!
//! [`SequentialRunner`] is the reference variant: one population, one
//! random stream, and promotion to the best solution checked after every
//! individual route evaluation.

use super::config::JsaConfig;
use super::operators::initialize_population;
use super::sweep::sweep;
use super::types::{cost_or_worst, BestSolution, SearchResult};
use crate::error::{JsaError, Result};
use crate::matrix::DistanceMatrix;
use crate::random::{resolve_seed, seeded_stream, RandomSource, MASTER_STREAM};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Executes the sequential Jellyfish Search loop.
///
/// # Usage
///
/// ```
/// use u_jsa::DistanceMatrix;
/// use u_jsa::jsa::{JsaConfig, SequentialRunner};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 1.0, 10.0, 1.0],
///     vec![1.0, 0.0, 1.0, 10.0],
///     vec![10.0, 1.0, 0.0, 1.0],
///     vec![1.0, 10.0, 1.0, 0.0],
/// ]).unwrap();
/// let config = JsaConfig::default()
///     .with_population_size(20)
///     .with_max_iterations(50)
///     .with_seed(42);
/// let result = SequentialRunner::run(&matrix, &config).unwrap();
/// assert_eq!(result.best.cost, 4.0);
/// ```
pub struct SequentialRunner;

impl SequentialRunner {
    /// Runs the search with a generator derived from `config.seed`.
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub fn run(matrix: &DistanceMatrix, config: &JsaConfig) -> Result<SearchResult> {
        config.validate()?;
        let seed = resolve_seed(config.seed);
        let mut rng = seeded_stream(seed, MASTER_STREAM);
        let mut result = Self::run_with_random(matrix, config, &mut rng)?;
        result.seed = Some(seed);
        Ok(result)
    }

    /// Runs the search drawing every random decision from `rng`.
    ///
    /// The loop is:
    ///
    /// 1. Build the population once.
    /// 2. Repeat `max_iterations` times: for each route in population order,
    ///    evaluate it, replace the best-ever solution if strictly better,
    ///    then perturb the route.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or `rng` fails.
    pub fn run_with_random<S: RandomSource + ?Sized>(
        matrix: &DistanceMatrix,
        config: &JsaConfig,
        rng: &mut S,
    ) -> Result<SearchResult> {
        config.validate()?;
        let start = Instant::now();

        info!(
            event = "search_start",
            variant = "sequential",
            population = config.population_size,
            clients = matrix.len(),
            iterations = config.max_iterations,
        );

        // Initializing
        let mut population = initialize_population(config.population_size, matrix.len(), rng)?;

        // Iterating
        let mut best: Option<BestSolution> = None;
        let mut improvements = 0usize;
        let mut cost_history = Vec::with_capacity(config.max_iterations);

        for iteration in 0..config.max_iterations {
            let before = cost_or_worst(&best);
            improvements += sweep(&mut population, matrix, config.parallel_cost, &mut best, rng)?;

            let after = cost_or_worst(&best);
            if after < before {
                debug!(event = "best_improved", iteration, cost = after);
            }
            trace!(event = "iteration_end", iteration, best = after);
            cost_history.push(after);
        }

        // Done
        let best = best.ok_or_else(|| JsaError::Config("search evaluated no route".into()))?;
        let elapsed = start.elapsed();

        info!(
            event = "search_end",
            variant = "sequential",
            cost = best.cost,
            improvements,
            duration_ms = elapsed.as_millis() as u64,
        );

        Ok(SearchResult {
            best,
            iterations: config.max_iterations,
            improvements,
            cost_history,
            seed: None,
            elapsed,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
