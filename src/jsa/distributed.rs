//! Distributed-memory search loop.
//!
//! [`DistributedRunner`] runs a parallel portfolio: every rank builds its
//! own full population from its own random stream, walks only its
//! contiguous [`Partition`] of that population, and keeps a run-wide local
//! best. Ranks never exchange routes. Coordination happens at two points
//! only:
//!
//! 1. A barrier after the coordinator's sequential baseline run, so the
//!    baseline is excluded from the timed phase.
//! 2. A minimum reduction of the local-best costs to the coordinator,
//!    followed by a broadcast of that scalar to every rank.
//!
//! Only the cost is reduced. The route achieving it stays with the rank
//! that found it; [`DistributedResult`] carries no global best route.

use super::config::JsaConfig;
use super::operators::initialize_population;
use super::sequential::SequentialRunner;
use super::sweep::sweep;
use super::types::{cost_or_worst, BestSolution, Partition, SearchResult};
use crate::comm::{Communicator, LocalCluster};
use crate::error::{JsaError, Result};
use crate::matrix::DistanceMatrix;
use crate::random::{resolve_seed, seeded_stream};
use crate::report::speedup;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Rank that runs the sequential baseline and roots the collectives.
pub const COORDINATOR: usize = 0;

/// What one rank knows at the end of a distributed run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankReport {
    /// This rank.
    pub rank: usize,

    /// Population indices this rank walked.
    pub partition: Partition,

    /// Best route found in this rank's partition, if it owned any route.
    pub local_best: Option<BestSolution>,

    /// Number of times the local best was replaced.
    pub improvements: usize,

    /// Minimum local-best cost over all ranks, as received by broadcast.
    pub global_best_cost: f64,

    /// Time spent in this rank's timed search loop.
    pub elapsed: Duration,

    /// Coordinator's baseline time, as received by broadcast.
    pub baseline_elapsed: Duration,

    /// Sequential baseline result; present on the coordinator only.
    pub baseline: Option<SearchResult>,
}

impl RankReport {
    /// Local speedup: baseline time over this rank's loop time.
    pub fn speedup(&self) -> f64 {
        speedup(self.baseline_elapsed, self.elapsed)
    }
}

/// Outcome of a distributed run, collected from all ranks.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributedResult {
    /// Minimum local-best cost across all ranks.
    pub global_best_cost: f64,

    /// Per-rank reports, in rank order.
    pub ranks: Vec<RankReport>,

    /// Seed every rank derived its stream from.
    pub seed: u64,
}

impl DistributedResult {
    /// The coordinator's report.
    pub fn coordinator(&self) -> &RankReport {
        &self.ranks[COORDINATOR]
    }

    /// The coordinator's sequential baseline.
    pub fn baseline(&self) -> Option<&SearchResult> {
        self.coordinator().baseline.as_ref()
    }

    /// Wall-clock time of the timed phase: the slowest rank's loop time.
    pub fn parallel_elapsed(&self) -> Duration {
        self.ranks.iter().map(|r| r.elapsed).max().unwrap_or_default()
    }
}

/// Executes the distributed Jellyfish Search loop.
///
/// # Usage
///
/// ```
/// use u_jsa::DistanceMatrix;
/// use u_jsa::jsa::{DistributedRunner, JsaConfig};
///
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0.0, 2.0, 9.0],
///     vec![1.0, 0.0, 6.0],
///     vec![15.0, 7.0, 0.0],
/// ]).unwrap();
/// let config = JsaConfig::default()
///     .with_population_size(12)
///     .with_max_iterations(10)
///     .with_workers(3)
///     .with_seed(42);
/// let result = DistributedRunner::run(&matrix, &config).unwrap();
/// assert_eq!(result.ranks.len(), 3);
/// assert!(result.ranks.iter().all(|r| r.global_best_cost == result.global_best_cost));
/// ```
pub struct DistributedRunner;

impl DistributedRunner {
    /// Runs `config.workers` ranks on an in-process [`LocalCluster`].
    ///
    /// # Errors
    /// Fails if the configuration is invalid or any rank fails; a single
    /// failing rank fails the whole run.
    pub fn run(matrix: &DistanceMatrix, config: &JsaConfig) -> Result<DistributedResult> {
        config.validate()?;
        let seed = resolve_seed(config.seed);

        info!(
            event = "search_start",
            variant = "distributed",
            population = config.population_size,
            clients = matrix.len(),
            iterations = config.max_iterations,
            ranks = config.workers,
            seed,
        );

        let ranks = LocalCluster::run(config.workers, |comm| {
            Self::run_rank(&comm, matrix, config, seed)
        })?;
        let global_best_cost = ranks[COORDINATOR].global_best_cost;
        let result = DistributedResult {
            global_best_cost,
            ranks,
            seed,
        };

        info!(
            event = "search_end",
            variant = "distributed",
            cost = global_best_cost,
            ranks = result.ranks.len(),
            duration_ms = result.parallel_elapsed().as_millis() as u64,
        );

        Ok(result)
    }

    /// Runs one rank of the distributed loop over `comm`.
    ///
    /// Every rank of the run must call this with the same `matrix`,
    /// `config` and `seed`. Rank `r` draws from stream `r` of `seed`.
    ///
    /// # Errors
    /// Fails if the configuration is invalid, the random source fails, or a
    /// collective fails.
    pub fn run_rank<C: Communicator + ?Sized>(
        comm: &C,
        matrix: &DistanceMatrix,
        config: &JsaConfig,
        seed: u64,
    ) -> Result<RankReport> {
        config.validate()?;
        let rank = comm.rank();
        let size = comm.size();
        if rank >= size {
            return Err(JsaError::Collective {
                rank,
                reason: format!("rank out of range for {size} ranks"),
            });
        }
        let mut rng = seeded_stream(seed, rank as u64);

        // untimed baseline on the coordinator
        let baseline = if rank == COORDINATOR {
            Some(SequentialRunner::run_with_random(matrix, config, &mut rng)?)
        } else {
            None
        };
        comm.barrier()?;

        // each rank owns a full population and walks its own slice of it
        let mut population = initialize_population(config.population_size, matrix.len(), &mut rng)?;
        let partition = Partition::for_rank(config.population_size, size, rank);
        info!(
            event = "rank_start",
            rank,
            start = partition.start,
            end = partition.end,
        );

        let start = Instant::now();
        let mut local_best: Option<BestSolution> = None;
        let mut improvements = 0usize;
        let slice = &mut population[partition.range()];
        for _ in 0..config.max_iterations {
            improvements += sweep(slice, matrix, config.parallel_cost, &mut local_best, &mut rng)?;
        }
        let elapsed = start.elapsed();

        let local_cost = cost_or_worst(&local_best);
        debug!(event = "reduce", rank, local_cost);
        let global_best_cost = comm.all_reduce_min(local_cost, COORDINATOR)?;

        let baseline_secs = baseline.as_ref().map_or(0.0, |b| b.elapsed.as_secs_f64());
        let baseline_secs = comm.broadcast(baseline_secs, COORDINATOR)?;
        let baseline_elapsed = Duration::try_from_secs_f64(baseline_secs).unwrap_or_default();

        let report = RankReport {
            rank,
            partition,
            local_best,
            improvements,
            global_best_cost,
            elapsed,
            baseline_elapsed,
            baseline,
        };
        info!(
            event = "rank_end",
            rank,
            local_cost,
            global_cost = global_best_cost,
            duration_ms = elapsed.as_millis() as u64,
            speedup = report.speedup(),
        );
        Ok(report)
    }
}

// ============================================================================
// Tests
// ============================================================================
