//! Command-line driver: generates a synthetic instance, runs the selected
//! search loops and prints routes, costs, timings, speedup and efficiency.

use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use u_jsa::jsa::{
    DistributedRunner, JsaConfig, SearchResult, SequentialRunner, SharedMemoryRunner,
};
use u_jsa::random::{resolve_seed, seeded_stream};
use u_jsa::report::PerformanceReport;
use u_jsa::{DistanceMatrix, Result};

/// Random stream reserved for instance generation.
const MATRIX_STREAM: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Single-threaded loop only.
    Sequential,
    /// Thread pool, compared against the same loop on one thread.
    Shared,
    /// In-process ranks, compared against the coordinator's baseline.
    Distributed,
    /// All of the above.
    All,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Jellyfish Search for single-vehicle cyclic routing", long_about = None)]
struct Args {
    /// Which search loop to run.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Number of clients (route length).
    #[arg(long, default_value_t = 10)]
    clients: usize,

    /// Number of routes in the population.
    #[arg(long, default_value_t = 70)]
    population: usize,

    /// Number of iterations.
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    /// Threads or ranks; defaults to the available parallelism.
    #[arg(long)]
    workers: Option<usize>,

    /// Seed for the instance and the search; random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Smallest generated distance.
    #[arg(long, default_value_t = 1)]
    min_distance: u32,

    /// Largest generated distance.
    #[arg(long, default_value_t = 100)]
    max_distance: u32,

    /// Sum each route's edges in parallel.
    #[arg(long)]
    parallel_cost: bool,
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "run_failed", error = %e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<()> {
    let seed = resolve_seed(args.seed);
    let mut config = JsaConfig::default()
        .with_population_size(args.population)
        .with_max_iterations(args.iterations)
        .with_parallel_cost(args.parallel_cost)
        .with_seed(seed);
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    config.validate()?;

    let mut rng = seeded_stream(seed, MATRIX_STREAM);
    let matrix = DistanceMatrix::random(
        args.clients,
        args.min_distance..=args.max_distance,
        &mut rng,
    )?;

    println!("Seed: {seed}");
    println!(
        "Clients: {}  Population: {}  Iterations: {}  Workers: {}",
        matrix.len(),
        config.population_size,
        config.max_iterations,
        config.workers
    );

    if matches!(args.mode, Mode::Sequential | Mode::All) {
        run_sequential(&matrix, &config)?;
    }
    if matches!(args.mode, Mode::Shared | Mode::All) {
        run_shared(&matrix, &config)?;
    }
    if matches!(args.mode, Mode::Distributed | Mode::All) {
        run_distributed(&matrix, &config)?;
    }
    Ok(())
}

fn run_sequential(matrix: &DistanceMatrix, config: &JsaConfig) -> Result<()> {
    let result = SequentialRunner::run(matrix, config)?;
    println!("\n==== SEQUENTIAL ====");
    print_result(&result);
    Ok(())
}

fn run_shared(matrix: &DistanceMatrix, config: &JsaConfig) -> Result<()> {
    let reference = SharedMemoryRunner::run(matrix, &config.clone().with_workers(1))?;
    let parallel = SharedMemoryRunner::run(matrix, config)?;

    println!("\n==== SHARED MEMORY (1 thread) ====");
    print_result(&reference);
    println!("\n==== SHARED MEMORY ({} threads) ====", config.workers);
    print_result(&parallel);
    print_performance(&PerformanceReport::new(
        reference.elapsed,
        parallel.elapsed,
        config.workers,
    ));
    Ok(())
}

fn run_distributed(matrix: &DistanceMatrix, config: &JsaConfig) -> Result<()> {
    let result = DistributedRunner::run(matrix, config)?;

    println!("\n==== DISTRIBUTED ({} ranks) ====", result.ranks.len());
    if let Some(baseline) = result.baseline() {
        println!("Baseline best cost: {:.2}", baseline.best.cost);
        println!("Baseline time: {}", format_secs(baseline.elapsed));
    }
    for rank in &result.ranks {
        println!(
            "Rank {} [{}..{}) -> local cost: {}, time: {}, speedup: {:.2}",
            rank.rank,
            rank.partition.start,
            rank.partition.end,
            rank.local_best
                .as_ref()
                .map_or_else(|| "-".to_string(), |b| format!("{:.2}", b.cost)),
            format_secs(rank.elapsed),
            rank.speedup()
        );
    }
    println!("Global best cost: {:.2}", result.global_best_cost);
    if let Some(baseline) = result.baseline() {
        print_performance(&PerformanceReport::new(
            baseline.elapsed,
            result.parallel_elapsed(),
            result.ranks.len(),
        ));
    }
    Ok(())
}

fn print_result(result: &SearchResult) {
    let route: Vec<String> = result.best.route.iter().map(|c| c.to_string()).collect();
    println!("Best route: {}", route.join(" "));
    println!("Cost: {:.2}", result.best.cost);
    println!("Improvements: {}", result.improvements);
    println!("Time: {}", format_secs(result.elapsed));
}

fn print_performance(report: &PerformanceReport) {
    println!("\nSequential time: {}", format_secs(report.sequential));
    println!("Parallel time: {}", format_secs(report.parallel));
    println!("Speedup: {:.4}", report.speedup());
    println!("Efficiency: {:.4}", report.efficiency());
}

fn format_secs(d: Duration) -> String {
    format!("{:.6} s", d.as_secs_f64())
}
