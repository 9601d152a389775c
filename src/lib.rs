//! Jellyfish Search routing optimizer.
//!
//! Minimizes the cost of a closed tour visiting every client exactly once
//! (a single-vehicle routing objective with no capacity or time-window
//! constraints) using a population-based Jellyfish Search, realized three
//! ways so their quality and runtime can be compared:
//!
//! - **Sequential**: a single thread walks the whole population.
//! - **Shared memory**: a rayon thread pool walks disjoint chunks of one
//!   population and merges per-iteration bests.
//! - **Distributed**: independent ranks with no shared state, each walking
//!   its partition of its own population, joined by a final minimum
//!   reduction.
//!
//! # Modules
//!
//! - [`jsa`]: search loops, configuration and route operators
//! - [`matrix`]: the validated distance matrix
//! - [`random`]: the injectable random-source capability
//! - [`comm`]: collectives for the distributed loop and an in-process cluster
//! - [`report`]: speedup and efficiency
//!
//! # Example
//!
//! ```
//! use u_jsa::{random, DistanceMatrix};
//! use u_jsa::jsa::{JsaConfig, SequentialRunner};
//!
//! let mut rng = random::seeded_stream(1, 0);
//! let matrix = DistanceMatrix::random(10, 1..=100, &mut rng).unwrap();
//! let config = JsaConfig::default()
//!     .with_population_size(30)
//!     .with_max_iterations(100)
//!     .with_seed(42);
//! let result = SequentialRunner::run(&matrix, &config).unwrap();
//! assert_eq!(result.best.route.len(), 10);
//! ```

pub mod comm;
pub mod error;
pub mod jsa;
pub mod matrix;
pub mod random;
pub mod report;

pub use error::{JsaError, Result};
pub use matrix::DistanceMatrix;
pub use random::RandomSource;
