//! Jellyfish Search (JSA) for single-vehicle cyclic routing.
//!
//! A population of routes performs a random walk: every iteration each
//! route is evaluated, compared against the best solution seen so far, and
//! then perturbed by a random swap with no acceptance test. Only the
//! separately tracked best solution improves monotonically.
//!
//! # Search Loops
//!
//! The same search step runs under three concurrency strategies:
//!
//! - [`SequentialRunner`]: one thread; the best is checked after every
//!   route evaluation
//! - [`SharedMemoryRunner`]: one population split across a thread pool;
//!   the best is checked once per iteration against the iteration's best
//! - [`DistributedRunner`]: independent ranks, each with its own
//!   population, walking disjoint partitions; only the best cost is reduced
//!   at the end
//!
//! # Key Types
//!
//! - [`JsaConfig`]: population size, iteration budget, worker count, seed
//! - [`BestSolution`], [`SearchResult`], [`DistributedResult`]
//! - [`Partition`]: the slice of population indices owned by one rank
//!
//! # Submodules
//!
//! - [`operators`]: population initialization, tour cost, perturbation

mod config;
mod distributed;
pub mod operators;
mod sequential;
mod shared;
mod sweep;
mod types;

pub use config::JsaConfig;
pub use distributed::{DistributedResult, DistributedRunner, RankReport, COORDINATOR};
pub use sequential::SequentialRunner;
pub use shared::SharedMemoryRunner;
pub use types::{BestSolution, Partition, Route, SearchResult};
