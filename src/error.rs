//! Error types for the JSA search loops.

use thiserror::Error;

/// Errors raised while configuring or running a search.
#[derive(Debug, Error)]
pub enum JsaError {
    /// Invalid run configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed distance matrix.
    #[error("invalid distance matrix: {0}")]
    Matrix(String),

    /// The injected random source could not produce a value.
    #[error("random source failed: {0}")]
    Random(String),

    /// The worker thread pool could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// A collective operation (barrier, reduction, broadcast) failed.
    ///
    /// Collectives are fate-sharing: once one rank fails, every peer
    /// waiting on it observes this error and the whole run fails.
    #[error("collective operation failed on rank {rank}: {reason}")]
    Collective {
        /// Rank that observed the failure.
        rank: usize,
        /// What went wrong.
        reason: String,
    },

    /// A worker thread panicked.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Result type alias for JSA operations.
pub type Result<T> = std::result::Result<T, JsaError>;
