//! Parallel performance metrics.
//!
//! Speedup is `T_sequential / T_parallel`; efficiency is
//! `speedup / workers`. These are reporting values only and never feed
//! back into the search.

use std::time::Duration;

/// Speedup of a parallel run over a sequential reference.
///
/// Returns `f64::INFINITY` if the parallel time is zero and `NaN` if both
/// times are zero.
pub fn speedup(sequential: Duration, parallel: Duration) -> f64 {
    sequential.as_secs_f64() / parallel.as_secs_f64()
}

/// Timing comparison between a sequential and a parallel run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceReport {
    /// Wall-clock time of the sequential reference.
    pub sequential: Duration,

    /// Wall-clock time of the parallel run.
    pub parallel: Duration,

    /// Number of threads or ranks used by the parallel run.
    pub workers: usize,
}

impl PerformanceReport {
    /// Creates a report.
    pub fn new(sequential: Duration, parallel: Duration, workers: usize) -> Self {
        Self {
            sequential,
            parallel,
            workers,
        }
    }

    /// `T_sequential / T_parallel`.
    pub fn speedup(&self) -> f64 {
        speedup(self.sequential, self.parallel)
    }

    /// `speedup / workers`.
    pub fn efficiency(&self) -> f64 {
        self.speedup() / self.workers as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup_and_efficiency() {
        let report = PerformanceReport::new(Duration::from_millis(800), Duration::from_millis(200), 8);
        assert!((report.speedup() - 4.0).abs() < 1e-12);
        assert!((report.efficiency() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_slowdown() {
        let report = PerformanceReport::new(Duration::from_millis(100), Duration::from_millis(400), 2);
        assert!((report.speedup() - 0.25).abs() < 1e-12);
        assert!((report.efficiency() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_zero_parallel_time() {
        assert_eq!(speedup(Duration::from_secs(1), Duration::ZERO), f64::INFINITY);
        assert!(speedup(Duration::ZERO, Duration::ZERO).is_nan());
    }
}
