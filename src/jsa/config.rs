//! JSA configuration.
//!
//! [`JsaConfig`] holds the run parameters shared by all three search loops.
//! The route length is not part of the configuration: it is the number of
//! clients in the [`DistanceMatrix`](crate::DistanceMatrix) being searched.

use crate::error::{JsaError, Result};

/// Configuration for a Jellyfish Search run.
///
/// # Defaults
///
/// ```
/// use u_jsa::jsa::JsaConfig;
///
/// let config = JsaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_iterations, 1000);
/// assert!(config.workers >= 1);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_jsa::jsa::JsaConfig;
///
/// let config = JsaConfig::default()
///     .with_population_size(70)
///     .with_max_iterations(100)
///     .with_workers(4)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JsaConfig {
    /// Number of routes in the population.
    pub population_size: usize,

    /// Number of iterations. Every iteration evaluates and perturbs each
    /// route exactly once; there is no early termination.
    pub max_iterations: usize,

    /// Number of workers: threads for the shared-memory loop, ranks for the
    /// distributed loop. Ignored by the sequential loop.
    pub workers: usize,

    /// Evaluate each route's edge sum as a parallel reduction.
    ///
    /// Only pays off for long routes.
    pub parallel_cost: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a seed from OS entropy; the drawn seed is logged.
    pub seed: Option<u64>,
}

impl Default for JsaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_iterations: 1000,
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            parallel_cost: false,
            seed: None,
        }
    }
}

impl JsaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Enables or disables the parallel edge-sum cost evaluator.
    pub fn with_parallel_cost(mut self, parallel: bool) -> Self {
        self.parallel_cost = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`JsaError::Config`] if the population, the iteration budget
    /// or the worker count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(JsaError::Config("population_size must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(JsaError::Config("max_iterations must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(JsaError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JsaConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_iterations, 1000);
        assert!(config.workers >= 1);
        assert!(!config.parallel_cost);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = JsaConfig::default()
            .with_population_size(70)
            .with_max_iterations(100)
            .with_workers(8)
            .with_parallel_cost(true)
            .with_seed(42);

        assert_eq!(config.population_size, 70);
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.workers, 8);
        assert!(config.parallel_cost);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_ok() {
        assert!(JsaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_population() {
        let config = JsaConfig::default().with_population_size(0);
        assert!(matches!(config.validate(), Err(JsaError::Config(_))));
    }

    #[test]
    fn test_validate_zero_iterations() {
        let config = JsaConfig::default().with_max_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_workers() {
        let config = JsaConfig::default().with_workers(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_route_population_is_valid() {
        let config = JsaConfig::default().with_population_size(1);
        assert!(config.validate().is_ok());
    }
}
