//! Value types shared by the JSA search loops.

use std::ops::Range;
use std::time::Duration;

/// A closed visiting tour: a permutation of the client indices `0..D`.
pub type Route = Vec<usize>;

/// Best solution found so far: a route and its cyclic tour cost.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestSolution {
    /// Cyclic tour cost of `route`.
    pub cost: f64,

    /// The route itself.
    pub route: Route,
}

impl BestSolution {
    /// Creates a new best solution.
    pub fn new(cost: f64, route: Route) -> Self {
        Self { cost, route }
    }

    /// Returns `true` if `cost` is strictly better than this solution.
    #[inline]
    pub fn is_improved_by(&self, cost: f64) -> bool {
        cost < self.cost
    }
}

/// Outcome of a sequential or shared-memory search run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// The best route found during the entire run, with its cost.
    pub best: BestSolution,

    /// Number of iterations executed (always the configured budget).
    pub iterations: usize,

    /// Number of times the best solution was replaced.
    pub improvements: usize,

    /// Best-ever cost at the end of each iteration.
    pub cost_history: Vec<f64>,

    /// Seed the run was started from, if the loop created its own source.
    pub seed: Option<u64>,

    /// Wall-clock time spent in the search loop.
    pub elapsed: Duration,
}

/// Replaces `best` with `(cost, route)` if the slot is empty or `cost` is
/// strictly lower. Returns `true` when the slot changed.
///
/// This is the single update path for a best-solution slot: the route is
/// copied only on promotion.
pub(crate) fn promote(best: &mut Option<BestSolution>, cost: f64, route: &[usize]) -> bool {
    match best {
        Some(current) if !current.is_improved_by(cost) => false,
        Some(current) => {
            current.cost = cost;
            current.route.clear();
            current.route.extend_from_slice(route);
            true
        }
        None => {
            *best = Some(BestSolution::new(cost, route.to_vec()));
            true
        }
    }
}

/// Cost of an optional best, with an empty slot counting as infinitely bad.
#[inline]
pub(crate) fn cost_or_worst(best: &Option<BestSolution>) -> f64 {
    best.as_ref().map_or(f64::INFINITY, |b| b.cost)
}

/// A contiguous slice `[start, end)` of population indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    /// First index (inclusive).
    pub start: usize,

    /// One past the last index.
    pub end: usize,
}

impl Partition {
    /// Computes the partition of `population_size` indices owned by `rank`
    /// out of `workers`.
    ///
    /// Every worker gets `population_size / workers` indices; the last worker
    /// additionally absorbs the remainder of the integer division. When there
    /// are more workers than indices, all but the last partition are empty.
    ///
    /// # Panics
    /// Panics if `workers` is zero or `rank >= workers`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_jsa::jsa::Partition;
    ///
    /// let parts: Vec<_> = (0..3).map(|r| Partition::for_rank(10, 3, r)).collect();
    /// assert_eq!((parts[0].start, parts[0].end), (0, 3));
    /// assert_eq!((parts[1].start, parts[1].end), (3, 6));
    /// assert_eq!((parts[2].start, parts[2].end), (6, 10));
    /// ```
    pub fn for_rank(population_size: usize, workers: usize, rank: usize) -> Self {
        assert!(workers > 0, "workers must be positive");
        assert!(rank < workers, "rank {rank} out of range for {workers} workers");
        let chunk = population_size / workers;
        let start = chunk * rank;
        let end = if rank == workers - 1 {
            population_size
        } else {
            chunk * (rank + 1)
        };
        Self { start, end }
    }

    /// Number of indices in the partition.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the partition owns no index.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The partition as an index range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_promote_empty_slot() {
        let mut best = None;
        assert!(promote(&mut best, 10.0, &[0, 1, 2]));
        assert_eq!(best, Some(BestSolution::new(10.0, vec![0, 1, 2])));
    }

    #[test]
    fn test_promote_requires_strict_improvement() {
        let mut best = Some(BestSolution::new(10.0, vec![0, 1, 2]));
        assert!(!promote(&mut best, 10.0, &[2, 1, 0]));
        assert_eq!(best.as_ref().unwrap().route, vec![0, 1, 2]);
        assert!(promote(&mut best, 9.0, &[2, 1, 0]));
        assert_eq!(best.as_ref().unwrap().route, vec![2, 1, 0]);
        assert!(!promote(&mut best, 11.0, &[1, 0, 2]));
    }

    #[test]
    fn test_cost_or_worst() {
        assert_eq!(cost_or_worst(&None), f64::INFINITY);
        assert_eq!(cost_or_worst(&Some(BestSolution::new(3.0, vec![0]))), 3.0);
    }

    #[test]
    fn test_partition_remainder_goes_to_last() {
        let last = Partition::for_rank(70, 4, 3);
        assert_eq!(last, Partition { start: 51, end: 70 });
        assert_eq!(last.len(), 19);
    }

    #[test]
    fn test_partition_more_workers_than_items() {
        let parts: Vec<_> = (0..5).map(|r| Partition::for_rank(3, 5, r)).collect();
        assert!(parts[..4].iter().all(Partition::is_empty));
        assert_eq!(parts[4].range(), 0..3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_partition_rank_out_of_range() {
        Partition::for_rank(10, 2, 2);
    }

    proptest! {
        #[test]
        fn prop_partitions_cover_population_exactly(n in 0usize..500, workers in 1usize..40) {
            let parts: Vec<_> = (0..workers).map(|r| Partition::for_rank(n, workers, r)).collect();

            prop_assert_eq!(parts[0].start, 0);
            prop_assert_eq!(parts[workers - 1].end, n);
            for pair in parts.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            let total: usize = parts.iter().map(Partition::len).sum();
            prop_assert_eq!(total, n);

            let base = n / workers;
            for p in &parts[..workers - 1] {
                prop_assert_eq!(p.len(), base);
            }
            prop_assert_eq!(parts[workers - 1].len(), base + n % workers);
        }
    }
}
