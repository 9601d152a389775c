//! The search step shared by every loop variant.

use crate::error::Result;
use crate::matrix::DistanceMatrix;
use crate::random::RandomSource;

use super::operators::{evaluate, perturb};
use super::types::{promote, BestSolution, Route};

/// Walks `routes` once in order: evaluates each route, promotes it into
/// `best` if strictly better, then perturbs it unconditionally.
///
/// The caller decides the scope of `best`: run-wide for the sequential and
/// distributed loops, one iteration for a shared-memory worker.
///
/// Returns the number of promotions.
pub(crate) fn sweep<S: RandomSource + ?Sized>(
    routes: &mut [Route],
    matrix: &DistanceMatrix,
    parallel_cost: bool,
    best: &mut Option<BestSolution>,
    rng: &mut S,
) -> Result<usize> {
    let mut promotions = 0;
    for route in routes.iter_mut() {
        let cost = evaluate(route, matrix, parallel_cost);
        if promote(best, cost, route) {
            promotions += 1;
        }
        perturb(route, rng)?;
    }
    Ok(promotions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsa::operators::route_cost;
    use crate::random::seeded_stream;

    #[test]
    fn test_sweep_promotes_before_perturbing() {
        let m = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 9.0],
            vec![9.0, 0.0, 1.0],
            vec![1.0, 9.0, 0.0],
        ])
        .unwrap();
        let mut routes = vec![vec![0, 2, 1], vec![0, 1, 2]];
        let original = routes.clone();
        let mut best = None;
        let mut rng = seeded_stream(42, 0);

        let promotions = sweep(&mut routes, &m, false, &mut best, &mut rng).unwrap();

        assert_eq!(promotions, 2);
        let best = best.unwrap();
        assert_eq!(best.cost, 3.0);
        // the recorded route is the one that was evaluated, not its perturbation
        assert_eq!(best.route, original[1]);
        assert_eq!(route_cost(&best.route, &m), best.cost);
    }

    #[test]
    fn test_sweep_keeps_better_existing_best() {
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 5.0], vec![5.0, 0.0]]).unwrap();
        let mut routes = vec![vec![0, 1]];
        let mut best = Some(BestSolution::new(1.0, vec![1, 0]));
        let mut rng = seeded_stream(42, 0);

        let promotions = sweep(&mut routes, &m, false, &mut best, &mut rng).unwrap();

        assert_eq!(promotions, 0);
        assert_eq!(best.unwrap().cost, 1.0);
    }
}
