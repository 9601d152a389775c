//! Route operators: initialization, cost evaluation and perturbation.
//!
//! These functions operate on `&[usize]` routes against a
//! [`DistanceMatrix`] and are shared by all three search loops.
//!
//! # Initialization
//!
//! - [`initialize_route`]: identity ordering followed by a position-wise
//!   random swap pass
//! - [`initialize_population`]: `N` routes built with [`initialize_route`]
//!
//! # Evaluation
//!
//! - [`route_cost`]: closed cyclic tour cost, O(D)
//! - [`route_cost_parallel`]: the same sum as a rayon reduction over edges
//!
//! # Perturbation
//!
//! - [`perturb`]: exchange two uniformly drawn positions, O(1)

use crate::error::Result;
use crate::matrix::DistanceMatrix;
use crate::random::RandomSource;
use rayon::prelude::*;

use super::types::Route;

// ============================================================================
// Initialization
// ============================================================================

/// Builds one random route over `route_length` clients.
///
/// Starts from the identity ordering and, for every position `j` in order,
/// swaps the client at `j` with the client at a position drawn uniformly
/// from `[0, route_length)`.
///
/// This swap pass is not a uniform shuffle (some permutations are more
/// likely than others); the search relies on the exact sequence of draws,
/// so it must not be replaced with Fisher–Yates.
pub fn initialize_route<S: RandomSource + ?Sized>(route_length: usize, rng: &mut S) -> Result<Route> {
    let mut route: Route = (0..route_length).collect();
    for j in 0..route_length {
        let k = rng.index(route_length)?;
        route.swap(j, k);
    }
    Ok(route)
}

/// Builds `population_size` random routes with [`initialize_route`].
pub fn initialize_population<S: RandomSource + ?Sized>(
    population_size: usize,
    route_length: usize,
    rng: &mut S,
) -> Result<Vec<Route>> {
    (0..population_size)
        .map(|_| initialize_route(route_length, rng))
        .collect()
}

// ============================================================================
// Evaluation
// ============================================================================

/// Cyclic tour cost: the sum of `distance(route[i], route[i + 1])` over
/// consecutive pairs plus the wraparound edge from the last client back to
/// the first.
///
/// An empty route costs zero.
///
/// # Complexity
/// O(D)
pub fn route_cost(route: &[usize], matrix: &DistanceMatrix) -> f64 {
    let Some((&first, _)) = route.split_first() else {
        return 0.0;
    };
    let open: f64 = route
        .windows(2)
        .map(|w| matrix.distance(w[0], w[1]))
        .sum();
    let last = route[route.len() - 1];
    open + matrix.distance(last, first)
}

/// Cyclic tour cost computed as a parallel reduction over edges.
///
/// Produces the same value as [`route_cost`] up to floating-point
/// summation order. Only worthwhile for long routes.
pub fn route_cost_parallel(route: &[usize], matrix: &DistanceMatrix) -> f64 {
    let n = route.len();
    (0..n)
        .into_par_iter()
        .map(|i| matrix.distance(route[i], route[(i + 1) % n]))
        .sum()
}

/// Dispatches to [`route_cost_parallel`] or [`route_cost`].
#[inline]
pub(crate) fn evaluate(route: &[usize], matrix: &DistanceMatrix, parallel: bool) -> f64 {
    if parallel {
        route_cost_parallel(route, matrix)
    } else {
        route_cost(route, matrix)
    }
}

// ============================================================================
// Perturbation
// ============================================================================

/// Exchanges the clients at two positions drawn independently and uniformly
/// from `[0, D)`.
///
/// The two positions may coincide, in which case the route is unchanged.
/// There is no acceptance test: the move is always applied.
pub fn perturb<S: RandomSource + ?Sized>(route: &mut [usize], rng: &mut S) -> Result<()> {
    let n = route.len();
    let a = rng.index(n)?;
    let b = rng.index(n)?;
    route.swap(a, b);
    Ok(())
}

/// Returns `true` if `route` is a permutation of `0..route.len()`.
pub fn is_permutation(route: &[usize]) -> bool {
    let mut seen = vec![false; route.len()];
    for &c in route {
        match seen.get_mut(c) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
