//! Pairwise travel costs.
//!
//! [`DistanceMatrix`] stores a `D × D` cost matrix in one contiguous
//! row-major buffer. It is built once, validated, and then shared read-only
//! by every worker of a run.

use crate::error::{JsaError, Result};
use crate::random::RandomSource;
use std::ops::RangeInclusive;

/// A square matrix of non-negative travel costs with a zero diagonal.
///
/// The matrix does not need to be symmetric: `distance(i, j)` and
/// `distance(j, i)` are independent.
///
/// # Examples
///
/// ```
/// use u_jsa::DistanceMatrix;
///
/// let m = DistanceMatrix::from_rows(vec![
///     vec![0.0, 3.0],
///     vec![5.0, 0.0],
/// ]).unwrap();
/// assert_eq!(m.len(), 2);
/// assert_eq!(m.distance(0, 1), 3.0);
/// assert_eq!(m.distance(1, 0), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from a row-major buffer of `size * size` values.
    ///
    /// # Errors
    /// Returns [`JsaError::Matrix`] if `size` is zero, the buffer length is
    /// not `size * size`, any entry is negative or non-finite, or any
    /// diagonal entry is non-zero.
    pub fn new(size: usize, data: Vec<f64>) -> Result<Self> {
        if size == 0 {
            return Err(JsaError::Matrix("matrix must have at least one client".into()));
        }
        if data.len() != size * size {
            return Err(JsaError::Matrix(format!(
                "expected {} entries for a {size}x{size} matrix, got {}",
                size * size,
                data.len()
            )));
        }
        for (k, &d) in data.iter().enumerate() {
            let (i, j) = (k / size, k % size);
            if !d.is_finite() || d < 0.0 {
                return Err(JsaError::Matrix(format!(
                    "distance ({i}, {j}) must be finite and non-negative, got {d}"
                )));
            }
            if i == j && d != 0.0 {
                return Err(JsaError::Matrix(format!(
                    "diagonal entry ({i}, {i}) must be zero, got {d}"
                )));
            }
        }
        Ok(Self { size, data })
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Errors
    /// Returns [`JsaError::Matrix`] if the rows do not form a square matrix
    /// or violate the constraints checked by [`new`](Self::new).
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(JsaError::Matrix(format!(
                "row {i} has {} entries, expected {size} (matrix must be square)",
                row.len()
            )));
        }
        Self::new(size, rows.into_iter().flatten().collect())
    }

    /// Builds a symmetric Euclidean matrix from planar coordinates.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Result<Self> {
        let size = points.len();
        let mut data = vec![0.0; size * size];
        for (i, &(xi, yi)) in points.iter().enumerate() {
            for (j, &(xj, yj)) in points.iter().enumerate() {
                if i != j {
                    data[i * size + j] = (xi - xj).hypot(yi - yj);
                }
            }
        }
        Self::new(size, data)
    }

    /// Generates a synthetic matrix with integer costs drawn uniformly from
    /// `range`, independently for every ordered pair, and a zero diagonal.
    ///
    /// # Errors
    /// Fails if `size` is zero, the range is empty, or the random source fails.
    pub fn random<S: RandomSource + ?Sized>(
        size: usize,
        range: RangeInclusive<u32>,
        rng: &mut S,
    ) -> Result<Self> {
        let (lo, hi) = (*range.start(), *range.end());
        if lo > hi {
            return Err(JsaError::Config(format!(
                "distance range {lo}..={hi} is empty"
            )));
        }
        let span = (hi - lo) as usize + 1;
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    data[i * size + j] = (lo as usize + rng.index(span)?) as f64;
                }
            }
        }
        Self::new(size, data)
    }

    /// Number of clients (the route length `D`).
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Always `false`: construction rejects empty matrices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Cost of travelling from `from` to `to`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        assert!(from < self.size && to < self.size, "client index out of bounds");
        self.data[from * self.size + to]
    }

    /// Row of costs leaving `from`.
    #[inline]
    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.size..(from + 1) * self.size]
    }
}
