//! Strategies for detecting the target dimension from a distance matrix.

use anyhow::anyhow;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array2, ArrayView2, Axis};

use crate::utils::validate_distance_matrix;

pub trait DimensionEstimator: Send + Sync {
    /// Returns a strictly positive dimension for the given distance matrix.
    fn estimate(&self, distance_matrix: ArrayView2<f64>) -> anyhow::Result<usize>;
}

/// Eigenvalue-gap heuristic on the classical MDS Gram matrix.
///
/// The squared distances are double centered into `B = -1/2 J D^2 J` and the
/// eigenvalues of `B` are sorted in descending order. Eigenvalues smaller than
/// `tolerance * lambda_max` count as zero. The detected dimension is the
/// position of the steepest relative drop `lambda_k / lambda_{k+1}`; the drop
/// onto the first zero eigenvalue is infinite, so data of exact rank `k`
/// always yields `k`. The tolerance acts as the noise floor: raise it to
/// ignore directions with little spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigengapEstimator {
    tolerance: f64,
    max_dim: Option<usize>,
}

impl Default for EigengapEstimator {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_dim: None,
        }
    }
}

impl EigengapEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative threshold below which an eigenvalue is treated as zero.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Upper bound for the detected dimension.
    pub fn max_dim(mut self, max_dim: usize) -> Self {
        self.max_dim = Some(max_dim.max(1));
        self
    }

    /// Eigenvalues of the double centered Gram matrix, largest first.
    pub fn spectrum(&self, distance_matrix: ArrayView2<f64>) -> anyhow::Result<Vec<f64>> {
        validate_distance_matrix(distance_matrix)?;
        let gram = double_center(distance_matrix)?;
        let n = gram.nrows();

        let gram = DMatrix::from_fn(n, n, |i, j| gram[[i, j]]);
        let mut eigenvalues: Vec<f64> = SymmetricEigen::new(gram).eigenvalues.iter().copied().collect();
        eigenvalues.sort_by(|a, b| b.total_cmp(a));
        Ok(eigenvalues)
    }
}

impl DimensionEstimator for EigengapEstimator {
    fn estimate(&self, distance_matrix: ArrayView2<f64>) -> anyhow::Result<usize> {
        let eigenvalues = self.spectrum(distance_matrix)?;

        let largest = eigenvalues.first().copied().unwrap_or(0.0);
        if largest <= 0.0 {
            log::debug!("no positive eigenvalue in distance spectrum, falling back to 1");
            return Ok(1);
        }

        let threshold = self.tolerance * largest;
        let mut dim = 1;
        let mut steepest = 0.0;
        for (i, pair) in eigenvalues.windows(2).enumerate() {
            let ratio = if pair[1] <= threshold {
                f64::INFINITY
            } else {
                pair[0] / pair[1]
            };
            if ratio > steepest {
                steepest = ratio;
                dim = i + 1;
            }
            if ratio.is_infinite() {
                break;
            }
        }

        let dim = match self.max_dim {
            Some(max_dim) => dim.min(max_dim),
            None => dim,
        };
        log::debug!("eigengap estimate: {} (drop ratio {})", dim, steepest);
        Ok(dim)
    }
}

fn double_center(distance_matrix: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    let squared = distance_matrix.mapv(|d| d * d);
    let row_means = squared
        .mean_axis(Axis(1))
        .ok_or_else(|| anyhow!("Failed to compute row means of squared distances"))?;
    let col_means = squared
        .mean_axis(Axis(0))
        .ok_or_else(|| anyhow!("Failed to compute column means of squared distances"))?;
    let grand_mean = squared
        .mean()
        .ok_or_else(|| anyhow!("Failed to compute mean of squared distances"))?;

    let mut gram = squared;
    for ((i, j), value) in gram.indexed_iter_mut() {
        *value = -0.5 * (*value - row_means[i] - col_means[j] + grand_mean);
    }
    Ok(gram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{distance_matrix, EuclideanDistance};
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn planar_grid() -> Array2<f64> {
        let mut points = Array2::zeros((9, 3));
        for (idx, mut row) in points.rows_mut().into_iter().enumerate() {
            row[0] = (idx % 3) as f64;
            row[1] = (idx / 3) as f64;
        }
        points
    }

    #[test]
    fn test_spectrum_of_planar_grid() {
        let d = distance_matrix(&EuclideanDistance, planar_grid().view()).unwrap();
        let spectrum = EigengapEstimator::new().spectrum(d.view()).unwrap();

        assert_eq!(spectrum.len(), 9);
        assert_relative_eq!(spectrum[0], 6.0, epsilon = 1e-8);
        assert_relative_eq!(spectrum[1], 6.0, epsilon = 1e-8);
        assert_relative_eq!(spectrum[2], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_estimate_planar_grid() {
        let d = distance_matrix(&EuclideanDistance, planar_grid().view()).unwrap();
        assert_eq!(EigengapEstimator::new().estimate(d.view()).unwrap(), 2);
        assert_eq!(
            EigengapEstimator::new().max_dim(1).estimate(d.view()).unwrap(),
            1
        );
    }

    #[test]
    fn test_estimate_unevenly_spread_plane() {
        let mut points = Array2::zeros((9, 3));
        for (idx, mut row) in points.rows_mut().into_iter().enumerate() {
            row[0] = 3.0 * (idx % 3) as f64;
            row[1] = (idx / 3) as f64;
        }
        let d = distance_matrix(&EuclideanDistance, points.view()).unwrap();
        let spectrum = EigengapEstimator::new().spectrum(d.view()).unwrap();
        assert_relative_eq!(spectrum[0], 54.0, epsilon = 1e-8);
        assert_relative_eq!(spectrum[1], 6.0, epsilon = 1e-8);

        assert_eq!(EigengapEstimator::new().estimate(d.view()).unwrap(), 2);
    }

    #[test]
    fn test_tolerance_sets_noise_floor() {
        // box of 3 x 1 x 0.01, spectrum [18, 2, 2e-4, 0, ...]
        let mut points = Array2::zeros((8, 3));
        for (idx, mut row) in points.rows_mut().into_iter().enumerate() {
            row[0] = 3.0 * (idx & 1) as f64;
            row[1] = ((idx >> 1) & 1) as f64;
            row[2] = 0.01 * ((idx >> 2) & 1) as f64;
        }
        let d = distance_matrix(&EuclideanDistance, points.view()).unwrap();

        assert_eq!(EigengapEstimator::new().estimate(d.view()).unwrap(), 3);
        assert_eq!(
            EigengapEstimator::new().tolerance(1e-3).estimate(d.view()).unwrap(),
            2
        );
    }

    #[test]
    fn test_estimate_collinear_points() {
        let x = array![
            [0.0, 0.0, 0.0],
            [1.0, 2.0, 3.0],
            [2.0, 4.0, 6.0],
            [3.0, 6.0, 9.0],
            [4.0, 8.0, 12.0]
        ];
        let d = distance_matrix(&EuclideanDistance, x.view()).unwrap();
        assert_eq!(EigengapEstimator::new().estimate(d.view()).unwrap(), 1);
    }

    #[test]
    fn test_degenerate_inputs() {
        let single = array![[0.0]];
        assert_eq!(EigengapEstimator::new().estimate(single.view()).unwrap(), 1);

        let identical = Array2::<f64>::zeros((4, 4));
        assert_eq!(EigengapEstimator::new().estimate(identical.view()).unwrap(), 1);

        let asymmetric = array![[0.0, 1.0], [3.0, 0.0]];
        assert!(EigengapEstimator::new().estimate(asymmetric.view()).is_err());
    }
}
