//! # Distances
//!
//! Pairwise distance measures used by distance-based dimension reduction
//! (and by automatic target dimension detection). Every measure must be
//! symmetric and non-negative.

use anyhow::bail;
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

use crate::utils::validate_features;
use crate::DimRedError;

/// A pairwise distance between two samples.
///
/// Both samples must have the same length; implementations check this with
/// `debug_assert_eq!` only, so release builds leave mismatched input unspecified.
///
/// Handles are shared between preprocessors as `Arc<dyn Distance>`, so
/// implementations have to be `Send + Sync` and must not rely on interior
/// mutation.
pub trait Distance: Send + Sync {
    fn name(&self) -> &'static str;

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl Distance for EuclideanDistance {
    fn name(&self) -> &'static str {
        "EuclideanDistance"
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanDistance;

impl Distance for ManhattanDistance {
    fn name(&self) -> &'static str {
        "ManhattanDistance"
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChebyshevDistance;

impl Distance for ChebyshevDistance {
    fn name(&self) -> &'static str {
        "ChebyshevDistance"
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(0.0, f64::max)
    }
}

/// One minus the cosine similarity, in `[0, 2]`.
///
/// Zero vectors have no direction; their distance to anything is 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDistance;

impl Distance for CosineDistance {
    fn name(&self) -> &'static str {
        "CosineDistance"
    }

    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        let (dot_product, norm_a, norm_b) = a
            .iter()
            .zip(b.iter())
            .fold((0.0, 0.0, 0.0), |(dot, na, nb), (&x, &y)| {
                (dot + x * y, na + x * x, nb + y * y)
            });
        let norm_product = (norm_a * norm_b).sqrt();
        if norm_product > f64::EPSILON {
            // rounding may push the similarity slightly outside [-1, 1]
            (1.0 - dot_product / norm_product).clamp(0.0, 2.0)
        } else {
            1.0
        }
    }
}

/// Computes the `n_samples x n_samples` distance matrix of `features`.
///
/// Rows are evaluated in parallel. Fails with [`DimRedError::InvalidInput`]
/// when the features are malformed or the distance yields negative or
/// non-finite values for them.
pub fn distance_matrix(
    distance: &dyn Distance,
    features: ArrayView2<f64>,
) -> anyhow::Result<Array2<f64>> {
    validate_features(features)?;
    let n_samples = features.nrows();
    log::trace!(
        "computing {} x {} distance matrix with {}",
        n_samples,
        n_samples,
        distance.name()
    );

    let mut matrix = Array2::zeros((n_samples, n_samples));
    Zip::indexed(&mut matrix).par_for_each(|(i, j), d| {
        if i != j {
            *d = distance.distance(features.row(i), features.row(j));
        }
    });

    if let Some(((i, j), d)) = matrix
        .indexed_iter()
        .find(|(_, d)| !d.is_finite() || **d < 0.0)
    {
        bail!(DimRedError::InvalidInput(format!(
            "{} produced {} for samples {} and {}",
            distance.name(),
            d,
            i,
            j
        )));
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    struct SignedDifference;

    impl Distance for SignedDifference {
        fn name(&self) -> &'static str {
            "SignedDifference"
        }

        fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
            a[0] - b[0]
        }
    }

    #[test]
    fn test_distances() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];

        assert_relative_eq!(EuclideanDistance.distance(a.view(), b.view()), 5.0);
        assert_relative_eq!(ManhattanDistance.distance(a.view(), b.view()), 7.0);
        assert_relative_eq!(ChebyshevDistance.distance(a.view(), b.view()), 4.0);
        assert_relative_eq!(CosineDistance.distance(a.view(), b.view()), 1.0);

        let c = array![6.0, 8.0];
        assert_relative_eq!(CosineDistance.distance(b.view(), c.view()), 0.0, epsilon = 1e-12);
        let d = array![-3.0, -4.0];
        assert_relative_eq!(CosineDistance.distance(b.view(), d.view()), 2.0, epsilon = 1e-12);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "samples differ in length")]
    fn test_length_mismatch_panics_in_debug() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 2.0];
        EuclideanDistance.distance(a.view(), b.view());
    }

    #[test]
    fn test_distance_matrix() {
        let x = array![[0.0, 0.0], [3.0, 4.0], [6.0, 8.0]];
        let d = distance_matrix(&EuclideanDistance, x.view()).unwrap();

        assert_eq!(d.dim(), (3, 3));
        for i in 0..3 {
            assert_relative_eq!(d[[i, i]], 0.0);
            for j in 0..3 {
                assert_relative_eq!(d[[i, j]], d[[j, i]]);
            }
        }
        assert_relative_eq!(d[[0, 1]], 5.0);
        assert_relative_eq!(d[[0, 2]], 10.0);
        assert_relative_eq!(d[[1, 2]], 5.0);
    }

    #[test]
    fn test_distance_matrix_rejects_bad_input() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(distance_matrix(&EuclideanDistance, empty.view()).is_err());

        let x = array![[0.0], [1.0]];
        let err = distance_matrix(&SignedDifference, x.view()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DimRedError>(),
            Some(DimRedError::InvalidInput(_))
        ));
    }
}
