use anyhow::bail;
use ndarray::{ArrayView1, ArrayView2};

use crate::DimRedError;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Checks that a feature matrix (samples x features) can be fed to a preprocessor.
pub fn validate_features(features: ArrayView2<f64>) -> anyhow::Result<()> {
    let (n_samples, n_features) = features.dim();
    if n_samples == 0 {
        bail!(DimRedError::InvalidInput(
            "feature matrix contains no samples".to_string()
        ));
    }
    if n_features == 0 {
        bail!(DimRedError::InvalidInput(format!(
            "feature matrix has {} samples but no features",
            n_samples
        )));
    }
    if let Some(((row, col), value)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
        bail!(DimRedError::InvalidInput(format!(
            "non-finite value {} at sample {}, feature {}",
            value, row, col
        )));
    }
    Ok(())
}

pub fn validate_vector(vector: ArrayView1<f64>) -> anyhow::Result<()> {
    if vector.is_empty() {
        bail!(DimRedError::InvalidInput(
            "feature vector is empty".to_string()
        ));
    }
    if let Some((idx, value)) = vector.indexed_iter().find(|(_, v)| !v.is_finite()) {
        bail!(DimRedError::InvalidInput(format!(
            "non-finite value {} at feature {}",
            value, idx
        )));
    }
    Ok(())
}

/// Checks that `distances` is a square, symmetric, non-negative matrix of finite values.
pub fn validate_distance_matrix(distances: ArrayView2<f64>) -> anyhow::Result<()> {
    let (n_rows, n_cols) = distances.dim();
    if n_rows == 0 {
        bail!(DimRedError::InvalidInput(
            "distance matrix is empty".to_string()
        ));
    }
    if n_rows != n_cols {
        bail!(DimRedError::InvalidInput(format!(
            "distance matrix must be square, got {} x {}",
            n_rows, n_cols
        )));
    }

    for ((i, j), &d) in distances.indexed_iter() {
        if !d.is_finite() || d < 0.0 {
            bail!(DimRedError::InvalidInput(format!(
                "distance at ({}, {}) is {}, expected a finite non-negative value",
                i, j, d
            )));
        }
        if j > i {
            let mirrored = distances[[j, i]];
            let scale = d.abs().max(mirrored.abs()).max(1.0);
            if (d - mirrored).abs() > SYMMETRY_TOLERANCE * scale {
                bail!(DimRedError::InvalidInput(format!(
                    "distance matrix is not symmetric at ({}, {}): {} != {}",
                    i, j, d, mirrored
                )));
            }
        }
    }
    Ok(())
}
