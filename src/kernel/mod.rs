use anyhow::bail;
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

use crate::utils::validate_features;
use crate::DimRedError;

/// A similarity function between two samples, used by kernel-based dimension
/// reduction. Shared between preprocessors as `Arc<dyn Kernel>`.
///
/// Both samples must have the same length; implementations check this with
/// `debug_assert_eq!` only.
pub trait Kernel: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl Kernel for LinearKernel {
    fn name(&self) -> &'static str {
        "LinearKernel"
    }

    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
    }
}

/// `exp(-||a - b||^2 / width)`
#[derive(Debug, Clone, Copy)]
pub struct GaussianKernel {
    width: f64,
}

impl GaussianKernel {
    pub fn new(width: f64) -> Self {
        Self { width }
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

impl Kernel for GaussianKernel {
    fn name(&self) -> &'static str {
        "GaussianKernel"
    }

    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        let squared_dist: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum();
        (-squared_dist / self.width).exp()
    }
}

/// `exp(-gamma * ||a - b||_1)`
#[derive(Debug, Clone, Copy)]
pub struct LaplacianKernel {
    gamma: f64,
}

impl LaplacianKernel {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }
}

impl Default for LaplacianKernel {
    fn default() -> Self {
        Self { gamma: 1.0 }
    }
}

impl Kernel for LaplacianKernel {
    fn name(&self) -> &'static str {
        "LaplacianKernel"
    }

    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        let dist: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum();
        (-self.gamma * dist).exp()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CosineKernel;

impl Kernel for CosineKernel {
    fn name(&self) -> &'static str {
        "CosineKernel"
    }

    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        let mut dot_product = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;

        for (&x, &y) in a.iter().zip(b.iter()) {
            dot_product += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }

        let norm_product = (norm_a * norm_b).sqrt();
        if norm_product > f64::EPSILON {
            dot_product / norm_product
        } else {
            0.0
        }
    }
}

/// `(<a, b> + coef0)^degree`
#[derive(Debug, Clone, Copy)]
pub struct PolynomialKernel {
    degree: i32,
    coef0: f64,
}

impl PolynomialKernel {
    pub fn new(degree: i32, coef0: f64) -> Self {
        Self { degree, coef0 }
    }
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self {
            degree: 2,
            coef0: 1.0,
        }
    }
}

impl Kernel for PolynomialKernel {
    fn name(&self) -> &'static str {
        "PolynomialKernel"
    }

    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "samples differ in length");
        let dot: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
        (dot + self.coef0).powi(self.degree)
    }
}

/// Computes the `n_samples x n_samples` kernel (Gram) matrix of `features` in parallel.
pub fn kernel_matrix(kernel: &dyn Kernel, features: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
    validate_features(features)?;
    let n_samples = features.nrows();
    log::trace!(
        "computing {} x {} kernel matrix with {}",
        n_samples,
        n_samples,
        kernel.name()
    );

    let mut matrix = Array2::zeros((n_samples, n_samples));
    Zip::indexed(&mut matrix).par_for_each(|(i, j), k| {
        *k = kernel.compute(features.row(i), features.row(j));
    });

    if let Some(((i, j), k)) = matrix.indexed_iter().find(|(_, k)| !k.is_finite()) {
        bail!(DimRedError::InvalidInput(format!(
            "{} produced {} for samples {} and {}",
            kernel.name(),
            k,
            i,
            j
        )));
    }
    Ok(matrix)
}
