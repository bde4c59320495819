//! # Dimensionality Reduction
//!
//! This module defines the interface every dimension reduction preprocessor
//! implements, so that algorithms such as PCA, Isomap or LLE can be plugged into
//! a feature processing pipeline interchangeably.
//!
//! ## Building Blocks
//! - [`DimensionReduction`]: the preprocessor capability. All methods apart from
//!   the configuration accessors have defaults, which together describe an
//!   identity transform.
//! - [`DimRedConfig`]: state shared by all preprocessors (target dimension,
//!   optional distance and kernel).
//! - [`DimensionReductionPreprocessor`]: ready to use preprocessor relying on the
//!   defaults, useful as a pass-through stage and as a base to compose from.
//! - [`TargetDim`]: either a fixed output dimension or [`TargetDim::Auto`]
//!   (raw value [`AUTO_TARGET_DIM`]).
//! - [`DimensionEstimator`]: strategy used to resolve [`TargetDim::Auto`].
//!
//! ## Lifecycle
//! Configure (target dimension, distance, kernel, in any order), call
//! [`DimensionReduction::init`] once, apply as often as needed, then
//! [`DimensionReduction::cleanup`]. The cycle may be repeated.
//!
//! Input matrices are laid out as samples x features.

pub mod estimate;
mod preprocessor;
pub mod target;

use std::fmt;
use std::sync::Arc;

use anyhow::bail;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::distance::{distance_matrix, Distance, EuclideanDistance};
use crate::kernel::Kernel;
use crate::utils::{validate_distance_matrix, validate_features, validate_vector};
use crate::DimRedError;

pub use estimate::{DimensionEstimator, EigengapEstimator};
pub use preprocessor::{
    DimensionReductionPreprocessor, DimensionReductionPreprocessorBuilder, PreprocessorState,
};
pub use target::{TargetDim, AUTO_TARGET_DIM};

/// Runtime tag used by pipelines to tell preprocessor kinds apart.
///
/// Concrete algorithms living in other crates report themselves as
/// [`PreprocessorType::Other`] with their own name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PreprocessorType {
    DimensionReduction,
    Other(&'static str),
}

impl fmt::Display for PreprocessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessorType::DimensionReduction => write!(f, "DimensionReduction"),
            PreprocessorType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Metric source picked by [`DimRedConfig::metric`].
#[derive(Clone, Copy)]
pub enum Metric<'a> {
    Distance(&'a dyn Distance),
    Kernel(&'a dyn Kernel),
}

/// Configuration shared by every dimension reduction preprocessor.
///
/// Distance and kernel are shared handles owned jointly with whoever supplied
/// them; they are only ever evaluated, never mutated. Both may be stored at the
/// same time, the concrete algorithm decides which one it consults.
#[derive(Clone, Default)]
pub struct DimRedConfig {
    target_dim: TargetDim,
    distance: Option<Arc<dyn Distance>>,
    kernel: Option<Arc<dyn Kernel>>,
}

impl DimRedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_dim(&self) -> TargetDim {
        self.target_dim
    }

    pub fn set_target_dim(&mut self, target_dim: TargetDim) {
        self.target_dim = target_dim;
    }

    pub fn distance(&self) -> Option<&Arc<dyn Distance>> {
        self.distance.as_ref()
    }

    pub fn set_distance(&mut self, distance: Arc<dyn Distance>) {
        self.distance = Some(distance);
    }

    pub fn clear_distance(&mut self) -> Option<Arc<dyn Distance>> {
        self.distance.take()
    }

    pub fn kernel(&self) -> Option<&Arc<dyn Kernel>> {
        self.kernel.as_ref()
    }

    pub fn set_kernel(&mut self, kernel: Arc<dyn Kernel>) {
        self.kernel = Some(kernel);
    }

    pub fn clear_kernel(&mut self) -> Option<Arc<dyn Kernel>> {
        self.kernel.take()
    }

    /// The single configured metric source.
    ///
    /// For algorithms that work with exactly one of distance or kernel. Fails
    /// with [`DimRedError::UnsupportedConfiguration`] if both or neither are set.
    pub fn metric(&self) -> anyhow::Result<Metric<'_>> {
        match (&self.distance, &self.kernel) {
            (Some(distance), None) => Ok(Metric::Distance(distance.as_ref())),
            (None, Some(kernel)) => Ok(Metric::Kernel(kernel.as_ref())),
            (Some(distance), Some(kernel)) => bail!(DimRedError::UnsupportedConfiguration(
                format!(
                    "both {} and {} are set, expected exactly one",
                    distance.name(),
                    kernel.name()
                )
            )),
            (None, None) => bail!(DimRedError::UnsupportedConfiguration(
                "neither a distance nor a kernel is set".to_string()
            )),
        }
    }
}

impl fmt::Debug for DimRedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimRedConfig")
            .field("target_dim", &self.target_dim)
            .field("distance", &self.distance.as_ref().map(|d| d.name()))
            .field("kernel", &self.kernel.as_ref().map(|k| k.name()))
            .finish()
    }
}

/// A preprocessor lowering the dimensionality of dense real-valued features.
///
/// Implementors provide access to their [`DimRedConfig`] and override whatever
/// their algorithm needs. The defaults validate their input and otherwise
/// behave as the identity: `init` does no precomputation, `cleanup` releases
/// nothing and both `apply_*` methods return their input unchanged.
///
/// Instances are not meant to be used from several threads at once; the
/// receivers (`&self` / `&mut self`) already enforce that.
pub trait DimensionReduction {
    fn config(&self) -> &DimRedConfig;

    fn config_mut(&mut self) -> &mut DimRedConfig;

    fn name(&self) -> &'static str {
        "DimensionReductionPreprocessor"
    }

    fn preprocessor_type(&self) -> PreprocessorType {
        PreprocessorType::DimensionReduction
    }

    /// Precomputes whatever later `apply_*` calls need.
    ///
    /// Fails with [`DimRedError::InvalidInput`] on empty or non-finite features.
    /// A failed `init` must leave the preprocessor safe to `cleanup`.
    fn init(&mut self, features: ArrayView2<f64>) -> anyhow::Result<()> {
        validate_features(features)?;
        log::debug!(
            "{}: init on {} x {} features",
            self.name(),
            features.nrows(),
            features.ncols()
        );
        Ok(())
    }

    /// Releases what `init` acquired. Idempotent, also valid without a prior `init`.
    fn cleanup(&mut self) {}

    /// Reduces a samples x features matrix. The result keeps the number of
    /// samples and has [`resolve_target_dim`](Self::resolve_target_dim) columns.
    fn apply_to_feature_matrix(&self, features: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        validate_features(features)?;
        Ok(features.to_owned())
    }

    /// Reduces a single sample using what was derived for the whole matrix.
    fn apply_to_feature_vector(&self, vector: ArrayView1<f64>) -> anyhow::Result<Array1<f64>> {
        validate_vector(vector)?;
        Ok(vector.to_owned())
    }

    /// Detects the target dimension from a square, symmetric, non-negative
    /// distance matrix. Only consulted when the target dimension is
    /// [`TargetDim::Auto`]. The default uses [`EigengapEstimator`].
    fn detect_dim(&self, distance_matrix: ArrayView2<f64>) -> anyhow::Result<usize> {
        validate_distance_matrix(distance_matrix)?;
        EigengapEstimator::default().estimate(distance_matrix)
    }

    /// The configured target dimension, or the detected one when it is
    /// [`TargetDim::Auto`]. Detection runs on the pairwise distances of
    /// `features` under the configured distance, Euclidean if none is set.
    fn resolve_target_dim(&self, features: ArrayView2<f64>) -> anyhow::Result<usize> {
        match self.target_dim() {
            TargetDim::Fixed(dim) => Ok(dim.get()),
            TargetDim::Auto => {
                let distances = match self.config().distance() {
                    Some(distance) => distance_matrix(distance.as_ref(), features)?,
                    None => distance_matrix(&EuclideanDistance, features)?,
                };
                let dim = self.detect_dim(distances.view())?;
                if dim == 0 {
                    bail!(DimRedError::InvalidInput(format!(
                        "{} detected a target dimension of 0",
                        self.name()
                    )));
                }
                log::debug!("{}: detected target dimension {}", self.name(), dim);
                Ok(dim)
            }
        }
    }

    fn target_dim(&self) -> TargetDim {
        self.config().target_dim()
    }

    /// Sets the target dimension from its raw form: [`AUTO_TARGET_DIM`] or a
    /// positive value. Anything else is rejected with
    /// [`DimRedError::InvalidTargetDim`] and leaves the current value in place.
    fn set_target_dim(&mut self, dim: i32) -> anyhow::Result<()> {
        let target_dim = TargetDim::try_from(dim)?;
        self.config_mut().set_target_dim(target_dim);
        Ok(())
    }

    fn set_distance(&mut self, distance: Arc<dyn Distance>) {
        self.config_mut().set_distance(distance);
    }

    fn set_kernel(&mut self, kernel: Arc<dyn Kernel>) {
        self.config_mut().set_kernel(kernel);
    }
}
