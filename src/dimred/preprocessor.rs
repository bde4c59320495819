use std::sync::Arc;

use ndarray::ArrayView2;

use crate::dimred::{DimRedConfig, DimensionReduction, TargetDim};
use crate::distance::Distance;
use crate::kernel::Kernel;
use crate::DimRedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreprocessorState {
    /// Constructed or reconfigured, `init` has not succeeded yet.
    #[default]
    Configured,
    Initialized,
    Cleaned,
}

/// Dimension reduction preprocessor relying on the default behavior of
/// [`DimensionReduction`]: inputs are validated and passed through unchanged.
///
/// Initialization is optional; applying before `init` is allowed.
#[derive(Debug, Clone, Default)]
pub struct DimensionReductionPreprocessor {
    config: DimRedConfig,
    state: PreprocessorState,
}

impl DimensionReductionPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DimensionReductionPreprocessorBuilder {
        DimensionReductionPreprocessorBuilder::new()
    }

    pub fn state(&self) -> PreprocessorState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == PreprocessorState::Initialized
    }
}

impl DimensionReduction for DimensionReductionPreprocessor {
    fn config(&self) -> &DimRedConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut DimRedConfig {
        &mut self.config
    }

    fn init(&mut self, features: ArrayView2<f64>) -> anyhow::Result<()> {
        // state only advances once validation went through
        self.state = PreprocessorState::Configured;
        crate::utils::validate_features(features)?;
        log::debug!(
            "{}: init on {} x {} features, target dimension {}",
            self.name(),
            features.nrows(),
            features.ncols(),
            self.config.target_dim()
        );
        self.state = PreprocessorState::Initialized;
        Ok(())
    }

    fn cleanup(&mut self) {
        if self.state == PreprocessorState::Initialized {
            log::debug!("{}: cleanup", self.name());
        }
        if self.state != PreprocessorState::Configured {
            self.state = PreprocessorState::Cleaned;
        }
    }

    // reconfiguring invalidates whatever `init` derived, so it takes the
    // preprocessor back to `Configured`
    fn set_target_dim(&mut self, dim: i32) -> anyhow::Result<()> {
        let target_dim = TargetDim::try_from(dim)?;
        self.config.set_target_dim(target_dim);
        self.state = PreprocessorState::Configured;
        Ok(())
    }

    fn set_distance(&mut self, distance: Arc<dyn Distance>) {
        self.config.set_distance(distance);
        self.state = PreprocessorState::Configured;
    }

    fn set_kernel(&mut self, kernel: Arc<dyn Kernel>) {
        self.config.set_kernel(kernel);
        self.state = PreprocessorState::Configured;
    }
}

/// Builder for [`DimensionReductionPreprocessor`].
///
/// ```ignore
/// let preprocessor = DimensionReductionPreprocessor::builder()
///     .try_target_dim(2)?
///     .distance(Arc::new(EuclideanDistance))
///     .build();
/// ```
#[derive(Default)]
pub struct DimensionReductionPreprocessorBuilder {
    target_dim: TargetDim,
    distance: Option<Arc<dyn Distance>>,
    kernel: Option<Arc<dyn Kernel>>,
}

impl DimensionReductionPreprocessorBuilder {
    /// Starts from the defaults: automatic target dimension, no distance, no kernel.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_dim(mut self, target_dim: TargetDim) -> Self {
        self.target_dim = target_dim;
        self
    }

    /// Sets the target dimension from its raw form, see [`TargetDim::try_from`].
    pub fn try_target_dim(mut self, dim: i32) -> Result<Self, DimRedError> {
        self.target_dim = TargetDim::try_from(dim)?;
        Ok(self)
    }

    pub fn distance(mut self, distance: Arc<dyn Distance>) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn kernel(mut self, kernel: Arc<dyn Kernel>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    pub fn build(self) -> DimensionReductionPreprocessor {
        let mut config = DimRedConfig::new();
        config.set_target_dim(self.target_dim);
        if let Some(distance) = self.distance {
            config.set_distance(distance);
        }
        if let Some(kernel) = self.kernel {
            config.set_kernel(kernel);
        }
        DimensionReductionPreprocessor {
            config,
            state: PreprocessorState::Configured,
        }
    }
}
