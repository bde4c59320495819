pub mod dimred;
pub mod distance;
pub mod kernel;
pub mod utils;
mod error;

pub use dimred::{
    DimRedConfig, DimensionReduction, DimensionReductionPreprocessor, PreprocessorType, TargetDim,
    AUTO_TARGET_DIM,
};
pub use error::DimRedError;
