use std::fmt;
use std::num::NonZeroUsize;

use crate::DimRedError;

/// Raw value standing for "determine the target dimension from the data".
pub const AUTO_TARGET_DIM: i32 = -1;

/// Output dimensionality of a dimension reduction preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetDim {
    /// Detected from the data, see [`DimensionReduction::detect_dim`](super::DimensionReduction::detect_dim).
    #[default]
    Auto,
    Fixed(NonZeroUsize),
}

impl TargetDim {
    /// Fixed target dimension; zero and values beyond `i32::MAX` are rejected.
    pub fn fixed(dim: usize) -> Result<Self, DimRedError> {
        if dim > i32::MAX as usize {
            return Err(DimRedError::InvalidTargetDim(
                i64::try_from(dim).unwrap_or(i64::MAX),
            ));
        }
        NonZeroUsize::new(dim)
            .map(TargetDim::Fixed)
            .ok_or(DimRedError::InvalidTargetDim(0))
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, TargetDim::Auto)
    }

    /// The fixed dimension, `None` for [`TargetDim::Auto`].
    pub fn get(&self) -> Option<usize> {
        match self {
            TargetDim::Auto => None,
            TargetDim::Fixed(dim) => Some(dim.get()),
        }
    }
}

impl TryFrom<i32> for TargetDim {
    type Error = DimRedError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            AUTO_TARGET_DIM => Ok(TargetDim::Auto),
            dim if dim > 0 => TargetDim::fixed(dim as usize),
            dim => Err(DimRedError::InvalidTargetDim(dim as i64)),
        }
    }
}

impl From<TargetDim> for i32 {
    fn from(target: TargetDim) -> Self {
        match target {
            TargetDim::Auto => AUTO_TARGET_DIM,
            // fixed() caps values at i32::MAX
            TargetDim::Fixed(dim) => dim.get() as i32,
        }
    }
}

impl fmt::Display for TargetDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDim::Auto => write!(f, "auto"),
            TargetDim::Fixed(dim) => write!(f, "{}", dim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_conversions() {
        assert_eq!(TargetDim::try_from(AUTO_TARGET_DIM), Ok(TargetDim::Auto));
        assert_eq!(TargetDim::try_from(5).unwrap().get(), Some(5));
        assert_eq!(i32::from(TargetDim::Auto), -1);
        assert_eq!(i32::from(TargetDim::fixed(5).unwrap()), 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(TargetDim::try_from(0), Err(DimRedError::InvalidTargetDim(0)));
        assert_eq!(TargetDim::try_from(-2), Err(DimRedError::InvalidTargetDim(-2)));
        assert_eq!(TargetDim::try_from(-5), Err(DimRedError::InvalidTargetDim(-5)));
        assert_eq!(TargetDim::fixed(0), Err(DimRedError::InvalidTargetDim(0)));
        assert_eq!(
            TargetDim::fixed(i32::MAX as usize + 1),
            Err(DimRedError::InvalidTargetDim(i32::MAX as i64 + 1))
        );
        if cfg!(target_pointer_width = "64") {
            assert_eq!(
                TargetDim::fixed(usize::MAX),
                Err(DimRedError::InvalidTargetDim(i64::MAX))
            );
        }
    }

    #[test]
    fn test_default_is_auto() {
        assert!(TargetDim::default().is_auto());
        assert_eq!(TargetDim::default().to_string(), "auto");
        assert_eq!(TargetDim::fixed(3).unwrap().to_string(), "3");
    }
}
