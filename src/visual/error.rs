//! Error type of the brain visual

use crate::backend::BackendError;
use thiserror::Error;

/// Visual error type
#[derive(Error, Debug)]
pub enum VisualError {
    #[error("{array} has {found} rows, expected {expected}")]
    DimensionMismatch {
        array: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{array}[{position}] = {index} is out of range for length {len}")]
    IndexOutOfRange {
        array: &'static str,
        position: usize,
        index: usize,
        len: usize,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Visual has been released")]
    Released,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type VisualResult<T> = Result<T, VisualError>;

/// Check that `array` has exactly `expected` rows
pub(crate) fn validate_len(array: &'static str, expected: usize, found: usize) -> VisualResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(VisualError::DimensionMismatch {
            array,
            expected,
            found,
        })
    }
}

/// Check that every index is below `len`, reporting the first offender
pub(crate) fn validate_indices(
    array: &'static str,
    indices: impl IntoIterator<Item = usize>,
    len: usize,
) -> VisualResult<()> {
    match indices.into_iter().enumerate().find(|&(_, index)| index >= len) {
        Some((position, index)) => Err(VisualError::IndexOutOfRange {
            array,
            position,
            index,
            len,
        }),
        None => Ok(()),
    }
}

/// Reject NaN and infinities in scalar settings
pub(crate) fn validate_finite(name: &str, values: &[f32]) -> VisualResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(VisualError::InvalidArgument(format!(
            "{} must be finite, got {:?}",
            name, values
        )))
    }
}
