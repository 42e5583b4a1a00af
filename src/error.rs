//! Error types for the fringe removal pipeline.

use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which acquisition a dataset belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DatasetRole {
    Sample,
    Background,
}

impl Display for DatasetRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetRole::Sample => write!(f, "sample"),
            DatasetRole::Background => write!(f, "background"),
        }
    }
}

/// Errors raised by the numerical pipeline.
///
/// All of them are local and synchronous. Nothing is retried; the caller corrects the
/// input (for example re-specifies the fringe bounds) and calls again.
#[derive(Debug, Error)]
pub enum FringeError {
    /// Empty, non-finite or otherwise malformed series.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Zero-fill or point-reduction factor below 1, too large, or a target length that is not
    /// a multiple of the input.
    #[error("invalid factor: {0}")]
    InvalidFactor(String),

    /// Zero-length input to alignment.
    #[error("length mismatch: cannot align a series of length {actual} to length {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Malformed or out-of-range fringe bound.
    #[error("invalid fringe bound ({start}, {end}): {reason}")]
    InvalidBound { start: f64, end: f64, reason: String },

    /// Failure inside the FFT backend.
    #[error("transform failed: {0}")]
    Transform(String),

    /// Error attributed to one of the two datasets of an export.
    #[error("{role} dataset: {source}")]
    Dataset {
        role: DatasetRole,
        #[source]
        source: Box<FringeError>,
    },
}

impl FringeError {
    /// Wraps the error with the role of the dataset that produced it.
    pub fn in_dataset(self, role: DatasetRole) -> FringeError {
        FringeError::Dataset {
            role,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FringeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_context_in_message() {
        let err = FringeError::InvalidBound {
            start: 10.0,
            end: 5.0,
            reason: "start must be smaller than end".to_string(),
        }
        .in_dataset(DatasetRole::Background);
        let msg = err.to_string();
        assert!(msg.starts_with("background dataset"));
        assert!(msg.contains("(10, 5)"));
    }
}
