//! Error types for the nebula-cloud crate.

use std::fmt;

/// Broad failure category of a [`CloudError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required object is missing or an argument is out of range.
    InvalidArgument,
    /// Two vectors that must agree in length do not.
    DimensionMismatch,
    /// A metric or generator parameter needed by the operation is absent or undefined.
    Configuration,
    /// The point type does not support the requested operation.
    UnsupportedOperation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::DimensionMismatch => "dimension mismatch",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::UnsupportedOperation => "unsupported operation",
        };
        f.write_str(s)
    }
}

/// Error type for all fallible operations in the nebula-cloud crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CloudError {
    /// Returned when a handle does not address a point of the cloud.
    #[error("unknown point handle {handle} (cloud holds {len} points)")]
    UnknownPoint {
        /// The offending handle.
        handle: usize,
        /// Number of points in the cloud.
        len: usize,
    },

    /// Returned when k is zero or the cloud has fewer than `k + 1` points.
    #[error("k must be in 1..={max}, got {k} for a cloud of {n_points} points", max = .n_points.saturating_sub(1))]
    InvalidK {
        /// The requested neighbor count.
        k: usize,
        /// Number of points in the cloud.
        n_points: usize,
    },

    /// Returned when an axis has a lower bound above its upper bound.
    #[error("axis {axis}: lower bound {min} exceeds upper bound {max}")]
    InvertedBounds {
        /// Axis index.
        axis: usize,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Returned when two vectors that must agree in length do not.
    #[error("{what} has {actual} components, expected {expected}")]
    DimensionMismatch {
        /// Name of the vector whose length disagrees.
        what: &'static str,
        /// Expected component count.
        expected: usize,
        /// Actual component count.
        actual: usize,
    },

    /// Returned when a metric parameter required by the operation is not set.
    #[error("metric parameter `{parameter}` is not set")]
    MissingParameter {
        /// Name of the missing parameter.
        parameter: &'static str,
    },

    /// Returned when a random-generation bound, or the width of an axis, is
    /// NaN or infinite.
    #[error("bound on axis {axis} is undefined")]
    UndefinedBound {
        /// Axis index.
        axis: usize,
    },

    /// Returned when an output-space operation is used on a point type without output vectors.
    #[error("{operation} requires points with an output vector")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

impl CloudError {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CloudError::UnknownPoint { .. }
            | CloudError::InvalidK { .. }
            | CloudError::InvertedBounds { .. } => ErrorKind::InvalidArgument,
            CloudError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            CloudError::MissingParameter { .. } | CloudError::UndefinedBound { .. } => {
                ErrorKind::Configuration
            }
            CloudError::Unsupported { .. } => ErrorKind::UnsupportedOperation,
        }
    }
}

/// Returns `Ok(())` when `actual == expected`, else a [`CloudError::DimensionMismatch`].
pub(crate) fn check_dimension(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), CloudError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CloudError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_unknown_point() {
        let e = CloudError::UnknownPoint { handle: 7, len: 3 };
        assert_eq!(e.to_string(), "unknown point handle 7 (cloud holds 3 points)");
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn error_invalid_k() {
        let e = CloudError::InvalidK { k: 4, n_points: 4 };
        assert_eq!(e.to_string(), "k must be in 1..=3, got 4 for a cloud of 4 points");
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn error_invalid_k_empty_cloud() {
        let e = CloudError::InvalidK { k: 1, n_points: 0 };
        assert_eq!(e.to_string(), "k must be in 1..=0, got 1 for a cloud of 0 points");
    }

    #[test]
    fn error_inverted_bounds() {
        let e = CloudError::InvertedBounds {
            axis: 1,
            min: 2.0,
            max: 1.0,
        };
        assert_eq!(e.to_string(), "axis 1: lower bound 2 exceeds upper bound 1");
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn error_dimension_mismatch() {
        let e = CloudError::DimensionMismatch {
            what: "length_scales",
            expected: 3,
            actual: 2,
        };
        assert_eq!(e.to_string(), "length_scales has 2 components, expected 3");
        assert_eq!(e.kind(), ErrorKind::DimensionMismatch);
    }

    #[test]
    fn error_missing_parameter() {
        let e = CloudError::MissingParameter { parameter: "min" };
        assert_eq!(e.to_string(), "metric parameter `min` is not set");
        assert_eq!(e.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn error_undefined_bound() {
        let e = CloudError::UndefinedBound { axis: 2 };
        assert_eq!(e.to_string(), "bound on axis 2 is undefined");
        assert_eq!(e.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn error_unsupported() {
        let e = CloudError::Unsupported {
            operation: "output_distance",
        };
        assert_eq!(
            e.to_string(),
            "output_distance requires points with an output vector"
        );
        assert_eq!(e.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn check_dimension_ok_and_err() {
        assert!(check_dimension("max", 2, 2).is_ok());
        assert!(matches!(
            check_dimension("max", 2, 3),
            Err(CloudError::DimensionMismatch {
                what: "max",
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Configuration.to_string(), "configuration error");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<CloudError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<CloudError>();
    }
}
