//! Error types for Poisson system construction and solving.

use strum_macros::Display;
use thiserror::Error;

/// Broad class of an [`Error`], so callers can tell bad input from bad numerics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// Caller supplied malformed input (empty domain, shapes, corners, config).
    Domain,
    /// Internal invariant between classification and stencil construction broken.
    Consistency,
    /// The linear system could not be solved to a usable answer.
    Numerical,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Empty domain: the mask selects no pixels")]
    EmptyDomain,

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Channel count mismatch for {what}: expected {expected}, got {actual}")]
    ChannelMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Expected 4 corner values (top-left, top-right, bottom-left, bottom-right), got {0}")]
    InvalidCorners(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Neighbor ({row}, {col}) of unknown {unknown} is not in the domain index")]
    MissingNeighbor {
        unknown: usize,
        row: isize,
        col: isize,
    },

    #[error("Inconsistent operator: {0}")]
    InconsistentOperator(String),

    #[error("Singular system: {0}")]
    SingularSystem(String),

    #[error("Residual {residual:.3e} exceeds threshold {threshold:.3e}")]
    ResidualExceeded { residual: f64, threshold: f64 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyDomain
            | Error::ShapeMismatch { .. }
            | Error::ChannelMismatch { .. }
            | Error::LengthMismatch { .. }
            | Error::InvalidCorners(_)
            | Error::InvalidConfig(_) => ErrorKind::Domain,
            Error::MissingNeighbor { .. } | Error::InconsistentOperator(_) => {
                ErrorKind::Consistency
            }
            Error::SingularSystem(_) | Error::ResidualExceeded { .. } => ErrorKind::Numerical,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain_message() {
        let err = Error::EmptyDomain;
        assert_eq!(err.to_string(), "Empty domain: the mask selects no pixels");
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = Error::ShapeMismatch {
            what: "mask",
            expected: (4, 5),
            actual: (4, 6),
        };
        let msg = err.to_string();
        assert!(msg.contains("mask"));
        assert!(msg.contains("(4, 5)"));
        assert!(msg.contains("(4, 6)"));
    }

    #[test]
    fn test_invalid_corners_message() {
        let err = Error::InvalidCorners(3);
        assert!(err.to_string().contains("got 3"));
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_missing_neighbor_is_consistency_error() {
        let err = Error::MissingNeighbor {
            unknown: 7,
            row: 2,
            col: 3,
        };
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(err.to_string().contains("(2, 3)"));
    }

    #[test]
    fn test_numerical_errors() {
        assert_eq!(
            Error::SingularSystem("zero pivot".into()).kind(),
            ErrorKind::Numerical
        );
        let err = Error::ResidualExceeded {
            residual: 0.5,
            threshold: 1e-6,
        };
        assert_eq!(err.kind(), ErrorKind::Numerical);
        assert!(err.to_string().contains("5.000e-1"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Consistency.to_string(), "consistency");
    }
}
