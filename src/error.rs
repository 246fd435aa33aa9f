use thiserror::Error;

use crate::geom::Coordinate;

/// Every failure this crate can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Malformed input to a constructor or predicate.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    /// The algorithm reached a state it cannot resolve at the current precision.
    #[error("topology error: {message}{}", fmt_coordinate(.coordinate))]
    Topology {
        message: String,
        coordinate: Option<Coordinate>,
    },
    /// An internal invariant was violated.
    #[error("assertion failed: {0}")]
    Assertion(String),
    /// The operation is not meaningful for the given geometry variant.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// The operation was aborted by an interrupt request.
    #[error("operation interrupted")]
    Interrupted,
}

fn fmt_coordinate(coordinate: &Option<Coordinate>) -> String {
    coordinate
        .map(|c| format!(" at or near point {} {}", c.x, c.y))
        .unwrap_or_default()
}

impl GeometryError {
    /// Returns a topology error located at the given coordinate.
    pub fn topology(message: impl Into<String>, coordinate: impl Into<Option<Coordinate>>) -> Self {
        Self::Topology {
            message: message.into(),
            coordinate: coordinate.into(),
        }
    }

    /// Returns an illegal argument error.
    pub fn illegal(message: impl Into<String>) -> Self {
        Self::IllegalArgument(message.into())
    }

    /// Returns an assertion error.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Returns true if, and only if, this is the failure a robustness ladder may retry on.
    pub fn is_topology(&self) -> bool {
        matches!(self, Self::Topology { .. })
    }

    /// Returns the coordinate the failure was located at, if any.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Topology { coordinate, .. } => *coordinate,
            _ => None,
        }
    }
}

/// The result type of fallible geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
