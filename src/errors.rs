//! Error types for the tracking pipeline and the assignment solver
//!
//! Expected conditions (empty frames, no candidate pairs) are not errors;
//! they produce zero-link results. Everything here aborts a run.

use std::fmt;

/// Errors that can occur during a tracking run
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// The spot collection is empty or malformed
    InvalidInput {
        /// Description of the problem
        description: String,
    },

    /// The tracking configuration is invalid
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// The assignment solver failed
    Assignment(AssignmentError),

    /// The run was aborted by the caller
    Cancelled,
}

impl TrackingError {
    pub(crate) fn invalid_input(description: impl Into<String>) -> Self {
        TrackingError::InvalidInput {
            description: description.into(),
        }
    }

    pub(crate) fn configuration(description: impl Into<String>) -> Self {
        TrackingError::Configuration {
            description: description.into(),
        }
    }

    /// True if the run was aborted rather than failed
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TrackingError::Cancelled)
    }
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::InvalidInput { description } => {
                write!(f, "Invalid input: {}", description)
            }
            TrackingError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            TrackingError::Assignment(e) => write!(f, "Assignment failed: {}", e),
            TrackingError::Cancelled => write!(f, "Tracking was cancelled"),
        }
    }
}

impl std::error::Error for TrackingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackingError::Assignment(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AssignmentError> for TrackingError {
    fn from(e: AssignmentError) -> Self {
        TrackingError::Assignment(e)
    }
}

/// Errors raised by the sparse assignment solver
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentError {
    /// A cost entry or alternative cost is negative or not finite
    InvalidCost {
        /// Row of the offending entry (None for an alternative cost)
        row: Option<usize>,
        /// Column of the offending entry (None for an alternative cost)
        col: Option<usize>,
        /// The offending value
        cost: f64,
    },

    /// Matrix structure does not match its declared dimensions
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Which dimension
        context: String,
    },

    /// No augmenting path exists for a row
    Infeasible {
        /// Row of the augmented problem that could not be assigned
        row: usize,
    },
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::InvalidCost { row, col, cost } => match (row, col) {
                (Some(r), Some(c)) => {
                    write!(f, "Invalid cost {} at entry ({}, {})", cost, r, c)
                }
                _ => write!(f, "Invalid alternative cost {}", cost),
            },
            AssignmentError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            AssignmentError::Infeasible { row } => {
                write!(f, "No augmenting path from row {}", row)
            }
        }
    }
}

impl std::error::Error for AssignmentError {}
