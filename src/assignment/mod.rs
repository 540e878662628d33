//! Sparse linear assignment solvers
//!
//! A solver takes a [`LapProblem`] (sparse costs plus per-side alternative
//! costs) and returns the globally optimal [`Assignment`]: each row is matched
//! to at most one column, each column to at most one row, and every unmatched
//! row or column pays its alternative cost.
//!
//! Implementations:
//! - [`JonkerVolgenant`] - column reduction + sparse shortest augmenting paths

pub mod jonker_volgenant;

pub use jonker_volgenant::JonkerVolgenant;

use crate::association::LapProblem;
use crate::errors::AssignmentError;

/// Optimal solution of a rectangular assignment problem
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column matched to each row, `None` if the row took its alternative
    pub row_to_col: Vec<Option<usize>>,
    /// Row matched to each column, `None` if the column took its alternative
    pub col_to_row: Vec<Option<usize>>,
    /// Sum of the costs of matched pairs
    pub total_cost: f64,
    /// `total_cost` plus all alternative costs paid
    pub objective: f64,
}

impl Assignment {
    /// Assignment where every row and column is unmatched
    pub fn unmatched(problem: &LapProblem) -> Self {
        let n_rows = problem.nrows();
        let n_cols = problem.ncols();
        Self {
            row_to_col: vec![None; n_rows],
            col_to_row: vec![None; n_cols],
            total_cost: 0.0,
            objective: n_rows as f64 * problem.row_alternative
                + n_cols as f64 * problem.col_alternative,
        }
    }

    /// Matched `(row, col)` pairs in row order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|c| (row, c)))
    }

    /// Number of matched pairs
    pub fn num_matched(&self) -> usize {
        self.row_to_col.iter().filter(|c| c.is_some()).count()
    }
}

/// Linear assignment solver
///
/// Implementations must return the globally optimal assignment or an error,
/// never an approximation.
pub trait AssignmentSolver: Send + Sync {
    /// Solve the problem
    fn solve(&self, problem: &LapProblem) -> Result<Assignment, AssignmentError>;
}

/// Reject negative or non-finite costs before solving
pub fn validate_problem(problem: &LapProblem) -> Result<(), AssignmentError> {
    for alternative in [problem.row_alternative, problem.col_alternative] {
        if !(alternative.is_finite() && alternative >= 0.0) {
            return Err(AssignmentError::InvalidCost {
                row: None,
                col: None,
                cost: alternative,
            });
        }
    }

    match problem
        .matrix
        .entries()
        .find(|(_, _, cost)| !(cost.is_finite() && *cost >= 0.0))
    {
        Some((row, col, cost)) => Err(AssignmentError::InvalidCost {
            row: Some(row),
            col: Some(col),
            cost,
        }),
        None => Ok(()),
    }
}
