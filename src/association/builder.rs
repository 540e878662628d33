//! Sparse cost-matrix construction.
//!
//! [`CostMatrixBuilder`] evaluates every `(source, target)` pair and keeps only
//! those whose distance is within the cutoff. Rejected pairs stay implicitly
//! infinite, so the matrix (and the solve) scales with the number of
//! plausible candidates rather than with `|sources| × |targets|`.
//!
//! Rows are evaluated independently. With the `rayon` feature they are
//! evaluated in parallel; the row order of the result never changes.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::errors::AssignmentError;
use crate::types::{AlternativeCostPolicy, LinkKind, Spot};

use super::cost::CostFunction;
use super::matrix::{LapProblem, SparseCostMatrix};

/// Builds gated sparse cost matrices between two spot sequences
pub struct CostMatrixBuilder<'a> {
    cost_function: &'a dyn CostFunction,
    kind: LinkKind,
    max_distance: f64,
    policy: AlternativeCostPolicy,
}

impl<'a> CostMatrixBuilder<'a> {
    /// Create a builder scoring pairs as links of `kind`
    pub fn new(
        cost_function: &'a dyn CostFunction,
        kind: LinkKind,
        max_distance: f64,
        policy: AlternativeCostPolicy,
    ) -> Self {
        Self {
            cost_function,
            kind,
            max_distance,
            policy,
        }
    }

    /// Build the assignment problem between `sources` (rows) and `targets` (columns).
    ///
    /// A pair at exactly `max_distance` is kept. If either side is empty the
    /// matrix is empty, which means no link is possible.
    pub fn build(&self, sources: &[Spot], targets: &[Spot]) -> Result<LapProblem, AssignmentError> {
        let max_d2 = self.max_distance * self.max_distance;

        let rows = collect_rows(sources.len(), |i| {
            let source = &sources[i];
            targets
                .iter()
                .enumerate()
                .filter(|(_, target)| source.square_distance_to(target) <= max_d2)
                .map(|(j, target)| (j, self.cost_function.link_cost(self.kind, source, target)))
                .collect()
        });

        let matrix = SparseCostMatrix::from_rows(targets.len(), rows)?;
        Ok(LapProblem::new(matrix, self.policy))
    }
}

/// Evaluate `row_fn` for every row index, in parallel when available.
///
/// The returned rows are in index order regardless of scheduling.
pub fn collect_rows<F>(n_rows: usize, row_fn: F) -> Vec<Vec<(usize, f64)>>
where
    F: Fn(usize) -> Vec<(usize, f64)> + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        (0..n_rows).into_par_iter().map(row_fn).collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        (0..n_rows).map(row_fn).collect()
    }
}
