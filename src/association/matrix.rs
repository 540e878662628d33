//! Sparse cost matrix and the linear assignment problem built on it.
//!
//! Only candidate pairs inside the configured physical thresholds are stored.
//! Every absent `(row, col)` entry is implicitly infinite. Storage is
//! compressed sparse row, with each row's columns in increasing order.

use crate::errors::AssignmentError;
use crate::types::AlternativeCostPolicy;

/// Alternative cost used when a problem has no finite entries at all
pub const EMPTY_ALTERNATIVE_COST: f64 = 1.0;

/// Sparse `n_rows × n_cols` cost matrix in CSR layout
#[derive(Debug, Clone, PartialEq)]
pub struct SparseCostMatrix {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    costs: Vec<f64>,
}

impl SparseCostMatrix {
    /// Matrix with no entries
    pub fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            costs: Vec::new(),
        }
    }

    /// Build from per-row entry lists.
    ///
    /// Each row must list `(col, cost)` with strictly increasing columns, all
    /// below `n_cols`.
    pub fn from_rows(n_cols: usize, rows: Vec<Vec<(usize, f64)>>) -> Result<Self, AssignmentError> {
        let n_rows = rows.len();
        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut costs = Vec::with_capacity(nnz);

        row_ptr.push(0);
        for row in rows {
            let mut last: Option<usize> = None;
            for (col, cost) in row {
                if col >= n_cols {
                    return Err(AssignmentError::DimensionMismatch {
                        expected: n_cols,
                        actual: col + 1,
                        context: "column index".to_string(),
                    });
                }
                if last.is_some_and(|l| l >= col) {
                    return Err(AssignmentError::DimensionMismatch {
                        expected: last.map_or(0, |l| l + 1),
                        actual: col,
                        context: "increasing column order".to_string(),
                    });
                }
                last = Some(col);
                col_idx.push(col);
                costs.push(cost);
            }
            row_ptr.push(col_idx.len());
        }

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            costs,
        })
    }

    /// Build from unordered `(row, col, cost)` triplets.
    ///
    /// Duplicate coordinates keep the lowest cost.
    pub fn from_triplets(
        n_rows: usize,
        n_cols: usize,
        mut entries: Vec<(usize, usize, f64)>,
    ) -> Result<Self, AssignmentError> {
        if let Some(&(row, _, _)) = entries.iter().find(|(r, _, _)| *r >= n_rows) {
            return Err(AssignmentError::DimensionMismatch {
                expected: n_rows,
                actual: row + 1,
                context: "row index".to_string(),
            });
        }

        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)).then(a.2.total_cmp(&b.2)));
        entries.dedup_by(|later, earlier| later.0 == earlier.0 && later.1 == earlier.1);

        let mut rows = vec![Vec::new(); n_rows];
        for (row, col, cost) in entries {
            rows[row].push((col, cost));
        }
        Self::from_rows(n_cols, rows)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (finite) entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.costs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Entries of one row as `(col, cost)`, in column order
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.costs[range].iter().copied())
    }

    /// All entries as `(row, col, cost)` in row-major order
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n_rows).flat_map(move |r| self.row(r).map(move |(c, cost)| (r, c, cost)))
    }

    /// Cost of one entry, `None` if absent
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        let cols = &self.col_idx[range.clone()];
        cols.binary_search(&col)
            .ok()
            .map(|k| self.costs[range.start + k])
    }

    /// Raw stored costs
    #[inline]
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }
}

/// Rectangular assignment problem: sparse costs plus no-match alternatives
#[derive(Debug, Clone, PartialEq)]
pub struct LapProblem {
    pub matrix: SparseCostMatrix,
    /// Cost of leaving a row unmatched
    pub row_alternative: f64,
    /// Cost of leaving a column unmatched
    pub col_alternative: f64,
}

impl LapProblem {
    /// Problem whose alternative cost is derived from the matrix costs
    pub fn new(matrix: SparseCostMatrix, policy: AlternativeCostPolicy) -> Self {
        let alternative = alternative_cost(policy, matrix.costs());
        Self {
            matrix,
            row_alternative: alternative,
            col_alternative: alternative,
        }
    }

    /// Problem with explicit alternative costs
    pub fn with_alternatives(
        matrix: SparseCostMatrix,
        row_alternative: f64,
        col_alternative: f64,
    ) -> Self {
        Self {
            matrix,
            row_alternative,
            col_alternative,
        }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }
}

/// Alternative cost for a set of finite costs under a policy
pub fn alternative_cost(policy: AlternativeCostPolicy, costs: &[f64]) -> f64 {
    if let AlternativeCostPolicy::Fixed(value) = policy {
        return value;
    }

    let finite: Vec<f64> = costs.iter().copied().filter(|c| c.is_finite()).collect();
    if finite.is_empty() {
        return EMPTY_ALTERNATIVE_COST;
    }

    let value = match policy {
        AlternativeCostPolicy::MaxFactor { factor } => {
            factor * finite.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
        AlternativeCostPolicy::Percentile { percentile, factor } => {
            factor * percentile_of(finite, percentile)
        }
        AlternativeCostPolicy::Fixed(value) => value,
    };

    // all-zero costs would otherwise make "unmatched" free
    if value > 0.0 {
        value
    } else {
        EMPTY_ALTERNATIVE_COST
    }
}

/// Nearest-rank percentile, `p` in (0, 1]
fn percentile_of(mut values: Vec<f64>, p: f64) -> f64 {
    values.sort_by(f64::total_cmp);
    let rank = (p * values.len() as f64).ceil() as usize;
    values[rank.clamp(1, values.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_triplets_sorts_and_dedups() {
        let m = SparseCostMatrix::from_triplets(
            2,
            3,
            vec![(1, 2, 5.0), (0, 1, 2.0), (1, 0, 1.0), (0, 1, 1.5)],
        )
        .unwrap();

        assert_eq!(m.nnz(), 3);
        assert_eq!(m.get(0, 1), Some(1.5));
        assert_eq!(m.get(0, 0), None);
        let row1: Vec<_> = m.row(1).collect();
        assert_eq!(row1, vec![(0, 1.0), (2, 5.0)]);
    }

    #[test]
    fn test_from_rows_rejects_out_of_range() {
        let err = SparseCostMatrix::from_rows(2, vec![vec![(2, 1.0)]]).unwrap_err();
        assert!(matches!(err, AssignmentError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_from_rows_rejects_unsorted() {
        assert!(SparseCostMatrix::from_rows(3, vec![vec![(2, 1.0), (1, 1.0)]]).is_err());
    }

    #[test]
    fn test_entries_row_major() {
        let m =
            SparseCostMatrix::from_rows(2, vec![vec![(1, 3.0)], vec![], vec![(0, 4.0)]]).unwrap();
        let entries: Vec<_> = m.entries().collect();
        assert_eq!(entries, vec![(0, 1, 3.0), (2, 0, 4.0)]);
    }

    #[test]
    fn test_alternative_max_factor() {
        let alt = alternative_cost(
            AlternativeCostPolicy::MaxFactor { factor: 1.05 },
            &[1.0, 4.0, 2.0],
        );
        assert!((alt - 4.2).abs() < 1e-12);
    }

    #[test]
    fn test_alternative_percentile() {
        let costs: Vec<f64> = (1..=10).map(f64::from).collect();
        let alt = alternative_cost(
            AlternativeCostPolicy::Percentile {
                percentile: 0.9,
                factor: 1.0,
            },
            &costs,
        );
        assert_eq!(alt, 9.0);
    }

    #[test]
    fn test_alternative_without_costs() {
        let alt = alternative_cost(AlternativeCostPolicy::linking_default(), &[]);
        assert_eq!(alt, EMPTY_ALTERNATIVE_COST);

        let alt = alternative_cost(AlternativeCostPolicy::linking_default(), &[0.0, 0.0]);
        assert_eq!(alt, EMPTY_ALTERNATIVE_COST);
    }

    #[test]
    fn test_problem_new() {
        let m = SparseCostMatrix::from_rows(1, vec![vec![(0, 2.0)]]).unwrap();
        let problem = LapProblem::new(m, AlternativeCostPolicy::Fixed(7.0));
        assert_eq!(problem.row_alternative, 7.0);
        assert_eq!(problem.col_alternative, 7.0);
        assert_eq!((problem.nrows(), problem.ncols()), (1, 1));
    }
}
