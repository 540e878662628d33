//! Sparse Jonker–Volgenant style assignment solver
//!
//! The rectangular problem with alternatives is first augmented to a square
//! `(R + C) × (R + C)` sparse problem:
//!
//! ```text
//!            C real cols        R dummy cols
//!          ┌──────────────────┬──────────────────┐
//!  R rows  │ costs            │ diag(row alt)    │
//!          ├──────────────────┼──────────────────┤
//!  C dummy │ diag(col alt)    │ costsᵀ pattern,0 │
//!          └──────────────────┴──────────────────┘
//! ```
//!
//! A perfect matching of the augmented problem is a partial matching of the
//! original one: a real row on its dummy column is unmatched, a dummy row on
//! its real column leaves that column unmatched, and the zero-cost transposed
//! block absorbs the dummies of every matched pair. The optimum of the
//! augmented problem is therefore the optimum of the original.
//!
//! Solving:
//! 1. Column reduction: column potentials start at the cheapest incoming
//!    cost and rows are greedily matched along tight edges.
//! 2. For each remaining free row, a Dijkstra search over reduced costs finds
//!    the shortest augmenting path. Potentials are updated so reduced costs
//!    stay non-negative and matched edges stay tight.
//!
//! Only stored entries are ever visited, so each search costs
//! `O(nnz · log n)` instead of `O(n²)`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::association::LapProblem;
use crate::errors::AssignmentError;

use super::{validate_problem, Assignment, AssignmentSolver};

/// Exact sparse LAP solver
#[derive(Debug, Clone, Copy, Default)]
pub struct JonkerVolgenant;

impl JonkerVolgenant {
    pub fn new() -> Self {
        Self
    }
}

impl AssignmentSolver for JonkerVolgenant {
    fn solve(&self, problem: &LapProblem) -> Result<Assignment, AssignmentError> {
        validate_problem(problem)?;

        if problem.matrix.is_empty() {
            return Ok(Assignment::unmatched(problem));
        }

        let augmented = AugmentedProblem::new(problem);
        let row_to_col = augmented.solve()?;
        Ok(extract_assignment(problem, &row_to_col))
    }
}

/// Square sparse problem with adjacency lists per row
struct AugmentedProblem {
    n: usize,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl AugmentedProblem {
    fn new(problem: &LapProblem) -> Self {
        let n_rows = problem.nrows();
        let n_cols = problem.ncols();
        let n = n_rows + n_cols;
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];

        // dummy row for column j sits at n_rows + j, its real column first
        for j in 0..n_cols {
            adjacency[n_rows + j].push((j, problem.col_alternative));
        }

        for i in 0..n_rows {
            let row = &mut adjacency[i];
            row.extend(problem.matrix.row(i));
            row.push((n_cols + i, problem.row_alternative));
        }

        for (i, j, _) in problem.matrix.entries() {
            adjacency[n_rows + j].push((n_cols + i, 0.0));
        }

        Self { n, adjacency }
    }

    fn solve(&self) -> Result<Vec<usize>, AssignmentError> {
        let n = self.n;
        let mut row_to_col: Vec<Option<usize>> = vec![None; n];
        let mut col_to_row: Vec<Option<usize>> = vec![None; n];
        let mut row_potential = vec![0.0; n];
        let mut col_potential = vec![f64::INFINITY; n];

        // column reduction
        for row in &self.adjacency {
            for &(j, cost) in row {
                if cost < col_potential[j] {
                    col_potential[j] = cost;
                }
            }
        }
        for (i, row) in self.adjacency.iter().enumerate() {
            if let Some(&(j, _)) = row
                .iter()
                .find(|&&(j, cost)| col_to_row[j].is_none() && cost == col_potential[j])
            {
                row_to_col[i] = Some(j);
                col_to_row[j] = Some(i);
            }
        }

        let mut search = PathSearch::new(n);
        for free_row in 0..n {
            if row_to_col[free_row].is_some() {
                continue;
            }
            search.augment(
                self,
                free_row,
                &mut row_to_col,
                &mut col_to_row,
                &mut row_potential,
                &mut col_potential,
            )?;
        }

        row_to_col
            .into_iter()
            .enumerate()
            .map(|(row, col)| col.ok_or(AssignmentError::Infeasible { row }))
            .collect()
    }
}

/// Reusable Dijkstra state for shortest augmenting path searches
struct PathSearch {
    dist: Vec<f64>,
    pred: Vec<usize>,
    done: Vec<bool>,
    touched: Vec<usize>,
    scanned_cols: Vec<usize>,
    scanned_rows: Vec<(usize, f64)>,
    heap: BinaryHeap<HeapEntry>,
}

impl PathSearch {
    fn new(n: usize) -> Self {
        Self {
            dist: vec![f64::INFINITY; n],
            pred: vec![usize::MAX; n],
            done: vec![false; n],
            touched: Vec::new(),
            scanned_cols: Vec::new(),
            scanned_rows: Vec::new(),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        for &j in &self.touched {
            self.dist[j] = f64::INFINITY;
            self.pred[j] = usize::MAX;
            self.done[j] = false;
        }
        self.touched.clear();
        self.scanned_cols.clear();
        self.scanned_rows.clear();
        self.heap.clear();
    }

    fn relax_row(
        &mut self,
        problem: &AugmentedProblem,
        row: usize,
        row_dist: f64,
        row_potential: &[f64],
        col_potential: &[f64],
    ) {
        for &(j, cost) in &problem.adjacency[row] {
            if self.done[j] {
                continue;
            }
            let reduced = (cost + row_potential[row] - col_potential[j]).max(0.0);
            let candidate = row_dist + reduced;
            if candidate < self.dist[j] {
                if self.dist[j].is_infinite() {
                    self.touched.push(j);
                }
                self.dist[j] = candidate;
                self.pred[j] = row;
                self.heap.push(HeapEntry {
                    dist: candidate,
                    col: j,
                });
            }
        }
    }

    /// Find the shortest augmenting path from `free_row` and flip it
    fn augment(
        &mut self,
        problem: &AugmentedProblem,
        free_row: usize,
        row_to_col: &mut [Option<usize>],
        col_to_row: &mut [Option<usize>],
        row_potential: &mut [f64],
        col_potential: &mut [f64],
    ) -> Result<(), AssignmentError> {
        self.reset();
        self.scanned_rows.push((free_row, 0.0));
        self.relax_row(problem, free_row, 0.0, row_potential, col_potential);

        let (sink, sink_dist) = loop {
            let HeapEntry { dist, col } = match self.heap.pop() {
                Some(entry) => entry,
                None => return Err(AssignmentError::Infeasible { row: free_row }),
            };
            if self.done[col] || dist > self.dist[col] {
                continue;
            }
            self.done[col] = true;
            self.scanned_cols.push(col);

            match col_to_row[col] {
                None => break (col, dist),
                Some(row) => {
                    // matched edges are tight: the row inherits the column distance
                    self.scanned_rows.push((row, dist));
                    self.relax_row(problem, row, dist, row_potential, col_potential);
                }
            }
        };

        for &(row, dist) in &self.scanned_rows {
            row_potential[row] += dist - sink_dist;
        }
        for &col in &self.scanned_cols {
            col_potential[col] += self.dist[col] - sink_dist;
        }

        let mut col = sink;
        loop {
            let row = self.pred[col];
            let previous = row_to_col[row];
            row_to_col[row] = Some(col);
            col_to_row[col] = Some(row);
            if row == free_row {
                break;
            }
            col = match previous {
                Some(c) => c,
                None => return Err(AssignmentError::Infeasible { row }),
            };
        }
        Ok(())
    }
}

/// Min-heap entry ordered by distance, ties broken by lower column index
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist: f64,
    col: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for min-heap
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.col.cmp(&self.col))
    }
}

/// Map the augmented solution back onto the original rows and columns
fn extract_assignment(problem: &LapProblem, augmented_row_to_col: &[usize]) -> Assignment {
    let n_rows = problem.nrows();
    let n_cols = problem.ncols();
    let mut row_to_col = vec![None; n_rows];
    let mut col_to_row = vec![None; n_cols];
    let mut total_cost = 0.0;

    for (i, &j) in augmented_row_to_col.iter().take(n_rows).enumerate() {
        if j < n_cols {
            if let Some(cost) = problem.matrix.get(i, j) {
                row_to_col[i] = Some(j);
                col_to_row[j] = Some(i);
                total_cost += cost;
            }
        }
    }

    let unmatched_rows = row_to_col.iter().filter(|c| c.is_none()).count();
    let unmatched_cols = col_to_row.iter().filter(|r| r.is_none()).count();
    let objective = total_cost
        + unmatched_rows as f64 * problem.row_alternative
        + unmatched_cols as f64 * problem.col_alternative;

    Assignment {
        row_to_col,
        col_to_row,
        total_cost,
        objective,
    }
}
