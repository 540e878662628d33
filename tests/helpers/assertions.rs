//! Structural assertions on link graphs and a reference assignment solver

use std::collections::HashSet;

use sparse_lap_tracker::{Assignment, LapProblem, LinkKind, TrackGraph, TrackingConfig};

/// Check frame spans and degree limits of every link in `graph`
pub fn assert_link_invariants(graph: &TrackGraph, config: &TrackingConfig) {
    for (link, span) in graph.edge_spans() {
        match link.kind {
            LinkKind::FrameToFrame | LinkKind::Splitting | LinkKind::Merging => {
                assert_eq!(span, 1, "{:?} spans {} frames", link, span)
            }
            LinkKind::GapClosing => {
                assert!(
                    (2..=config.max_frame_gap).contains(&span),
                    "{:?} spans {} frames, window is 2..={}",
                    link,
                    span,
                    config.max_frame_gap
                )
            }
        }
        assert!(link.cost.is_finite() && link.cost >= 0.0, "{:?} has invalid cost", link);
    }

    for spot in graph.spots() {
        let out_kinds: Vec<LinkKind> = graph.outgoing(spot.id).map(|l| l.kind).collect();
        let in_kinds: Vec<LinkKind> = graph.incoming(spot.id).map(|l| l.kind).collect();

        assert!(out_kinds.len() <= 2, "spot {} has {} outgoing links", spot.id, out_kinds.len());
        assert!(in_kinds.len() <= 2, "spot {} has {} incoming links", spot.id, in_kinds.len());

        if out_kinds.len() == 2 {
            assert!(config.allow_splitting, "spot {} splits with splitting disabled", spot.id);
            assert!(out_kinds.contains(&LinkKind::Splitting));
        }
        if in_kinds.len() == 2 {
            assert!(config.allow_merging, "spot {} merges with merging disabled", spot.id);
            assert!(in_kinds.contains(&LinkKind::Merging));
        }

        let f2f_out = out_kinds.iter().filter(|&&k| k == LinkKind::FrameToFrame).count();
        let f2f_in = in_kinds.iter().filter(|&&k| k == LinkKind::FrameToFrame).count();
        assert!(f2f_out <= 1 && f2f_in <= 1, "spot {} branches in frame-to-frame links", spot.id);
    }

    if !config.allow_gap_closing {
        assert!(graph.edges().iter().all(|l| l.kind != LinkKind::GapClosing));
    }
    if !config.allow_splitting {
        assert!(graph.edges().iter().all(|l| l.kind != LinkKind::Splitting));
    }
    if !config.allow_merging {
        assert!(graph.edges().iter().all(|l| l.kind != LinkKind::Merging));
    }
}

/// Check that `assignment` is a valid partial matching over the entries of
/// `problem` and that its objective is consistent with it
pub fn assert_valid_assignment(problem: &LapProblem, assignment: &Assignment) {
    assert_eq!(assignment.row_to_col.len(), problem.nrows());
    assert_eq!(assignment.col_to_row.len(), problem.ncols());

    let mut used_cols = HashSet::new();
    let mut total = 0.0;
    for (row, col) in assignment.pairs() {
        assert!(used_cols.insert(col), "column {} assigned twice", col);
        assert_eq!(assignment.col_to_row[col], Some(row));
        total += problem
            .matrix
            .get(row, col)
            .unwrap_or_else(|| panic!("({}, {}) is not a candidate", row, col));
    }
    assert!((total - assignment.total_cost).abs() < 1e-9);

    let matched = assignment.num_matched() as f64;
    let expected = total
        + (problem.nrows() as f64 - matched) * problem.row_alternative
        + (problem.ncols() as f64 - matched) * problem.col_alternative;
    assert!((expected - assignment.objective).abs() < 1e-9);
}

/// Optimal objective by exhaustive enumeration of partial matchings
pub fn brute_force_objective(problem: &LapProblem) -> f64 {
    fn search(
        problem: &LapProblem,
        row: usize,
        used: &mut Vec<bool>,
        matched: usize,
        cost: f64,
        best: &mut f64,
    ) {
        if row == problem.nrows() {
            let objective = cost
                + (problem.nrows() - matched) as f64 * problem.row_alternative
                + (problem.ncols() - matched) as f64 * problem.col_alternative;
            if objective < *best {
                *best = objective;
            }
            return;
        }

        // Row takes its alternative
        search(problem, row + 1, used, matched, cost, best);

        for (col, c) in problem.matrix.row(row) {
            if !used[col] {
                used[col] = true;
                search(problem, row + 1, used, matched + 1, cost + c, best);
                used[col] = false;
            }
        }
    }

    let mut best = f64::INFINITY;
    let mut used = vec![false; problem.ncols()];
    search(problem, 0, &mut used, 0, 0.0, &mut best);
    best
}
