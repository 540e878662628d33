//! Segment linking: gap closing, splitting and merging in one global solve.
//!
//! Rows are segment ends followed by split sources, columns are segment
//! starts followed by merge targets:
//!
//! | row \ col    | start        | merge target |
//! |--------------|--------------|--------------|
//! | end          | gap closing  | merging      |
//! | split source | splitting    | -            |
//!
//! Split sources and merge targets only exist when their category is
//! enabled. Column candidates are bucketed by frame so each row only visits
//! the frames its categories can reach.

use std::collections::BTreeMap;

use crate::assignment::AssignmentSolver;
use crate::association::{collect_rows, CostFunction, LapProblem, SparseCostMatrix};
use crate::errors::TrackingError;
use crate::types::{Link, LinkKind, Spot, TrackingConfig};

use super::segments::Segment;
use super::AbortToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRole {
    End,
    SplitSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColRole {
    Start,
    MergeTarget,
}

fn link_kind(row: RowRole, col: ColRole) -> Option<LinkKind> {
    match (row, col) {
        (RowRole::End, ColRole::Start) => Some(LinkKind::GapClosing),
        (RowRole::End, ColRole::MergeTarget) => Some(LinkKind::Merging),
        (RowRole::SplitSource, ColRole::Start) => Some(LinkKind::Splitting),
        (RowRole::SplitSource, ColRole::MergeTarget) => None,
    }
}

/// Column indices grouped by the frame of their spot
type FrameBuckets = BTreeMap<usize, Vec<usize>>;

fn bucket_by_frame(spots: &[&Spot], offset: usize) -> FrameBuckets {
    let mut buckets = FrameBuckets::new();
    for (i, spot) in spots.iter().enumerate() {
        buckets.entry(spot.frame).or_default().push(offset + i);
    }
    buckets
}

/// The global segment-stage problem, with the spot behind every row and column
#[derive(Debug, Clone)]
pub struct SegmentProblem<'a> {
    problem: LapProblem,
    rows: Vec<(&'a Spot, RowRole)>,
    cols: Vec<(&'a Spot, ColRole)>,
}

impl<'a> SegmentProblem<'a> {
    /// The assignment problem handed to the solver
    pub fn lap(&self) -> &LapProblem {
        &self.problem
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Number of candidate links
    pub fn num_candidates(&self) -> usize {
        self.problem.matrix.nnz()
    }
}

/// Builds and solves the segment-stage problem
pub struct SegmentLinker<'a> {
    config: &'a TrackingConfig,
    cost_function: &'a dyn CostFunction,
    solver: &'a dyn AssignmentSolver,
}

impl<'a> SegmentLinker<'a> {
    pub fn new(
        config: &'a TrackingConfig,
        cost_function: &'a dyn CostFunction,
        solver: &'a dyn AssignmentSolver,
    ) -> Self {
        Self {
            config,
            cost_function,
            solver,
        }
    }

    /// Propose gap-closing, splitting and merging links between segments.
    ///
    /// Returns no links when every category is disabled or there is nothing
    /// to connect. The abort token is checked before the solve.
    pub fn link(
        &self,
        segments: &[Segment<'_>],
        abort: &AbortToken,
    ) -> Result<Vec<Link>, TrackingError> {
        if !self.config.segment_stage_enabled() || segments.is_empty() {
            return Ok(Vec::new());
        }
        let problem = self.build_problem(segments)?;
        abort.check()?;
        self.solve(&problem)
    }

    /// Assemble the candidate matrix for all segments
    pub fn build_problem<'s>(
        &self,
        segments: &[Segment<'s>],
    ) -> Result<SegmentProblem<'s>, TrackingError> {
        let config = self.config;

        let mut rows: Vec<(&'s Spot, RowRole)> =
            segments.iter().map(|s| (s.end(), RowRole::End)).collect();
        if config.allow_splitting {
            rows.extend(
                segments
                    .iter()
                    .flat_map(|s| s.split_sources().iter())
                    .map(|&spot| (spot, RowRole::SplitSource)),
            );
        }

        let starts: Vec<&'s Spot> = segments.iter().map(Segment::start).collect();
        let merge_targets: Vec<&'s Spot> = if config.allow_merging {
            segments
                .iter()
                .flat_map(|s| s.merge_targets().iter().copied())
                .collect()
        } else {
            Vec::new()
        };

        let start_buckets = bucket_by_frame(&starts, 0);
        let merge_buckets = bucket_by_frame(&merge_targets, starts.len());

        let mut cols: Vec<(&'s Spot, ColRole)> =
            starts.iter().map(|&s| (s, ColRole::Start)).collect();
        cols.extend(merge_targets.iter().map(|&s| (s, ColRole::MergeTarget)));

        let gap_closing = config.gap_closing_enabled();
        let max_gap = config.max_frame_gap;

        let candidate_rows = collect_rows(rows.len(), |i| {
            let (source, role) = rows[i];
            let frame = source.frame;
            let mut entries = Vec::new();

            // Frame offsets are clamped at the end of the frame axis
            let mut visit = |buckets: &FrameBuckets, min_offset: usize, max_offset: usize| {
                let Some(first) = frame.checked_add(min_offset) else {
                    return;
                };
                let last = frame.saturating_add(max_offset);
                if first > last {
                    return;
                }
                let candidates = buckets
                    .range(first..=last)
                    .flat_map(|(_, bucket)| bucket.iter().copied());
                for col in candidates {
                    let (target, col_role) = cols[col];
                    let Some(kind) = link_kind(role, col_role) else {
                        continue;
                    };
                    let max_distance = config.max_distance(kind);
                    if source.square_distance_to(target) <= max_distance * max_distance {
                        entries.push((col, self.cost_function.link_cost(kind, source, target)));
                    }
                }
            };

            match role {
                RowRole::End => {
                    if gap_closing {
                        visit(&start_buckets, 2, max_gap);
                    }
                    if config.allow_merging {
                        visit(&merge_buckets, 1, 1);
                    }
                }
                RowRole::SplitSource => visit(&start_buckets, 1, 1),
            }

            entries.sort_unstable_by_key(|&(col, _)| col);
            entries
        });

        let matrix = SparseCostMatrix::from_rows(cols.len(), candidate_rows)?;
        log::debug!(
            "Segment problem: {} rows x {} cols, {} candidates",
            matrix.nrows(),
            matrix.ncols(),
            matrix.nnz()
        );

        Ok(SegmentProblem {
            problem: LapProblem::new(matrix, config.segment_alternative),
            rows,
            cols,
        })
    }

    /// Solve a built problem and translate accepted entries into links
    pub fn solve(&self, problem: &SegmentProblem<'_>) -> Result<Vec<Link>, TrackingError> {
        if problem.num_candidates() == 0 {
            return Ok(Vec::new());
        }

        let assignment = self.solver.solve(&problem.problem)?;
        Ok(assignment
            .pairs()
            .filter_map(|(i, j)| {
                let (source, row_role) = problem.rows[i];
                let (target, col_role) = problem.cols[j];
                let kind = link_kind(row_role, col_role)?;
                let cost = problem.problem.matrix.get(i, j)?;
                Some(Link::new(source.id, target.id, cost, kind))
            })
            .collect())
    }
}
