//! Frame-to-frame linking
//!
//! Every pair of consecutive frames `(t, t+1)` is an independent assignment
//! problem: spots of `t` are rows, spots of `t+1` are columns, candidates are
//! gated by `max_linking_distance`. Pairs are solved in parallel when the
//! `rayon` feature is enabled; each worker owns its output and results are
//! concatenated in increasing `t`.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::assignment::AssignmentSolver;
use crate::association::{CostFunction, CostMatrixBuilder};
use crate::errors::TrackingError;
use crate::types::{Link, LinkKind, Spot, SpotCollection, TrackingConfig};

use super::AbortToken;

/// Links accepted between frame `source_frame` and `source_frame + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct FramePairLinks {
    pub source_frame: usize,
    pub links: Vec<Link>,
}

/// Source frame with the spots of it and of the frame after
type FramePair<'s> = (usize, &'s [Spot], &'s [Spot]);

/// Solves one assignment problem per consecutive frame pair
pub struct FrameLinker<'a> {
    config: &'a TrackingConfig,
    cost_function: &'a dyn CostFunction,
    solver: &'a dyn AssignmentSolver,
}

impl<'a> FrameLinker<'a> {
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

    /// Link all consecutive frame pairs and return the flattened links
    pub fn link(
        &self,
        spots: &SpotCollection,
        abort: &AbortToken,
    ) -> Result<Vec<Link>, TrackingError> {
        Ok(self
            .link_frame_pairs(spots, abort)?
            .into_iter()
            .flat_map(|pair| pair.links)
            .collect())
    }

    /// Link all consecutive frame pairs, keeping the per-pair grouping.
    ///
    /// The abort token is checked before each pair; an abort discards every
    /// pair already linked.
    pub fn link_frame_pairs(
        &self,
        spots: &SpotCollection,
        abort: &AbortToken,
    ) -> Result<Vec<FramePairLinks>, TrackingError> {
        let frames: Vec<(usize, &[Spot])> = spots.frames().collect();
        let pairs: Vec<FramePair<'_>> = frames
            .windows(2)
            .filter(|w| w[1].0 == w[0].0 + 1)
            .map(|w| (w[0].0, w[0].1, w[1].1))
            .collect();

        log::debug!("Frame-to-frame linking over {} frame pairs", pairs.len());

        #[cfg(feature = "rayon")]
        {
            pairs
                .par_iter()
                .map(|pair| self.link_frame_pair(pair, abort))
                .collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            pairs
                .iter()
                .map(|pair| self.link_frame_pair(pair, abort))
                .collect()
        }
    }

    fn link_frame_pair(
        &self,
        &(frame, sources, targets): &FramePair<'_>,
        abort: &AbortToken,
    ) -> Result<FramePairLinks, TrackingError> {
        abort.check()?;
        let links = self.link_pair(sources, targets)?;
        log::trace!("Frame {} -> {}: {} links", frame, frame + 1, links.len());
        Ok(FramePairLinks {
            source_frame: frame,
            links,
        })
    }

    /// Solve the assignment between two spot sets
    pub fn link_pair(
        &self,
        sources: &[Spot],
        targets: &[Spot],
    ) -> Result<Vec<Link>, TrackingError> {
        if sources.is_empty() || targets.is_empty() {
            return Ok(Vec::new());
        }

        let problem = CostMatrixBuilder::new(
            self.cost_function,
            LinkKind::FrameToFrame,
            self.config.max_linking_distance,
            self.config.linking_alternative,
        )
        .build(sources, targets)?;

        let assignment = self.solver.solve(&problem)?;
        Ok(assignment
            .pairs()
            .filter_map(|(i, j)| {
                let cost = problem.matrix.get(i, j)?;
                Some(Link::new(sources[i].id, targets[j].id, cost, LinkKind::FrameToFrame))
            })
            .collect())
    }
}
