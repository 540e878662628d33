//! The full tracking run: frame-to-frame linking, segment linking, assembly

use std::sync::Arc;

use crate::assignment::{AssignmentSolver, JonkerVolgenant};
use crate::association::{CostFunction, FeaturePenaltyCost};
use crate::errors::TrackingError;
use crate::graph::TrackGraph;
use crate::reporter::{NoOpReporter, StepReporter};
use crate::types::{Link, LinkCounts, SpotCollection, TrackingConfig};

use super::frame_to_frame::FrameLinker;
use super::gap_closing::SegmentLinker;
use super::segments::build_segments;
use super::AbortToken;

/// Two-stage sparse LAP tracker
///
/// Holds a validated configuration plus the cost function and solver used
/// by both stages. A tracker is immutable and can run any number of times.
#[derive(Clone)]
pub struct SparseLapTracker {
    config: TrackingConfig,
    cost_function: Arc<dyn CostFunction>,
    solver: Arc<dyn AssignmentSolver>,
}

impl std::fmt::Debug for SparseLapTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseLapTracker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SparseLapTracker {
    /// Create a tracker with the feature-penalty cost and the Jonker-Volgenant solver.
    pub fn new(config: TrackingConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        let cost_function = Arc::new(FeaturePenaltyCost::from_config(&config));
        Ok(Self {
            config,
            cost_function,
            solver: Arc::new(JonkerVolgenant),
        })
    }

    /// Replace the link cost function
    pub fn with_cost_function(mut self, cost_function: Arc<dyn CostFunction>) -> Self {
        self.cost_function = cost_function;
        self
    }

    /// Replace the assignment solver
    pub fn with_solver(mut self, solver: Arc<dyn AssignmentSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Run both linking stages and return every accepted link.
    ///
    /// Frame-to-frame links come first in frame order, followed by the
    /// segment-stage links.
    pub fn link(
        &self,
        spots: &SpotCollection,
        abort: &AbortToken,
    ) -> Result<Vec<Link>, TrackingError> {
        self.link_with_reporter(spots, abort, &mut NoOpReporter)
    }

    /// Run the full pipeline and assemble the track graph
    pub fn track(
        &self,
        spots: &SpotCollection,
        abort: &AbortToken,
    ) -> Result<TrackGraph, TrackingError> {
        self.track_with_reporter(spots, abort, &mut NoOpReporter)
    }

    /// [`track`](Self::track) with instrumentation callbacks.
    ///
    /// The abort token is checked between frame pairs, before the segment
    /// solve and before assembly. On abort or failure nothing is returned
    /// but the error.
    pub fn track_with_reporter(
        &self,
        spots: &SpotCollection,
        abort: &AbortToken,
        reporter: &mut dyn StepReporter,
    ) -> Result<TrackGraph, TrackingError> {
        let links = self.link_with_reporter(spots, abort, reporter)?;
        abort.check()?;

        let graph = TrackGraph::assemble(spots, &links)?;
        log::info!(
            "Tracking complete: {} tracks, {} links",
            graph.num_tracks(),
            graph.num_edges()
        );
        reporter.on_graph_assembled(&graph);
        Ok(graph)
    }

    fn link_with_reporter(
        &self,
        spots: &SpotCollection,
        abort: &AbortToken,
        reporter: &mut dyn StepReporter,
    ) -> Result<Vec<Link>, TrackingError> {
        spots.validate()?;
        match spots.frame_range() {
            Some((first, last)) => log::info!(
                "Tracking {} spots over {} frames ({}..={})",
                spots.num_spots(),
                spots.num_frames(),
                first,
                last
            ),
            None => log::info!("Tracking an empty spot collection"),
        }

        // Stage 1: frame-to-frame
        let frame_linker =
            FrameLinker::new(&self.config, self.cost_function.as_ref(), self.solver.as_ref());
        let pairs = frame_linker.link_frame_pairs(spots, abort)?;
        for pair in &pairs {
            reporter.on_frame_pair(pair);
        }
        let mut links: Vec<Link> = pairs.into_iter().flat_map(|p| p.links).collect();
        log::debug!("Frame-to-frame linking accepted {} links", links.len());
        reporter.on_frame_linking_complete(&links);

        // Stage 2: gap closing, splitting, merging
        if !self.config.segment_stage_enabled() {
            reporter.on_segment_linking_complete(&[]);
            return Ok(links);
        }

        let segments = build_segments(spots, &links);
        reporter.on_segments(&segments);

        let segment_linker =
            SegmentLinker::new(&self.config, self.cost_function.as_ref(), self.solver.as_ref());
        let problem = segment_linker.build_problem(&segments)?;
        reporter.on_segment_problem(&problem);
        abort.check()?;

        let segment_links = segment_linker.solve(&problem)?;
        let counts = LinkCounts::from_links(&segment_links);
        log::debug!(
            "Segment linking accepted {} gap-closing, {} splitting, {} merging links",
            counts.gap_closing,
            counts.splitting,
            counts.merging
        );
        reporter.on_segment_linking_complete(&segment_links);

        links.extend(segment_links);
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::SquareDistanceCost;
    use crate::reporter::DebugReporter;
    use crate::types::{LinkKind, Spot, SpotId};

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackingConfig {
            max_linking_distance: -1.0,
            ..TrackingConfig::default()
        };
        assert!(matches!(
            SparseLapTracker::new(config),
            Err(TrackingError::Configuration { .. })
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        let tracker = SparseLapTracker::new(TrackingConfig::default()).unwrap();
        let err = tracker.track(&SpotCollection::new(), &AbortToken::new()).unwrap_err();
        assert!(matches!(err, TrackingError::InvalidInput { .. }));
    }

    #[test]
    fn test_frame_links_then_gap_links() {
        let spots = SpotCollection::from_spots(vec![
            Spot::new_2d(0, 0, 0.0, 0.0),
            Spot::new_2d(1, 1, 1.0, 0.0),
            Spot::new_2d(2, 3, 2.0, 0.0),
            Spot::new_2d(3, 4, 3.0, 0.0),
        ]);
        let tracker = SparseLapTracker::new(TrackingConfig::default())
            .unwrap()
            .with_cost_function(Arc::new(SquareDistanceCost));

        let links = tracker.link(&spots, &AbortToken::new()).unwrap();
        let kinds: Vec<LinkKind> = links.iter().map(|l| l.kind).collect();

        assert_eq!(
            kinds,
            vec![LinkKind::FrameToFrame, LinkKind::FrameToFrame, LinkKind::GapClosing]
        );
        assert_eq!((links[2].source, links[2].target), (SpotId(1), SpotId(2)));
    }

    #[test]
    fn test_reporter_sees_every_stage() {
        let spots = SpotCollection::from_spots(vec![
            Spot::new_2d(0, 0, 0.0, 0.0),
            Spot::new_2d(1, 1, 1.0, 0.0),
            Spot::new_2d(2, 2, 2.0, 0.0),
        ]);
        let tracker = SparseLapTracker::new(TrackingConfig::default()).unwrap();
        let mut reporter = DebugReporter::new();

        let graph = tracker
            .track_with_reporter(&spots, &AbortToken::new(), &mut reporter)
            .unwrap();

        assert_eq!(graph.num_tracks(), 1);
        assert_eq!(reporter.frame_pair_events().len(), 2);
        assert_eq!(reporter.segment_events(), &[vec![3]]);
        assert_eq!(reporter.segment_problem_events().len(), 1);
        assert_eq!(reporter.graph_events(), &[1]);
    }

    #[test]
    fn test_abort_returns_cancelled() {
        let spots = SpotCollection::from_spots(vec![
            Spot::new_2d(0, 0, 0.0, 0.0),
            Spot::new_2d(1, 1, 1.0, 0.0),
        ]);
        let tracker = SparseLapTracker::new(TrackingConfig::default()).unwrap();
        let abort = AbortToken::new();
        abort.abort();

        let err = tracker.track(&spots, &abort).unwrap_err();
        assert!(err.is_cancelled());
    }
}
