//! Observability for tracking runs.
//!
//! This module provides the [`StepReporter`] trait for debugging and research
//! instrumentation. Reporters receive callbacks at key points of a run
//! without touching the linking logic.
//!
//! # Zero-Cost Abstraction
//!
//! The default [`NoOpReporter`] compiles to zero overhead - all callback
//! methods are empty and will be optimized away by the compiler.
//!
//! # Example
//!
//! ```
//! use sparse_lap_tracker::{
//!     AbortToken, DebugReporter, SparseLapTracker, Spot, SpotCollection, TrackingConfig,
//! };
//!
//! let spots = SpotCollection::from_spots(vec![
//!     Spot::new_2d(0, 0, 0.0, 0.0),
//!     Spot::new_2d(1, 1, 1.0, 0.0),
//! ]);
//! let tracker = SparseLapTracker::new(TrackingConfig::default()).unwrap();
//! let mut reporter = DebugReporter::new();
//!
//! tracker
//!     .track_with_reporter(&spots, &AbortToken::new(), &mut reporter)
//!     .unwrap();
//!
//! assert_eq!(reporter.frame_pair_events().len(), 1);
//! assert_eq!(reporter.graph_events(), &[1]);
//! ```

use crate::graph::TrackGraph;
use crate::tracking::{FramePairLinks, Segment, SegmentProblem};
use crate::types::{Link, LinkCounts};

// ============================================================================
// StepReporter Trait
// ============================================================================

/// Observability trait for tracking runs.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
///
/// # Thread Safety
///
/// Callbacks are issued from the calling thread after each stage completes,
/// never from inside a parallel section, so reporters need not be `Send`.
pub trait StepReporter {
    /// Called once per linked frame pair, in frame order.
    fn on_frame_pair(&mut self, _pair: &FramePairLinks) {}

    /// Called after all frame-to-frame links are known.
    fn on_frame_linking_complete(&mut self, _links: &[Link]) {}

    /// Called after the frame-to-frame links are split into segments.
    fn on_segments(&mut self, _segments: &[Segment<'_>]) {}

    /// Called after the global segment problem is built, before it is solved.
    fn on_segment_problem(&mut self, _problem: &SegmentProblem<'_>) {}

    /// Called with the gap-closing, splitting and merging links accepted.
    fn on_segment_linking_complete(&mut self, _links: &[Link]) {}

    /// Called once the track graph is assembled.
    fn on_graph_assembled(&mut self, _graph: &TrackGraph) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl StepReporter for NoOpReporter {
    // All methods use default empty implementations
}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures events for post-hoc analysis.
///
/// Link sets are cloned; segments and problems are reduced to their sizes
/// since they borrow from the run.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// Captured frame pairs
    frame_pairs: Vec<FramePairLinks>,

    /// Captured frame-to-frame link sets
    frame_links: Vec<Vec<Link>>,

    /// Segment lengths per run
    segment_lengths: Vec<Vec<usize>>,

    /// `(rows, cols, candidates)` of each segment problem
    segment_problems: Vec<(usize, usize, usize)>,

    /// Captured segment-stage link sets
    segment_links: Vec<Vec<Link>>,

    /// Number of tracks of each assembled graph
    graphs: Vec<usize>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.frame_pairs.clear();
        self.frame_links.clear();
        self.segment_lengths.clear();
        self.segment_problems.clear();
        self.segment_links.clear();
        self.graphs.clear();
    }

    pub fn frame_pair_events(&self) -> &[FramePairLinks] {
        &self.frame_pairs
    }

    pub fn frame_linking_events(&self) -> &[Vec<Link>] {
        &self.frame_links
    }

    pub fn segment_events(&self) -> &[Vec<usize>] {
        &self.segment_lengths
    }

    pub fn segment_problem_events(&self) -> &[(usize, usize, usize)] {
        &self.segment_problems
    }

    pub fn segment_linking_events(&self) -> &[Vec<Link>] {
        &self.segment_links
    }

    /// Track counts of assembled graphs
    pub fn graph_events(&self) -> &[usize] {
        &self.graphs
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.frame_pairs.len()
            + self.frame_links.len()
            + self.segment_lengths.len()
            + self.segment_problems.len()
            + self.segment_links.len()
            + self.graphs.len()
    }
}

impl StepReporter for DebugReporter {
    fn on_frame_pair(&mut self, pair: &FramePairLinks) {
        self.frame_pairs.push(pair.clone());
    }

    fn on_frame_linking_complete(&mut self, links: &[Link]) {
        self.frame_links.push(links.to_vec());
    }

    fn on_segments(&mut self, segments: &[Segment<'_>]) {
        self.segment_lengths
            .push(segments.iter().map(Segment::len).collect());
    }

    fn on_segment_problem(&mut self, problem: &SegmentProblem<'_>) {
        self.segment_problems
            .push((problem.num_rows(), problem.num_cols(), problem.num_candidates()));
    }

    fn on_segment_linking_complete(&mut self, links: &[Link]) {
        self.segment_links.push(links.to_vec());
    }

    fn on_graph_assembled(&mut self, graph: &TrackGraph) {
        self.graphs.push(graph.num_tracks());
    }
}

// ============================================================================
// LogReporter
// ============================================================================

/// Reporter that forwards events to the `log` crate and keeps the messages.
///
/// # Log Levels
///
/// - `on_frame_linking_complete`, `on_segment_linking_complete`,
///   `on_graph_assembled`: INFO
/// - `on_segments`, `on_segment_problem`: DEBUG
/// - `on_frame_pair`: TRACE (not recorded)
#[derive(Debug, Clone, Default)]
pub struct LogReporter {
    messages: Vec<String>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Take the recorded messages, leaving the reporter empty
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    fn info(&mut self, message: String) {
        log::info!("{}", message);
        self.messages.push(message);
    }

    fn debug(&mut self, message: String) {
        log::debug!("{}", message);
        self.messages.push(message);
    }
}

fn describe_counts(counts: &LinkCounts) -> String {
    format!(
        "{} gap-closing, {} splitting, {} merging",
        counts.gap_closing, counts.splitting, counts.merging
    )
}

impl StepReporter for LogReporter {
    fn on_frame_pair(&mut self, pair: &FramePairLinks) {
        log::trace!(
            "Frame {} -> {}: {} links",
            pair.source_frame,
            pair.source_frame + 1,
            pair.links.len()
        );
    }

    fn on_frame_linking_complete(&mut self, links: &[Link]) {
        self.info(format!("Frame-to-frame linking: {} links", links.len()));
    }

    fn on_segments(&mut self, segments: &[Segment<'_>]) {
        self.debug(format!("Built {} segments", segments.len()));
    }

    fn on_segment_problem(&mut self, problem: &SegmentProblem<'_>) {
        self.debug(format!(
            "Segment problem: {} x {} with {} candidates",
            problem.num_rows(),
            problem.num_cols(),
            problem.num_candidates()
        ));
    }

    fn on_segment_linking_complete(&mut self, links: &[Link]) {
        let counts = LinkCounts::from_links(links);
        self.info(format!("Segment linking: {}", describe_counts(&counts)));
    }

    fn on_graph_assembled(&mut self, graph: &TrackGraph) {
        self.info(format!(
            "Assembled {} tracks from {} spots and {} links",
            graph.num_tracks(),
            graph.num_spots(),
            graph.num_edges()
        ));
    }
}
