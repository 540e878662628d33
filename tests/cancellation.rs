//! Cooperative cancellation and persistent model state

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sparse_lap_tracker::tracking::SegmentProblem;
use sparse_lap_tracker::{
    AbortToken, AssignmentError, AssignmentSolver, Assignment, JonkerVolgenant, LapProblem,
    SparseLapTracker, StepReporter, TrackModel, TrackingError,
};

use helpers::fixtures::{gap_scenario, permissive_config, random_spots, SimulationParams};

/// Aborts the run as soon as the segment problem is reported
struct AbortOnSegmentProblem {
    token: AbortToken,
}

impl StepReporter for AbortOnSegmentProblem {
    fn on_segment_problem(&mut self, _problem: &SegmentProblem<'_>) {
        self.token.abort();
    }
}

/// Counts solver calls and delegates to Jonker-Volgenant
#[derive(Default)]
struct CountingSolver {
    calls: AtomicUsize,
}

impl AssignmentSolver for CountingSolver {
    fn solve(&self, problem: &LapProblem) -> Result<Assignment, AssignmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        JonkerVolgenant.solve(problem)
    }
}

#[test]
fn test_abort_before_start_is_cancelled() {
    let tracker = SparseLapTracker::new(permissive_config()).unwrap();
    let abort = AbortToken::new();
    abort.abort();

    let result = tracker.track(&random_spots(1, SimulationParams::default()), &abort);

    assert_eq!(result.unwrap_err(), TrackingError::Cancelled);
}

#[test]
fn test_abort_between_stages_skips_global_solve() {
    let solver = Arc::new(CountingSolver::default());
    let config = sparse_lap_tracker::TrackingConfig::builder()
        .max_frame_gap(3)
        .build()
        .unwrap();
    let tracker = SparseLapTracker::new(config)
        .unwrap()
        .with_solver(solver.clone());
    let abort = AbortToken::new();
    let mut reporter = AbortOnSegmentProblem { token: abort.clone() };

    let err = tracker
        .track_with_reporter(&gap_scenario(), &abort, &mut reporter)
        .unwrap_err();

    assert!(err.is_cancelled());
    // Two frame pairs were solved, the segment problem never was
    assert_eq!(solver.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_model_keeps_prior_graph_on_cancel() {
    let tracker = SparseLapTracker::new(permissive_config()).unwrap();
    let spots = random_spots(42, SimulationParams::default());
    let mut model = TrackModel::new();

    model.retrack(&tracker, &spots, &AbortToken::new()).unwrap();
    let prior_edges = model.graph().unwrap().edges().to_vec();
    let prior_tracks = model.graph().unwrap().num_tracks();
    let log_len = model.log().len();

    let abort = AbortToken::new();
    abort.abort();
    let other_spots = random_spots(7, SimulationParams::default());
    assert!(model.retrack(&tracker, &other_spots, &abort).unwrap_err().is_cancelled());

    let graph = model.graph().unwrap();
    assert_eq!(graph.edges(), prior_edges.as_slice());
    assert_eq!(graph.num_tracks(), prior_tracks);
    assert!(!model.last_run_succeeded());
    assert!(model.log().len() > log_len);
}

#[test]
fn test_model_keeps_prior_graph_on_invalid_input() {
    let tracker = SparseLapTracker::new(permissive_config()).unwrap();
    let mut model = TrackModel::new();
    model
        .retrack(&tracker, &random_spots(3, SimulationParams::default()), &AbortToken::new())
        .unwrap();

    let err = model
        .retrack(&tracker, &sparse_lap_tracker::SpotCollection::new(), &AbortToken::new())
        .unwrap_err();

    assert!(matches!(err, TrackingError::InvalidInput { .. }));
    assert!(model.graph().is_some());
    assert!(!model.last_run_succeeded());

    model
        .retrack(&tracker, &random_spots(3, SimulationParams::default()), &AbortToken::new())
        .unwrap();
    assert!(model.last_run_succeeded());
}
