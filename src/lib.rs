/*!
# sparse-lap-tracker - Particle tracking by sparse linear assignment

Links detections ("spots") across the frames of a time-lapse into tracks
by solving globally optimal linear assignment problems over sparse cost
matrices, in two stages.

## Features

- Frame-to-frame linking, one assignment problem per consecutive frame pair
- Gap closing, track splitting and track merging in one global solve over
  track segments
- Sparse Jonker-Volgenant solver with alternative ("no match") costs
- Feature penalties on link costs, per link category
- Cooperative cancellation and an arena-backed track graph

## Modules

- [`types`] - Spots, links and configuration
- [`association`] - Link costs and sparse cost-matrix construction
- [`assignment`] - Sparse linear assignment solvers
- [`tracking`] - The two linking stages and the tracker
- [`graph`] - Track graph, statistics and persistent model
- [`reporter`] - Instrumentation callbacks

## Example

```rust
use sparse_lap_tracker::{AbortToken, SparseLapTracker, Spot, SpotCollection, TrackingConfig};

let spots = SpotCollection::from_spots(vec![
    Spot::new_2d(0, 0, 0.0, 0.0),
    Spot::new_2d(1, 0, 10.0, 10.0),
    Spot::new_2d(2, 1, 1.0, 1.0),
    Spot::new_2d(3, 1, 11.0, 11.0),
    Spot::new_2d(4, 1, 50.0, 50.0),
]);

let config = TrackingConfig::builder()
    .max_linking_distance(5.0)
    .build()
    .unwrap();
let tracker = SparseLapTracker::new(config).unwrap();
let graph = tracker.track(&spots, &AbortToken::new()).unwrap();

assert_eq!(graph.num_tracks(), 2);
assert_eq!(graph.num_edges(), 2);
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Spots, links and configuration
pub mod types;

/// Error types
pub mod errors;

/// Link costs and sparse cost-matrix construction
pub mod association;

/// Sparse linear assignment solvers
pub mod assignment;

/// Frame-to-frame and segment linking
pub mod tracking;

/// Track graph assembly and queries
pub mod graph;

/// Instrumentation callbacks
pub mod reporter;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use types::{
    AlternativeCostPolicy, FeaturePenalties, Link, LinkCounts, LinkKind, PenaltyForm, Spot,
    SpotCollection, SpotId, TrackingConfig, TrackingConfigBuilder,
};

// Errors
pub use errors::{AssignmentError, TrackingError};

// Costs and matrices
pub use association::{
    CostFunction, CostMatrixBuilder, FeaturePenaltyCost, LapProblem, SparseCostMatrix,
    SquareDistanceCost,
};

// Solvers
pub use assignment::{Assignment, AssignmentSolver, JonkerVolgenant};

// Pipeline
pub use tracking::{AbortToken, FrameLinker, SegmentLinker, SparseLapTracker};

// Graph
pub use graph::{TrackGraph, TrackId, TrackModel, TrackStatistics};

// Reporters
pub use reporter::{DebugReporter, LogReporter, NoOpReporter, StepReporter};
