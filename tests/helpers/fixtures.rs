//! Spot fixtures
//!
//! Scenario fixtures are small hand-built spot sets with a known answer.
//! Random fixtures simulate particles drifting in 2D with detection dropouts
//! and are seeded so every run sees the same data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sparse_lap_tracker::{
    AbortToken, SparseLapTracker, Spot, SpotCollection, TrackGraph, TrackingConfig,
};

//=============================================================================
// Scenarios
//=============================================================================

/// Two spots at frame 0, three at frame 1; one target is far from everything
pub fn two_frame_scenario() -> SpotCollection {
    SpotCollection::from_spots(vec![
        Spot::new_2d(0, 0, 0.0, 0.0),
        Spot::new_2d(1, 0, 10.0, 10.0),
        Spot::new_2d(2, 1, 1.0, 1.0),
        Spot::new_2d(3, 1, 11.0, 11.0),
        Spot::new_2d(4, 1, 50.0, 50.0),
    ])
}

/// Segment 0 -> 1 ends at frame 3, segment 2 -> 3 starts at frame 6
pub fn gap_scenario() -> SpotCollection {
    SpotCollection::from_spots(vec![
        Spot::new_2d(0, 2, 0.0, 0.0),
        Spot::new_2d(1, 3, 1.0, 0.0),
        Spot::new_2d(2, 6, 2.0, 0.0),
        Spot::new_2d(3, 7, 3.0, 0.0),
    ])
}

/// Track 0 -> 1 -> 2 along y = 0, plus spot 3 at frame 0 that can only
/// join the track by merging into spot 1
pub fn merge_scenario() -> SpotCollection {
    SpotCollection::from_spots(vec![
        Spot::new_2d(0, 0, 0.0, 0.0),
        Spot::new_2d(1, 1, 1.0, 0.0),
        Spot::new_2d(2, 2, 2.0, 0.0),
        Spot::new_2d(3, 0, 1.0, 2.0),
    ])
}

/// Track 0 -> 1 -> 2 along y = 0, plus spot 3 at frame 2 that can only
/// join the track by splitting off spot 1
pub fn split_scenario() -> SpotCollection {
    SpotCollection::from_spots(vec![
        Spot::new_2d(0, 0, 0.0, 0.0),
        Spot::new_2d(1, 1, 1.0, 0.0),
        Spot::new_2d(2, 2, 2.0, 0.0),
        Spot::new_2d(3, 2, 1.0, 2.0),
    ])
}

//=============================================================================
// Random spot sets
//=============================================================================

/// Parameters of a simulated particle set
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    pub num_particles: usize,
    pub num_frames: usize,
    /// Side of the square field of view
    pub extent: f64,
    /// Largest per-axis displacement between frames
    pub step: f64,
    /// Probability that a particle is not detected in a frame
    pub dropout: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_particles: 20,
            num_frames: 15,
            extent: 200.0,
            step: 2.0,
            dropout: 0.1,
        }
    }
}

/// Random-walk particles with detection dropouts
pub fn random_spots(seed: u64, params: SimulationParams) -> SpotCollection {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<(f64, f64)> = (0..params.num_particles)
        .map(|_| {
            (
                rng.gen_range(0.0..params.extent),
                rng.gen_range(0.0..params.extent),
            )
        })
        .collect();

    let mut spots = SpotCollection::new();
    let mut next_id = 0u64;
    for frame in 0..params.num_frames {
        for (x, y) in positions.iter_mut() {
            *x += rng.gen_range(-params.step..=params.step);
            *y += rng.gen_range(-params.step..=params.step);
            if rng.gen_bool(params.dropout) {
                continue;
            }
            let intensity = rng.gen_range(50.0..150.0);
            spots.add(Spot::new_2d(next_id, frame, *x, *y).with_feature("intensity", intensity));
            next_id += 1;
        }
    }
    spots
}

/// Config with every link category enabled
pub fn permissive_config() -> TrackingConfig {
    TrackingConfig::builder()
        .max_linking_distance(6.0)
        .max_gap_closing_distance(8.0)
        .max_frame_gap(3)
        .allow_splitting(true)
        .allow_merging(true)
        .build()
        .expect("valid config")
}

/// Run a tracker to completion
pub fn run_tracker(config: TrackingConfig, spots: &SpotCollection) -> TrackGraph {
    SparseLapTracker::new(config)
        .expect("valid config")
        .track(spots, &AbortToken::new())
        .expect("tracking succeeds")
}
