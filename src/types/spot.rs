//! Spot and spot collection types
//!
//! Spots are produced by an external detector and are read-only for the
//! whole tracking run. Links reference spots by [`SpotId`], never by pointer.

use std::collections::{BTreeMap, HashSet};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;

/// Unique spot identifier assigned by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpotId(pub u64);

impl std::fmt::Display for SpotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point-like detection in one frame
///
/// 2D data uses `z = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spot {
    /// Detector-assigned identifier
    pub id: SpotId,
    /// Frame index
    pub frame: usize,
    /// Spatial position
    pub position: Point3<f64>,
    /// Estimated object radius
    pub radius: f64,
    /// Scalar features by name (intensity, quality, ...)
    pub features: BTreeMap<String, f64>,
}

impl Spot {
    /// Create a 3D spot with unit radius and no features
    pub fn new(id: u64, frame: usize, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: SpotId(id),
            frame,
            position: Point3::new(x, y, z),
            radius: 1.0,
            features: BTreeMap::new(),
        }
    }

    /// Create a 2D spot (z = 0)
    pub fn new_2d(id: u64, frame: usize, x: f64, y: f64) -> Self {
        Self::new(id, frame, x, y, 0.0)
    }

    /// Set the radius
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Add or replace a feature value
    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    /// Look up a feature value
    #[inline]
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    /// Squared Euclidean distance to another spot
    #[inline]
    pub fn square_distance_to(&self, other: &Spot) -> f64 {
        nalgebra::distance_squared(&self.position, &other.position)
    }

    /// Euclidean distance to another spot
    #[inline]
    pub fn distance_to(&self, other: &Spot) -> f64 {
        self.square_distance_to(other).sqrt()
    }
}

/// Spots grouped by frame, ordered by frame index
#[derive(Debug, Clone, Default)]
pub struct SpotCollection {
    frames: BTreeMap<usize, Vec<Spot>>,
}

impl SpotCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from an iterator of spots
    pub fn from_spots(spots: impl IntoIterator<Item = Spot>) -> Self {
        let mut collection = Self::new();
        for spot in spots {
            collection.add(spot);
        }
        collection
    }

    /// Add a spot to its frame
    pub fn add(&mut self, spot: Spot) {
        self.frames.entry(spot.frame).or_default().push(spot);
    }

    /// Spots of one frame (empty if the frame has no detections)
    pub fn frame(&self, frame: usize) -> &[Spot] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(frame, spots)` in increasing frame order
    pub fn frames(&self) -> impl Iterator<Item = (usize, &[Spot])> + '_ {
        self.frames.iter().map(|(&t, spots)| (t, spots.as_slice()))
    }

    /// Iterate all spots in frame order
    pub fn iter(&self) -> impl Iterator<Item = &Spot> + '_ {
        self.frames.values().flatten()
    }

    /// Total number of spots
    pub fn num_spots(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    /// Number of frames holding at least one spot
    pub fn num_frames(&self) -> usize {
        self.frames.values().filter(|s| !s.is_empty()).count()
    }

    /// True if no frame holds any spot
    pub fn is_empty(&self) -> bool {
        self.num_spots() == 0
    }

    /// First and last frame index, if any
    pub fn frame_range(&self) -> Option<(usize, usize)> {
        let first = *self.frames.keys().next()?;
        let last = *self.frames.keys().next_back()?;
        Some((first, last))
    }

    /// Check the collection can be tracked.
    ///
    /// Rejects empty collections, duplicate ids, non-finite coordinates and
    /// invalid radii.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.is_empty() {
            return Err(TrackingError::invalid_input("spot collection is empty"));
        }

        let mut seen = HashSet::with_capacity(self.num_spots());
        for spot in self.iter() {
            if !seen.insert(spot.id) {
                return Err(TrackingError::invalid_input(format!(
                    "duplicate spot id {}",
                    spot.id
                )));
            }
            if !spot.position.iter().all(|c| c.is_finite()) {
                return Err(TrackingError::invalid_input(format!(
                    "spot {} in frame {} has non-finite coordinates",
                    spot.id, spot.frame
                )));
            }
            if !(spot.radius.is_finite() && spot.radius >= 0.0) {
                return Err(TrackingError::invalid_input(format!(
                    "spot {} has invalid radius {}",
                    spot.id, spot.radius
                )));
            }
        }
        Ok(())
    }
}
