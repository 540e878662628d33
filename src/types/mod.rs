//! Core types for the tracking library
//!
//! # Types
//!
//! - [`Spot`] / [`SpotCollection`] - Detections, grouped by frame
//! - [`Link`] / [`LinkKind`] - Accepted correspondences between spots
//! - [`TrackingConfig`] - Immutable parameters of one run

pub mod config;
pub mod link;
pub mod spot;

pub use config::{
    AlternativeCostPolicy, FeaturePenalties, PenaltyForm, TrackingConfig, TrackingConfigBuilder,
    DEFAULT_ALTERNATIVE_COST_FACTOR, DEFAULT_CUTOFF_PERCENTILE,
};
pub use link::{Link, LinkCounts, LinkKind};
pub use spot::{Spot, SpotCollection, SpotId};
