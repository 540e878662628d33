//! Candidate gating and sparse cost-matrix construction
//!
//! This module provides:
//! - [`cost`] - Link cost functions (squared distance plus feature penalties)
//! - [`matrix`] - Sparse CSR cost matrix and the assignment problem wrapper
//! - [`builder`] - Gated matrix construction between two spot sequences

pub mod builder;
pub mod cost;
pub mod matrix;

pub use builder::{collect_rows, CostMatrixBuilder};
pub use cost::{CostFunction, FeaturePenaltyCost, SquareDistanceCost};
pub use matrix::{alternative_cost, LapProblem, SparseCostMatrix};
