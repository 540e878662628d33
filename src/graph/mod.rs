//! Track graph assembly and queries
//!
//! - [`TrackGraph`] - spot arena, links and connected-component tracks
//! - [`TrackStatistics`] - lazily computed per-track summaries
//! - [`TrackModel`] - last successful graph plus a run log

pub mod model;
pub mod statistics;
pub mod track_graph;

pub use model::TrackModel;
pub use statistics::TrackStatistics;
pub use track_graph::{TrackGraph, TrackId};
