//! Per-track summary statistics

use serde::Serialize;

use crate::types::LinkKind;

use super::track_graph::{TrackGraph, TrackId};

/// Summary of one track's spots and links
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStatistics {
    pub num_spots: usize,
    pub num_links: usize,
    /// Number of gap-closing links
    pub num_gaps: usize,
    /// Largest frame span of a gap-closing link, 0 without gaps
    pub longest_gap: usize,
    /// Spots with more than one outgoing link
    pub num_splits: usize,
    /// Spots with more than one incoming link
    pub num_merges: usize,
    pub start_frame: usize,
    pub stop_frame: usize,
    /// `stop_frame - start_frame`
    pub duration: usize,
    /// Sum of link lengths
    pub total_distance: f64,
    pub mean_step: f64,
    pub max_step: f64,
    /// Distance between the first and the last spot
    pub displacement: f64,
}

impl TrackStatistics {
    pub(crate) fn compute(graph: &TrackGraph, id: TrackId) -> Self {
        let spots: Vec<_> = graph.track_spots(id).collect();

        let mut stats = TrackStatistics {
            num_spots: spots.len(),
            num_links: 0,
            num_gaps: 0,
            longest_gap: 0,
            num_splits: 0,
            num_merges: 0,
            start_frame: spots.first().map_or(0, |s| s.frame),
            stop_frame: spots.last().map_or(0, |s| s.frame),
            duration: 0,
            total_distance: 0.0,
            mean_step: 0.0,
            max_step: 0.0,
            displacement: 0.0,
        };
        stats.duration = stats.stop_frame - stats.start_frame;
        if let (Some(first), Some(last)) = (spots.first(), spots.last()) {
            stats.displacement = first.distance_to(last);
        }

        for spot in &spots {
            if graph.out_degree(spot.id) > 1 {
                stats.num_splits += 1;
            }
            if graph.in_degree(spot.id) > 1 {
                stats.num_merges += 1;
            }
        }

        for link in graph.track_edges(id) {
            let (Some(source), Some(target)) = (graph.spot(link.source), graph.spot(link.target))
            else {
                continue;
            };
            let step = source.distance_to(target);
            stats.num_links += 1;
            stats.total_distance += step;
            stats.max_step = stats.max_step.max(step);
            if link.kind == LinkKind::GapClosing {
                stats.num_gaps += 1;
                stats.longest_gap = stats.longest_gap.max(target.frame - source.frame);
            }
        }
        if stats.num_links > 0 {
            stats.mean_step = stats.total_distance / stats.num_links as f64;
        }

        stats
    }
}
