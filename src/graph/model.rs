//! Persistent tracking state across runs

use crate::errors::TrackingError;
use crate::reporter::LogReporter;
use crate::tracking::{AbortToken, SparseLapTracker};
use crate::types::SpotCollection;

use super::TrackGraph;

/// Holds the graph of the last successful run and a log of every run.
///
/// A failed or cancelled run leaves the previous graph in place.
#[derive(Debug, Clone, Default)]
pub struct TrackModel {
    graph: Option<TrackGraph>,
    log: Vec<String>,
    last_run_succeeded: bool,
}

impl TrackModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of the last successful run
    pub fn graph(&self) -> Option<&TrackGraph> {
        self.graph.as_ref()
    }

    /// Mutable access for visibility changes
    pub fn graph_mut(&mut self) -> Option<&mut TrackGraph> {
        self.graph.as_mut()
    }

    /// Messages accumulated over all runs
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn last_run_succeeded(&self) -> bool {
        self.last_run_succeeded
    }

    /// Run `tracker` on `spots` and replace the graph on success
    pub fn retrack(
        &mut self,
        tracker: &SparseLapTracker,
        spots: &SpotCollection,
        abort: &AbortToken,
    ) -> Result<&TrackGraph, TrackingError> {
        let mut reporter = LogReporter::new();
        let result = tracker.track_with_reporter(spots, abort, &mut reporter);
        self.log.extend(reporter.take_messages());

        match result {
            Ok(graph) => {
                self.last_run_succeeded = true;
                Ok(&*self.graph.insert(graph))
            }
            Err(e) => {
                self.last_run_succeeded = false;
                log::warn!("Tracking run did not complete: {}", e);
                self.log.push(e.to_string());
                Err(e)
            }
        }
    }
}
