//! The two-stage LAP tracking pipeline
//!
//! - [`frame_to_frame`] - Links spots of consecutive frames into segments
//! - [`segments`] - Derives non-branching segments from frame-to-frame links
//! - [`gap_closing`] - One joint solve for gap closing, splitting and merging
//! - [`tracker`] - Runs both stages and assembles the track graph

pub mod frame_to_frame;
pub mod gap_closing;
pub mod segments;
pub mod tracker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::TrackingError;

pub use frame_to_frame::{FrameLinker, FramePairLinks};
pub use gap_closing::{SegmentLinker, SegmentProblem};
pub use segments::{build_segments, Segment};
pub use tracker::SparseLapTracker;

/// Cooperative cancellation flag shared between the caller and a run
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortToken {
    flag: Arc<AtomicBool>,
}

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop at its next checkpoint
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once abort has been requested
    #[inline]
    pub fn check(&self) -> Result<(), TrackingError> {
        if self.is_aborted() {
            Err(TrackingError::Cancelled)
        } else {
            Ok(())
        }
    }
}
