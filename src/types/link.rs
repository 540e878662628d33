//! Accepted links between spots

use serde::{Deserialize, Serialize};

use super::SpotId;

/// How a link was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LinkKind {
    /// Consecutive-frame link from the frame-to-frame stage
    FrameToFrame,
    /// Bridge over one or more frames without detection
    GapClosing,
    /// Second outgoing link of a dividing object
    Splitting,
    /// Second incoming link of a fusing object
    Merging,
}

impl LinkKind {
    /// Short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::FrameToFrame => "frame-to-frame",
            LinkKind::GapClosing => "gap-closing",
            LinkKind::Splitting => "splitting",
            LinkKind::Merging => "merging",
        }
    }
}

/// A directed link, always pointing forward in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub source: SpotId,
    pub target: SpotId,
    pub cost: f64,
    pub kind: LinkKind,
}

impl Link {
    pub fn new(source: SpotId, target: SpotId, cost: f64, kind: LinkKind) -> Self {
        Self {
            source,
            target,
            cost,
            kind,
        }
    }
}

/// Per-kind link counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkCounts {
    pub frame_to_frame: usize,
    pub gap_closing: usize,
    pub splitting: usize,
    pub merging: usize,
}

impl LinkCounts {
    /// Count links by kind
    pub fn from_links(links: &[Link]) -> Self {
        let mut counts = Self::default();
        for link in links {
            match link.kind {
                LinkKind::FrameToFrame => counts.frame_to_frame += 1,
                LinkKind::GapClosing => counts.gap_closing += 1,
                LinkKind::Splitting => counts.splitting += 1,
                LinkKind::Merging => counts.merging += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.frame_to_frame + self.gap_closing + self.splitting + self.merging
    }
}
