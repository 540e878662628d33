//! Track segments: maximal non-branching chains of frame-to-frame links.
//!
//! Frame-to-frame linking gives every spot at most one predecessor and one
//! successor, so the links decompose the spot set into disjoint chains. A
//! spot with no frame-to-frame link is a segment of its own.

use std::collections::{HashMap, HashSet};

use crate::types::{Link, LinkKind, Spot, SpotCollection, SpotId};

/// Spots of one segment, in frame order
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    spots: Vec<&'a Spot>,
}

impl<'a> Segment<'a> {
    /// First spot
    #[inline]
    pub fn start(&self) -> &'a Spot {
        self.spots[0]
    }

    /// Last spot
    #[inline]
    pub fn end(&self) -> &'a Spot {
        self.spots[self.spots.len() - 1]
    }

    #[inline]
    pub fn spots(&self) -> &[&'a Spot] {
        &self.spots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Spots that already have a successor; candidate sources of a split
    pub fn split_sources(&self) -> &[&'a Spot] {
        &self.spots[..self.spots.len() - 1]
    }

    /// Spots that already have a predecessor; candidate targets of a merge
    pub fn merge_targets(&self) -> &[&'a Spot] {
        &self.spots[1..]
    }
}

/// Decompose the spots into segments along their frame-to-frame links.
///
/// Links of other kinds are ignored. Segments are ordered by
/// `(start frame, start id)`.
pub fn build_segments<'a>(spots: &'a SpotCollection, links: &[Link]) -> Vec<Segment<'a>> {
    let mut successor: HashMap<SpotId, SpotId> = HashMap::new();
    let mut has_predecessor: HashSet<SpotId> = HashSet::new();
    for link in links.iter().filter(|l| l.kind == LinkKind::FrameToFrame) {
        successor.insert(link.source, link.target);
        has_predecessor.insert(link.target);
    }

    let by_id: HashMap<SpotId, &Spot> = spots.iter().map(|s| (s.id, s)).collect();

    let mut starts: Vec<&Spot> = spots
        .iter()
        .filter(|s| !has_predecessor.contains(&s.id))
        .collect();
    starts.sort_by_key(|s| (s.frame, s.id));

    starts
        .into_iter()
        .map(|start| {
            let mut chain = vec![start];
            let mut current = start.id;
            while let Some(next) = successor.get(&current).and_then(|id| by_id.get(id)) {
                chain.push(*next);
                current = next.id;
            }
            Segment { spots: chain }
        })
        .collect()
}
