//! Arena-backed track graph
//!
//! Spots are stored once in an arena sorted by `(frame, id)`; links refer to
//! arena indices through per-node incoming/outgoing adjacency lists. Tracks
//! are the connected components (ignoring direction) that contain at least
//! one link.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::TrackingError;
use crate::types::{Link, Spot, SpotCollection, SpotId};

use super::statistics::TrackStatistics;

/// Identifier of a track within one [`TrackGraph`]
///
/// Ids are dense, starting at 0, in the order of each track's earliest
/// (lowest frame, then lowest id) spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub usize);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track_{}", self.0)
    }
}

type Adjacency = SmallVec<[usize; 2]>;

#[derive(Debug, Clone)]
struct TrackEntry {
    /// Arena indices, in arena order
    nodes: Vec<usize>,
    /// Edge indices, in edge order
    edges: Vec<usize>,
    visible: bool,
}

/// The final spot/link graph partitioned into tracks
#[derive(Debug, Clone)]
pub struct TrackGraph {
    spots: Vec<Spot>,
    index: HashMap<SpotId, usize>,
    edges: Vec<Link>,
    /// `(source node, target node)` of every edge
    endpoints: Vec<(usize, usize)>,
    outgoing: Vec<Adjacency>,
    incoming: Vec<Adjacency>,
    node_track: Vec<Option<TrackId>>,
    tracks: Vec<TrackEntry>,
    statistics: Vec<OnceLock<TrackStatistics>>,
}

impl TrackGraph {
    /// Build the graph from the input spots and the accepted links.
    ///
    /// Every link must reference known spots and point forward in time.
    /// Edges are ordered by `(source frame, source id, target frame, target id)`.
    pub fn assemble(spots: &SpotCollection, links: &[Link]) -> Result<Self, TrackingError> {
        let mut arena: Vec<Spot> = spots.iter().cloned().collect();
        arena.sort_by_key(|s| (s.frame, s.id));

        let index: HashMap<SpotId, usize> =
            arena.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        if index.len() != arena.len() {
            return Err(TrackingError::invalid_input("duplicate spot ids"));
        }

        let node_of = |id: SpotId| {
            index
                .get(&id)
                .copied()
                .ok_or_else(|| {
                    TrackingError::invalid_input(format!("link references unknown spot {}", id))
                })
        };

        let mut resolved = Vec::with_capacity(links.len());
        for link in links {
            let source = node_of(link.source)?;
            let target = node_of(link.target)?;
            if arena[target].frame <= arena[source].frame {
                return Err(TrackingError::invalid_input(format!(
                    "{} link {} -> {} does not point forward in time",
                    link.kind.as_str(),
                    link.source,
                    link.target
                )));
            }
            resolved.push((source, target, *link));
        }
        // Arena order is (frame, id), so node indices sort the same way
        resolved.sort_by_key(|&(s, t, _)| (s, t));

        let n = arena.len();
        let mut outgoing = vec![Adjacency::new(); n];
        let mut incoming = vec![Adjacency::new(); n];
        let mut union_find = UnionFind::<usize>::new(n);
        let mut edges = Vec::with_capacity(resolved.len());
        let mut endpoints = Vec::with_capacity(resolved.len());

        for (e, (source, target, link)) in resolved.into_iter().enumerate() {
            outgoing[source].push(e);
            incoming[target].push(e);
            union_find.union(source, target);
            edges.push(link);
            endpoints.push((source, target));
        }

        // Assign track ids in arena order of each component's first node
        let mut root_track: HashMap<usize, TrackId> = HashMap::new();
        let mut node_track = vec![None; n];
        let mut tracks: Vec<TrackEntry> = Vec::new();
        for node in 0..n {
            if outgoing[node].is_empty() && incoming[node].is_empty() {
                continue;
            }
            let root = union_find.find_mut(node);
            let id = *root_track.entry(root).or_insert_with(|| {
                tracks.push(TrackEntry {
                    nodes: Vec::new(),
                    edges: Vec::new(),
                    visible: true,
                });
                TrackId(tracks.len() - 1)
            });
            tracks[id.0].nodes.push(node);
            node_track[node] = Some(id);
        }
        for (e, &(source, _)) in endpoints.iter().enumerate() {
            if let Some(id) = node_track[source] {
                tracks[id.0].edges.push(e);
            }
        }

        log::debug!(
            "Assembled track graph: {} spots, {} links, {} tracks",
            n,
            edges.len(),
            tracks.len()
        );

        let statistics = (0..tracks.len()).map(|_| OnceLock::new()).collect();
        Ok(Self {
            spots: arena,
            index,
            edges,
            endpoints,
            outgoing,
            incoming,
            node_track,
            tracks,
            statistics,
        })
    }

    // ========================================================================
    // Spots and links
    // ========================================================================

    pub fn num_spots(&self) -> usize {
        self.spots.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All spots in `(frame, id)` order
    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn spot(&self, id: SpotId) -> Option<&Spot> {
        self.index.get(&id).map(|&i| &self.spots[i])
    }

    /// All links
    pub fn edges(&self) -> &[Link] {
        &self.edges
    }

    /// Links leaving `id`; empty for unknown spots
    pub fn outgoing(&self, id: SpotId) -> impl Iterator<Item = &Link> + '_ {
        self.adjacent(&self.outgoing, id)
    }

    /// Links entering `id`; empty for unknown spots
    pub fn incoming(&self, id: SpotId) -> impl Iterator<Item = &Link> + '_ {
        self.adjacent(&self.incoming, id)
    }

    fn adjacent<'g>(
        &'g self,
        adjacency: &'g [Adjacency],
        id: SpotId,
    ) -> impl Iterator<Item = &'g Link> + 'g {
        self.index
            .get(&id)
            .into_iter()
            .flat_map(move |&node| adjacency[node].iter().map(move |&e| &self.edges[e]))
    }

    pub fn out_degree(&self, id: SpotId) -> usize {
        self.index.get(&id).map_or(0, |&node| self.outgoing[node].len())
    }

    pub fn in_degree(&self, id: SpotId) -> usize {
        self.index.get(&id).map_or(0, |&node| self.incoming[node].len())
    }

    /// Frame span of every edge, paired with the edge
    pub fn edge_spans(&self) -> impl Iterator<Item = (&Link, usize)> + '_ {
        self.edges
            .iter()
            .zip(&self.endpoints)
            .map(move |(link, &(s, t))| (link, self.spots[t].frame - self.spots[s].frame))
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn track_ids(&self) -> impl Iterator<Item = TrackId> {
        (0..self.tracks.len()).map(TrackId)
    }

    /// Track containing `id`, `None` for unknown or unlinked spots
    pub fn track_of(&self, id: SpotId) -> Option<TrackId> {
        self.index.get(&id).and_then(|&node| self.node_track[node])
    }

    /// Spots of a track in `(frame, id)` order; empty for unknown tracks
    pub fn track_spots(&self, id: TrackId) -> impl Iterator<Item = &Spot> + '_ {
        self.tracks
            .get(id.0)
            .into_iter()
            .flat_map(move |t| t.nodes.iter().map(move |&n| &self.spots[n]))
    }

    /// Links of a track in edge order; empty for unknown tracks
    pub fn track_edges(&self, id: TrackId) -> impl Iterator<Item = &Link> + '_ {
        self.tracks
            .get(id.0)
            .into_iter()
            .flat_map(move |t| t.edges.iter().map(move |&e| &self.edges[e]))
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    /// Show or hide a track. Links are untouched. Returns false for unknown ids.
    pub fn set_track_visible(&mut self, id: TrackId, visible: bool) -> bool {
        match self.tracks.get_mut(id.0) {
            Some(track) => {
                track.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn is_track_visible(&self, id: TrackId) -> bool {
        self.tracks.get(id.0).is_some_and(|t| t.visible)
    }

    pub fn visible_track_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.track_ids().filter(move |&id| self.is_track_visible(id))
    }

    /// Set every track's visibility from `predicate`; returns the number visible
    pub fn filter_tracks<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(TrackId, &TrackStatistics) -> bool,
    {
        let decisions: Vec<bool> = self
            .track_ids()
            .map(|id| self.statistics(id).is_some_and(|stats| predicate(id, stats)))
            .collect();
        for (track, visible) in self.tracks.iter_mut().zip(&decisions) {
            track.visible = *visible;
        }
        decisions.iter().filter(|&&v| v).count()
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Statistics of a track, computed on first access
    pub fn statistics(&self, id: TrackId) -> Option<&TrackStatistics> {
        let cell = self.statistics.get(id.0)?;
        Some(cell.get_or_init(|| TrackStatistics::compute(self, id)))
    }

    /// Drop all cached statistics
    pub fn invalidate_statistics(&mut self) {
        for cell in &mut self.statistics {
            cell.take();
        }
    }
}
