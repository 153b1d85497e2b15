use serde::Serialize;

use crate::error::GraphError;
use crate::filter::Metric;
use crate::graph::{Edge, Graph, Interval};
use crate::id::ElementId;
use crate::path::{BoundaryMode, Step};

/// A window with a constant minimal hop count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HopSegment {
    pub window: Interval,
    pub hops: u32,
}

/// Piecewise-constant minimal hop count over time.
///
/// Segments are sorted, disjoint, and adjacent segments with the same hop
/// count are merged. Instants covered by no segment are unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HopProfile {
    segments: Vec<HopSegment>,
}

impl HopProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[HopSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Minimal hop count at instant `t`, if reachable.
    pub fn at(&self, t: i64) -> Option<u32> {
        self.segments
            .iter()
            .find(|s| s.window.from <= t && t < s.window.to)
            .map(|s| s.hops)
    }

    /// Record that `window` is reachable in `hops`, keeping the lower count
    /// wherever it overlaps an existing segment.
    pub fn insert_min(&mut self, window: Interval, hops: u32) {
        if window.from >= window.to {
            return;
        }

        let mut cuts: Vec<i64> = self
            .segments
            .iter()
            .flat_map(|s| [s.window.from, s.window.to])
            .chain([window.from, window.to])
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut merged: Vec<HopSegment> = Vec::with_capacity(cuts.len());
        for pair in cuts.windows(2) {
            let piece = Interval::new(pair[0], pair[1]);
            let existing = self.at(piece.from);
            let incoming = (window.from <= piece.from && piece.to <= window.to).then_some(hops);
            let best = match (existing, incoming) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => continue,
            };

            match merged.last_mut() {
                Some(last) if last.hops == best && last.window.to == piece.from => {
                    last.window.to = piece.to;
                }
                _ => merged.push(HopSegment { window: piece, hops: best }),
            }
        }
        self.segments = merged;
    }
}

struct Frame {
    candidates: Step,
    cursor: usize,
}

impl Frame {
    fn new(candidates: Vec<Edge>, window: Option<Interval>) -> Self {
        let mut candidates = Step::new(candidates);
        if let Some(w) = window {
            candidates.insert_boundaries(w.from, w.to, BoundaryMode::Inner);
        }
        Self { candidates, cursor: 0 }
    }

    fn next_edge(&mut self) -> Option<Edge> {
        let edge = self.candidates.edges().get(self.cursor).cloned();
        self.cursor += 1;
        edge
    }
}

fn check_endpoints(graph: &Graph, start: &ElementId, end: &ElementId) -> Result<(), GraphError> {
    for id in [start, end] {
        if graph.vertex(id).is_none() {
            return Err(GraphError::UnknownVertex(*id));
        }
    }
    if start == end {
        return Err(GraphError::SameEndpoints(*start));
    }
    Ok(())
}

/// Walk every simple path leaving `start` whose consecutive edges satisfy
/// `metric`, calling `on_arrival(window, hops)` each time `end` is reached.
///
/// `window` is the intersection of the path's edge intervals; `None` when
/// the edges share no common instant. A path stops at `end`. With
/// `shared_window`, a continuation must also overlap the window of the
/// whole path so far, not just the previous edge.
fn walk_paths<F>(
    graph: &Graph,
    start: &ElementId,
    end: &ElementId,
    metric: Metric,
    shared_window: bool,
    mut on_arrival: F,
) where
    F: FnMut(Option<Interval>, u32),
{
    let roots: Vec<Edge> = graph.out_edges(start).cloned().collect();
    let mut stack = vec![Frame::new(roots, None)];
    // visited[k] = vertex reached after k edges; parallel to stack
    let mut visited: Vec<ElementId> = vec![*start];

    while let Some(frame) = stack.last_mut() {
        let Some(edge) = frame.next_edge() else {
            stack.pop();
            visited.pop();
            continue;
        };
        if visited.contains(&edge.target) {
            continue;
        }

        let window = match frame.candidates.bounds() {
            Some(bounds) => bounds.intersect(&edge.validity),
            None => Some(edge.validity),
        };
        let hops = stack.len() as u32;

        if edge.target == *end {
            on_arrival(window, hops);
            continue;
        }
        if shared_window && window.is_none() {
            continue;
        }

        let next: Vec<Edge> = graph
            .edges()
            .iter()
            .filter(|e| {
                metric.admits(&edge, e)
                    && !visited.contains(&e.target)
                    && window.map_or(true, |w| !shared_window || e.validity.overlaps(&w))
            })
            .cloned()
            .collect();
        if next.is_empty() {
            continue;
        }

        visited.push(edge.target);
        stack.push(Frame::new(next, window.filter(|_| shared_window)));
    }
}

/// Temporal hop count from `start` to `end`.
///
/// Explores simple paths whose edges are all valid during a common window
/// (each continuation overlaps the window of the path so far) and records,
/// per instant, the fewest edges needed to get from `start` to `end`.
pub fn temporal_hop_count(
    graph: &Graph,
    start: &ElementId,
    end: &ElementId,
) -> Result<HopProfile, GraphError> {
    check_endpoints(graph, start, end)?;

    let mut profile = HopProfile::new();
    let mut paths = 0usize;
    walk_paths(graph, start, end, Metric::HopCount, true, |window, hops| {
        paths += 1;
        if let Some(w) = window {
            profile.insert_min(w, hops);
        }
    });

    tracing::debug!(
        start = %start,
        end = %end,
        paths,
        segments = profile.segments().len(),
        "temporal hop count computed"
    );
    Ok(profile)
}

/// Whether `end` is reachable from `start` along a chain of edges where
/// each edge starts strictly after the previous one ends.
pub fn temporally_connected(
    graph: &Graph,
    start: &ElementId,
    end: &ElementId,
) -> Result<bool, GraphError> {
    check_endpoints(graph, start, end)?;

    let mut reached = false;
    walk_paths(graph, start, end, Metric::TemporalConnectedness, false, |_, _| {
        reached = true;
    });
    Ok(reached)
}
