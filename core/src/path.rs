use serde::Serialize;

use crate::error::GraphError;
use crate::filter::{root_candidates, sort_edges, successors, Metric, SortKey};
use crate::graph::{Edge, Graph, Interval};
use crate::id::ElementId;

/// How new bounds combine with a step's existing `from`/`to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Tighten: `from = max`, `to = min`.
    Inner,
    /// Widen: `from = min`, `to = max`.
    Outer,
}

/// One stage of the path: filtered + sorted candidates, the chosen index,
/// and optional aggregated bounds.
///
/// Candidates are fixed at creation; only the selection and bounds change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    edges: Vec<Edge>,
    selected: Option<usize>,
    from: Option<i64>,
    to: Option<i64>,
}

impl Step {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self {
            edges,
            selected: None,
            from: None,
            to: None,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_edge(&self) -> Option<&Edge> {
        self.selected.and_then(|i| self.edges.get(i))
    }

    pub fn from(&self) -> Option<i64> {
        self.from
    }

    pub fn to(&self) -> Option<i64> {
        self.to
    }

    /// Aggregated bounds, once both ends have been recorded.
    pub fn bounds(&self) -> Option<Interval> {
        Some(Interval::new(self.from?, self.to?))
    }

    /// Mark the candidate with `id` as selected. An ID not in this step
    /// leaves the step unselected.
    pub fn select(&mut self, id: &ElementId) {
        self.selected = self.edges.iter().position(|e| e.id == *id);
        if self.selected.is_none() {
            tracing::warn!(edge = %id, "selected edge is not a candidate of this step");
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn insert_boundaries(&mut self, from: i64, to: i64, mode: BoundaryMode) {
        let (pick_from, pick_to): (fn(i64, i64) -> i64, fn(i64, i64) -> i64) = match mode {
            BoundaryMode::Inner => (i64::max, i64::min),
            BoundaryMode::Outer => (i64::min, i64::max),
        };
        self.from = Some(self.from.map_or(from, |f| pick_from(f, from)));
        self.to = Some(self.to.map_or(to, |t| pick_to(t, to)));
    }
}

/// Interactive path state machine over one graph.
///
/// Always holds at least one step. Step 0 is the (optionally filtered) root
/// candidate list; every later step holds the successors of the edge
/// selected in the step before it.
#[derive(Debug, Clone)]
pub struct PathBuilder<'g> {
    graph: &'g Graph,
    steps: Vec<Step>,
}

impl<'g> PathBuilder<'g> {
    /// Start with a single unselected step holding every edge in graph order.
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            steps: vec![Step::new(graph.edges().to_vec())],
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true; a path always has a root step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> &Step {
        // steps is never empty
        &self.steps[self.steps.len() - 1]
    }

    /// Rebuild the root step and drop all deeper progress.
    pub fn set_filters(&mut self, vertex_filter: Option<&ElementId>, sort_key: SortKey) {
        let edges = root_candidates(self.graph, vertex_filter, sort_key);
        tracing::debug!(
            vertex = ?vertex_filter.map(ToString::to_string),
            sort = %sort_key,
            candidates = edges.len(),
            "path reset"
        );
        self.steps = vec![Step::new(edges)];
    }

    /// Choose `edge` at `step_index` and open the next step with its
    /// successors under `metric`, sorted by `sort_key`.
    ///
    /// Steps past `step_index` are discarded. If the edge has no successors
    /// the path ends at `step_index`.
    pub fn select_edge(
        &mut self,
        step_index: usize,
        edge: &Edge,
        metric: Metric,
        sort_key: SortKey,
    ) -> Result<(), GraphError> {
        if step_index >= self.steps.len() {
            return Err(GraphError::StepOutOfRange {
                index: step_index,
                len: self.steps.len(),
            });
        }

        self.steps.truncate(step_index + 1);

        let candidates = sort_edges(self.graph, &successors(self.graph, metric, edge), sort_key);
        tracing::debug!(
            step = step_index,
            edge = %edge.label,
            metric = %metric,
            candidates = candidates.len(),
            "edge selected"
        );
        if !candidates.is_empty() {
            self.steps.push(Step::new(candidates));
        }

        self.steps[step_index].select(&edge.id);
        Ok(())
    }

    /// Drop the last step (unless it is the root) and reopen the new last
    /// step for selection.
    pub fn undo(&mut self) {
        if self.steps.len() > 1 {
            self.steps.pop();
        }
        let last = self.steps.len() - 1;
        self.steps[last].clear_selection();
        tracing::debug!(steps = self.steps.len(), "undo");
    }

    pub fn annotate_step(
        &mut self,
        step_index: usize,
        from: i64,
        to: i64,
        mode: BoundaryMode,
    ) -> Result<(), GraphError> {
        let len = self.steps.len();
        let step = self
            .steps
            .get_mut(step_index)
            .ok_or(GraphError::StepOutOfRange { index: step_index, len })?;
        step.insert_boundaries(from, to, mode);
        Ok(())
    }

    /// The chain of chosen edges, root first.
    pub fn selected_edges(&self) -> Vec<&Edge> {
        self.steps.iter().map_while(Step::selected_edge).collect()
    }

    /// Window during which every chosen edge is valid, if non-empty.
    pub fn reachable_window(&self) -> Option<Interval> {
        let mut chosen = self.selected_edges().into_iter();
        let first = chosen.next()?.validity;
        chosen.try_fold(first, |acc, e| acc.intersect(&e.validity))
    }

    /// Smallest interval covering every chosen edge.
    pub fn path_span(&self) -> Option<Interval> {
        self.selected_edges()
            .into_iter()
            .map(|e| e.validity)
            .reduce(|acc, v| acc.span(&v))
    }
}
