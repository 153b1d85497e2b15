use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::id::{ElementId, IdGenerator};

/// Half-open validity interval `[from, to)`.
///
/// `(-1, -1)` is the sentinel for "unbounded / not applicable", used by
/// vertices that exist for the whole lifetime of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub from: i64,
    pub to: i64,
}

impl Interval {
    pub const UNBOUNDED: Interval = Interval { from: -1, to: -1 };

    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::UNBOUNDED
    }

    /// True if the intervals share at least one instant.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.from < other.to && self.to > other.from
    }

    /// True if this interval starts strictly after `other` ends.
    pub fn starts_after(&self, other: &Interval) -> bool {
        self.from > other.to
    }

    /// Intersection, or None if it is empty.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from < to).then_some(Interval { from, to })
    }

    /// Smallest interval covering both.
    pub fn span(&self, other: &Interval) -> Interval {
        Interval {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }
}

/// A vertex with a validity interval. Labels are not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: ElementId,
    pub label: String,
    pub validity: Interval,
}

/// A directed temporal edge. Endpoints are vertex IDs owned by the graph.
///
/// Self-loops (`source == target`) are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub label: String,
    pub source: ElementId,
    pub target: ElementId,
    pub validity: Interval,
}

impl Edge {
    pub fn valid_from(&self) -> i64 {
        self.validity.from
    }

    pub fn valid_to(&self) -> i64 {
        self.validity.to
    }
}

/// Immutable temporal multigraph: ordered vertices + ordered edges.
///
/// Every edge endpoint resolves to a vertex in `vertices`; `Graph::new`
/// refuses anything else.
#[derive(Debug, Clone)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    vertex_index: HashMap<ElementId, usize>,
    edge_index: HashMap<ElementId, usize>,
}

impl Graph {
    pub fn new(vertices: Vec<Vertex>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let vertex_index: HashMap<ElementId, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id, i))
            .collect();

        for edge in &edges {
            for endpoint in [edge.source, edge.target] {
                if !vertex_index.contains_key(&endpoint) {
                    return Err(GraphError::DanglingEndpoint {
                        edge: edge.id,
                        edge_label: edge.label.clone(),
                        vertex: endpoint,
                    });
                }
            }
        }

        let edge_index = edges.iter().enumerate().map(|(i, e)| (e.id, i)).collect();

        Ok(Self {
            vertices,
            edges,
            vertex_index,
            edge_index,
        })
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            vertex_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex(&self, id: &ElementId) -> Option<&Vertex> {
        self.vertex_index.get(id).map(|&i| &self.vertices[i])
    }

    pub fn edge(&self, id: &ElementId) -> Option<&Edge> {
        self.edge_index.get(id).map(|&i| &self.edges[i])
    }

    /// First vertex carrying `label`.
    pub fn find_vertex(&self, label: &str) -> Result<&Vertex, GraphError> {
        find_by_label(&self.vertices, label)
    }

    /// Source vertex of an edge that belongs to this graph.
    pub fn source_of(&self, edge: &Edge) -> Option<&Vertex> {
        self.vertex(&edge.source)
    }

    pub fn target_of(&self, edge: &Edge) -> Option<&Vertex> {
        self.vertex(&edge.target)
    }

    /// Outgoing edges of a vertex, in graph order.
    pub fn out_edges<'a>(&'a self, vertex: &'a ElementId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == *vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::empty()
    }
}

fn find_by_label<'a>(vertices: &'a [Vertex], label: &str) -> Result<&'a Vertex, GraphError> {
    vertices
        .iter()
        .find(|v| v.label == label)
        .ok_or_else(|| GraphError::NotFound {
            label: label.to_string(),
        })
}

/// Incremental graph construction with label-based endpoint lookup.
///
/// Identifiers come from the supplied generator, one per element in
/// insertion order.
pub struct GraphBuilder<G: IdGenerator> {
    ids: G,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl<G: IdGenerator> GraphBuilder<G> {
    pub fn new(ids: G) -> Self {
        Self {
            ids,
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(ids: G, vertex_count: usize, edge_count: usize) -> Self {
        Self {
            ids,
            vertices: Vec::with_capacity(vertex_count),
            edges: Vec::with_capacity(edge_count),
        }
    }

    pub fn add_vertex(&mut self, label: impl Into<String>, validity: Interval) -> ElementId {
        let id = self.ids.next_id();
        self.vertices.push(Vertex {
            id,
            label: label.into(),
            validity,
        });
        id
    }

    /// Add an edge between already-registered vertex IDs.
    pub fn add_edge_between(
        &mut self,
        label: impl Into<String>,
        source: ElementId,
        target: ElementId,
        valid_from: i64,
        valid_to: i64,
    ) -> ElementId {
        let id = self.ids.next_id();
        self.edges.push(Edge {
            id,
            label: label.into(),
            source,
            target,
            validity: Interval::new(valid_from, valid_to),
        });
        id
    }

    /// Add an edge whose endpoints are looked up by vertex label.
    pub fn add_edge(
        &mut self,
        label: impl Into<String>,
        source_label: &str,
        target_label: &str,
        valid_from: i64,
        valid_to: i64,
    ) -> Result<ElementId, GraphError> {
        let source = find_by_label(&self.vertices, source_label)?.id;
        let target = find_by_label(&self.vertices, target_label)?.id;
        Ok(self.add_edge_between(label, source, target, valid_from, valid_to))
    }

    pub fn build(self) -> Result<Graph, GraphError> {
        Graph::new(self.vertices, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIds;

    fn two_vertex_graph() -> Graph {
        let mut b = GraphBuilder::new(SequentialIds::new());
        b.add_vertex("A", Interval::UNBOUNDED);
        b.add_vertex("B", Interval::UNBOUNDED);
        b.add_edge("e1", "A", "B", 0, 10).unwrap();
        b.add_edge("e2", "B", "A", 5, 15).unwrap();
        b.add_edge("loop", "B", "B", 1, 2).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_build_preserves_order() {
        let g = two_vertex_graph();
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 3);
        let labels: Vec<&str> = g.edges().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["e1", "e2", "loop"]);
    }

    #[test]
    fn test_endpoints_resolve() {
        let g = two_vertex_graph();
        for e in g.edges() {
            assert!(g.source_of(e).is_some());
            assert!(g.target_of(e).is_some());
        }
        let e1 = &g.edges()[0];
        assert_eq!(g.source_of(e1).unwrap().label, "A");
        assert_eq!(g.target_of(e1).unwrap().label, "B");
    }

    #[test]
    fn test_find_vertex_not_found() {
        let g = two_vertex_graph();
        assert_eq!(g.find_vertex("B").unwrap().label, "B");
        assert_eq!(
            g.find_vertex("Z"),
            Err(GraphError::NotFound { label: "Z".into() })
        );
    }

    #[test]
    fn test_builder_unknown_label() {
        let mut b = GraphBuilder::new(SequentialIds::new());
        b.add_vertex("A", Interval::UNBOUNDED);
        let err = b.add_edge("bad", "A", "Q", 0, 1).unwrap_err();
        assert_eq!(err, GraphError::NotFound { label: "Q".into() });
    }

    #[test]
    fn test_dangling_endpoint_rejected() {
        let a = Vertex {
            id: ElementId::from_u128(1),
            label: "A".into(),
            validity: Interval::UNBOUNDED,
        };
        let e = Edge {
            id: ElementId::from_u128(2),
            label: "e".into(),
            source: a.id,
            target: ElementId::from_u128(99),
            validity: Interval::new(0, 1),
        };
        let err = Graph::new(vec![a], vec![e]).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEndpoint { vertex, .. } if vertex == ElementId::from_u128(99)));
    }

    #[test]
    fn test_lookup_by_id() {
        let g = two_vertex_graph();
        let e2 = &g.edges()[1];
        assert_eq!(g.edge(&e2.id), Some(e2));
        assert!(g.edge(&ElementId::from_u128(12345)).is_none());
    }

    #[test]
    fn test_out_edges_includes_self_loop() {
        let g = two_vertex_graph();
        let b = g.find_vertex("B").unwrap().id;
        let labels: Vec<&str> = g.out_edges(&b).map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["e2", "loop"]);
    }

    #[test]
    fn test_empty_graph() {
        let g = Graph::default();
        assert_eq!(g.vertex_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_interval_relations() {
        let a = Interval::new(0, 10);
        assert!(a.overlaps(&Interval::new(5, 15)));
        assert!(!a.overlaps(&Interval::new(10, 20)));
        assert!(Interval::new(12, 20).starts_after(&a));
        assert!(!Interval::new(10, 20).starts_after(&a));
        assert_eq!(a.intersect(&Interval::new(5, 15)), Some(Interval::new(5, 10)));
        assert_eq!(a.intersect(&Interval::new(10, 15)), None);
        assert_eq!(a.span(&Interval::new(5, 15)), Interval::new(0, 15));
        assert!(Interval::UNBOUNDED.is_unbounded());
        assert!(!a.is_unbounded());
    }
}
