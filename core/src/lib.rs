//! temporal-path-core: Temporal multigraph store and interactive path builder.
//!
//! Vertices and edges carry validity intervals `[from, to)`. A path is
//! built one edge at a time: each choice opens a new step holding the
//! edges that may follow it under the active metric (overlapping validity
//! for `hc`/`tsp`, strict precedence for `tc`), sorted by a selectable key.
//! Steps are truncated on re-selection and popped on undo. Whole-graph
//! queries (temporal hop count, temporal reachability) reuse the same
//! metric predicates.
//!
//! Pure in-memory library; rendering and input handling live elsewhere.

mod error;
mod explorer;
mod filter;
mod fixture;
mod graph;
mod id;
mod path;
mod traversal;

pub use error::GraphError;
pub use explorer::{ExploreConfig, Explorer};
pub use filter::{locale_cmp, root_candidates, sort_edges, successors, Metric, SortKey};
pub use fixture::sample_graph;
pub use graph::{Edge, Graph, GraphBuilder, Interval, Vertex};
pub use id::{ElementId, IdGenerator, RandomIds, SequentialIds};
pub use path::{BoundaryMode, PathBuilder, Step};
pub use traversal::{temporal_hop_count, temporally_connected, HopProfile, HopSegment};
