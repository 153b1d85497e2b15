use thiserror::Error;

use crate::id::ElementId;

/// Failures raised while building or querying a temporal graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No vertex carries the requested label.
    #[error("vertex with label '{label}' not found")]
    NotFound { label: String },

    /// An edge endpoint does not resolve to a vertex of the graph.
    #[error("edge '{edge_label}' ({edge}) references missing vertex {vertex}")]
    DanglingEndpoint {
        edge: ElementId,
        edge_label: String,
        vertex: ElementId,
    },

    /// A vertex identifier is not part of the graph.
    #[error("vertex {0} not found")]
    UnknownVertex(ElementId),

    /// A query whose start and end vertex coincide.
    #[error("start and end vertex are both {0}")]
    SameEndpoints(ElementId),

    /// An edge identifier is not part of the graph.
    #[error("edge {0} not found")]
    UnknownEdge(ElementId),

    /// A step index beyond the current path length.
    #[error("step {index} out of range (path has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },
}
