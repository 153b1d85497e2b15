use std::cmp::Ordering;
use std::fmt;

use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::graph::{Edge, Graph};
use crate::id::ElementId;

/// Rule deciding which edges may follow a previously chosen edge.
///
/// Parsed leniently: any name other than `hc`, `tsp` or `tc` maps to
/// `Unfiltered`, which lets every edge through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// `hc`: continue from the target vertex within an overlapping window.
    #[default]
    HopCount,
    /// `tsp`: same rule as `hc`.
    TemporalShortestPath,
    /// `tc`: continue from the target vertex strictly after the edge ends.
    TemporalConnectedness,
    Unfiltered,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::HopCount => "hc",
            Metric::TemporalShortestPath => "tsp",
            Metric::TemporalConnectedness => "tc",
            Metric::Unfiltered => "none",
        }
    }

    /// Whether `next` may follow `prev` under this metric.
    pub fn admits(&self, prev: &Edge, next: &Edge) -> bool {
        match self {
            Metric::HopCount | Metric::TemporalShortestPath => {
                next.source == prev.target && next.validity.overlaps(&prev.validity)
            }
            Metric::TemporalConnectedness => {
                next.source == prev.target && next.validity.starts_after(&prev.validity)
            }
            Metric::Unfiltered => true,
        }
    }
}

impl From<&str> for Metric {
    fn from(name: &str) -> Self {
        match name {
            "hc" => Metric::HopCount,
            "tsp" => Metric::TemporalShortestPath,
            "tc" => Metric::TemporalConnectedness,
            other => {
                tracing::warn!(metric = other, "unrecognized metric, edges left unfiltered");
                Metric::Unfiltered
            }
        }
    }
}

/// Ordering applied to every candidate list.
///
/// Unknown names map to `Unsorted`, which keeps the incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Label,
    ValidFrom,
    ValidTo,
    SourceLabel,
    TargetLabel,
    Unsorted,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Label => "label",
            SortKey::ValidFrom => "validFrom",
            SortKey::ValidTo => "validTo",
            SortKey::SourceLabel => "sourceLabel",
            SortKey::TargetLabel => "targetLabel",
            SortKey::Unsorted => "none",
        }
    }
}

impl From<&str> for SortKey {
    fn from(name: &str) -> Self {
        match name {
            "label" => SortKey::Label,
            "validFrom" => SortKey::ValidFrom,
            "validTo" => SortKey::ValidTo,
            "sourceLabel" => SortKey::SourceLabel,
            "targetLabel" => SortKey::TargetLabel,
            other => {
                tracing::warn!(sort_key = other, "unrecognized sort key, order left unchanged");
                SortKey::Unsorted
            }
        }
    }
}

macro_rules! string_enum_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                Ok(<$ty>::from(name.as_str()))
            }
        }
    };
}

string_enum_serde!(Metric);
string_enum_serde!(SortKey);

/// Root-locale collator for label ordering.
///
/// Falls back to code point order if the collation data cannot be loaded.
struct LabelCollator(Option<Collator>);

impl LabelCollator {
    fn new() -> Self {
        match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Self(Some(collator)),
            Err(err) => {
                tracing::warn!(error = %err, "root collation unavailable, using code point order");
                Self(None)
            }
        }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.0 {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

/// Locale-aware string order (Unicode root collation, tertiary strength):
/// accents and case are secondary to the base letter, lowercase sorts
/// before uppercase, punctuation before digits before letters.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    LabelCollator::new().compare(a, b)
}

fn vertex_label<'a>(graph: &'a Graph, id: &ElementId) -> &'a str {
    graph.vertex(id).map(|v| v.label.as_str()).unwrap_or_default()
}

/// Stable sort by `key`. Returns a new sequence; the input is untouched.
pub fn sort_edges(graph: &Graph, edges: &[Edge], key: SortKey) -> Vec<Edge> {
    let mut sorted = edges.to_vec();
    let collator = LabelCollator::new();
    match key {
        SortKey::Label => sorted.sort_by(|a, b| collator.compare(&a.label, &b.label)),
        SortKey::ValidFrom => sorted.sort_by_key(|e| e.valid_from()),
        SortKey::ValidTo => sorted.sort_by_key(|e| e.valid_to()),
        SortKey::SourceLabel => sorted.sort_by(|a, b| {
            collator.compare(vertex_label(graph, &a.source), vertex_label(graph, &b.source))
        }),
        SortKey::TargetLabel => sorted.sort_by(|a, b| {
            collator.compare(vertex_label(graph, &a.target), vertex_label(graph, &b.target))
        }),
        SortKey::Unsorted => {}
    }
    sorted
}

/// Edges of the whole graph that may follow `prev` under `metric`, in
/// graph order.
pub fn successors(graph: &Graph, metric: Metric, prev: &Edge) -> Vec<Edge> {
    graph
        .edges()
        .iter()
        .filter(|e| metric.admits(prev, e))
        .cloned()
        .collect()
}

/// Candidate list for the first step: all edges, optionally restricted to
/// those leaving `vertex_filter`, then sorted.
pub fn root_candidates(graph: &Graph, vertex_filter: Option<&ElementId>, key: SortKey) -> Vec<Edge> {
    let edges: Vec<Edge> = match vertex_filter {
        Some(v) => graph.out_edges(v).cloned().collect(),
        None => graph.edges().to_vec(),
    };
    sort_edges(graph, &edges, key)
}
