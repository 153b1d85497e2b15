use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::filter::{Metric, SortKey};
use crate::graph::Graph;
use crate::id::ElementId;
use crate::path::{PathBuilder, Step};

/// Per-session exploration settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExploreConfig {
    pub metric: Metric,
    pub sort_key: SortKey,
    /// Label of the vertex the root step is restricted to.
    pub root_vertex: Option<String>,
}

/// One user's exploration of a graph: settings plus path state.
///
/// Translates presentation-layer intents (IDs, labels) into path builder
/// calls with the session's metric and sort order.
#[derive(Debug, Clone)]
pub struct Explorer<'g> {
    config: ExploreConfig,
    path: PathBuilder<'g>,
}

impl<'g> Explorer<'g> {
    /// Fresh session. Applies `root_vertex` and `sort_key` when a root
    /// vertex is configured; otherwise the root step holds every edge in
    /// graph order.
    pub fn new(graph: &'g Graph, config: ExploreConfig) -> Result<Self, GraphError> {
        let mut path = PathBuilder::new(graph);
        if let Some(label) = &config.root_vertex {
            let root = graph.find_vertex(label)?.id;
            path.set_filters(Some(&root), config.sort_key);
        }
        Ok(Self { config, path })
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    pub fn steps(&self) -> &[Step] {
        self.path.steps()
    }

    pub fn path(&self) -> &PathBuilder<'g> {
        &self.path
    }

    /// Affects subsequent edge choices only.
    pub fn set_metric(&mut self, metric: Metric) {
        self.config.metric = metric;
    }

    /// Restrict the root step to edges leaving `vertex` and re-sort.
    /// Resets the path. An ID outside the graph is rejected and leaves the
    /// session untouched.
    pub fn change_root_filter(
        &mut self,
        vertex: Option<&ElementId>,
        sort_key: SortKey,
    ) -> Result<(), GraphError> {
        let root_vertex = match vertex {
            Some(id) => Some(
                self.path
                    .graph()
                    .vertex(id)
                    .ok_or(GraphError::UnknownVertex(*id))?
                    .label
                    .clone(),
            ),
            None => None,
        };
        self.config.root_vertex = root_vertex;
        self.config.sort_key = sort_key;
        self.path.set_filters(vertex, sort_key);
        Ok(())
    }

    /// Choose the edge with `edge_id` at `step_index`.
    pub fn choose_edge(&mut self, step_index: usize, edge_id: &ElementId) -> Result<(), GraphError> {
        let edge = self
            .path
            .graph()
            .edge(edge_id)
            .ok_or(GraphError::UnknownEdge(*edge_id))?;
        self.path
            .select_edge(step_index, edge, self.config.metric, self.config.sort_key)
    }

    pub fn undo(&mut self) {
        self.path.undo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::sample_graph;
    use crate::id::SequentialIds;

    fn edge_id(g: &Graph, label: &str) -> ElementId {
        g.edges().iter().find(|e| e.label == label).unwrap().id
    }

    #[test]
    fn test_default_config() {
        let config = ExploreConfig::default();
        assert_eq!(config.metric, Metric::HopCount);
        assert_eq!(config.sort_key, SortKey::Label);
        assert_eq!(config.root_vertex, None);
    }

    #[test]
    fn test_config_from_json() {
        let config: ExploreConfig =
            serde_json::from_str(r#"{"metric":"tc","sortKey":"validFrom","rootVertex":"A"}"#).unwrap();
        assert_eq!(config.metric, Metric::TemporalConnectedness);
        assert_eq!(config.sort_key, SortKey::ValidFrom);
        assert_eq!(config.root_vertex.as_deref(), Some("A"));

        let partial: ExploreConfig = serde_json::from_str(r#"{"metric":"weird"}"#).unwrap();
        assert_eq!(partial.metric, Metric::Unfiltered);
        assert_eq!(partial.sort_key, SortKey::Label);
    }

    #[test]
    fn test_new_with_root_vertex() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let config = ExploreConfig {
            root_vertex: Some("A".into()),
            sort_key: SortKey::ValidFrom,
            ..ExploreConfig::default()
        };
        let ex = Explorer::new(&g, config).unwrap();
        let labels: Vec<&str> = ex.steps()[0].edges().iter().map(|e| e.label.as_str()).collect();
        // A's outgoing edges: 11 [14,27), 19 [8,32), 35 [2,17), 41 [39,46)
        assert_eq!(labels, ["Edge 35", "Edge 19", "Edge 11", "Edge 41"]);
    }

    #[test]
    fn test_new_with_unknown_root_vertex() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let config = ExploreConfig {
            root_vertex: Some("Z".into()),
            ..ExploreConfig::default()
        };
        assert_eq!(
            Explorer::new(&g, config).unwrap_err(),
            GraphError::NotFound { label: "Z".into() }
        );
    }

    #[test]
    fn test_choose_edge_walk() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let mut ex = Explorer::new(&g, ExploreConfig::default()).unwrap();

        // Edge 35: A -> G [2,17)
        ex.choose_edge(0, &edge_id(&g, "Edge 35")).unwrap();
        assert_eq!(ex.steps().len(), 2);
        let next: Vec<&str> = ex.steps()[1].edges().iter().map(|e| e.label.as_str()).collect();
        // From G overlapping [2,17): Edge 30 [4,47), Edge 50 [8,46); Edge 6 [32,38) and 28 [39,41) excluded
        assert_eq!(next, ["Edge 30", "Edge 50"]);

        ex.choose_edge(1, &edge_id(&g, "Edge 50")).unwrap();
        assert_eq!(ex.steps().len(), 3);
        assert_eq!(ex.path().selected_edges().len(), 2);

        ex.undo();
        assert_eq!(ex.steps().len(), 2);
        assert_eq!(ex.steps()[1].selected(), None);
    }

    #[test]
    fn test_choose_unknown_edge() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let mut ex = Explorer::new(&g, ExploreConfig::default()).unwrap();
        let missing = ElementId::from_u128(9999);
        assert_eq!(ex.choose_edge(0, &missing), Err(GraphError::UnknownEdge(missing)));
        assert_eq!(ex.steps().len(), 1);
    }

    #[test]
    fn test_change_root_filter_updates_config() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let mut ex = Explorer::new(&g, ExploreConfig::default()).unwrap();
        ex.choose_edge(0, &edge_id(&g, "Edge 35")).unwrap();

        let h = g.find_vertex("H").unwrap().id;
        ex.change_root_filter(Some(&h), SortKey::TargetLabel).unwrap();
        assert_eq!(ex.steps().len(), 1);
        assert_eq!(ex.config().root_vertex.as_deref(), Some("H"));
        assert_eq!(ex.config().sort_key, SortKey::TargetLabel);
        assert!(ex.steps()[0].edges().iter().all(|e| e.source == h));

        ex.change_root_filter(None, SortKey::Label).unwrap();
        assert_eq!(ex.steps()[0].edges().len(), 50);
        assert_eq!(ex.config().root_vertex, None);
    }

    #[test]
    fn test_change_root_filter_unknown_vertex() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let config = ExploreConfig {
            root_vertex: Some("C".into()),
            ..ExploreConfig::default()
        };
        let mut ex = Explorer::new(&g, config).unwrap();
        ex.choose_edge(0, &edge_id(&g, "Edge 3")).unwrap();
        let before = ex.steps().to_vec();

        let missing = ElementId::from_u128(4242);
        assert_eq!(
            ex.change_root_filter(Some(&missing), SortKey::ValidTo),
            Err(GraphError::UnknownVertex(missing))
        );
        assert_eq!(ex.config().root_vertex.as_deref(), Some("C"));
        assert_eq!(ex.config().sort_key, SortKey::Label);
        assert_eq!(ex.steps(), before.as_slice());
    }

    #[test]
    fn test_set_metric_applies_to_next_choice() {
        let g = sample_graph(SequentialIds::new()).unwrap();
        let mut ex = Explorer::new(&g, ExploreConfig::default()).unwrap();
        ex.set_metric(Metric::TemporalConnectedness);
        // Edge 23: E -> H [3,6); tc keeps edges from H starting after 6
        ex.choose_edge(0, &edge_id(&g, "Edge 23")).unwrap();
        assert!(ex.steps()[1]
            .edges()
            .iter()
            .all(|e| e.valid_from() > 6 && g.source_of(e).unwrap().label == "H"));
    }
}
