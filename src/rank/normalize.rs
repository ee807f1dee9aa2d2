// Per-statistic normalization.
//
// Projects the multigraph into one single-weight digraph per statistic:
// select the statistic's edges, take magnitudes, consolidate parallel edges
// between the same ordered pair, then scale each node's outgoing weights to
// sum to 1. Sources with no outgoing weight are left untouched, which keeps
// every row of the implied transition matrix summing to 1 or 0.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::rank::graph::{MatchupGraph, PlayerKey};
use crate::rank::Statistic;

// ---------------------------------------------------------------------------
// Normalized graph
// ---------------------------------------------------------------------------

/// A row-stochastic digraph for one statistic. Only nodes incident to an
/// edge carrying the statistic are present.
#[derive(Debug)]
pub struct NormalizedGraph {
    pub graph: DiGraph<PlayerKey, f64>,
}

impl NormalizedGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The weight on the edge between two keys, if both exist and are
    /// connected.
    pub fn weight(&self, source: PlayerKey, target: PlayerKey) -> Option<f64> {
        let find = |key: PlayerKey| self.graph.node_indices().find(|&ix| self.graph[ix] == key);
        let s = find(source)?;
        let t = find(target)?;
        let e = self.graph.find_edge(s, t)?;
        self.graph.edge_weight(e).copied()
    }
}

// ---------------------------------------------------------------------------
// Projection and normalization
// ---------------------------------------------------------------------------

/// Project the multigraph onto one statistic and normalize it.
pub fn normalize_for_stat(source: &MatchupGraph, stat: Statistic) -> NormalizedGraph {
    let mut graph: DiGraph<PlayerKey, f64> = DiGraph::new();
    let mut index: HashMap<PlayerKey, NodeIndex> = HashMap::new();

    for edge in source.graph.edge_references() {
        let payload = edge.weight();
        if payload.stat != stat {
            continue;
        }
        let (Some(source_node), Some(target_node)) = (
            source.graph.node_weight(edge.source()),
            source.graph.node_weight(edge.target()),
        ) else {
            continue;
        };

        let s_ix = *index
            .entry(source_node.key)
            .or_insert_with(|| graph.add_node(source_node.key));
        let t_ix = *index
            .entry(target_node.key)
            .or_insert_with(|| graph.add_node(target_node.key));

        // Direction already encodes the sign, only the magnitude ranks.
        let magnitude = payload.value.abs();
        match graph.find_edge(s_ix, t_ix) {
            Some(e_ix) => {
                if let Some(existing) = graph.edge_weight_mut(e_ix) {
                    *existing += magnitude;
                }
            }
            None => {
                graph.add_edge(s_ix, t_ix, magnitude);
            }
        }
    }

    row_normalize(&mut graph);
    NormalizedGraph { graph }
}

/// Scale every node's outgoing weights to sum to 1. Nodes whose outgoing
/// weights sum to 0 are left unchanged. Applying this to an already
/// normalized graph is a no-op.
pub fn row_normalize(graph: &mut DiGraph<PlayerKey, f64>) {
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    for node in nodes {
        let total: f64 = graph.edges(node).map(|e| *e.weight()).sum();
        if total <= 0.0 {
            continue;
        }
        let edge_ids: Vec<_> = graph.edges(node).map(|e| e.id()).collect();
        for id in edge_ids {
            if let Some(weight) = graph.edge_weight_mut(id) {
                *weight /= total;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
