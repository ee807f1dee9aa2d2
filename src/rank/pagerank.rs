// PageRank over a normalized statistic graph.
//
// Standard damped power iteration: with probability `damping` the walk
// follows an outgoing weighted edge, otherwise it jumps uniformly. Dangling
// nodes redistribute their mass uniformly. The iteration cap is a safety
// valve; hitting it logs a warning and returns the current vector.

use std::collections::HashMap;
use tracing::warn;

use crate::rank::graph::PlayerKey;
use crate::rank::normalize::NormalizedGraph;
use petgraph::visit::EdgeRef;

// ---------------------------------------------------------------------------
// Parameters and result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct PageRankParams {
    pub damping: f64,
    pub max_iterations: usize,
    /// L1 tolerance, compared against node_count * tolerance like the
    /// reference formulation.
    pub tolerance: f64,
}

impl Default for PageRankParams {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 10_000,
            tolerance: 1e-6,
        }
    }
}

/// The result of one PageRank run.
#[derive(Debug, Clone)]
pub struct RankVector {
    pub scores: HashMap<PlayerKey, f64>,
    pub iterations: usize,
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// Power iteration
// ---------------------------------------------------------------------------

/// Compute the rank score of every node in the normalized graph. Scores are
/// non-negative and sum to 1 over the graph's node set.
pub fn pagerank(normalized: &NormalizedGraph, params: &PageRankParams) -> RankVector {
    let graph = &normalized.graph;
    let n = graph.node_count();
    if n == 0 {
        return RankVector {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
        };
    }

    let nf = n as f64;
    let damping = params.damping;

    // Node indices are contiguous because the graph is never mutated after
    // construction, so plain vectors indexed by NodeIndex::index() suffice.
    let dangling: Vec<usize> = graph
        .node_indices()
        .filter(|&ix| graph.edges(ix).next().is_none())
        .map(|ix| ix.index())
        .collect();

    let mut x = vec![1.0 / nf; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iterations {
        iterations += 1;
        let xlast = std::mem::replace(&mut x, vec![0.0; n]);

        let danglesum: f64 = damping * dangling.iter().map(|&i| xlast[i]).sum::<f64>();

        for edge in graph.edge_references() {
            let s = edge.source().index();
            let t = edge.target().index();
            x[t] += damping * xlast[s] * *edge.weight();
        }

        let base = danglesum / nf + (1.0 - damping) / nf;
        for value in x.iter_mut() {
            *value += base;
        }

        let err: f64 = x.iter().zip(&xlast).map(|(a, b)| (a - b).abs()).sum();
        if err < nf * params.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "pagerank hit the {} iteration cap without converging",
            params.max_iterations
        );
    }

    let scores = graph
        .node_indices()
        .map(|ix| (graph[ix], x[ix.index()]))
        .collect();

    RankVector {
        scores,
        iterations,
        converged,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
