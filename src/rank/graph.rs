// Matchup multigraph construction.
//
// Converts finished matchup totals into directed multi-edges between player
// nodes. Direction encodes the sign of each statistic: a positive total runs
// pitcher -> batter, a negative total runs batter -> pitcher, and a zero
// total emits no edge. Node identity is the composite (player id, role), so
// a two-way player occupies two distinct nodes.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::ingest::players::{PlayerRecord, Role};
use crate::rank::aggregate::MatchupKey;
use crate::rank::{StatTriple, Statistic};

/// Structural ceiling on edges between an ordered node pair: one per
/// statistic, one direction each. Exceeding it indicates a builder or
/// aggregator defect.
pub const MAX_EDGES_PER_PAIR: usize = 3;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown {role} {id} referenced by a matchup")]
    UnknownPlayer { id: u32, role: Role },
}

// ---------------------------------------------------------------------------
// Node and edge payloads
// ---------------------------------------------------------------------------

/// Composite node identity: raw player id qualified by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerKey {
    pub id: u32,
    pub role: Role,
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.id)
    }
}

/// A player node: identity, descriptive attributes, season-cumulative stats,
/// and the rank scores filled in by the propagator.
#[derive(Debug, Clone)]
pub struct PlayerNode {
    pub key: PlayerKey,
    pub name: String,
    pub team: String,
    pub totals: StatTriple,
    pub aav: f64,
    pub rank: StatTriple,
}

impl PlayerNode {
    fn from_record(rec: &PlayerRecord) -> Self {
        Self {
            key: PlayerKey {
                id: rec.id,
                role: rec.role,
            },
            name: rec.name.clone(),
            team: rec.team.clone(),
            totals: StatTriple::new(rec.cumulative_wpa, rec.cumulative_re, rec.cumulative_score),
            aav: rec.aav,
            rank: StatTriple::default(),
        }
    }
}

/// A directed multi-edge: one statistic label with its signed aggregate, plus
/// the derived and rescaled weights filled in by the propagator.
#[derive(Debug, Clone)]
pub struct MatchupEdge {
    pub stat: Statistic,
    pub value: f64,
    pub derived: StatTriple,
    pub scaled: StatTriple,
}

/// One ordered node pair found carrying more than `MAX_EDGES_PER_PAIR` edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCountViolation {
    pub source: PlayerKey,
    pub target: PlayerKey,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// The multigraph
// ---------------------------------------------------------------------------

/// The matchup multigraph. Built once, then only read and annotated.
#[derive(Debug)]
pub struct MatchupGraph {
    pub(crate) graph: DiGraph<PlayerNode, MatchupEdge>,
    index: HashMap<PlayerKey, NodeIndex>,
}

impl MatchupGraph {
    /// Create the graph with one node per player record. Duplicate
    /// (id, role) records are skipped with a warning.
    pub fn with_players(batters: &[PlayerRecord], pitchers: &[PlayerRecord]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for rec in batters.iter().chain(pitchers.iter()) {
            let node = PlayerNode::from_record(rec);
            let key = node.key;
            if index.contains_key(&key) {
                warn!("duplicate player record for {}, keeping the first", key);
                continue;
            }
            let ix = graph.add_node(node);
            index.insert(key, ix);
        }

        Self { graph, index }
    }

    /// Build the complete graph from player records and finished matchup
    /// totals.
    pub fn build(
        batters: &[PlayerRecord],
        pitchers: &[PlayerRecord],
        matchups: &BTreeMap<MatchupKey, StatTriple>,
    ) -> Result<Self, GraphError> {
        let mut g = Self::with_players(batters, pitchers);
        for (key, totals) in matchups {
            g.add_matchup(*key, totals)?;
        }
        Ok(g)
    }

    /// Emit the edges for one matchup: per statistic, a positive total points
    /// pitcher -> batter, a negative total points batter -> pitcher, and a
    /// zero total adds nothing. The signed value is kept on the edge.
    pub fn add_matchup(
        &mut self,
        key: MatchupKey,
        totals: &StatTriple,
    ) -> Result<(), GraphError> {
        let batter_key = PlayerKey {
            id: key.batter,
            role: Role::Batter,
        };
        let pitcher_key = PlayerKey {
            id: key.pitcher,
            role: Role::Pitcher,
        };

        let batter_ix = self.lookup(batter_key)?;
        let pitcher_ix = self.lookup(pitcher_key)?;

        for stat in Statistic::ALL {
            let value = totals.get(stat);
            let (source, target) = if value > 0.0 {
                (pitcher_ix, batter_ix)
            } else if value < 0.0 {
                (batter_ix, pitcher_ix)
            } else {
                continue;
            };
            self.graph.add_edge(
                source,
                target,
                MatchupEdge {
                    stat,
                    value,
                    derived: StatTriple::default(),
                    scaled: StatTriple::default(),
                },
            );
        }

        Ok(())
    }

    fn lookup(&self, key: PlayerKey) -> Result<NodeIndex, GraphError> {
        self.index.get(&key).copied().ok_or(GraphError::UnknownPlayer {
            id: key.id,
            role: key.role,
        })
    }

    /// Count edges per ordered node pair and report every pair exceeding the
    /// structural ceiling. Violations are diagnostics, never corrected.
    pub fn check_edge_invariant(&self) -> Vec<EdgeCountViolation> {
        let mut counts: BTreeMap<(PlayerKey, PlayerKey), usize> = BTreeMap::new();
        for edge in self.graph.edge_references() {
            let (Some(source), Some(target)) = (
                self.graph.node_weight(edge.source()),
                self.graph.node_weight(edge.target()),
            ) else {
                continue;
            };
            *counts.entry((source.key, target.key)).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .filter(|&(_, count)| count > MAX_EDGES_PER_PAIR)
            .map(|((source, target), count)| EdgeCountViolation {
                source,
                target,
                count,
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a node by its composite key.
    pub fn node(&self, key: PlayerKey) -> Option<&PlayerNode> {
        self.index.get(&key).map(|&ix| &self.graph[ix])
    }

    /// Iterate nodes in insertion order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerNode> {
        self.graph.node_weights()
    }

    /// Iterate edges as (source node, target node, edge) triples.
    pub fn edge_views(
        &self,
    ) -> impl Iterator<Item = (&PlayerNode, &PlayerNode, &MatchupEdge)> + '_ {
        self.graph.edge_references().filter_map(move |edge| {
            let source = self.graph.node_weight(edge.source())?;
            let target = self.graph.node_weight(edge.target())?;
            Some((source, target, edge.weight()))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
