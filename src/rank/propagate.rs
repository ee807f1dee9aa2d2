// Score propagation.
//
// Attaches each PageRank vector back onto the multigraph's nodes, derives
// per-edge weights as the product of endpoint ranks, rescales each
// statistic's derived weights into [0, 1], and rolls player ranks up into
// team aggregates.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::outcomes::WinLoss;
use crate::rank::graph::MatchupGraph;
use crate::rank::pagerank::RankVector;
use crate::rank::{StatTriple, Statistic};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RankError {
    #[error("no rankable edges for statistic {stat}")]
    NoRankableEdges { stat: Statistic },
}

// ---------------------------------------------------------------------------
// Rank annotation
// ---------------------------------------------------------------------------

/// Write one statistic's rank scores onto the graph's nodes. Nodes absent
/// from the rank vector (no edges for this statistic) default to 0.
pub fn attach_ranks(graph: &mut MatchupGraph, stat: Statistic, ranks: &RankVector) {
    let nodes: Vec<_> = graph.graph.node_indices().collect();
    for ix in nodes {
        if let Some(node) = graph.graph.node_weight_mut(ix) {
            let score = ranks.scores.get(&node.key).copied().unwrap_or(0.0);
            node.rank.set(stat, score);
        }
    }
}

/// Derive every edge's weight per statistic as the product of its endpoint
/// ranks. Defined for all edges, including ones that do not carry the
/// statistic's own label.
pub fn derive_edge_weights(graph: &mut MatchupGraph) {
    let edges: Vec<_> = graph.graph.edge_indices().collect();
    for id in edges {
        let Some((s, t)) = graph.graph.edge_endpoints(id) else {
            continue;
        };
        let (Some(source), Some(target)) =
            (graph.graph.node_weight(s), graph.graph.node_weight(t))
        else {
            continue;
        };
        let (source_rank, target_rank) = (source.rank, target.rank);
        if let Some(edge) = graph.graph.edge_weight_mut(id) {
            for stat in Statistic::ALL {
                edge.derived
                    .set(stat, source_rank.get(stat) * target_rank.get(stat));
            }
        }
    }
}

/// Rescale one statistic's derived weights into [0, 1] by dividing by the
/// maximum. A zero maximum means no edge carries any rank mass for the
/// statistic, which is a domain error rather than a silent NaN.
pub fn rescale_edge_weights(graph: &mut MatchupGraph, stat: Statistic) -> Result<(), RankError> {
    let max = graph
        .edge_views()
        .map(|(_, _, edge)| edge.derived.get(stat))
        .fold(0.0_f64, f64::max);

    if max <= 0.0 {
        return Err(RankError::NoRankableEdges { stat });
    }

    let edges: Vec<_> = graph.graph.edge_indices().collect();
    for id in edges {
        if let Some(edge) = graph.graph.edge_weight_mut(id) {
            let derived = edge.derived.get(stat);
            edge.scaled.set(stat, derived / max);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Team rollups
// ---------------------------------------------------------------------------

/// Per-team rollup of player stats, rank scores, payroll, and the win/loss
/// record. Built once after player ranks are final, read-only thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamAggregate {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    /// Sum of the team's players' cumulative deltas.
    pub stat_totals: StatTriple,
    /// Sum of the team's players' rank scores, per statistic.
    pub rank_totals: StatTriple,
    /// Sum of the team's players' AAV.
    pub payroll: f64,
}

/// Roll player-level ranks, cumulative stats, and payroll up to the teams in
/// the win/loss record. Players whose team string matches no record (e.g.
/// mid-season movers tagged "Multiple") contribute to no rollup.
pub fn team_rollups(
    graph: &MatchupGraph,
    records: &BTreeMap<String, WinLoss>,
) -> Vec<TeamAggregate> {
    records
        .iter()
        .map(|(team, record)| {
            let mut agg = TeamAggregate {
                team: team.clone(),
                wins: record.wins,
                losses: record.losses,
                stat_totals: StatTriple::default(),
                rank_totals: StatTriple::default(),
                payroll: 0.0,
            };
            for player in graph.players().filter(|p| &p.team == team) {
                agg.stat_totals.add(player.totals);
                agg.rank_totals.add(player.rank);
                agg.payroll += player.aav;
            }
            agg
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::players::{PlayerRecord, Role};
    use crate::rank::aggregate::MatchupKey;
    use crate::rank::graph::PlayerKey;
    use std::collections::HashMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_player(id: u32, role: Role, team: &str, aav: f64) -> PlayerRecord {
        PlayerRecord {
            id,
            role,
            name: format!("Player {id}"),
            team: team.into(),
            cumulative_wpa: 1.0,
            cumulative_re: 0.5,
            cumulative_score: 2.0,
            aav,
        }
    }

    fn batter_key(id: u32) -> PlayerKey {
        PlayerKey { id, role: Role::Batter }
    }

    fn pitcher_key(id: u32) -> PlayerKey {
        PlayerKey { id, role: Role::Pitcher }
    }

    fn rank_vector(entries: &[(PlayerKey, f64)]) -> RankVector {
        RankVector {
            scores: entries.iter().copied().collect::<HashMap<_, _>>(),
            iterations: 1,
            converged: true,
        }
    }

    fn two_node_graph() -> MatchupGraph {
        let batters = vec![make_player(1, Role::Batter, "NYY", 1_000_000.0)];
        let pitchers = vec![make_player(2, Role::Pitcher, "BOS", 2_000_000.0)];
        let mut matchups = BTreeMap::new();
        matchups.insert(
            MatchupKey { batter: 1, pitcher: 2 },
            StatTriple::new(0.5, -0.2, 0.0),
        );
        MatchupGraph::build(&batters, &pitchers, &matchups).unwrap()
    }

    #[test]
    fn attach_ranks_defaults_missing_nodes_to_zero() {
        let mut graph = two_node_graph();
        let ranks = rank_vector(&[(batter_key(1), 0.6)]);
        attach_ranks(&mut graph, Statistic::WinProbability, &ranks);

        assert!(approx_eq(
            graph.node(batter_key(1)).unwrap().rank.wpa,
            0.6,
            1e-12
        ));
        assert!(approx_eq(
            graph.node(pitcher_key(2)).unwrap().rank.wpa,
            0.0,
            1e-12
        ));
    }

    #[test]
    fn derived_weight_is_product_of_endpoint_ranks() {
        let mut graph = two_node_graph();
        attach_ranks(
            &mut graph,
            Statistic::WinProbability,
            &rank_vector(&[(batter_key(1), 0.6), (pitcher_key(2), 0.4)]),
        );
        derive_edge_weights(&mut graph);

        for (_, _, edge) in graph.edge_views() {
            assert!(approx_eq(edge.derived.wpa, 0.24, 1e-12));
        }
    }

    #[test]
    fn derived_weight_defined_for_edges_without_the_label() {
        let mut graph = two_node_graph();
        // Only wpa ranks are attached; the re edge still gets a wpa-derived
        // weight, and its re-derived weight is 0 because re ranks default 0.
        attach_ranks(
            &mut graph,
            Statistic::WinProbability,
            &rank_vector(&[(batter_key(1), 0.6), (pitcher_key(2), 0.4)]),
        );
        derive_edge_weights(&mut graph);

        let re_edge = graph
            .edge_views()
            .find(|(_, _, e)| e.stat == Statistic::RunExpectancy)
            .map(|(_, _, e)| e.clone())
            .unwrap();
        assert!(approx_eq(re_edge.derived.wpa, 0.24, 1e-12));
        assert!(approx_eq(re_edge.derived.re, 0.0, 1e-12));
    }

    #[test]
    fn rescale_maps_maximum_to_one() {
        let batters = vec![
            make_player(1, Role::Batter, "NYY", 1_000_000.0),
            make_player(3, Role::Batter, "NYY", 1_000_000.0),
        ];
        let pitchers = vec![make_player(2, Role::Pitcher, "BOS", 2_000_000.0)];
        let mut matchups = BTreeMap::new();
        matchups.insert(
            MatchupKey { batter: 1, pitcher: 2 },
            StatTriple::new(0.5, 0.0, 0.0),
        );
        matchups.insert(
            MatchupKey { batter: 3, pitcher: 2 },
            StatTriple::new(0.3, 0.0, 0.0),
        );
        let mut graph = MatchupGraph::build(&batters, &pitchers, &matchups).unwrap();

        attach_ranks(
            &mut graph,
            Statistic::WinProbability,
            &rank_vector(&[
                (batter_key(1), 0.5),
                (batter_key(3), 0.2),
                (pitcher_key(2), 0.3),
            ]),
        );
        derive_edge_weights(&mut graph);
        rescale_edge_weights(&mut graph, Statistic::WinProbability).unwrap();

        let scaled: Vec<f64> = graph
            .edge_views()
            .map(|(_, _, e)| e.scaled.wpa)
            .collect();
        let max = scaled.iter().copied().fold(0.0_f64, f64::max);
        assert!(approx_eq(max, 1.0, 1e-12));
        assert!(scaled.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn rescale_with_zero_maximum_is_an_explicit_error() {
        // Ranks never attached: every derived weight is 0.
        let mut graph = two_node_graph();
        derive_edge_weights(&mut graph);

        let err = rescale_edge_weights(&mut graph, Statistic::OutcomeScore).unwrap_err();
        match err {
            RankError::NoRankableEdges { stat } => {
                assert_eq!(stat, Statistic::OutcomeScore);
            }
        }

        // Scaled weights stay untouched, no NaN leaks out.
        for (_, _, edge) in graph.edge_views() {
            assert!(edge.scaled.score.is_finite());
            assert!(approx_eq(edge.scaled.score, 0.0, 1e-12));
        }
    }

    #[test]
    fn team_rollups_sum_players_and_merge_records() {
        let batters = vec![
            make_player(1, Role::Batter, "NYY", 1_000_000.0),
            make_player(3, Role::Batter, "NYY", 4_000_000.0),
        ];
        let pitchers = vec![make_player(2, Role::Pitcher, "BOS", 2_000_000.0)];
        let mut matchups = BTreeMap::new();
        matchups.insert(
            MatchupKey { batter: 1, pitcher: 2 },
            StatTriple::new(0.5, 0.0, 0.0),
        );
        let mut graph = MatchupGraph::build(&batters, &pitchers, &matchups).unwrap();
        attach_ranks(
            &mut graph,
            Statistic::WinProbability,
            &rank_vector(&[
                (batter_key(1), 0.5),
                (batter_key(3), 0.1),
                (pitcher_key(2), 0.4),
            ]),
        );

        let mut records = BTreeMap::new();
        records.insert("NYY".to_string(), WinLoss { wins: 3, losses: 1 });
        records.insert("BOS".to_string(), WinLoss { wins: 1, losses: 3 });

        let rollups = team_rollups(&graph, &records);
        assert_eq!(rollups.len(), 2);

        // BTreeMap order: BOS before NYY.
        assert_eq!(rollups[0].team, "BOS");
        assert_eq!(rollups[0].wins, 1);
        assert!(approx_eq(rollups[0].payroll, 2_000_000.0, 1e-6));
        assert!(approx_eq(rollups[0].rank_totals.wpa, 0.4, 1e-12));

        assert_eq!(rollups[1].team, "NYY");
        assert_eq!(rollups[1].losses, 1);
        assert!(approx_eq(rollups[1].payroll, 5_000_000.0, 1e-6));
        assert!(approx_eq(rollups[1].rank_totals.wpa, 0.6, 1e-12));
        // Two players with cumulative wpa 1.0 each.
        assert!(approx_eq(rollups[1].stat_totals.wpa, 2.0, 1e-12));
    }

    #[test]
    fn players_without_a_matching_team_record_are_skipped() {
        let batters = vec![make_player(1, Role::Batter, "Multiple", 1_000_000.0)];
        let pitchers = vec![make_player(2, Role::Pitcher, "BOS", 2_000_000.0)];
        let graph = MatchupGraph::with_players(&batters, &pitchers);

        let mut records = BTreeMap::new();
        records.insert("BOS".to_string(), WinLoss { wins: 2, losses: 2 });

        let rollups = team_rollups(&graph, &records);
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].team, "BOS");
        assert!(approx_eq(rollups[0].payroll, 2_000_000.0, 1e-6));
    }
}
