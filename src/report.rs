// Output artifacts.
//
// Serializes the annotated multigraph, the combined player ranking table,
// the team rollup table, and the per-game results as CSV files under the
// configured output directory.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ingest::players::Role;
use crate::outcomes::GameOutcome;
use crate::rank::graph::MatchupGraph;
use crate::rank::propagate::TeamAggregate;
use crate::rank::Statistic;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> ReportError + '_ {
    move |e| ReportError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PlayerRow<'a> {
    player_id: u32,
    name: &'a str,
    team: &'a str,
    role: Role,
    cumulative_wpa: f64,
    cumulative_re: f64,
    cumulative_score: f64,
    aav: f64,
    pagerank_wpa: f64,
    pagerank_re: f64,
    pagerank_score: f64,
}

#[derive(Debug, Serialize)]
struct EdgeRow {
    source_id: u32,
    source_role: Role,
    target_id: u32,
    target_role: Role,
    stat: Statistic,
    value: f64,
    weight_wpa: f64,
    weight_re: f64,
    weight_score: f64,
    weight_wpa_scaled: f64,
    weight_re_scaled: f64,
    weight_score_scaled: f64,
}

#[derive(Debug, Serialize)]
struct TeamRow<'a> {
    team: &'a str,
    wins: u32,
    losses: u32,
    total_wpa: f64,
    total_re: f64,
    total_score: f64,
    pagerank_wpa: f64,
    pagerank_re: f64,
    pagerank_score: f64,
    total_aav: f64,
}

#[derive(Debug, Serialize)]
struct GameRow<'a> {
    game_pk: u64,
    home_team: &'a str,
    away_team: &'a str,
    home_points: u32,
    away_points: u32,
    winner: &'a str,
    home_team_wpa: f64,
    away_team_wpa: f64,
    home_team_re: f64,
    away_team_re: f64,
    home_team_score: f64,
    away_team_score: f64,
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write the combined per-player ranking table. This doubles as the graph's
/// node list: every row is one node with its cumulative stats and ranks.
pub fn write_player_table(path: &Path, graph: &MatchupGraph) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for player in graph.players() {
        writer
            .serialize(PlayerRow {
                player_id: player.key.id,
                name: &player.name,
                team: &player.team,
                role: player.key.role,
                cumulative_wpa: player.totals.wpa,
                cumulative_re: player.totals.re,
                cumulative_score: player.totals.score,
                aav: player.aav,
                pagerank_wpa: player.rank.wpa,
                pagerank_re: player.rank.re,
                pagerank_score: player.rank.score,
            })
            .map_err(csv_err(path))?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write the multigraph's edge list with statistic labels, signed
/// magnitudes, and the derived and rescaled weights.
pub fn write_edge_table(path: &Path, graph: &MatchupGraph) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for (source, target, edge) in graph.edge_views() {
        writer
            .serialize(EdgeRow {
                source_id: source.key.id,
                source_role: source.key.role,
                target_id: target.key.id,
                target_role: target.key.role,
                stat: edge.stat,
                value: edge.value,
                weight_wpa: edge.derived.wpa,
                weight_re: edge.derived.re,
                weight_score: edge.derived.score,
                weight_wpa_scaled: edge.scaled.wpa,
                weight_re_scaled: edge.scaled.re,
                weight_score_scaled: edge.scaled.score,
            })
            .map_err(csv_err(path))?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write the team rollup table.
pub fn write_team_table(path: &Path, teams: &[TeamAggregate]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for team in teams {
        writer
            .serialize(TeamRow {
                team: &team.team,
                wins: team.wins,
                losses: team.losses,
                total_wpa: team.stat_totals.wpa,
                total_re: team.stat_totals.re,
                total_score: team.stat_totals.score,
                pagerank_wpa: team.rank_totals.wpa,
                pagerank_re: team.rank_totals.re,
                pagerank_score: team.rank_totals.score,
                total_aav: team.payroll,
            })
            .map_err(csv_err(path))?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write the per-game results table.
pub fn write_game_results(path: &Path, outcomes: &[GameOutcome]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for outcome in outcomes {
        writer
            .serialize(GameRow {
                game_pk: outcome.game_id,
                home_team: &outcome.home_team,
                away_team: &outcome.away_team,
                home_points: outcome.home_score,
                away_points: outcome.away_score,
                winner: &outcome.winner,
                home_team_wpa: outcome.home_totals.wpa,
                away_team_wpa: outcome.away_totals.wpa,
                home_team_re: outcome.home_totals.re,
                away_team_re: outcome.away_totals.re,
                home_team_score: outcome.home_totals.score,
                away_team_score: outcome.away_totals.score,
            })
            .map_err(csv_err(path))?;
    }
    writer.flush().map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write every artifact under the output directory, creating it if needed.
/// Returns the written paths.
pub fn write_all(
    dir: &Path,
    graph: &MatchupGraph,
    teams: &[TeamAggregate],
    outcomes: &[GameOutcome],
) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(dir).map_err(|e| ReportError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let players_path = dir.join("combined_player_stats.csv");
    let edges_path = dir.join("graph_edges.csv");
    let teams_path = dir.join("updated_team_stats.csv");
    let games_path = dir.join("game_results.csv");

    write_player_table(&players_path, graph)?;
    write_edge_table(&edges_path, graph)?;
    write_team_table(&teams_path, teams)?;
    write_game_results(&games_path, outcomes)?;

    Ok(vec![players_path, edges_path, teams_path, games_path])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
