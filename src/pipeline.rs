// End-to-end batch pipeline.
//
// Stages run strictly in order, each consuming the previous stage's fully
// materialized output: ingest, eligibility filter, attribution, game
// outcomes, matchup aggregation, graph construction, per-statistic
// normalization and PageRank, score propagation, team rollups, report.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::ingest::{self, IngestError};
use crate::outcomes;
use crate::rank::aggregate::MatchupAccumulator;
use crate::rank::attribution::{attribute_all, ScoreTable};
use crate::rank::graph::{GraphError, MatchupGraph};
use crate::rank::normalize::normalize_for_stat;
use crate::rank::pagerank::{pagerank, PageRankParams};
use crate::rank::propagate::{
    attach_ranks, derive_edge_weights, rescale_edge_weights, team_rollups,
};
use crate::rank::Statistic;
use crate::report::{self, ReportError};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts and paths describing one completed pipeline run.
#[derive(Debug)]
pub struct PipelineSummary {
    pub players: usize,
    pub matchups: usize,
    pub edges: usize,
    pub games: usize,
    pub teams: usize,
    /// Statistics whose derived edge weights could not be rescaled because
    /// no edge carried any rank mass.
    pub skipped_stats: Vec<Statistic>,
    pub outputs: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run the full pipeline against the configured inputs and write every
/// output artifact.
pub fn run(config: &Config) -> Result<PipelineSummary, PipelineError> {
    // Ingest and eligibility.
    let dataset = ingest::load_all(&config.data)?;
    info!(
        "loaded {} events, {} batters, {} pitchers",
        dataset.events.len(),
        dataset.batters.len(),
        dataset.pitchers.len()
    );
    let (events, batters, pitchers) = ingest::eligibility::apply_eligibility(
        dataset.events,
        dataset.batters,
        dataset.pitchers,
        config.ranking.min_appearances,
    );
    if events.is_empty() {
        warn!("no events survive eligibility filtering; outputs will be empty");
    }

    // Attribution and game outcomes.
    let scores = ScoreTable::with_overrides(&config.event_scores);
    let attributed = attribute_all(&events, &scores);
    let game_outcomes = outcomes::determine_outcomes(&events, &attributed);
    let records = outcomes::team_records(&game_outcomes);
    info!(
        "resolved {} games across {} teams",
        game_outcomes.len(),
        records.len()
    );

    // Matchup aggregation and graph construction.
    let mut accumulator = MatchupAccumulator::new();
    for event in &attributed {
        accumulator.record(event);
    }
    let matchups = accumulator.finish();
    let matchup_count = matchups.len();

    let mut graph = MatchupGraph::build(&batters, &pitchers, &matchups)?;
    info!(
        "matchup graph built: {} nodes, {} edges from {} matchups",
        graph.node_count(),
        graph.edge_count(),
        matchup_count
    );
    for violation in graph.check_edge_invariant() {
        warn!(
            "edge ceiling exceeded: {} -> {} carries {} edges",
            violation.source, violation.target, violation.count
        );
    }

    // Per-statistic normalization and ranking.
    let params = PageRankParams {
        damping: config.ranking.damping,
        max_iterations: config.ranking.max_iterations,
        tolerance: config.ranking.tolerance,
    };
    for stat in Statistic::ALL {
        let normalized = normalize_for_stat(&graph, stat);
        let ranks = pagerank(&normalized, &params);
        info!(
            "pagerank({stat}): {} nodes, {} iterations, converged={}",
            normalized.node_count(),
            ranks.iterations,
            ranks.converged
        );
        attach_ranks(&mut graph, stat, &ranks);
    }

    // Propagation back onto edges.
    derive_edge_weights(&mut graph);
    let mut skipped_stats = Vec::new();
    for stat in Statistic::ALL {
        if let Err(e) = rescale_edge_weights(&mut graph, stat) {
            warn!("{e}; scaled weights left at zero");
            skipped_stats.push(stat);
        }
    }

    // Team rollups and artifacts.
    let teams = team_rollups(&graph, &records);
    let outputs = report::write_all(Path::new(&config.output.dir), &graph, &teams, &game_outcomes)?;

    Ok(PipelineSummary {
        players: graph.node_count(),
        matchups: matchup_count,
        edges: graph.edge_count(),
        games: game_outcomes.len(),
        teams: teams.len(),
        skipped_stats,
        outputs,
    })
}
