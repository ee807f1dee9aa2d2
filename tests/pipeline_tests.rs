// Integration tests for the ranking pipeline.
//
// These tests exercise the full system end-to-end using the library crate's
// public API: CSV fixtures go in, the pipeline runs, and the written
// artifacts are read back and checked against the ranking invariants.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sabergraph::config::Config;
use sabergraph::pipeline::{self, PipelineError};
use sabergraph::rank::graph::GraphError;
use sabergraph::rank::Statistic;

// ===========================================================================
// Test helpers
// ===========================================================================

const EVENT_HEADER: &str = "batter,pitcher,events,delta_home_win_exp,delta_run_exp,inning_topbot,game_pk,home_team,away_team,at_bat_number,pitch_number,post_home_score,post_away_score";

const BATTER_HEADER: &str = "batter,name,team,cumulative_wpa,cumulative_re,cumulative_score,aav";

const PITCHER_HEADER: &str = "pitcher,name,team,cumulative_wpa,cumulative_re,cumulative_score,aav";

/// Two NYY batters facing two BOS pitchers across one game, all in the
/// bottom half so batter deltas keep the home perspective sign.
const EVENT_ROWS: &str = "\
1,10,single,0.10,0.20,Bot,100,NYY,BOS,1,1,0,0
2,10,strikeout,-0.05,-0.10,Bot,100,NYY,BOS,2,1,0,0
1,11,home_run,0.15,0.30,Bot,100,NYY,BOS,3,1,1,0
2,11,walk,0.02,0.05,Bot,100,NYY,BOS,4,2,1,0";

const BATTER_ROWS: &str = "\
1,\"Judge, Aaron\",NYY,0.25,0.50,2.90,36000000
2,\"Volpe, Anthony\",NYY,-0.03,-0.05,0.31,2500000";

const PITCHER_ROWS: &str = "\
10,\"Crochet, Garrett\",BOS,0.05,0.10,-0.56,30000000
11,\"Bello, Brayan\",BOS,-0.17,-0.35,-2.65,5500000";

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Write the three input CSVs into a fresh temp workspace and return a
/// config pointing at them.
fn fixture_config(dir_name: &str, events: &str, batters: &str, pitchers: &str) -> Config {
    let tmp = std::env::temp_dir().join(dir_name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(&tmp).unwrap();

    let events_path = tmp.join("event_data.csv");
    let batters_path = tmp.join("batter_stats.csv");
    let pitchers_path = tmp.join("pitcher_stats.csv");
    fs::write(&events_path, format!("{EVENT_HEADER}\n{events}")).unwrap();
    fs::write(&batters_path, format!("{BATTER_HEADER}\n{batters}")).unwrap();
    fs::write(&pitchers_path, format!("{PITCHER_HEADER}\n{pitchers}")).unwrap();

    let mut config = Config::default();
    config.data.events = events_path.display().to_string();
    config.data.batters = batters_path.display().to_string();
    config.data.pitchers = pitchers_path.display().to_string();
    config.output.dir = tmp.join("out").display().to_string();
    config.ranking.min_appearances = 1;
    config
}

fn read_csv(path: &Path) -> Vec<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .deserialize::<HashMap<String, String>>()
        .map(|r| r.unwrap())
        .collect()
}

fn column_sum(rows: &[HashMap<String, String>], column: &str) -> f64 {
    rows.iter()
        .map(|row| row[column].parse::<f64>().unwrap())
        .sum()
}

fn column_max(rows: &[HashMap<String, String>], column: &str) -> f64 {
    rows.iter()
        .map(|row| row[column].parse::<f64>().unwrap())
        .fold(0.0_f64, f64::max)
}

fn cleanup(config: &Config) {
    if let Some(parent) = PathBuf::from(&config.data.events).parent() {
        let _ = fs::remove_dir_all(parent);
    }
}

// ===========================================================================
// End-to-end run
// ===========================================================================

#[test]
fn full_pipeline_produces_consistent_artifacts() {
    let config = fixture_config(
        "sabergraph_it_full",
        EVENT_ROWS,
        BATTER_ROWS,
        PITCHER_ROWS,
    );

    let summary = pipeline::run(&config).expect("pipeline should succeed");

    // Four players, four matchups, every matchup emitting one edge per
    // statistic (no zero totals in the fixture).
    assert_eq!(summary.players, 4);
    assert_eq!(summary.matchups, 4);
    assert_eq!(summary.edges, 12);
    assert_eq!(summary.games, 1);
    assert_eq!(summary.teams, 2);
    assert!(summary.skipped_stats.is_empty());
    assert_eq!(summary.outputs.len(), 4);
    for path in &summary.outputs {
        assert!(path.exists(), "missing artifact {}", path.display());
    }

    let out_dir = PathBuf::from(&config.output.dir);

    // Player table: one row per node, ranks per statistic summing to 1
    // because every node participates in every statistic's graph here.
    let players = read_csv(&out_dir.join("combined_player_stats.csv"));
    assert_eq!(players.len(), 4);
    for column in ["pagerank_wpa", "pagerank_re", "pagerank_score"] {
        let total = column_sum(&players, column);
        assert!(
            approx_eq(total, 1.0, 1e-6),
            "{column} sums to {total}, expected 1"
        );
    }

    // Edge table: rescaled weights land in [0, 1] with the maximum at 1.
    let edges = read_csv(&out_dir.join("graph_edges.csv"));
    assert_eq!(edges.len(), 12);
    for column in [
        "weight_wpa_scaled",
        "weight_re_scaled",
        "weight_score_scaled",
    ] {
        assert!(approx_eq(column_max(&edges, column), 1.0, 1e-9));
        for row in &edges {
            let value: f64 = row[column].parse().unwrap();
            assert!((0.0..=1.0).contains(&value));
        }
    }

    // Team table: the home side won the only game, payrolls sum per team.
    let teams = read_csv(&out_dir.join("updated_team_stats.csv"));
    assert_eq!(teams.len(), 2);
    let nyy = teams.iter().find(|t| t["team"] == "NYY").unwrap();
    assert_eq!(nyy["wins"], "1");
    assert_eq!(nyy["losses"], "0");
    assert!(approx_eq(nyy["total_aav"].parse().unwrap(), 38_500_000.0, 1.0));
    let bos = teams.iter().find(|t| t["team"] == "BOS").unwrap();
    assert_eq!(bos["wins"], "0");
    assert_eq!(bos["losses"], "1");
    assert!(approx_eq(bos["total_aav"].parse().unwrap(), 35_500_000.0, 1.0));

    // Game results: one game, won by NYY at 1-0.
    let games = read_csv(&out_dir.join("game_results.csv"));
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["winner"], "NYY");
    assert_eq!(games[0]["home_points"], "1");
    assert_eq!(games[0]["away_points"], "0");

    cleanup(&config);
}

// ===========================================================================
// Statistic with no rankable edges
// ===========================================================================

#[test]
fn statistic_without_edges_is_skipped_not_nan() {
    // Every event type is unknown to the score table, so no score edges
    // exist and the score statistic cannot be rescaled.
    let events = "\
1,10,balk,0.10,0.20,Bot,100,NYY,BOS,1,1,0,0
2,10,pickoff,-0.05,-0.10,Bot,100,NYY,BOS,2,1,0,0
1,11,wild_pitch,0.15,0.30,Bot,100,NYY,BOS,3,1,1,0";
    let config = fixture_config("sabergraph_it_skipped", events, BATTER_ROWS, PITCHER_ROWS);

    let summary = pipeline::run(&config).expect("pipeline should succeed");

    assert_eq!(summary.skipped_stats, vec![Statistic::OutcomeScore]);

    let out_dir = PathBuf::from(&config.output.dir);
    let players = read_csv(&out_dir.join("combined_player_stats.csv"));
    for row in &players {
        let score_rank: f64 = row["pagerank_score"].parse().unwrap();
        assert!(approx_eq(score_rank, 0.0, 1e-12));
    }
    let edges = read_csv(&out_dir.join("graph_edges.csv"));
    for row in &edges {
        let scaled: f64 = row["weight_score_scaled"].parse().unwrap();
        assert!(scaled.is_finite());
        assert!(approx_eq(scaled, 0.0, 1e-12));
    }

    cleanup(&config);
}

// ===========================================================================
// Eligibility filtering
// ===========================================================================

#[test]
fn eligibility_threshold_shrinks_the_graph() {
    // Batter 2 appears once and falls below the threshold of 2.
    let events = "\
1,10,single,0.10,0.20,Bot,100,NYY,BOS,1,1,0,0
1,10,double,0.08,0.15,Bot,100,NYY,BOS,2,1,1,0
2,10,strikeout,-0.05,-0.10,Bot,100,NYY,BOS,3,1,1,0";
    let mut config =
        fixture_config("sabergraph_it_eligibility", events, BATTER_ROWS, PITCHER_ROWS);
    config.ranking.min_appearances = 2;

    let summary = pipeline::run(&config).expect("pipeline should succeed");

    // Batter 1 and pitcher 10 survive; batter 2 and pitcher 11 are dropped.
    assert_eq!(summary.players, 2);
    assert_eq!(summary.matchups, 1);

    let out_dir = PathBuf::from(&config.output.dir);
    let players = read_csv(&out_dir.join("combined_player_stats.csv"));
    assert_eq!(players.len(), 2);
    assert!(players.iter().any(|p| p["player_id"] == "1"));
    assert!(players.iter().all(|p| p["player_id"] != "2"));

    cleanup(&config);
}

// ===========================================================================
// Unknown player fail-fast
// ===========================================================================

#[test]
fn event_for_unlisted_player_fails_fast() {
    // Batter 5 has events but no stat table row, so the graph builder must
    // reject the matchup instead of inventing a phantom node.
    let events = "5,10,single,0.10,0.20,Bot,100,NYY,BOS,1,1,0,0";
    let config = fixture_config("sabergraph_it_unknown", events, BATTER_ROWS, PITCHER_ROWS);

    let err = pipeline::run(&config).expect_err("pipeline must fail");
    match err {
        PipelineError::Graph(GraphError::UnknownPlayer { id, .. }) => {
            assert_eq!(id, 5);
        }
        other => panic!("expected UnknownPlayer, got: {other}"),
    }

    cleanup(&config);
}
