// Play-by-play event loading.
//
// Reads the statcast-export CSV produced by the upstream ingestion step. Each
// row is one plate-appearance outcome with home-perspective win probability
// and run expectancy deltas plus the post-event scoreboard.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::ingest::IngestError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which half of the inning an event occurred in. Top means the away team is
/// batting, Bottom means the home team is batting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfInning {
    Top,
    Bottom,
}

/// One normalized play-by-play event.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub batter: u32,
    pub pitcher: u32,
    pub event_type: String,
    /// Change in home win expectancy caused by this event.
    pub delta_win_exp: f64,
    /// Change in home run expectancy caused by this event.
    pub delta_run_exp: f64,
    pub half: HalfInning,
    pub game_id: u64,
    pub home_team: String,
    pub away_team: String,
    pub at_bat_number: u32,
    pub pitch_number: u32,
    pub post_home_score: u32,
    pub post_away_score: u32,
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private) — statcast export format
// ---------------------------------------------------------------------------

/// Raw event row. Extra statcast columns are absorbed via `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawEventRow {
    batter: u32,
    pitcher: u32,
    events: String,
    delta_home_win_exp: f64,
    delta_run_exp: f64,
    inning_topbot: String,
    game_pk: u64,
    home_team: String,
    away_team: String,
    at_bat_number: u32,
    pitch_number: u32,
    post_home_score: u32,
    post_away_score: u32,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns true if all given f64 values are finite (not NaN or Infinity).
fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn parse_half(raw: &str) -> Option<HalfInning> {
    match raw.trim() {
        "Top" => Some(HalfInning::Top),
        "Bot" | "Bottom" => Some(HalfInning::Bottom),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_events_from_reader<R: Read>(rdr: R) -> Result<Vec<EventRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut events = Vec::new();
    for result in reader.deserialize::<RawEventRow>() {
        match result {
            Ok(raw) => {
                if !all_finite(&[raw.delta_home_win_exp, raw.delta_run_exp]) {
                    warn!(
                        "skipping event for batter {}: non-finite delta value",
                        raw.batter
                    );
                    continue;
                }
                let Some(half) = parse_half(&raw.inning_topbot) else {
                    warn!(
                        "skipping event for batter {}: unknown half-inning '{}'",
                        raw.batter, raw.inning_topbot
                    );
                    continue;
                };
                events.push(EventRecord {
                    batter: raw.batter,
                    pitcher: raw.pitcher,
                    event_type: raw.events.trim().to_string(),
                    delta_win_exp: raw.delta_home_win_exp,
                    delta_run_exp: raw.delta_run_exp,
                    half,
                    game_id: raw.game_pk,
                    home_team: raw.home_team.trim().to_string(),
                    away_team: raw.away_team.trim().to_string(),
                    at_bat_number: raw.at_bat_number,
                    pitch_number: raw.pitch_number,
                    post_home_score: raw.post_home_score,
                    post_away_score: raw.post_away_score,
                });
            }
            Err(e) => {
                warn!("skipping malformed event row: {}", e);
            }
        }
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load play-by-play events from a CSV file.
pub fn load_events(path: &Path) -> Result<Vec<EventRecord>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_events_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
