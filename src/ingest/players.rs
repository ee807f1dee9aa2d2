// Player stat table loading.
//
// Reads the per-player stat CSVs produced upstream: one table for batters
// (id column "batter") and one for pitchers (id column "pitcher"), both with
// season-cumulative deltas and a payroll (AAV) column.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::ingest::IngestError;

/// League-minimum payroll value used when a player has no AAV entry.
pub const DEFAULT_AAV: f64 = 720_000.0;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which side of a matchup a player record belongs to. A player who both bats
/// and pitches appears in both tables and is treated as two distinct nodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batter,
    Pitcher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Batter => "batter",
            Role::Pitcher => "pitcher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a player stat table.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: u32,
    pub role: Role,
    pub name: String,
    pub team: String,
    pub cumulative_wpa: f64,
    pub cumulative_re: f64,
    pub cumulative_score: f64,
    pub aav: f64,
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Raw player row. The id column is named after the role ("batter" or
/// "pitcher"), handled via serde aliases. A missing AAV column falls back to
/// the league minimum.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawPlayerRow {
    #[serde(alias = "batter", alias = "pitcher")]
    player_id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    team: String,
    cumulative_wpa: f64,
    cumulative_re: f64,
    cumulative_score: f64,
    #[serde(default = "default_aav")]
    aav: f64,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

fn default_aav() -> f64 {
    DEFAULT_AAV
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(
    rdr: R,
    role: Role,
) -> Result<Vec<PlayerRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => {
                if !raw.cumulative_wpa.is_finite()
                    || !raw.cumulative_re.is_finite()
                    || !raw.cumulative_score.is_finite()
                    || !raw.aav.is_finite()
                {
                    warn!(
                        "skipping {} {}: non-finite stat value",
                        role, raw.player_id
                    );
                    continue;
                }
                players.push(PlayerRecord {
                    id: raw.player_id,
                    role,
                    name: raw.name.trim().to_string(),
                    team: raw.team.trim().to_string(),
                    cumulative_wpa: raw.cumulative_wpa,
                    cumulative_re: raw.cumulative_re,
                    cumulative_score: raw.cumulative_score,
                    aav: raw.aav,
                });
            }
            Err(e) => {
                warn!("skipping malformed {} row: {}", role, e);
            }
        }
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load a player stat table from a CSV file, tagging every row with the
/// given role.
pub fn load_players(path: &Path, role: Role) -> Result<Vec<PlayerRecord>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_players_from_reader(file, role).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
