// Tabular data ingestion: play-by-play events and per-player stat tables.

pub mod eligibility;
pub mod events;
pub mod players;

use std::path::Path;

use crate::config::DataPaths;
use self::events::EventRecord;
use self::players::{PlayerRecord, Role};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Combined dataset
// ---------------------------------------------------------------------------

/// All input tables loaded and ready for the ranking pipeline.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub events: Vec<EventRecord>,
    pub batters: Vec<PlayerRecord>,
    pub pitchers: Vec<PlayerRecord>,
}

/// Load all input tables from the configured paths and return the combined
/// `Dataset`. A table that yields zero valid rows is a validation error.
pub fn load_all(paths: &DataPaths) -> Result<Dataset, IngestError> {
    let events = events::load_events(Path::new(&paths.events))?;
    let batters = players::load_players(Path::new(&paths.batters), Role::Batter)?;
    let pitchers = players::load_players(Path::new(&paths.pitchers), Role::Pitcher)?;

    if events.is_empty() {
        return Err(IngestError::Validation(
            "event CSV produced zero valid rows".into(),
        ));
    }
    if batters.is_empty() {
        return Err(IngestError::Validation(
            "batter CSV produced zero valid rows".into(),
        ));
    }
    if pitchers.is_empty() {
        return Err(IngestError::Validation(
            "pitcher CSV produced zero valid rows".into(),
        ));
    }

    Ok(Dataset {
        events,
        batters,
        pitchers,
    })
}
