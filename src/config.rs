// Configuration loading and parsing (config/ranking.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data: DataPaths,
    pub output: OutputConfig,
    pub ranking: RankingParams,
    /// Overrides for the built-in event outcome score table. Keys are raw
    /// event type strings (e.g. "home_run"), values replace the defaults.
    pub event_scores: HashMap<String, f64>,
}

// ---------------------------------------------------------------------------
// ranking.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire ranking.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    data: DataPaths,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    ranking: RankingParams,
    #[serde(default)]
    event_scores: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub events: String,
    pub batters: String,
    pub pitchers: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            events: "data/event_data.csv".into(),
            batters: "data/batter_stats.csv".into(),
            pitchers: "data/pitcher_stats.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: "out".into() }
    }
}

/// Knobs for the ranking engine and the upstream eligibility filter.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingParams {
    /// PageRank damping factor, strictly between 0 and 1.
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Safety cap on power iterations, not an expected iteration count.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// L1 convergence tolerance, scaled by node count during iteration.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Minimum event appearances for a player to enter the graph.
    #[serde(default = "default_min_appearances")]
    pub min_appearances: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            min_appearances: default_min_appearances(),
        }
    }
}

fn default_damping() -> f64 {
    0.85
}

fn default_max_iterations() -> usize {
    10_000
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_min_appearances() -> usize {
    100
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from an explicit ranking.toml path.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        data: file.data,
        output: file.output,
        ranking: file.ranking,
        event_scores: file.event_scores,
    };

    validate(&config)?;

    Ok(config)
}

/// Load `config/ranking.toml` relative to the given base directory, or fall
/// back to the built-in defaults when the file does not exist.
pub fn load_or_default(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("ranking.toml");
    if path.exists() {
        load_config(&path)
    } else {
        info!("no config file at {}, using built-in defaults", path.display());
        Ok(Config::default())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let r = &config.ranking;

    if !(r.damping > 0.0 && r.damping < 1.0) {
        return Err(ConfigError::ValidationError {
            field: "ranking.damping".into(),
            message: format!("must be strictly between 0 and 1, got {}", r.damping),
        });
    }

    if r.max_iterations == 0 {
        return Err(ConfigError::ValidationError {
            field: "ranking.max_iterations".into(),
            message: "must be greater than 0".into(),
        });
    }

    if !(r.tolerance > 0.0 && r.tolerance.is_finite()) {
        return Err(ConfigError::ValidationError {
            field: "ranking.tolerance".into(),
            message: format!("must be a positive finite number, got {}", r.tolerance),
        });
    }

    if r.min_appearances == 0 {
        return Err(ConfigError::ValidationError {
            field: "ranking.min_appearances".into(),
            message: "must be greater than 0".into(),
        });
    }

    let path_fields: &[(&str, &str)] = &[
        ("data.events", &config.data.events),
        ("data.batters", &config.data.batters),
        ("data.pitchers", &config.data.pitchers),
        ("output.dir", &config.output.dir),
    ];
    for (name, val) in path_fields {
        if val.is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    for (event, score) in &config.event_scores {
        if !score.is_finite() {
            return Err(ConfigError::ValidationError {
                field: format!("event_scores.{event}"),
                message: format!("must be finite, got {score}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
