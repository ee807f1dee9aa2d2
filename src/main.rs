// Matchup ranking pipeline entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr)
// 2. Load config (explicit path argument, or config/ranking.toml, or defaults)
// 3. Run the batch pipeline
// 4. Log the run summary and written artifacts

use std::path::Path;

use anyhow::Context;
use tracing::info;

use sabergraph::config;
use sabergraph::pipeline;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to stderr)
    init_tracing()?;
    info!("sabergraph starting up");

    // 2. Load config
    let config = match std::env::args().nth(1) {
        Some(path) => config::load_config(Path::new(&path))
            .with_context(|| format!("failed to load configuration from {path}"))?,
        None => config::load_or_default(Path::new(".")).context("failed to load configuration")?,
    };
    info!(
        "config loaded: damping={}, max_iterations={}, min_appearances={}",
        config.ranking.damping, config.ranking.max_iterations, config.ranking.min_appearances
    );

    // 3. Run the batch pipeline
    let summary = pipeline::run(&config).context("pipeline failed")?;

    // 4. Log the run summary and written artifacts
    info!(
        "ranked {} players across {} matchups ({} edges), {} games, {} teams",
        summary.players, summary.matchups, summary.edges, summary.games, summary.teams
    );
    for stat in &summary.skipped_stats {
        info!("statistic {stat} had no rankable edges and was skipped during rescaling");
    }
    for path in &summary.outputs {
        info!("wrote {}", path.display());
    }

    Ok(())
}

/// Initialize tracing to stderr so artifact paths on stdout stay clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sabergraph=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(())
}
