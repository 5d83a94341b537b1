// Batch runner entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr)
// 2. Load slate.toml (path from the first argument, default "slate.toml")
// 3. Load the game logs for the configured date window
// 4. Run the preparation pipeline
// 5. Log a Fan Points summary for the training frame

use std::path::Path;

use anyhow::Context;
use tracing::info;

use slate_prep::calculator::ScoreCalculator;
use slate_prep::config::{self, SharedWeights};

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "slate.toml".to_string());
    let config = config::load_config(Path::new(&config_path))
        .with_context(|| format!("failed to load configuration from {config_path}"))?;
    info!(
        data_dir = %config.data.data_dir.display(),
        game_date = %config.data.resolved_date(),
        training_days = config.data.training_days,
        validation = config.data.validation,
        "configuration loaded"
    );

    let shared = SharedWeights::new(config.weights);
    let mut calc =
        ScoreCalculator::from_config(&config, shared).context("failed to load game logs")?;
    info!(
        train_rows = calc.train().n_rows(),
        valid_rows = calc.valid().map_or(0, |frame| frame.n_rows()),
        "game logs loaded"
    );

    calc.prepare().context("preparation pipeline failed")?;

    let scores: Vec<f64> = calc
        .train()
        .require(calc.response())
        .context("scored frame is missing the response column")?
        .numeric_cells()
        .into_iter()
        .flatten()
        .collect();
    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    info!(
        rows_scored = scores.len(),
        mean_fan_points = %format!("{mean:.2}"),
        "training frame scored"
    );

    Ok(())
}

/// Initialize tracing to stderr with an env-filter override.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("slate_prep=info,slateprep=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
