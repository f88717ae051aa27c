use std::path::Path;

use anyhow::Result;
use clap::Parser;
use vm_core::config::{AnalyzerConfig, load_config};

pub mod cli;
pub mod commands;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config
    let config = resolve_config(&cli.config)?;

    // 4. Exécuter la sous-commande
    match cli.command {
        cli::Command::Record { seconds, mode } => commands::record(&config, seconds, mode),
        cli::Command::Analyze { file, mode } => commands::analyze(&config, &file, mode),
        cli::Command::Baseline {
            current,
            history,
            lookback_days,
        } => commands::baseline(
            &config,
            &current,
            &history,
            lookback_days.unwrap_or(config.lookback_days),
        ),
        cli::Command::Drift {
            baseline,
            current,
            baseline_date,
        } => commands::drift(&baseline, &current, baseline_date),
    }
}

/// Missing config file falls back to defaults; a broken one is an error.
fn resolve_config(path: &Path) -> Result<AnalyzerConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(AnalyzerConfig::default())
    }
}
