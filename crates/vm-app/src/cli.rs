use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use vm_audio::classify::ClassifierMode;

/// voicemirror — analyse vocale temps réel et déviation de baseline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Session micro live ; affiche métriques et code en JSON.
    Record {
        /// Durée de la session (s).
        #[arg(long, default_value_t = 10)]
        seconds: u64,

        /// Classifieur : standard ou prosody.
        #[arg(long, default_value = "standard")]
        mode: ClassifierMode,
    },

    /// Analyse offline d'un fichier audio (WAV, MP3, FLAC, OGG).
    Analyze {
        /// Fichier à analyser.
        file: PathBuf,

        /// Classifieur : standard ou prosody.
        #[arg(long, default_value = "standard")]
        mode: ClassifierMode,
    },

    /// Compare un vecteur 30D à l'historique ; affiche le rapport en JSON.
    Baseline {
        /// JSON : tableau de 30 nombres.
        #[arg(long)]
        current: PathBuf,

        /// JSON : tableau d'entrées d'historique.
        #[arg(long)]
        history: PathBuf,

        /// Fenêtre de baseline (jours). Défaut : valeur de la config.
        #[arg(long)]
        lookback_days: Option<u32>,
    },

    /// Dérive entre deux passes ; affiche le rapport en JSON.
    Drift {
        /// JSON de la passe de référence (sortie de `analyze` ou `record`).
        #[arg(long)]
        baseline: PathBuf,

        /// JSON de la passe courante.
        #[arg(long)]
        current: PathBuf,

        /// Date de la passe de référence, RFC 3339.
        #[arg(long)]
        baseline_date: DateTime<Utc>,
    },
}
