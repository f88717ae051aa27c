use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration complète de l'analyse, chargeable depuis TOML.
///
/// Chaque champ a une valeur par défaut saine. Les seuils de classification
/// et les gates de signal ne sont PAS configurables : ce sont des constantes
/// du pipeline.
///
/// # Example
/// ```
/// use vm_core::config::AnalyzerConfig;
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.fft_size, 2048);
/// assert_eq!(config.lookback_days, 30);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    // === Graphe d'analyse ===
    /// Taille de la transformée (puissance de 2, [32, 32768]).
    pub fft_size: usize,
    /// Lissage temporel du spectre [0.0, 1.0).
    pub smoothing: f32,
    /// Borne basse (dB) du spectre quantifié sur 8 bits.
    pub min_db: f32,
    /// Borne haute (dB) du spectre quantifié sur 8 bits.
    pub max_db: f32,
    /// Sample rate utilisé tant qu'aucun stream n'est branché.
    pub fallback_sample_rate: u32,

    // === Driver ===
    /// Ticks d'échantillonnage par seconde (cadence de rendu de l'hôte).
    pub tick_rate: u32,

    // === Baseline ===
    /// Fenêtre d'historique prise en compte pour la baseline (jours).
    pub lookback_days: u32,
    /// Durée de rétention de l'historique (jours).
    pub retention_days: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
            fallback_sample_rate: 16_000,
            tick_rate: 60,
            lookback_days: 30,
            retention_days: 60,
        }
    }
}

impl AnalyzerConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.fft_size = self.fft_size.clamp(32, 32768).next_power_of_two().min(32768);
        self.smoothing = self.smoothing.clamp(0.0, 0.99);
        self.min_db = self.min_db.clamp(-200.0, 0.0);
        self.max_db = self.max_db.clamp(-200.0, 0.0);
        if self.max_db <= self.min_db {
            log::warn!(
                "max_db ({}) <= min_db ({}), retour aux bornes par défaut",
                self.max_db,
                self.min_db
            );
            self.min_db = -100.0;
            self.max_db = -30.0;
        }
        self.fallback_sample_rate = self.fallback_sample_rate.clamp(8_000, 192_000);
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.lookback_days = self.lookback_days.clamp(1, 3650);
        self.retention_days = self.retention_days.clamp(self.lookback_days, 3650);
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    analyzer: Option<AnalyzerSection>,
    baseline: Option<BaselineSection>,
}

/// Analyzer section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct AnalyzerSection {
    fft_size: Option<usize>,
    smoothing: Option<f32>,
    min_db: Option<f32>,
    max_db: Option<f32>,
    fallback_sample_rate: Option<u32>,
    tick_rate: Option<u32>,
}

/// Baseline section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct BaselineSection {
    lookback_days: Option<u32>,
    retention_days: Option<u32>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use vm_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = AnalyzerConfig::default();

    if let Some(a) = file.analyzer {
        if let Some(v) = a.fft_size {
            config.fft_size = v;
        }
        if let Some(v) = a.smoothing {
            config.smoothing = v;
        }
        if let Some(v) = a.min_db {
            config.min_db = v;
        }
        if let Some(v) = a.max_db {
            config.max_db = v;
        }
        if let Some(v) = a.fallback_sample_rate {
            config.fallback_sample_rate = v;
        }
        if let Some(v) = a.tick_rate {
            config.tick_rate = v;
        }
    }

    if let Some(b) = file.baseline {
        if let Some(v) = b.lookback_days {
            config.lookback_days = v;
        }
        if let Some(v) = b.retention_days {
            config.retention_days = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = match tempfile::NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => panic!("tempfile: {e}"),
        };
        if let Err(e) = file.write_all(content.as_bytes()) {
            panic!("write: {e}");
        }
        file
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let file = write_temp("[analyzer]\nsmoothing = 0.5\n\n[baseline]\nlookback_days = 14\n");
        let config = match load_config(file.path()) {
            Ok(c) => c,
            Err(e) => panic!("load_config: {e}"),
        };
        assert!((config.smoothing - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.fft_size, 2048);
        assert_eq!(config.retention_days, 60);
    }

    #[test]
    fn empty_file_is_default() {
        let file = write_temp("");
        let config = load_config(file.path()).unwrap_or_else(|e| panic!("load_config: {e}"));
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let file = write_temp(
            "[analyzer]\nfft_size = 1000\nsmoothing = 4.0\nmin_db = -20.0\nmax_db = -60.0\ntick_rate = 1\n",
        );
        let config = load_config(file.path()).unwrap_or_else(|e| panic!("load_config: {e}"));
        assert_eq!(config.fft_size, 1024);
        assert!(config.smoothing < 1.0);
        assert!((config.min_db + 100.0).abs() < f32::EPSILON);
        assert!((config.max_db + 30.0).abs() < f32::EPSILON);
        assert_eq!(config.tick_rate, 10);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let file = write_temp("[analyzer\nfft_size = ");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn shipped_default_file_matches_builtin_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = load_config(&path).unwrap_or_else(|e| panic!("load_config: {e}"));
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/definitely/not/here.toml")).is_err());
    }
}
