use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use vm_audio::analyzer::SignalAnalyzer;
use vm_audio::batch_analyzer::{BatchAnalyzer, SessionReport};
use vm_audio::capture::AudioCapture;
use vm_audio::classify::ClassifierMode;
use vm_audio::driver::SamplingDriver;
use vm_core::config::AnalyzerConfig;
use vm_core::metrics::AnalysisResult;
use vm_core::voice_log::VoiceLog;

/// Session micro de `seconds` secondes.
///
/// # Errors
/// Returns an error if no input device is available or sampling fails.
pub fn record(config: &AnalyzerConfig, seconds: u64, mode: ClassifierMode) -> Result<()> {
    let capture = AudioCapture::start_default()?;

    let mut analyzer = SignalAnalyzer::new(config.clone());
    analyzer.initialize();
    analyzer.connect_stream(capture)?;
    analyzer.start()?;

    let mut driver = SamplingDriver::spawn(analyzer, config.tick_rate)?;
    let deadline = Instant::now() + Duration::from_secs(seconds);
    let mut stderr = std::io::stderr();

    while Instant::now() < deadline {
        let reading = driver.latest_reading();
        let pitch = reading.pitch.map_or_else(|| "---".to_string(), |p| format!("{p:.0}"));
        let _ = write!(
            stderr,
            "\r{:5.1}s  rms {:.3}  pitch {pitch:>4} Hz ",
            driver.elapsed_secs(),
            reading.rms
        );
        let _ = stderr.flush();
        thread::sleep(Duration::from_millis(100));
    }
    let _ = writeln!(stderr);

    let mut analyzer = driver.stop()?;
    let report = SessionReport {
        duration_secs: analyzer.clock().pos_secs(),
        sample_rate: analyzer.sample_rate(),
        frames: analyzer.samples().frame_count(),
        result: analyzer.analyze(mode),
    };
    // Releases the microphone.
    analyzer.destroy();

    print_json(&report)
}

/// Analyse offline d'un fichier.
///
/// # Errors
/// Returns an error if the file cannot be decoded.
pub fn analyze(config: &AnalyzerConfig, file: &Path, mode: ClassifierMode) -> Result<()> {
    let report = BatchAnalyzer::new(config.clone(), mode).analyze_file(file)?;
    print_json(&report)
}

/// Rapport de déviation d'un vecteur courant contre l'historique.
///
/// # Errors
/// Returns an error if an input file is unreadable or malformed, or if the
/// current vector is not 30-dimensional.
pub fn baseline(
    config: &AnalyzerConfig,
    current: &Path,
    history: &Path,
    lookback_days: u32,
) -> Result<()> {
    let current: Vec<f64> = read_json(current)?;
    let mut history: Vec<VoiceLog> = read_json(history)?;

    let now = Utc::now();
    vm_baseline::prune_history(&mut history, now, config.retention_days);

    let result = vm_baseline::calculate_z_scores_at(&current, &history, lookback_days, now)?;
    print_json(&result)
}

/// Dérive entre deux résultats d'analyse enregistrés.
///
/// # Errors
/// Returns an error if an input file is unreadable or malformed.
pub fn drift(baseline: &Path, current: &Path, baseline_date: DateTime<Utc>) -> Result<()> {
    let baseline: AnalysisResult = read_json(baseline)?;
    let current: AnalysisResult = read_json(current)?;

    let analysis = vm_baseline::calculate_drift(&baseline.metrics, &current.metrics, baseline_date);
    log::info!("{}", analysis.narrative());
    print_json(&analysis)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("JSON invalide dans {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
