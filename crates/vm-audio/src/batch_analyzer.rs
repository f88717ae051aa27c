use std::path::Path;

use serde::Serialize;
use vm_core::config::AnalyzerConfig;
use vm_core::metrics::AnalysisResult;

use crate::analyzer::SignalAnalyzer;
use crate::classify::ClassifierMode;
use crate::decode;
use crate::error::AudioError;
use crate::stream::SampleStream;

/// Rapport d'une analyse offline.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Durée du signal analysé (s).
    pub duration_secs: f64,
    /// Sample rate après décodage (Hz).
    pub sample_rate: u32,
    /// Frames non silencieuses retenues.
    pub frames: usize,
    /// Code et métriques, identiques à une session live.
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// Analyseur offline : rejoue un signal complet tick par tick.
///
/// Le signal passe par un [`SampleStream`] de `sample_rate / tick_rate`
/// échantillons par lecture, donc par exactement le même chemin qu'un micro.
///
/// # Example
/// ```
/// use vm_audio::batch_analyzer::BatchAnalyzer;
/// use vm_audio::classify::ClassifierMode;
/// use vm_core::config::AnalyzerConfig;
///
/// let batch = BatchAnalyzer::new(AnalyzerConfig::default(), ClassifierMode::Standard);
/// let report = batch.analyze_samples(vec![0.0; 16_000], 16_000).unwrap();
/// assert_eq!(report.frames, 0);
/// assert_eq!(report.result.metrics.pitch, 150.0);
/// ```
pub struct BatchAnalyzer {
    config: AnalyzerConfig,
    mode: ClassifierMode,
}

impl BatchAnalyzer {
    #[must_use]
    pub fn new(config: AnalyzerConfig, mode: ClassifierMode) -> Self {
        Self { config, mode }
    }

    /// Samples fed per tick at `sample_rate`.
    #[must_use]
    pub fn hop(&self, sample_rate: u32) -> usize {
        (sample_rate / self.config.tick_rate.max(1)).max(1) as usize
    }

    /// Analyse un signal mono déjà en mémoire.
    ///
    /// # Errors
    /// Propagates analyzer errors (none are expected for a fresh analyzer).
    pub fn analyze_samples(
        &self,
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> Result<SessionReport, AudioError> {
        let stream = SampleStream::new(samples, sample_rate, self.hop(sample_rate));
        let ticks = stream.ticks();
        let duration_secs = stream.len() as f64 / f64::from(sample_rate.max(1));

        let mut analyzer = SignalAnalyzer::new(self.config.clone());
        analyzer.initialize();
        analyzer.connect_stream(stream)?;
        analyzer.start()?;
        for _ in 0..ticks {
            analyzer.collect_sample()?;
        }
        analyzer.stop();

        let result = analyzer.analyze(self.mode);
        let frames = analyzer.samples().frame_count();
        analyzer.destroy();

        log::info!(
            "Analyse offline : {duration_secs:.1}s, {frames}/{ticks} frames retenues → {}",
            result.type_code
        );

        Ok(SessionReport {
            duration_secs,
            sample_rate,
            frames,
            result,
        })
    }

    /// Décode `path` puis l'analyse.
    ///
    /// # Errors
    /// Retourne une erreur si le fichier ne peut être décodé ou est vide.
    pub fn analyze_file(&self, path: &Path) -> anyhow::Result<SessionReport> {
        let (samples, sample_rate) = decode::decode_file(path)?;
        if samples.is_empty() {
            anyhow::bail!("Fichier audio vide : {}", path.display());
        }
        Ok(self.analyze_samples(samples, sample_rate)?)
    }
}
