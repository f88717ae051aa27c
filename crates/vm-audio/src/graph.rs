use vm_core::config::AnalyzerConfig;

use crate::fft::FftPipeline;
use crate::smoothing::SpectrumSmoother;

/// Graphe d'analyse : fenêtre glissante + spectre lissé quantifié sur 8 bits.
///
/// Garde les `fft_size` derniers échantillons reçus. Le spectre est calculé
/// à la demande, lissé dans le temps, converti en dB puis projeté sur
/// `[0, 255]` entre `min_db` et `max_db`.
///
/// # Example
/// ```
/// use vm_audio::graph::AnalyserGraph;
/// use vm_core::config::AnalyzerConfig;
///
/// let mut graph = AnalyserGraph::new(&AnalyzerConfig::default());
/// graph.push(&[0.25; 4096]);
/// let mut time = vec![0.0; graph.fft_size()];
/// graph.get_float_time_domain_data(&mut time);
/// assert!(time.iter().all(|&s| s == 0.25));
/// ```
pub struct AnalyserGraph {
    fft: FftPipeline,
    smoother: SpectrumSmoother,
    window: Vec<f32>,
    min_db: f32,
    max_db: f32,
    sample_rate: u32,
}

impl AnalyserGraph {
    /// Allocate a graph sized by `config.fft_size`.
    #[must_use]
    pub fn new(config: &AnalyzerConfig) -> Self {
        let fft_size = config.fft_size.max(32);
        Self {
            fft: FftPipeline::new(fft_size),
            smoother: SpectrumSmoother::new(config.smoothing),
            window: vec![0.0; fft_size],
            min_db: config.min_db,
            max_db: config.max_db,
            sample_rate: config.fallback_sample_rate,
        }
    }

    /// Append fresh samples, keeping only the most recent `fft_size`.
    pub fn push(&mut self, samples: &[f32]) {
        let n = self.window.len();
        if samples.len() >= n {
            self.window.copy_from_slice(&samples[samples.len() - n..]);
        } else if !samples.is_empty() {
            let k = samples.len();
            self.window.copy_within(k.., 0);
            self.window[n - k..].copy_from_slice(samples);
        }
    }

    /// Copy the current time-domain window into `out`.
    pub fn get_float_time_domain_data(&self, out: &mut [f32]) {
        let n = out.len().min(self.window.len());
        out[..n].copy_from_slice(&self.window[..n]);
    }

    /// Write the smoothed, byte-quantized spectrum into `out`.
    ///
    /// Each call advances the temporal smoothing by one step.
    pub fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
        let magnitudes = self.fft.process(&self.window);
        let smoothed = self.smoother.smooth(magnitudes);
        let scale = 255.0 / (self.max_db - self.min_db);

        for (byte, &mag) in out.iter_mut().zip(smoothed) {
            let db = if mag > 0.0 {
                20.0 * mag.log10()
            } else {
                f32::NEG_INFINITY
            };
            *byte = ((db - self.min_db) * scale).floor().clamp(0.0, 255.0) as u8;
        }
    }

    /// Zero the window and the smoothing state.
    pub fn clear(&mut self) {
        self.window.iter_mut().for_each(|s| *s = 0.0);
        self.smoother.reset();
    }

    /// Time-domain window length.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft.fft_size()
    }

    /// Number of frequency bins (`fft_size / 2`).
    #[must_use]
    pub fn frequency_bin_count(&self) -> usize {
        self.fft.bin_count()
    }

    /// Sample rate the bins are expressed against.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Adopt the sample rate of a newly connected stream.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AnalyzerConfig {
        AnalyzerConfig {
            fft_size: 64,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn push_keeps_most_recent_samples() {
        let mut graph = AnalyserGraph::new(&small_config());
        let ramp: Vec<f32> = (0..10).map(|i| i as f32).collect();
        graph.push(&ramp);
        let mut out = vec![0.0; 64];
        graph.get_float_time_domain_data(&mut out);
        assert_eq!(&out[54..], ramp.as_slice());
        assert!(out[..54].iter().all(|&s| s == 0.0));

        graph.push(&[42.0]);
        graph.get_float_time_domain_data(&mut out);
        assert_eq!(out[63], 42.0);
        assert_eq!(out[62], 9.0);
    }

    #[test]
    fn silence_quantizes_to_zero_bytes() {
        let mut graph = AnalyserGraph::new(&small_config());
        let mut bins = vec![7u8; graph.frequency_bin_count()];
        graph.get_byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn loud_tone_saturates_some_bins() {
        let mut graph = AnalyserGraph::new(&small_config());
        let tone: Vec<f32> = (0..64)
            .map(|i| (2.0 * std::f32::consts::PI * 8.0 * i as f32 / 64.0).sin())
            .collect();
        graph.push(&tone);
        let mut bins = vec![0u8; 32];
        for _ in 0..20 {
            graph.get_byte_frequency_data(&mut bins);
        }
        assert_eq!(bins[8], 255);

        graph.clear();
        graph.get_byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }
}
