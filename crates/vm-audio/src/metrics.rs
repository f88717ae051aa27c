//! Reduction of a pass's sample buffers into one [`AnalysisMetrics`].

use vm_core::metrics::{AnalysisMetrics, ProsodyMetrics};

use crate::buffers::SampleBuffers;
use crate::features::NOISE_FLOOR;

/// Defaults used when a buffer is too short to say anything.
pub mod defaults {
    /// Mean pitch of an empty pitch buffer (Hz).
    pub const PITCH: f64 = 150.0;
    /// Mean volume of an empty volume buffer.
    pub const VOLUME: f64 = 0.5;
    /// Energy variability with fewer than 2 volume samples.
    pub const VIBE: f64 = 0.1;
    /// Mean tone of an empty centroid buffer (Hz).
    pub const TONE: f64 = 2000.0;
    /// Speed with fewer than 10 volume samples.
    pub const SPEED: f64 = 0.5;
    /// Pitch coefficient of variation with fewer than 2 pitch samples.
    pub const PITCH_CV: f64 = 0.05;
    /// Mean SNR with no recorded frame (dB).
    pub const HNR: f64 = 15.0;
}

/// Volume buffers shorter than this get the default speed.
const MIN_SPEED_SAMPLES: usize = 10;
/// A gap between voiced frames longer than this counts as a pause (ms).
const PAUSE_GAP_MS: f64 = 500.0;

/// Build the metrics snapshot for a recording pass.
///
/// Never fails: empty or short buffers fall back to [`defaults`].
///
/// # Example
/// ```
/// use vm_audio::metrics::calculate_metrics;
/// use vm_audio::buffers::SampleBuffers;
///
/// let m = calculate_metrics(&SampleBuffers::default());
/// assert_eq!((m.pitch, m.speed, m.vibe, m.tone), (150.0, 0.5, 0.1, 2000.0));
/// assert_eq!(m.humanity_score, 70.0);
/// ```
#[must_use]
pub fn calculate_metrics(buffers: &SampleBuffers) -> AnalysisMetrics {
    let avg_pitch = mean(&buffers.pitch).unwrap_or(defaults::PITCH);
    let avg_volume = mean(&buffers.volume).unwrap_or(defaults::VOLUME);
    let avg_tone = mean(&buffers.centroid).unwrap_or(defaults::TONE);

    let vibe = coefficient_of_variation(&buffers.volume, avg_volume).unwrap_or(defaults::VIBE);
    let pitch_cv = coefficient_of_variation(&buffers.pitch, avg_pitch).unwrap_or(defaults::PITCH_CV);
    let speed = estimate_speed(&buffers.volume);

    let humanity = (50.0 + pitch_cv * 200.0 + vibe * 100.0).clamp(0.0, 100.0);

    let prosody = ProsodyMetrics {
        jitter: if pitch_cv > 0.1 { 0.05 } else { 0.01 },
        hnr: mean(&buffers.snr_db).unwrap_or(defaults::HNR),
        pitch_var: pitch_cv,
        silence_rate: silence_rate(&buffers.timestamps_ms),
        volume_db: 20.0 * (avg_volume / f64::from(NOISE_FLOOR)).log10(),
        speed_var: vibe,
        peak_count: estimate_peak_count(&buffers.volume),
    };

    let metrics = AnalysisMetrics {
        pitch: avg_pitch.round(),
        speed: round2(speed),
        vibe: round2(vibe),
        tone: avg_tone.round(),
        humanity_score: humanity.round(),
        prosody,
    };

    log::debug!(
        "Métriques : {} frames, pitch={} speed={} vibe={} tone={}",
        buffers.frame_count(),
        metrics.pitch,
        metrics.speed,
        metrics.vibe,
        metrics.tone
    );

    metrics
}

/// Naive syllable counter normalized to [0, 1].
///
/// Counts local maxima above 70% of the buffer's own maximum, then maps
/// 5..=15 peaks onto 0..=1. Fewer than 10 samples yield 0.5.
///
/// # Example
/// ```
/// use vm_audio::metrics::estimate_speed;
/// assert_eq!(estimate_speed(&[0.1; 4]), 0.5);
/// assert_eq!(estimate_speed(&[0.1; 40]), 0.0);
/// ```
#[must_use]
pub fn estimate_speed(volume: &[f32]) -> f64 {
    if volume.len() < MIN_SPEED_SAMPLES {
        return defaults::SPEED;
    }
    let peaks = count_peaks(volume, 0.7);
    ((f64::from(peaks) - 5.0) / 10.0).clamp(0.0, 1.0)
}

/// Volume peaks above half of the buffer maximum. 0 below 10 samples.
#[must_use]
pub fn estimate_peak_count(volume: &[f32]) -> u32 {
    if volume.len() < MIN_SPEED_SAMPLES {
        return 0;
    }
    count_peaks(volume, 0.5)
}

pub(crate) fn count_peaks(volume: &[f32], ratio: f32) -> u32 {
    let max = volume.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let threshold = ratio * max;
    let peaks = volume
        .windows(3)
        .filter(|w| w[1] > threshold && w[1] > w[0] && w[1] > w[2])
        .count();
    u32::try_from(peaks).unwrap_or(u32::MAX)
}

/// Population standard deviation. 0 for fewer than 2 values.
///
/// # Example
/// ```
/// use vm_audio::metrics::standard_deviation;
/// assert_eq!(standard_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
/// assert_eq!(standard_deviation(&[3.0]), 0.0);
/// ```
#[must_use]
pub fn standard_deviation(values: &[f32]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

pub(crate) fn mean<T: Copy + Into<f64>>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v.into()).sum::<f64>() / values.len() as f64)
}

/// std / mean, `None` with fewer than 2 values. A zero mean divides by 1.
fn coefficient_of_variation(values: &[f32], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let denom = if mean == 0.0 { 1.0 } else { mean };
    Some(standard_deviation(values) / denom)
}

/// Pauses (> 500 ms gaps) per second of recording.
fn silence_rate(timestamps_ms: &[f64]) -> f64 {
    let (Some(first), Some(last)) = (timestamps_ms.first(), timestamps_ms.last()) else {
        return 0.0;
    };
    let duration_secs = (last - first) / 1000.0;
    let pauses = timestamps_ms
        .windows(2)
        .filter(|w| w[1] - w[0] > PAUSE_GAP_MS)
        .count();
    pauses as f64 / if duration_secs > 0.0 { duration_secs } else { 1.0 }
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffers_give_documented_defaults() {
        let m = calculate_metrics(&SampleBuffers::default());
        assert_eq!(m.pitch, 150.0);
        assert_eq!(m.vibe, 0.1);
        assert_eq!(m.tone, 2000.0);
        assert_eq!(m.speed, 0.5);
        assert!((0.0..=100.0).contains(&m.humanity_score));
        assert_eq!(m.prosody.hnr, 15.0);
        assert_eq!(m.prosody.peak_count, 0);
        assert_eq!(m.prosody.silence_rate, 0.0);
    }

    #[test]
    fn short_scenario() {
        let buffers = SampleBuffers::from_samples(
            vec![150.0, 152.0, 148.0, 151.0],
            vec![0.05, 0.06, 0.055, 0.07],
            vec![2000.0, 2100.0, 1950.0, 2050.0],
        );
        let m = calculate_metrics(&buffers);
        assert_eq!(m.pitch, 150.0);
        assert_eq!(m.tone, 2025.0);
        // Fewer than 10 volume samples: no peak counting.
        assert_eq!(m.speed, 0.5);
        assert_eq!(m.vibe, 0.13);
        assert_eq!(m.humanity_score, 65.0);
        assert_eq!(m.prosody.jitter, 0.01);
    }

    #[test]
    fn speed_counts_peaks_above_seventy_percent() {
        // 20 alternating peaks: [0.2, 1.0, 0.2, 1.0, ...]
        let volume: Vec<f32> = (0..41).map(|i| if i % 2 == 1 { 1.0 } else { 0.2 }).collect();
        assert_eq!(count_peaks(&volume, 0.7), 20);
        assert_eq!(estimate_speed(&volume), 1.0);

        // Ten peaks: (10 - 5) / 10
        let volume: Vec<f32> = (0..21).map(|i| if i % 2 == 1 { 1.0 } else { 0.2 }).collect();
        assert_eq!(estimate_speed(&volume), 0.5);

        // Peaks below 70% of the max do not count.
        let mut volume: Vec<f32> = (0..21).map(|i| if i % 2 == 1 { 0.5 } else { 0.2 }).collect();
        volume[10] = 1.0;
        assert_eq!(count_peaks(&volume, 0.7), 1);
        assert_eq!(estimate_speed(&volume), 0.0);
    }

    #[test]
    fn speed_stays_in_unit_interval() {
        for len in [0usize, 5, 9, 10, 11, 50, 200] {
            let volume: Vec<f32> = (0..len).map(|i| ((i * 7919) % 13) as f32 / 13.0).collect();
            let s = estimate_speed(&volume);
            assert!((0.0..=1.0).contains(&s), "len {len} gave {s}");
        }
    }

    #[test]
    fn humanity_is_clamped() {
        // Wildly varying pitch and volume push the raw score past 100.
        let buffers = SampleBuffers::from_samples(
            vec![60.0, 480.0, 60.0, 480.0],
            vec![0.01, 0.9, 0.01, 0.9],
            vec![],
        );
        let m = calculate_metrics(&buffers);
        assert_eq!(m.humanity_score, 100.0);
        assert_eq!(m.prosody.jitter, 0.05);
    }

    #[test]
    fn population_standard_deviation() {
        assert_eq!(standard_deviation(&[]), 0.0);
        assert_eq!(standard_deviation(&[1.0, 1.0, 1.0]), 0.0);
        assert!((standard_deviation(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pauses_per_second() {
        // 4 s recording with three gaps over 500 ms.
        let ts = [0.0, 100.0, 900.0, 1000.0, 3000.0, 4000.0];
        assert!((silence_rate(&ts) - 0.75).abs() < 1e-12);
        assert_eq!(silence_rate(&[]), 0.0);
        assert_eq!(silence_rate(&[10.0]), 0.0);
    }
}
