//! Two-speaker resonance over a tagged pass.
//!
//! Frames tagged [`SPEAKER_A`], [`SPEAKER_B`] or [`BOTH`] (overlapping
//! speech) are compared; frames with any other tag, or none, only count
//! toward the cross-talk denominator.

use serde::Serialize;

use crate::buffers::{SampleBuffers, TaggedSamples};
use crate::metrics::{count_peaks, mean, round2};

/// Tag of the first speaker.
pub const SPEAKER_A: &str = "A";
/// Tag of the second speaker.
pub const SPEAKER_B: &str = "B";
/// Tag of frames where both speak at once.
pub const BOTH: &str = "Both";

/// Mean pitch of a speaker with no valid pitch (Hz).
const DEFAULT_PITCH: f64 = 150.0;
/// Mean centroid of a speaker with no valid centroid (Hz).
const DEFAULT_CENTROID: f64 = 2000.0;
/// Pitch range of a speaker with no valid pitch (Hz).
const DEFAULT_PITCH_RANGE: (f64, f64) = (100.0, 200.0);
/// Speech rate of a speaker with fewer than 5 frames.
const DEFAULT_RATE: f64 = 0.5;
const MIN_RATE_FRAMES: usize = 5;
/// Centroid gap (Hz) at which timbres count as fully apart.
const CENTROID_SPAN: f64 = 2000.0;

const AMPLITUDE_SYNC_BASE: f64 = 0.5;
const AMPLITUDE_SYNC_OVERLAP_BONUS: f64 = 0.3;
const STRESS_COVARIANCE: f64 = 0.5;
const VOCAL_QUALITY_SYNC: f64 = 0.6;
const PAUSE_ENTROPY: f64 = 0.4;

/// Indicateurs de résonance d'un couple (C01 à C10).
///
/// `stress_covariance`, `vocal_quality_sync` et `pause_entropy` sont des
/// valeurs fixes ; `amplitude_sync` ne dépend que de la présence de
/// chevauchements.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CoupleResonance {
    /// Mean F0 gap between the speakers (Hz).
    pub f0_distance: f64,
    /// Gap between the speakers' peak rates (peaks per second).
    pub speech_rate_delta: f64,
    /// Mean time from A's last frame to B's first frame at each A→B turn (ms).
    pub turn_taking_latency: f64,
    /// Share of all frames tagged [`BOTH`].
    pub cross_talk_ratio: f64,
    /// 1 for identical mean centroids, 0 at 2 kHz apart or more.
    pub spectral_convergence: f64,
    pub amplitude_sync: f64,
    pub stress_covariance: f64,
    pub vocal_quality_sync: f64,
    pub pause_entropy: f64,
    /// Intersection of the two pitch ranges over their union.
    pub pitch_overlap: f64,
}

/// Compare speakers A and B over `tagged`.
///
/// `frame_rate` is the number of frames sampled per second; it converts
/// frame counts into durations for the speech rate.
///
/// # Example
/// ```
/// use vm_audio::buffers::TaggedSamples;
/// use vm_audio::resonance::calculate_resonance;
///
/// let r = calculate_resonance(&TaggedSamples::default(), 60.0);
/// assert_eq!(r.f0_distance, 0.0);
/// assert_eq!(r.spectral_convergence, 1.0);
/// assert_eq!(r.pitch_overlap, 1.0);
/// ```
#[must_use]
pub fn calculate_resonance(tagged: &TaggedSamples, frame_rate: f64) -> CoupleResonance {
    let a: SampleBuffers = tagged.frames_tagged(SPEAKER_A).collect();
    let b: SampleBuffers = tagged.frames_tagged(SPEAKER_B).collect();
    let both = tagged.frames_tagged(BOTH).count();

    let f0_distance =
        (mean(&a.pitch).unwrap_or(DEFAULT_PITCH) - mean(&b.pitch).unwrap_or(DEFAULT_PITCH)).abs();
    let speech_rate_delta = (speech_rate(&a.volume, frame_rate) - speech_rate(&b.volume, frame_rate)).abs();

    let cross_talk_ratio = if tagged.is_empty() {
        0.0
    } else {
        both as f64 / tagged.len() as f64
    };

    let centroid_gap = (mean(&a.centroid).unwrap_or(DEFAULT_CENTROID)
        - mean(&b.centroid).unwrap_or(DEFAULT_CENTROID))
    .abs();
    let spectral_convergence = 1.0 - (centroid_gap / CENTROID_SPAN).min(1.0);

    let amplitude_sync = if both > 0 {
        AMPLITUDE_SYNC_BASE + AMPLITUDE_SYNC_OVERLAP_BONUS
    } else {
        AMPLITUDE_SYNC_BASE
    };

    let resonance = CoupleResonance {
        f0_distance: round2(f0_distance),
        speech_rate_delta: round2(speech_rate_delta),
        turn_taking_latency: turn_taking_latency(tagged).round(),
        cross_talk_ratio: round2(cross_talk_ratio),
        spectral_convergence: round2(spectral_convergence),
        amplitude_sync,
        stress_covariance: STRESS_COVARIANCE,
        vocal_quality_sync: VOCAL_QUALITY_SYNC,
        pause_entropy: PAUSE_ENTROPY,
        pitch_overlap: round2(pitch_overlap(&a.pitch, &b.pitch)),
    };

    log::debug!(
        "Résonance : A={} B={} Both={both} frames, f0Δ={} latence={} ms",
        a.frame_count(),
        b.frame_count(),
        resonance.f0_distance,
        resonance.turn_taking_latency
    );

    resonance
}

/// Volume peaks above half the maximum, per second of frames.
fn speech_rate(volume: &[f32], frame_rate: f64) -> f64 {
    if volume.len() < MIN_RATE_FRAMES {
        return DEFAULT_RATE;
    }
    let secs = volume.len() as f64 / frame_rate;
    let secs = if secs > 0.0 { secs } else { 1.0 };
    f64::from(count_peaks(volume, 0.5)) / secs
}

/// Mean gap between an A frame and the B frame right after it.
fn turn_taking_latency(tagged: &TaggedSamples) -> f64 {
    let frames: Vec<_> = tagged.frames().collect();
    let gaps: Vec<f64> = frames
        .windows(2)
        .filter(|w| w[0].0 == Some(SPEAKER_A) && w[1].0 == Some(SPEAKER_B))
        .map(|w| w[1].1.timestamp_ms - w[0].1.timestamp_ms)
        .collect();
    mean(&gaps).unwrap_or(0.0)
}

fn pitch_range(pitch: &[f32]) -> (f64, f64) {
    if pitch.is_empty() {
        return DEFAULT_PITCH_RANGE;
    }
    pitch.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
        (lo.min(f64::from(p)), hi.max(f64::from(p)))
    })
}

fn pitch_overlap(a: &[f32], b: &[f32]) -> f64 {
    let (min_a, max_a) = pitch_range(a);
    let (min_b, max_b) = pitch_range(b);
    let overlap = (max_a.min(max_b) - min_a.max(min_b)).max(0.0);
    let combined = max_a.max(max_b) - min_a.min(min_b);
    if combined > 0.0 { overlap / combined } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use vm_core::frame::FrameReading;

    use super::*;

    fn frame(timestamp_ms: f64, rms: f32, pitch: f32, centroid: f32) -> FrameReading {
        FrameReading {
            rms,
            pitch: Some(pitch),
            centroid: Some(centroid),
            snr_db: 20.0,
            timestamp_ms,
        }
    }

    /// A for 10 frames, a 300 ms gap, B for 10 frames, then 5 overlapping.
    fn conversation() -> TaggedSamples {
        let mut tagged = TaggedSamples::default();
        for i in 0..10 {
            tagged.push(Some(SPEAKER_A), &frame(f64::from(i) * 20.0, 0.2, 200.0, 1500.0));
        }
        for i in 0..10 {
            tagged.push(Some(SPEAKER_B), &frame(480.0 + f64::from(i) * 20.0, 0.2, 120.0, 2500.0));
        }
        for i in 0..5 {
            tagged.push(Some(BOTH), &frame(700.0 + f64::from(i) * 20.0, 0.4, 160.0, 2000.0));
        }
        tagged
    }

    #[test]
    fn empty_pass_uses_defaults() {
        let r = calculate_resonance(&TaggedSamples::default(), 50.0);
        assert_eq!(r.f0_distance, 0.0);
        assert_eq!(r.speech_rate_delta, 0.0);
        assert_eq!(r.turn_taking_latency, 0.0);
        assert_eq!(r.cross_talk_ratio, 0.0);
        assert_eq!(r.spectral_convergence, 1.0);
        assert_eq!(r.amplitude_sync, 0.5);
        assert_eq!(r.pitch_overlap, 1.0);
    }

    #[test]
    fn distinct_speakers_are_measured_apart() {
        let r = calculate_resonance(&conversation(), 50.0);
        assert_eq!(r.f0_distance, 80.0);
        assert_eq!(r.turn_taking_latency, 300.0);
        assert_eq!(r.cross_talk_ratio, 0.2);
        assert_eq!(r.spectral_convergence, 0.5);
        assert_eq!(r.amplitude_sync, 0.8);
        assert_eq!(r.pitch_overlap, 0.0);
        assert_eq!((r.stress_covariance, r.vocal_quality_sync, r.pause_entropy), (0.5, 0.6, 0.4));
    }

    #[test]
    fn latency_averages_every_a_to_b_turn() {
        let mut tagged = TaggedSamples::default();
        tagged.push(Some(SPEAKER_A), &frame(0.0, 0.2, 200.0, 1500.0));
        tagged.push(Some(SPEAKER_B), &frame(300.0, 0.2, 120.0, 2500.0));
        tagged.push(Some(SPEAKER_A), &frame(400.0, 0.2, 200.0, 1500.0));
        tagged.push(Some(SPEAKER_B), &frame(500.0, 0.2, 120.0, 2500.0));
        // B to A turns and turns broken by an untagged frame do not count.
        tagged.push(Some(SPEAKER_A), &frame(600.0, 0.2, 200.0, 1500.0));
        tagged.push(None, &frame(700.0, 0.2, 150.0, 2000.0));
        tagged.push(Some(SPEAKER_B), &frame(900.0, 0.2, 120.0, 2500.0));

        let r = calculate_resonance(&tagged, 50.0);
        assert_eq!(r.turn_taking_latency, 200.0);
        assert_eq!(r.cross_talk_ratio, 0.0);
        assert_eq!(r.amplitude_sync, 0.5);
    }

    #[test]
    fn untagged_frames_dilute_cross_talk() {
        let mut tagged = conversation();
        for i in 0..25 {
            tagged.push(None, &frame(1000.0 + f64::from(i) * 20.0, 0.2, 150.0, 2000.0));
        }
        assert_eq!(calculate_resonance(&tagged, 50.0).cross_talk_ratio, 0.1);
    }

    #[test]
    fn speech_rate_and_range_overlap() {
        let mut tagged = TaggedSamples::default();
        let bursts = [0.1, 0.5, 0.1, 0.5, 0.1, 0.5, 0.1, 0.5, 0.1, 0.1];
        for (i, &rms) in bursts.iter().enumerate() {
            let pitch = 180.0 + 40.0 * (i as f32 / 9.0);
            tagged.push(Some(SPEAKER_A), &frame(i as f64 * 20.0, rms, pitch, 1800.0));
        }
        for i in 0..10 {
            let pitch = 200.0 + 60.0 * (i as f32 / 9.0);
            tagged.push(Some(SPEAKER_B), &frame(300.0 + i as f64 * 20.0, 0.3, pitch, 1800.0));
        }

        let r = calculate_resonance(&tagged, 50.0);
        // A: 4 peaks over 0.2 s, B: flat.
        assert_eq!(r.speech_rate_delta, 20.0);
        // [180, 220] against [200, 260].
        assert_eq!(r.pitch_overlap, 0.25);
        assert_eq!(r.spectral_convergence, 1.0);
    }

    #[test]
    fn short_turns_use_the_default_rate() {
        let mut tagged = TaggedSamples::default();
        for (i, rms) in [0.1, 0.5, 0.1].into_iter().enumerate() {
            let t = i as f64 * 20.0;
            tagged.push(Some(SPEAKER_A), &frame(t, rms, 200.0, 1500.0));
            tagged.push(Some(SPEAKER_B), &frame(100.0 + t, 0.3, 120.0, 2500.0));
        }
        assert_eq!(calculate_resonance(&tagged, 50.0).speech_rate_delta, 0.0);
    }

    #[test]
    fn report_keeps_snake_case_names() {
        let r = calculate_resonance(&conversation(), 50.0);
        let json = serde_json::to_value(r).unwrap_or_else(|e| panic!("json: {e}"));
        assert_eq!(json["f0_distance"], 80.0);
        assert_eq!(json["turn_taking_latency"], 300.0);
    }
}
