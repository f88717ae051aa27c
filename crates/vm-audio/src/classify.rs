use std::str::FromStr;

use vm_core::metrics::{AnalysisMetrics, AnalysisResult};
use vm_core::type_code::TypeCode;

use crate::buffers::SampleBuffers;
use crate::metrics::calculate_metrics;

/// Seuils fixes de classification.
pub mod thresholds {
    /// Pitch (Hz) au-dessus duquel l'axe 1 vaut `H`.
    pub const PITCH: f64 = 160.0;
    /// Speed au-dessus de laquelle l'axe 2 vaut `F`.
    pub const SPEED: f64 = 0.5;
    /// Vibe au-dessus de laquelle l'axe 3 vaut `E`.
    pub const VIBE: f64 = 0.15;
    /// Tone (Hz) au-dessus duquel l'axe 4 vaut `C`.
    pub const TONE: f64 = 2500.0;
    /// Vibe sous laquelle une voix aiguë est jugée mécanique.
    pub const ROBOT_STABILITY: f64 = 0.05;
    /// Pitch sous lequel une voix stable est jugée profonde.
    pub const WHALE_PITCH: f64 = 100.0;
}

/// Map a metrics snapshot to its four-letter code.
///
/// The two special overrides are checked first, `HFCC` before `LSCD`.
/// Otherwise each axis compares with a strict `>`, so a value sitting on a
/// threshold takes the low branch.
///
/// # Example
/// ```
/// use vm_audio::classify::classify;
/// use vm_core::{AnalysisMetrics, TypeCode};
///
/// let m = AnalysisMetrics { pitch: 200.0, speed: 0.8, vibe: 0.3, tone: 3000.0, ..Default::default() };
/// assert_eq!(classify(&m).as_str(), "HFEC");
///
/// let flat = AnalysisMetrics { pitch: 200.0, vibe: 0.01, ..Default::default() };
/// assert_eq!(classify(&flat), TypeCode::ROBOT);
/// ```
#[must_use]
pub fn classify(m: &AnalysisMetrics) -> TypeCode {
    if m.vibe < thresholds::ROBOT_STABILITY && m.pitch > thresholds::PITCH {
        return TypeCode::ROBOT;
    }
    if m.pitch < thresholds::WHALE_PITCH && m.vibe < thresholds::VIBE {
        return TypeCode::WHALE;
    }
    TypeCode::standard(
        m.pitch > thresholds::PITCH,
        m.speed > thresholds::SPEED,
        m.vibe > thresholds::VIBE,
        m.tone > thresholds::TONE,
    )
}

/// Prosody-axis code: stability, pauses, openness, rhythm.
///
/// | axe | lettre | condition |
/// |-----|--------|-----------|
/// | 1 | E / N | `pitch_var * 100 < 20` |
/// | 2 | L / P | `silence_rate > 0.15` |
/// | 3 | O / C | `volume_db > -10` |
/// | 4 | N / S | `speed_var > 0.3` |
#[must_use]
pub fn classify_prosody(m: &AnalysisMetrics) -> TypeCode {
    let p = &m.prosody;
    TypeCode::from_symbols([
        if p.pitch_var * 100.0 < 20.0 { b'E' } else { b'N' },
        if p.silence_rate > 0.15 { b'L' } else { b'P' },
        if p.volume_db > -10.0 { b'O' } else { b'C' },
        if p.speed_var > 0.3 { b'N' } else { b'S' },
    ])
}

/// Which classifier `analyze` applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassifierMode {
    /// Pitch / speed / vibe / tone axes with the two special overrides.
    #[default]
    Standard,
    /// Prosody axes from the extended metrics block.
    Prosody,
}

impl ClassifierMode {
    /// Apply the selected classifier.
    #[must_use]
    pub fn classify(self, m: &AnalysisMetrics) -> TypeCode {
        match self {
            Self::Standard => classify(m),
            Self::Prosody => classify_prosody(m),
        }
    }
}

impl FromStr for ClassifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "prosody" => Ok(Self::Prosody),
            other => Err(format!("mode de classification inconnu : {other}")),
        }
    }
}

/// Aggregate `buffers` and classify the result.
#[must_use]
pub fn analyze(buffers: &SampleBuffers, mode: ClassifierMode) -> AnalysisResult {
    let metrics = calculate_metrics(buffers);
    let type_code = mode.classify(&metrics);
    log::debug!("Classification {mode:?} : {type_code}");
    AnalysisResult { type_code, metrics }
}
