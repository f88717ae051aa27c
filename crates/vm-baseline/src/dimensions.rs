//! Noms des 30 dimensions du vecteur de features (diagnostic uniquement).

use vm_core::voice_log::FEATURE_DIMENSIONS;

/// One name per dimension, in vector order.
pub const DIMENSION_NAMES: [&str; FEATURE_DIMENSIONS] = [
    // 0-4 : dynamique de la F0
    "F0_Mean",
    "F0_Std",
    "F0_Min",
    "F0_Max",
    "F0_Range",
    // 5-9 : qualité
    "Jitter_Local",
    "Jitter_Abs",
    "Shimmer_Local",
    "Shimmer_dB",
    "HNR",
    // 10-24 : résonance
    "F1_Center",
    "F1_Bandwidth",
    "F2_Center",
    "F2_Bandwidth",
    "F3_Center",
    "F3_Bandwidth",
    "Spectral_Centroid",
    "Spectral_Rolloff",
    "Spectral_Flux",
    "Spectral_Entropy",
    "ZCR",
    "MFCC_1",
    "MFCC_2",
    "MFCC_3",
    "MFCC_4",
    // 25-29 : temporel
    "Speech_Rate",
    "Pause_Duration",
    "Voiced_Ratio",
    "Volume_Stability",
    "Pitch_Stability",
];

/// Name of dimension `index`, `"Unknown"` past the schema.
///
/// # Example
/// ```
/// use vm_baseline::dimensions::dimension_name;
/// assert_eq!(dimension_name(9), "HNR");
/// assert_eq!(dimension_name(30), "Unknown");
/// ```
#[must_use]
pub fn dimension_name(index: usize) -> &'static str {
    DIMENSION_NAMES.get(index).copied().unwrap_or("Unknown")
}
