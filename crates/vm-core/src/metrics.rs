use serde::{Deserialize, Serialize};

/// Snapshot des métriques d'une passe d'enregistrement.
///
/// Construit une seule fois par l'agrégateur, puis lu par les classifieurs
/// et transmis tel quel à la persistance. Jamais muté après création.
///
/// # Example
/// ```
/// use vm_core::metrics::AnalysisMetrics;
/// let m = AnalysisMetrics { pitch: 180.0, tone: 2600.0, ..AnalysisMetrics::default() };
/// assert_eq!(m.speed, 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    /// F0 moyenne (Hz), arrondie à l'entier.
    pub pitch: f64,
    /// Débit normalisé [0.0, 1.0], 2 décimales.
    pub speed: f64,
    /// Variabilité d'énergie (coefficient de variation du RMS), 2 décimales.
    pub vibe: f64,
    /// Centroïde spectral moyen (Hz), arrondi à l'entier.
    pub tone: f64,
    /// Score d'« humanité » [0, 100], arrondi à l'entier.
    pub humanity_score: f64,
    /// Prosodic measures used by the prosody classifier.
    #[serde(flatten)]
    pub prosody: ProsodyMetrics,
}

/// Extended prosody block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProsodyMetrics {
    /// Jitter proxy: 0.05 when the pitch varies by more than 10%, else 0.01.
    pub jitter: f64,
    /// Mean local SNR in dB, used as an HNR proxy.
    pub hnr: f64,
    /// Pitch coefficient of variation.
    pub pitch_var: f64,
    /// Pauses longer than 500 ms per second of recording.
    pub silence_rate: f64,
    /// Mean loudness in dB relative to the 0.001 noise floor.
    pub volume_db: f64,
    /// Coefficient of variation of the volume buffer.
    pub speed_var: f64,
    /// Volume peaks above half of the buffer maximum.
    pub peak_count: u32,
}

/// Résultat final d'une passe : code de type + métriques.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Catégorie symbolique.
    pub type_code: crate::type_code::TypeCode,
    /// Snapshot dont elle dérive.
    pub metrics: AnalysisMetrics,
}
