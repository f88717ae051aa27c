use chrono::{DateTime, TimeDelta, Utc};
use rayon::prelude::*;
use serde::Serialize;
use vm_core::voice_log::{FEATURE_DIMENSIONS, FeatureVector, VoiceLog};

use crate::dimensions::dimension_name;
use crate::error::BaselineError;

/// Default baseline window (days).
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;
/// Fewer recent entries than this yield the neutral result.
pub const MIN_HISTORY: usize = 3;
/// |z| strictly above this is an anomaly.
pub const ANOMALY_Z: f64 = 1.5;
/// |z| strictly above this is at least `Medium`.
pub const MEDIUM_Z: f64 = 2.0;
/// |z| strictly above this is `High`.
pub const HIGH_Z: f64 = 2.5;

/// Gravité d'une anomalie, ordonnée `Low < Medium < High`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Tier for an absolute z-score, `None` when it is not an anomaly.
    ///
    /// # Example
    /// ```
    /// use vm_baseline::engine::Severity;
    /// assert_eq!(Severity::from_abs_z(1.5), None);
    /// assert_eq!(Severity::from_abs_z(2.0), Some(Severity::Low));
    /// assert_eq!(Severity::from_abs_z(2.6), Some(Severity::High));
    /// ```
    #[must_use]
    pub fn from_abs_z(abs_z: f64) -> Option<Self> {
        if abs_z > HIGH_Z {
            Some(Self::High)
        } else if abs_z > MEDIUM_Z {
            Some(Self::Medium)
        } else if abs_z > ANOMALY_Z {
            Some(Self::Low)
        } else {
            None
        }
    }
}

/// Sens de l'écart par rapport à la baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

/// Une dimension anormalement éloignée de la baseline.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAlert {
    pub dimension: usize,
    pub dimension_name: &'static str,
    pub z_score: f64,
    pub severity: Severity,
    pub direction: Direction,
}

/// Moyenne et écart-type population par dimension.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BaselineStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Rapport de déviation d'un vecteur courant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZScoreResult {
    /// The current vector, as given.
    pub vector: FeatureVector,
    pub z_scores: Vec<f64>,
    /// Sorted by descending severity, dimension order within a tier.
    pub anomalies: Vec<AnomalyAlert>,
    pub baseline_stats: BaselineStats,
}

impl ZScoreResult {
    /// Result returned when the history is too thin for statistics.
    fn neutral(current: &[f64]) -> Self {
        Self {
            vector: current.to_vec(),
            z_scores: vec![0.0; FEATURE_DIMENSIONS],
            anomalies: Vec::new(),
            baseline_stats: BaselineStats {
                mean: current.to_vec(),
                std: vec![0.0; FEATURE_DIMENSIONS],
            },
        }
    }

    /// `true` if any dimension was flagged.
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Compare `current` to the last `lookback_days` of `history`, as of now.
///
/// # Errors
/// [`BaselineError::InvalidDimension`] if `current` is not 30-dimensional.
pub fn calculate_z_scores(
    current: &[f64],
    history: &[VoiceLog],
    lookback_days: u32,
) -> Result<ZScoreResult, BaselineError> {
    calculate_z_scores_at(current, history, lookback_days, Utc::now())
}

/// Same as [`calculate_z_scores`] with a caller-supplied clock.
///
/// History entries whose calibration vector is not 30-dimensional are
/// skipped with a warning.
///
/// # Errors
/// [`BaselineError::InvalidDimension`] if `current` is not 30-dimensional.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use vm_baseline::engine::calculate_z_scores_at;
///
/// let result = calculate_z_scores_at(&[1.0; 30], &[], 30, Utc::now()).unwrap();
/// assert!(result.z_scores.iter().all(|&z| z == 0.0));
/// assert_eq!(result.baseline_stats.mean, vec![1.0; 30]);
/// ```
pub fn calculate_z_scores_at(
    current: &[f64],
    history: &[VoiceLog],
    lookback_days: u32,
    now: DateTime<Utc>,
) -> Result<ZScoreResult, BaselineError> {
    if current.len() != FEATURE_DIMENSIONS {
        return Err(BaselineError::InvalidDimension {
            expected: FEATURE_DIMENSIONS,
            actual: current.len(),
        });
    }

    let cutoff = now - TimeDelta::days(i64::from(lookback_days));
    let recent: Vec<&[f64]> = history
        .iter()
        .filter(|log| log.timestamp >= cutoff)
        .filter_map(|log| {
            if log.has_valid_vector() {
                Some(log.calibration_vector.as_slice())
            } else {
                log::warn!(
                    "Entrée d'historique ignorée ({}) : {} dimensions",
                    log.timestamp,
                    log.calibration_vector.len()
                );
                None
            }
        })
        .collect();

    if recent.len() < MIN_HISTORY {
        log::debug!(
            "Baseline : {} entrées sur {lookback_days} jours, résultat neutre",
            recent.len()
        );
        return Ok(ZScoreResult::neutral(current));
    }

    let n = recent.len() as f64;
    let (mean, std): (Vec<f64>, Vec<f64>) = (0..FEATURE_DIMENSIONS)
        .map(|dim| {
            let first = recent[0][dim];
            if recent.iter().all(|v| v[dim].to_bits() == first.to_bits()) {
                return (first, 0.0);
            }
            let m = recent.iter().map(|v| v[dim]).sum::<f64>() / n;
            let variance = recent.iter().map(|v| (v[dim] - m).powi(2)).sum::<f64>() / n;
            let s = variance.sqrt();
            // Rounding residue of a constant dimension counts as no spread.
            if s <= f64::EPSILON * m.abs().max(1.0) * 4.0 {
                (m, 0.0)
            } else {
                (m, s)
            }
        })
        .unzip();

    let z_scores: Vec<f64> = current
        .iter()
        .zip(mean.iter().zip(&std))
        .map(|(&value, (&m, &s))| if s == 0.0 { 0.0 } else { (value - m) / s })
        .collect();

    let mut anomalies: Vec<AnomalyAlert> = z_scores
        .iter()
        .enumerate()
        .filter_map(|(dim, &z)| {
            Severity::from_abs_z(z.abs()).map(|severity| AnomalyAlert {
                dimension: dim,
                dimension_name: dimension_name(dim),
                z_score: z,
                severity,
                direction: if z > 0.0 {
                    Direction::Above
                } else {
                    Direction::Below
                },
            })
        })
        .collect();
    // Stable: dimension order is kept within a tier.
    anomalies.sort_by(|a, b| b.severity.cmp(&a.severity));

    log::debug!(
        "Baseline : {} entrées, {} anomalies",
        recent.len(),
        anomalies.len()
    );

    Ok(ZScoreResult {
        vector: current.to_vec(),
        z_scores,
        anomalies,
        baseline_stats: BaselineStats { mean, std },
    })
}

/// Score several vectors against the same history in parallel.
pub fn calculate_many(
    currents: &[FeatureVector],
    history: &[VoiceLog],
    lookback_days: u32,
    now: DateTime<Utc>,
) -> Vec<Result<ZScoreResult, BaselineError>> {
    currents
        .par_iter()
        .map(|current| calculate_z_scores_at(current, history, lookback_days, now))
        .collect()
}
