use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nombre de dimensions du vecteur de features bio-acoustiques.
pub const FEATURE_DIMENSIONS: usize = 30;

/// Vecteur de features opaque, [`FEATURE_DIMENSIONS`] valeurs attendues.
pub type FeatureVector = Vec<f64>;

/// Time-of-day bucket attached to a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeCategory {
    /// 05:00–10:59.
    Morning,
    /// 11:00–16:59.
    Afternoon,
    /// 17:00–22:59.
    Evening,
    /// 23:00–04:59.
    Night,
}

/// Weekday vs weekend bucket attached to a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayCategory {
    /// Monday to Friday.
    Weekday,
    /// Saturday and Sunday.
    Weekend,
}

/// Contextual tags recorded alongside a reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogContext {
    /// Time-of-day bucket.
    pub time_category: TimeCategory,
    /// Weekday / weekend bucket.
    pub day_category: DayCategory,
    /// Optional reading genre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Optional self-reported mood.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Optional day index within a program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<u32>,
}

/// Une entrée d'historique : vecteur 30D horodaté + contexte.
///
/// Possédée et persistée par un collaborateur externe ; le moteur de
/// baseline ne fait que la lire.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use vm_core::voice_log::{DayCategory, LogContext, TimeCategory, VoiceLog, FEATURE_DIMENSIONS};
///
/// let log = VoiceLog::new(
///     Utc::now(),
///     vec![0.5; FEATURE_DIMENSIONS],
///     LogContext {
///         time_category: TimeCategory::Morning,
///         day_category: DayCategory::Weekday,
///         genre: None,
///         mood: None,
///         day_index: None,
///     },
/// );
/// assert_eq!(log.calibration_vector.len(), 30);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceLog {
    /// Moment de l'enregistrement (UTC).
    pub timestamp: DateTime<Utc>,
    /// Vecteur 30D issu de la phrase de calibration. Older logs call it `vector`.
    #[serde(alias = "vector")]
    pub calibration_vector: FeatureVector,
    /// Vecteur 30D issu de la lecture dynamique, si présent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_vector: Option<FeatureVector>,
    /// Tags contextuels.
    pub context: LogContext,
    /// Étiquette subjective posée par l'utilisateur après coup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_tag: Option<String>,
}

impl VoiceLog {
    /// Crée une entrée sans vecteur de lecture ni annotation.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        calibration_vector: FeatureVector,
        context: LogContext,
    ) -> Self {
        Self {
            timestamp,
            calibration_vector,
            reading_vector: None,
            context,
            annotation_tag: None,
        }
    }

    /// `true` si le vecteur de calibration a exactement 30 dimensions.
    #[must_use]
    pub fn has_valid_vector(&self) -> bool {
        self.calibration_vector.len() == FEATURE_DIMENSIONS
    }
}
