use chrono::{DateTime, Utc};
use serde::Serialize;
use vm_core::metrics::AnalysisMetrics;

/// Below this absolute weighted change (%), the voice counts as stable.
pub const STABLE_PERCENT: f64 = 5.0;

/// Pitch and tone dominate the weighted drift rate.
const PITCH_WEIGHT: f64 = 0.4;
const TONE_WEIGHT: f64 = 0.4;
const SPEED_WEIGHT: f64 = 0.1;
const VOLUME_WEIGHT: f64 = 0.1;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Tendance entre deux enregistrements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriftStatus {
    Stable,
    Upgrade,
    Degrading,
}

/// Variation en pourcentage de chaque métrique, 1 décimale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DriftChanges {
    pub pitch: f64,
    pub speed: f64,
    /// Change of `vibe`, the energy variability.
    pub volume: f64,
    pub tone: f64,
}

/// Dérive d'une voix entre une passe de référence et la passe courante.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftAnalysis {
    /// Weighted percent change, 1 decimal.
    pub drift_rate: f64,
    pub status: DriftStatus,
    pub baseline_date: DateTime<Utc>,
    /// Whole days between the two passes, rounded up.
    pub days_since: u32,
    pub changes: DriftChanges,
}

impl DriftAnalysis {
    /// One-sentence summary for the user.
    #[must_use]
    pub fn narrative(&self) -> String {
        let days = self.days_since;
        match self.status {
            DriftStatus::Stable => format!(
                "Your vocal identity has remained remarkably stable over the last {days} days. Minimal decay detected."
            ),
            DriftStatus::Upgrade => format!(
                "Vocal resonance has improved by {}%. Your voice sounds more energetic and clear than it did {days} days ago.",
                self.drift_rate
            ),
            DriftStatus::Degrading => format!(
                "Warning: {}% vocal degradation detected. Stress or environmental factors may be impacting your vocal clarity compared to {days} days ago.",
                self.drift_rate.abs()
            ),
        }
    }
}

/// Compare `current` to `baseline`, recorded at `baseline_date`, as of now.
#[must_use]
pub fn calculate_drift(
    baseline: &AnalysisMetrics,
    current: &AnalysisMetrics,
    baseline_date: DateTime<Utc>,
) -> DriftAnalysis {
    calculate_drift_at(baseline, current, baseline_date, Utc::now())
}

/// Same as [`calculate_drift`] with a caller-supplied clock.
///
/// A metric whose baseline is zero contributes no change.
///
/// # Example
/// ```
/// use chrono::{TimeDelta, Utc};
/// use vm_baseline::drift::{DriftStatus, calculate_drift_at};
/// use vm_core::metrics::AnalysisMetrics;
///
/// let before = AnalysisMetrics { pitch: 200.0, tone: 2000.0, ..AnalysisMetrics::default() };
/// let after = AnalysisMetrics { pitch: 180.0, tone: 1800.0, ..AnalysisMetrics::default() };
/// let now = Utc::now();
/// let drift = calculate_drift_at(&before, &after, now - TimeDelta::days(14), now);
/// assert_eq!(drift.status, DriftStatus::Degrading);
/// assert_eq!(drift.drift_rate, -8.0);
/// assert_eq!(drift.days_since, 14);
/// ```
#[must_use]
pub fn calculate_drift_at(
    baseline: &AnalysisMetrics,
    current: &AnalysisMetrics,
    baseline_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DriftAnalysis {
    let pitch = percent_change(baseline.pitch, current.pitch);
    let speed = percent_change(baseline.speed, current.speed);
    let volume = percent_change(baseline.vibe, current.vibe);
    let tone = percent_change(baseline.tone, current.tone);

    let rate = pitch * PITCH_WEIGHT + tone * TONE_WEIGHT + speed * SPEED_WEIGHT + volume * VOLUME_WEIGHT;

    let status = if rate.abs() < STABLE_PERCENT {
        DriftStatus::Stable
    } else if rate > 0.0 && tone > 0.0 {
        DriftStatus::Upgrade
    } else {
        DriftStatus::Degrading
    };

    let elapsed_ms = (now - baseline_date).abs().num_milliseconds() as f64;
    let days_since = (elapsed_ms / MS_PER_DAY).ceil() as u32;

    log::debug!("Dérive : {rate:.2} % sur {days_since} jours ({status:?})");

    DriftAnalysis {
        drift_rate: round1(rate),
        status,
        baseline_date,
        days_since,
        changes: DriftChanges {
            pitch: round1(pitch),
            speed: round1(speed),
            volume: round1(volume),
            tone: round1(tone),
        },
    }
}

fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (current - baseline) / baseline * 100.0
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("bad date"))
    }

    fn snapshot(pitch: f64, speed: f64, vibe: f64, tone: f64) -> AnalysisMetrics {
        AnalysisMetrics {
            pitch,
            speed,
            vibe,
            tone,
            ..AnalysisMetrics::default()
        }
    }

    fn drift(baseline: &AnalysisMetrics, current: &AnalysisMetrics) -> DriftAnalysis {
        calculate_drift_at(baseline, current, now() - TimeDelta::days(7), now())
    }

    #[test]
    fn identical_passes_are_stable() {
        let m = snapshot(180.0, 0.6, 0.3, 2400.0);
        let result = drift(&m, &m);
        assert_eq!(result.status, DriftStatus::Stable);
        assert_eq!(result.drift_rate, 0.0);
        assert_eq!(result.changes, DriftChanges::default());
    }

    #[test]
    fn five_percent_is_the_stability_edge() {
        let baseline = snapshot(100.0, 0.5, 0.5, 2000.0);

        // Tone +12.4 % weighs 4.96 %.
        let below = drift(&baseline, &snapshot(100.0, 0.5, 0.5, 2248.0));
        assert_eq!(below.status, DriftStatus::Stable);
        assert_eq!(below.changes.tone, 12.4);

        // Tone +12.5 % weighs exactly 5 %.
        let at = drift(&baseline, &snapshot(100.0, 0.5, 0.5, 2250.0));
        assert_eq!(at.status, DriftStatus::Upgrade);
        assert_eq!(at.drift_rate, 5.0);
    }

    #[test]
    fn rise_without_brighter_tone_is_degrading() {
        let baseline = snapshot(100.0, 0.5, 0.5, 2000.0);
        let result = drift(&baseline, &snapshot(125.0, 0.5, 0.5, 2000.0));
        assert_eq!(result.drift_rate, 10.0);
        assert_eq!(result.status, DriftStatus::Degrading);
    }

    #[test]
    fn drop_is_degrading() {
        let baseline = snapshot(200.0, 0.5, 0.5, 2000.0);
        let result = drift(&baseline, &snapshot(160.0, 0.5, 0.5, 1600.0));
        assert_eq!(result.drift_rate, -16.0);
        assert_eq!(result.status, DriftStatus::Degrading);
        assert!(result.narrative().starts_with("Warning: 16%"));
    }

    #[test]
    fn zero_baseline_metric_contributes_nothing() {
        let baseline = snapshot(0.0, 0.0, 0.5, 2000.0);
        let result = drift(&baseline, &snapshot(220.0, 0.8, 0.5, 2000.0));
        assert_eq!(result.changes.pitch, 0.0);
        assert_eq!(result.changes.speed, 0.0);
        assert!(result.drift_rate.is_finite());
        assert_eq!(result.status, DriftStatus::Stable);
    }

    #[test]
    fn days_since_rounds_up() {
        let m = snapshot(180.0, 0.6, 0.3, 2400.0);
        let at = |ago: TimeDelta| calculate_drift_at(&m, &m, now() - ago, now()).days_since;
        assert_eq!(at(TimeDelta::zero()), 0);
        assert_eq!(at(TimeDelta::hours(1)), 1);
        assert_eq!(at(TimeDelta::days(3)), 3);
        assert_eq!(at(TimeDelta::days(3) + TimeDelta::minutes(1)), 4);
        // A baseline dated after `now` counts the same distance.
        assert_eq!(calculate_drift_at(&m, &m, now() + TimeDelta::days(2), now()).days_since, 2);
    }

    #[test]
    fn report_serializes_in_camel_case() {
        let baseline = snapshot(100.0, 0.5, 0.5, 2000.0);
        let result = drift(&baseline, &snapshot(100.0, 0.5, 0.5, 2400.0));
        let json = serde_json::to_value(&result).unwrap_or_else(|e| panic!("json: {e}"));
        assert_eq!(json["status"], "UPGRADE");
        assert_eq!(json["daysSince"], 7);
        assert_eq!(json["driftRate"], 8.0);
        assert_eq!(json["changes"]["tone"], 20.0);
        assert!(json.get("baselineDate").is_some());
    }
}
