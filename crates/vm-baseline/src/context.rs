use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc, Weekday};
use vm_core::voice_log::{DayCategory, TimeCategory, VoiceLog};

/// Default history retention (days).
pub const DEFAULT_RETENTION_DAYS: u32 = 60;

/// Time-of-day bucket of `t`, in whatever timezone `t` carries.
///
/// # Example
/// ```
/// use chrono::NaiveTime;
/// use vm_baseline::context::time_category;
/// use vm_core::voice_log::TimeCategory;
///
/// let t = NaiveTime::from_hms_opt(10, 59, 0).unwrap();
/// assert_eq!(time_category(&t), TimeCategory::Morning);
/// ```
#[must_use]
pub fn time_category<T: Timelike>(t: &T) -> TimeCategory {
    match t.hour() {
        5..=10 => TimeCategory::Morning,
        11..=16 => TimeCategory::Afternoon,
        17..=22 => TimeCategory::Evening,
        _ => TimeCategory::Night,
    }
}

/// Weekend on Saturday and Sunday.
#[must_use]
pub fn day_category<T: Datelike>(t: &T) -> DayCategory {
    match t.weekday() {
        Weekday::Sat | Weekday::Sun => DayCategory::Weekend,
        _ => DayCategory::Weekday,
    }
}

/// Drop entries older than `retention_days` before `now`.
///
/// Returns how many entries were removed.
pub fn prune_history(history: &mut Vec<VoiceLog>, now: DateTime<Utc>, retention_days: u32) -> usize {
    let cutoff = now - TimeDelta::days(i64::from(retention_days));
    let before = history.len();
    history.retain(|log| log.timestamp >= cutoff);
    let removed = before - history.len();
    if removed > 0 {
        log::info!("Historique : {removed} entrées de plus de {retention_days} jours supprimées");
    }
    removed
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use vm_core::voice_log::{FEATURE_DIMENSIONS, LogContext};

    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_else(|| panic!("bad time {h}:{m}"))
    }

    fn entry(timestamp: DateTime<Utc>) -> VoiceLog {
        VoiceLog::new(
            timestamp,
            vec![0.0; FEATURE_DIMENSIONS],
            LogContext {
                time_category: time_category(&timestamp),
                day_category: day_category(&timestamp),
                genre: None,
                mood: None,
                day_index: None,
            },
        )
    }

    #[test]
    fn time_buckets() {
        assert_eq!(time_category(&hm(4, 59)), TimeCategory::Night);
        assert_eq!(time_category(&hm(5, 0)), TimeCategory::Morning);
        assert_eq!(time_category(&hm(11, 0)), TimeCategory::Afternoon);
        assert_eq!(time_category(&hm(16, 59)), TimeCategory::Afternoon);
        assert_eq!(time_category(&hm(17, 0)), TimeCategory::Evening);
        assert_eq!(time_category(&hm(22, 59)), TimeCategory::Evening);
        assert_eq!(time_category(&hm(23, 0)), TimeCategory::Night);
        assert_eq!(time_category(&hm(0, 0)), TimeCategory::Night);
    }

    #[test]
    fn day_buckets() {
        // 2026-03-14 is a Saturday.
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap_or_else(|| panic!("bad day {d}"));
        assert_eq!(day_category(&day(13)), DayCategory::Weekday);
        assert_eq!(day_category(&day(14)), DayCategory::Weekend);
        assert_eq!(day_category(&day(15)), DayCategory::Weekend);
        assert_eq!(day_category(&day(16)), DayCategory::Weekday);
    }

    #[test]
    fn prune_keeps_the_retention_window() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("bad date"));
        let mut history = vec![
            entry(now - TimeDelta::days(61)),
            entry(now - TimeDelta::days(60)),
            entry(now - TimeDelta::days(10)),
            entry(now),
        ];
        assert_eq!(prune_history(&mut history, now, DEFAULT_RETENTION_DAYS), 1);
        assert_eq!(history.len(), 3);
        assert_eq!(prune_history(&mut history, now, DEFAULT_RETENTION_DAYS), 0);
    }
}
