//! Mood aggregation, trend classification and variability.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::history::CheckIn;

/// Mean difference between halves needed to call a trend.
pub const TREND_THRESHOLD: f64 = 0.2;

/// Average mood of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodDataPoint {
    pub date: NaiveDate,
    /// Mean of same-day check-ins, 1.0..=5.0
    pub average_mood: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    #[default]
    Stable,
    Declining,
}

impl MoodTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTrend::Improving => "improving",
            MoodTrend::Stable => "stable",
            MoodTrend::Declining => "declining",
        }
    }
}

impl fmt::Display for MoodTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point per calendar day, in date order.
pub fn daily_mood_points(check_ins: &[CheckIn]) -> Vec<MoodDataPoint> {
    let mut days: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for check_in in check_ins {
        let entry = days.entry(check_in.date).or_default();
        entry.0 += u32::from(check_in.mood);
        entry.1 += 1;
    }
    days.into_iter()
        .map(|(date, (sum, count))| MoodDataPoint {
            date,
            average_mood: sum as f64 / count as f64,
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn average_mood(points: &[MoodDataPoint]) -> f64 {
    mean(points.iter().map(|p| p.average_mood)).unwrap_or(0.0)
}

/// Compare the means of the first and second half (second half takes the
/// extra point on odd counts).
pub fn mood_trend(points: &[MoodDataPoint]) -> MoodTrend {
    mood_trend_with_threshold(points, TREND_THRESHOLD)
}

pub fn mood_trend_with_threshold(points: &[MoodDataPoint], threshold: f64) -> MoodTrend {
    if points.len() < 2 {
        return MoodTrend::Stable;
    }
    let (first, second) = points.split_at(points.len() / 2);
    let first_mean = average_mood(first);
    let second_mean = average_mood(second);

    if second_mean > first_mean + threshold {
        MoodTrend::Improving
    } else if second_mean < first_mean - threshold {
        MoodTrend::Declining
    } else {
        MoodTrend::Stable
    }
}

/// Population standard deviation of daily averages; 0 when empty.
pub fn mood_variability(points: &[MoodDataPoint]) -> f64 {
    let Some(m) = mean(points.iter().map(|p| p.average_mood)) else {
        return 0.0;
    };
    let variance = points
        .iter()
        .map(|p| (p.average_mood - m).powi(2))
        .sum::<f64>()
        / points.len() as f64;
    variance.sqrt()
}

/// Consecutive days with at least one check-in, counted back from `end`.
/// A day without a check-in yet at `end` does not break the streak.
pub fn check_in_streak(points: &[MoodDataPoint], end: NaiveDate) -> u32 {
    let has = |d: NaiveDate| points.iter().any(|p| p.date == d);
    let mut day = if has(end) { Some(end) } else { end.pred_opt() };
    let mut streak = 0;
    while let Some(d) = day.filter(|&d| has(d)) {
        streak += 1;
        day = d.pred_opt();
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn points(values: &[f64]) -> Vec<MoodDataPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| MoodDataPoint {
                date: start + Duration::days(i as i64),
                average_mood: v,
            })
            .collect()
    }

    #[test]
    fn trend_classification_examples() {
        assert_eq!(mood_trend(&points(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0])), MoodTrend::Improving);
        assert_eq!(mood_trend(&points(&[5.0, 5.0, 5.0, 1.0, 1.0, 1.0])), MoodTrend::Declining);
        assert_eq!(mood_trend(&points(&[3.0, 3.0, 3.0, 3.0])), MoodTrend::Stable);
    }

    #[test]
    fn trend_with_too_few_points_is_stable() {
        assert_eq!(mood_trend(&[]), MoodTrend::Stable);
        assert_eq!(mood_trend(&points(&[1.0])), MoodTrend::Stable);
    }

    #[test]
    fn odd_count_gives_second_half_extra_point() {
        // first = [2], second = [2, 5] -> 3.5 vs 2.0
        assert_eq!(mood_trend(&points(&[2.0, 2.0, 5.0])), MoodTrend::Improving);
        // first = [3], second = [3, 3.3] -> 3.15 vs 3.0, inside threshold
        assert_eq!(mood_trend(&points(&[3.0, 3.0, 3.3])), MoodTrend::Stable);
    }

    #[test]
    fn same_day_check_ins_are_averaged() {
        let d1 = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let check_ins = vec![
            CheckIn::new(Utc::now(), d2, 4, None, None).unwrap(),
            CheckIn::new(Utc::now(), d1, 2, None, None).unwrap(),
            CheckIn::new(Utc::now(), d1, 5, None, None).unwrap(),
        ];
        let pts = daily_mood_points(&check_ins);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].date, d1);
        assert_eq!(pts[0].average_mood, 3.5);
        assert_eq!(pts[1].average_mood, 4.0);
    }

    #[test]
    fn variability_is_population_std_dev() {
        assert_eq!(mood_variability(&[]), 0.0);
        assert_eq!(mood_variability(&points(&[3.0, 3.0])), 0.0);
        let v = mood_variability(&points(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]));
        assert!((v - 2.0).abs() < 1e-9);
    }

    #[test]
    fn check_in_streak_counts_back_from_end() {
        let pts = points(&[3.0, 3.0, 3.0]); // Apr 1..3
        let apr = |d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap();
        assert_eq!(check_in_streak(&pts, apr(3)), 3);
        assert_eq!(check_in_streak(&pts, apr(4)), 3, "today without check-in yet");
        assert_eq!(check_in_streak(&pts, apr(5)), 0);
        assert_eq!(check_in_streak(&[], apr(5)), 0);
    }
}
