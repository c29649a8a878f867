//! Analytics over challenge and check-in history.
//!
//! All functions are pure and total: an empty window yields a zeroed
//! snapshot with `has_enough_data = false`, never an error, so the UI can
//! always render a "not enough data" state.

mod completion;
mod mood;
mod runs;

pub use completion::{
    average_effort, category_preference, completion_rate, difficulty_preference,
    grouped_completion, ratio, strongest, PreferenceStat,
};
pub use mood::{
    average_mood, check_in_streak, daily_mood_points, mood_trend, mood_trend_with_threshold,
    mood_variability, MoodDataPoint, MoodTrend, TREND_THRESHOLD,
};
pub use runs::{analyze_runs, completion_runs, completion_sequence, RunStats};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::challenge::{Category, DailyChallenge, Difficulty, TrainingPath};
use crate::history::{CheckIn, DateRange};

/// Everything the UI and the summary step need about one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub path: TrainingPath,
    pub range: DateRange,
    pub total_challenges: u32,
    pub completed: u32,
    pub skipped: u32,
    pub completion_rate: f64,
    pub average_effort: f64,
    pub category_preference: BTreeMap<Category, PreferenceStat>,
    pub difficulty_preference: BTreeMap<Difficulty, PreferenceStat>,
    pub runs: RunStats,
    pub mood_points: Vec<MoodDataPoint>,
    pub mood_trend: MoodTrend,
    pub mood_variability: f64,
    pub average_mood: f64,
    pub check_in_count: u32,
    pub check_in_streak: u32,
    pub has_enough_data: bool,
}

impl AnalyticsSnapshot {
    /// Zeroed snapshot for a window with no data.
    pub fn empty(path: TrainingPath, range: DateRange) -> Self {
        Self {
            path,
            range,
            total_challenges: 0,
            completed: 0,
            skipped: 0,
            completion_rate: 0.0,
            average_effort: 0.0,
            category_preference: BTreeMap::new(),
            difficulty_preference: BTreeMap::new(),
            runs: RunStats::default(),
            mood_points: Vec::new(),
            mood_trend: MoodTrend::Stable,
            mood_variability: 0.0,
            average_mood: 0.0,
            check_in_count: 0,
            check_in_streak: 0,
            has_enough_data: false,
        }
    }

    pub fn strongest_category(&self) -> Option<Category> {
        strongest(&self.category_preference)
    }
}

/// Builds [`AnalyticsSnapshot`]s.
#[derive(Debug, Clone)]
pub struct AnalyticsAggregator {
    /// Mean difference between halves needed to call a mood trend
    pub trend_threshold: f64,
}

impl Default for AnalyticsAggregator {
    fn default() -> Self {
        Self {
            trend_threshold: TREND_THRESHOLD,
        }
    }
}

impl AnalyticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(
        &self,
        path: TrainingPath,
        range: DateRange,
        challenges: &[DailyChallenge],
        check_ins: &[CheckIn],
    ) -> AnalyticsSnapshot {
        if challenges.is_empty() && check_ins.is_empty() {
            return AnalyticsSnapshot::empty(path, range);
        }

        let mood_points = daily_mood_points(check_ins);

        AnalyticsSnapshot {
            path,
            range,
            total_challenges: challenges.len() as u32,
            completed: challenges.iter().filter(|c| c.is_completed()).count() as u32,
            skipped: challenges.iter().filter(|c| c.is_skipped()).count() as u32,
            completion_rate: completion_rate(challenges),
            average_effort: average_effort(challenges),
            category_preference: category_preference(challenges),
            difficulty_preference: difficulty_preference(challenges),
            runs: analyze_runs(&completion_sequence(challenges)),
            mood_trend: mood_trend_with_threshold(&mood_points, self.trend_threshold),
            mood_variability: mood_variability(&mood_points),
            average_mood: average_mood(&mood_points),
            check_in_count: check_ins.len() as u32,
            check_in_streak: check_in_streak(&mood_points, range.end),
            mood_points,
            has_enough_data: true,
        }
    }
}
