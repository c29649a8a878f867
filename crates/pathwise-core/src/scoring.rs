//! Challenge scoring.
//!
//! A template's desirability is a product of independent factors, each in
//! roughly [0, 1.4]:
//! 1. Base score: 1.0
//! 2. Category boost: 0.5 + success rate
//! 3. Variety: days since category last used / 7, capped at 1
//! 4. Day-of-week preference multiplier
//! 5. Evening-length penalty for long challenges late in the day
//!
//! Scoring is a pure function of its inputs. Randomness lives in the selector.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::challenge::{Category, ChallengeTemplate, DailyChallenge, Difficulty};
use crate::clock::weekday_number;

/// Tunable constants for [`ScoringEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Days after which a category counts as fully fresh
    #[serde(default = "default_variety_window_days")]
    pub variety_window_days: f64,
    /// Local hour from which the evening penalty applies
    #[serde(default = "default_evening_start_hour")]
    pub evening_start_hour: u32,
    /// Longest duration (minutes) exempt from the evening penalty
    #[serde(default = "default_evening_max_minutes")]
    pub evening_max_minutes: u32,
    #[serde(default = "default_evening_penalty")]
    pub evening_penalty: f64,
}

fn default_variety_window_days() -> f64 {
    7.0
}
fn default_evening_start_hour() -> u32 {
    19
}
fn default_evening_max_minutes() -> u32 {
    15
}
fn default_evening_penalty() -> f64 {
    0.7
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            variety_window_days: default_variety_window_days(),
            evening_start_hour: default_evening_start_hour(),
            evening_max_minutes: default_evening_max_minutes(),
            evening_penalty: default_evening_penalty(),
        }
    }
}

/// Per-user statistics derived from challenge history. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChallengeStats {
    /// Completion rate per category (0.0-1.0)
    pub success_rate: BTreeMap<Category, f64>,
    /// Whole days since a challenge of the category was last issued
    pub days_since_last: BTreeMap<Category, i64>,
    /// Weekday (1 = Sunday .. 7 = Saturday) to score multiplier
    pub day_of_week_preference: BTreeMap<u32, f64>,
    pub preferred_difficulty: Option<Difficulty>,
}

impl UserChallengeStats {
    /// Derive stats from a path's challenge history as of `today`.
    ///
    /// Weekday weights are `0.5 + completion rate on that weekday` and are
    /// only present for weekdays with history.
    pub fn from_history(challenges: &[DailyChallenge], today: NaiveDate) -> Self {
        let mut per_category: BTreeMap<Category, (u32, u32)> = BTreeMap::new();
        let mut last_used: BTreeMap<Category, NaiveDate> = BTreeMap::new();
        let mut per_weekday: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
        let mut per_difficulty: BTreeMap<Difficulty, u32> = BTreeMap::new();

        for challenge in challenges {
            let completed = challenge.is_completed() as u32;

            let entry = per_category.entry(challenge.category()).or_default();
            entry.0 += completed;
            entry.1 += 1;

            last_used
                .entry(challenge.category())
                .and_modify(|d| *d = (*d).max(challenge.date))
                .or_insert(challenge.date);

            let entry = per_weekday.entry(weekday_number(&challenge.date)).or_default();
            entry.0 += completed;
            entry.1 += 1;

            if completed == 1 {
                *per_difficulty.entry(challenge.difficulty()).or_default() += 1;
            }
        }

        let success_rate = per_category
            .into_iter()
            .map(|(cat, (done, total))| (cat, done as f64 / total as f64))
            .collect();

        let days_since_last = last_used
            .into_iter()
            .map(|(cat, date)| (cat, (today - date).num_days().max(0)))
            .collect();

        let day_of_week_preference = per_weekday
            .into_iter()
            .map(|(day, (done, total))| (day, 0.5 + done as f64 / total as f64))
            .collect();

        // ascending iteration: ties keep the lower difficulty
        let preferred_difficulty = per_difficulty
            .into_iter()
            .fold(None, |best: Option<(Difficulty, u32)>, (d, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((d, n)),
            })
            .map(|(d, _)| d);

        Self {
            success_rate,
            days_since_last,
            day_of_week_preference,
            preferred_difficulty,
        }
    }
}

/// Category boost: `0.5 + success_rate`. Unseen categories get 0.5.
pub fn category_boost(template: &ChallengeTemplate, stats: &UserChallengeStats) -> f64 {
    0.5 + stats
        .success_rate
        .get(&template.category)
        .copied()
        .unwrap_or(0.0)
}

/// Variety factor in [0, 1]; unseen categories count as fully fresh.
pub fn variety_factor(
    template: &ChallengeTemplate,
    stats: &UserChallengeStats,
    config: &ScoringConfig,
) -> f64 {
    match stats.days_since_last.get(&template.category) {
        Some(&days) if config.variety_window_days > 0.0 => {
            (days.max(0) as f64 / config.variety_window_days).min(1.0)
        }
        _ => 1.0,
    }
}

/// Day-of-week multiplier for the weekday of `now`, 1.0 if unknown.
pub fn day_of_week_factor(stats: &UserChallengeStats, now: &DateTime<FixedOffset>) -> f64 {
    stats
        .day_of_week_preference
        .get(&now.weekday().number_from_sunday())
        .copied()
        .unwrap_or(1.0)
}

/// Evening-length penalty: long challenges are discouraged late in the day.
pub fn evening_factor(
    template: &ChallengeTemplate,
    now: &DateTime<FixedOffset>,
    config: &ScoringConfig,
) -> f64 {
    if now.hour() >= config.evening_start_hour && template.estimated_minutes > config.evening_max_minutes {
        config.evening_penalty
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a template for the given user stats at local time `now`.
    pub fn score(
        &self,
        template: &ChallengeTemplate,
        stats: &UserChallengeStats,
        now: &DateTime<FixedOffset>,
    ) -> f64 {
        let score = 1.0
            * category_boost(template, stats)
            * variety_factor(template, stats, &self.config)
            * day_of_week_factor(stats, now)
            * evening_factor(template, now, &self.config);
        score.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::TrainingPath;
    use chrono::{TimeZone, Utc};

    fn template(category: Category, minutes: u32) -> ChallengeTemplate {
        ChallengeTemplate::new("t", TrainingPath::Discipline, Difficulty::Standard, category, minutes)
    }

    fn at(hour: u32) -> DateTime<FixedOffset> {
        // 2024-03-06 is a Wednesday (weekday 4)
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 6, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn unseen_category_scores_half() {
        let engine = ScoringEngine::new();
        let score = engine.score(&template(Category::Mental, 10), &UserChallengeStats::default(), &at(9));
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn all_factors_multiply() {
        let mut stats = UserChallengeStats::default();
        stats.success_rate.insert(Category::Physical, 0.8);
        stats.days_since_last.insert(Category::Physical, 3);
        stats.day_of_week_preference.insert(4, 1.2);

        let engine = ScoringEngine::new();
        let score = engine.score(&template(Category::Physical, 30), &stats, &at(20));
        let expected = 1.3 * (3.0 / 7.0) * 1.2 * 0.7;
        assert!((score - expected).abs() < 1e-9, "got {score}, expected {expected}");
    }

    #[test]
    fn category_used_today_scores_zero() {
        let mut stats = UserChallengeStats::default();
        stats.days_since_last.insert(Category::Social, 0);
        let score = ScoringEngine::new().score(&template(Category::Social, 5), &stats, &at(9));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn variety_caps_after_a_week() {
        let mut stats = UserChallengeStats::default();
        stats.days_since_last.insert(Category::Creative, 30);
        let f = variety_factor(&template(Category::Creative, 5), &stats, &ScoringConfig::default());
        assert_eq!(f, 1.0);
    }

    #[test]
    fn evening_penalty_only_for_long_challenges() {
        let config = ScoringConfig::default();
        assert_eq!(evening_factor(&template(Category::General, 15), &at(21), &config), 1.0);
        assert_eq!(evening_factor(&template(Category::General, 16), &at(21), &config), 0.7);
        assert_eq!(evening_factor(&template(Category::General, 60), &at(18), &config), 1.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let mut stats = UserChallengeStats::default();
        stats.success_rate.insert(Category::Digital, 0.33);
        let engine = ScoringEngine::new();
        let t = template(Category::Digital, 20);
        let first = engine.score(&t, &stats, &at(19));
        for _ in 0..100 {
            assert_eq!(engine.score(&t, &stats, &at(19)), first);
        }
    }

    #[test]
    fn stats_from_history() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mk = |cat: Category, diff: Difficulty, day: u32, done: bool| {
            let mut t = template(cat, 10);
            t.difficulty = diff;
            let mut c = DailyChallenge::new(
                t,
                NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap(),
            );
            if done {
                c.complete(Utc::now(), None, None).unwrap();
            } else {
                c.skip(Utc::now(), None).unwrap();
            }
            c
        };
        let history = vec![
            mk(Category::Physical, Difficulty::Micro, 3, true),   // Sunday
            mk(Category::Physical, Difficulty::Standard, 4, false), // Monday
            mk(Category::Mental, Difficulty::Standard, 8, true),  // Friday
            mk(Category::Mental, Difficulty::Micro, 10, true),    // Sunday
        ];

        let stats = UserChallengeStats::from_history(&history, today);
        assert_eq!(stats.success_rate[&Category::Physical], 0.5);
        assert_eq!(stats.success_rate[&Category::Mental], 1.0);
        assert_eq!(stats.days_since_last[&Category::Physical], 6);
        assert_eq!(stats.days_since_last[&Category::Mental], 0);
        assert_eq!(stats.day_of_week_preference[&1], 1.5);
        assert_eq!(stats.day_of_week_preference[&2], 0.5);
        assert!(!stats.day_of_week_preference.contains_key(&3));
        // Micro and Standard both have completions; Micro has two
        assert_eq!(stats.preferred_difficulty, Some(Difficulty::Micro));
    }

    #[test]
    fn preferred_difficulty_ties_go_to_lower() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mk = |diff: Difficulty| {
            let mut t = template(Category::General, 10);
            t.difficulty = diff;
            let mut c = DailyChallenge::new(t, today, Utc::now());
            c.complete(Utc::now(), None, None).unwrap();
            c
        };
        let stats = UserChallengeStats::from_history(&[mk(Difficulty::Advanced), mk(Difficulty::Standard)], today);
        assert_eq!(stats.preferred_difficulty, Some(Difficulty::Standard));
        assert_eq!(UserChallengeStats::from_history(&[], today).preferred_difficulty, None);
    }
}
