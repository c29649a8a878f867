//! Weekly summary request packaging.
//!
//! This module packages a window's aggregated data into a bounded payload
//! for an external text generator. It does not write prose itself; when the
//! generator is unavailable a templated narrative is built from the same
//! counts (see [`generator`]).

pub mod generator;

pub use generator::{
    fallback_narrative, generate_weekly_summary, generate_with_timeout, NarrativeSource,
    TextGenerator, WeeklySummary,
};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{check_in_streak, daily_mood_points, mood_trend, MoodTrend};
use crate::challenge::{DailyChallenge, TrainingPath};
use crate::history::{CheckIn, DateRange};

/// Hard caps for the generation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_max_completed_titles")]
    pub max_completed_titles: usize,
    #[serde(default = "default_max_excerpts")]
    pub max_journal_excerpts: usize,
    #[serde(default = "default_max_excerpts")]
    pub max_check_in_excerpts: usize,
    /// Maximum characters per excerpt
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,
    #[serde(default = "default_max_key_themes")]
    pub max_key_themes: usize,
    /// Generator timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_completed_titles() -> usize {
    5
}
fn default_max_excerpts() -> usize {
    3
}
fn default_excerpt_max_chars() -> usize {
    100
}
fn default_max_key_themes() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    20
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_completed_titles: default_max_completed_titles(),
            max_journal_excerpts: default_max_excerpts(),
            max_check_in_excerpts: default_max_excerpts(),
            excerpt_max_chars: default_excerpt_max_chars(),
            max_key_themes: default_max_key_themes(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bounded payload handed to the text generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub path: TrainingPath,
    pub range: Option<DateRange>,
    /// Most recent completed titles, oldest first
    pub completed_titles: Vec<String>,
    pub journal_excerpts: Vec<String>,
    pub check_in_excerpts: Vec<String>,
    /// Uncapped count of completed challenges
    pub challenges_completed: u32,
    pub check_in_streak: u32,
    pub mood_trend: MoodTrend,
    pub key_themes: Vec<String>,
    pub recommended_focus: TrainingPath,
}

impl SummaryRequest {
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_recommended_focus(mut self, path: TrainingPath) -> Self {
        self.recommended_focus = path;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SummaryRequestBuilder {
    config: SummaryConfig,
}

impl SummaryRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SummaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Package chronological inputs into a bounded request. Excess items are
    /// dropped earliest-first.
    pub fn build(
        &self,
        journal_excerpts: &[String],
        completed_challenges: &[DailyChallenge],
        check_ins: &[CheckIn],
        path: TrainingPath,
    ) -> SummaryRequest {
        let completed: Vec<&DailyChallenge> = completed_challenges
            .iter()
            .filter(|c| c.is_completed())
            .collect();

        let completed_titles = keep_latest(
            completed.iter().map(|c| c.title().to_string()),
            self.config.max_completed_titles,
        );

        let journal = keep_latest(
            journal_excerpts
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| truncate_chars(s, self.config.excerpt_max_chars)),
            self.config.max_journal_excerpts,
        );

        let check_in_notes = keep_latest(
            check_ins
                .iter()
                .filter_map(|c| c.note.as_deref())
                .filter(|s| !s.trim().is_empty())
                .map(|s| truncate_chars(s, self.config.excerpt_max_chars)),
            self.config.max_check_in_excerpts,
        );

        let points = daily_mood_points(check_ins);
        let streak = points
            .last()
            .map(|p| check_in_streak(&points, p.date))
            .unwrap_or(0);

        SummaryRequest {
            path,
            range: inferred_range(&completed, check_ins),
            completed_titles,
            journal_excerpts: journal,
            check_in_excerpts: check_in_notes,
            challenges_completed: completed.len() as u32,
            check_in_streak: streak,
            mood_trend: mood_trend(&points),
            key_themes: key_themes(&completed, self.config.max_key_themes),
            recommended_focus: path,
        }
    }
}

/// Keep the last `max` items of a chronological sequence.
fn keep_latest<I: Iterator<Item = String>>(items: I, max: usize) -> Vec<String> {
    let all: Vec<String> = items.collect();
    let skip = all.len().saturating_sub(max);
    all.into_iter().skip(skip).collect()
}

/// Truncate at a char boundary, never exceeding `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Most frequent tags and categories among completed challenges.
fn key_themes(completed: &[&DailyChallenge], max: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for challenge in completed {
        *counts.entry(challenge.category().to_string()).or_default() += 1;
        for tag in &challenge.template.tags {
            *counts.entry(tag.clone()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(max).map(|(theme, _)| theme).collect()
}

fn inferred_range(completed: &[&DailyChallenge], check_ins: &[CheckIn]) -> Option<DateRange> {
    let dates: Vec<NaiveDate> = completed
        .iter()
        .map(|c| c.date)
        .chain(check_ins.iter().map(|c| c.date))
        .collect();
    let start = dates.iter().min()?;
    let end = dates.iter().max()?;
    DateRange::new(*start, *end).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{Category, ChallengeTemplate, Difficulty};
    use chrono::{Duration, Utc};

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap() + Duration::days(n)
    }

    fn completed(title: &str, n: i64, tags: &[&str]) -> DailyChallenge {
        let t = ChallengeTemplate::new(title, TrainingPath::Purpose, Difficulty::Standard, Category::Social, 10)
            .with_tags(tags.iter().copied());
        let mut c = DailyChallenge::new(t, day(n), Utc::now());
        c.complete(Utc::now(), None, None).unwrap();
        c
    }

    #[test]
    fn caps_keep_most_recent_items() {
        let challenges: Vec<DailyChallenge> = (0..8).map(|i| completed(&format!("C{i}"), i, &[])).collect();
        let journal: Vec<String> = (0..6).map(|i| format!("entry {i}")).collect();
        let check_ins: Vec<CheckIn> = (0..5)
            .map(|i| CheckIn::new(Utc::now(), day(i), 3, Some(format!("note {i}")), None).unwrap())
            .collect();

        let req = SummaryRequestBuilder::new().build(&journal, &challenges, &check_ins, TrainingPath::Purpose);

        assert_eq!(req.completed_titles, vec!["C3", "C4", "C5", "C6", "C7"]);
        assert_eq!(req.journal_excerpts, vec!["entry 3", "entry 4", "entry 5"]);
        assert_eq!(req.check_in_excerpts, vec!["note 2", "note 3", "note 4"]);
        assert_eq!(req.challenges_completed, 8);
        assert_eq!(req.check_in_streak, 5);
    }

    #[test]
    fn excerpts_are_truncated_to_limit() {
        let long = "é".repeat(250);
        let req = SummaryRequestBuilder::new().build(&[long], &[], &[], TrainingPath::Clarity);
        assert_eq!(req.journal_excerpts[0].chars().count(), 100);
    }

    #[test]
    fn skipped_challenges_are_not_listed() {
        let mut skipped = completed("x", 0, &[]);
        skipped.status = crate::challenge::ChallengeStatus::Skipped {
            skipped_at: Utc::now(),
            reason: None,
        };
        let req = SummaryRequestBuilder::new().build(&[], &[skipped], &[], TrainingPath::Clarity);
        assert!(req.completed_titles.is_empty());
        assert_eq!(req.challenges_completed, 0);
        assert!(req.range.is_none());
    }

    #[test]
    fn key_themes_rank_by_frequency() {
        let challenges = vec![
            completed("a", 0, &["gratitude", "values"]),
            completed("b", 1, &["gratitude"]),
            completed("c", 2, &["service"]),
        ];
        let req = SummaryRequestBuilder::new().build(&[], &challenges, &[], TrainingPath::Purpose);
        assert_eq!(req.key_themes[0], "social");
        assert_eq!(req.key_themes[1], "gratitude");
        assert!(req.key_themes.len() <= 5);
        assert_eq!(req.range, Some(DateRange::new(day(0), day(2)).unwrap()));
    }

    #[test]
    fn blank_notes_are_skipped() {
        let check_ins = vec![
            CheckIn::new(Utc::now(), day(0), 3, Some("   ".into()), None).unwrap(),
            CheckIn::new(Utc::now(), day(1), 3, None, None).unwrap(),
        ];
        let req = SummaryRequestBuilder::new().build(&[], &[], &check_ins, TrainingPath::Purpose);
        assert!(req.check_in_excerpts.is_empty());
    }
}
