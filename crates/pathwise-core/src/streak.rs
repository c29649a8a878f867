//! Streak state machine with banked grace days.
//!
//! The streak counts calendar days, not challenges. Transitions:
//! - **Complete**: total +1; on the first completion of a day current +1
//!   and longest = max(longest, current)
//! - **Skip** with bank days: one bank day is consumed, current is kept
//! - **Skip** without bank days: current resets to 0
//! - **Missed day** (no activity at all): same as a skip
//!
//! A skip on a day that already saw a completion or a skip leaves the
//! counters alone.
//!
//! Invariants: `longest_streak >= current_streak`, `bank_days` never
//! underflows, `total_completed` never decreases.
//!
//! Callers serialize transitions per user; the tracker takes `&mut self`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Persistent streak counters for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completed: u64,
    pub bank_days: u32,
    /// Last calendar day with a completion or skip
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    /// Last calendar day credited to the streak
    #[serde(default)]
    pub last_completed_date: Option<NaiveDate>,
}

impl StreakState {
    pub fn with_bank_days(bank_days: u32) -> Self {
        Self {
            bank_days,
            ..Self::default()
        }
    }

    /// `longest_streak >= current_streak` and, when both dates are set, the
    /// last credited day is not after the last activity.
    pub fn invariants_hold(&self) -> bool {
        let dates_ordered = match (self.last_completed_date, self.last_activity_date) {
            (Some(completed), Some(activity)) => completed <= activity,
            _ => true,
        };
        self.longest_streak >= self.current_streak && dates_ordered
    }
}

/// Configuration for bank-day earning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Completions in a row that earn one bank day (0 disables earning)
    #[serde(default = "default_bank_day_interval")]
    pub bank_day_interval: u32,
    /// Upper bound on banked days
    #[serde(default = "default_max_bank_days")]
    pub max_bank_days: u32,
    /// Keep an in-memory log of transitions
    #[serde(default = "default_true")]
    pub enable_logging: bool,
}

fn default_bank_day_interval() -> u32 {
    7
}
fn default_max_bank_days() -> u32 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            bank_day_interval: default_bank_day_interval(),
            max_bank_days: default_max_bank_days(),
            enable_logging: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakEvent {
    Complete,
    Skip,
    MissedDay,
    BankDayGranted,
}

impl StreakEvent {
    pub fn description(&self) -> &'static str {
        match self {
            StreakEvent::Complete => "Challenge completed",
            StreakEvent::Skip => "Challenge skipped",
            StreakEvent::MissedDay => "Day missed without activity",
            StreakEvent::BankDayGranted => "Bank day granted",
        }
    }
}

/// A logged transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakTransition {
    pub event: StreakEvent,
    pub date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    pub before: StreakState,
    pub after: StreakState,
    /// Whether a bank day absorbed a miss
    pub bank_day_used: bool,
}

impl StreakTransition {
    pub fn streak_preserved(&self) -> bool {
        self.after.current_streak >= self.before.current_streak
    }
}

/// Tracker state captured before a transition that may need undoing.
#[derive(Debug, Clone)]
pub struct StreakCheckpoint {
    state: StreakState,
    history_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    config: StreakConfig,
    state: StreakState,
    history: Vec<StreakTransition>,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreakConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Resume from a persisted state.
    pub fn from_state(state: StreakState, config: StreakConfig) -> Self {
        Self {
            config,
            state,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    pub fn history(&self) -> &[StreakTransition] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn checkpoint(&self) -> StreakCheckpoint {
        StreakCheckpoint {
            state: self.state.clone(),
            history_len: self.history.len(),
        }
    }

    /// Undo every transition applied since `checkpoint`.
    pub fn restore(&mut self, checkpoint: StreakCheckpoint) {
        self.state = checkpoint.state;
        self.history.truncate(checkpoint.history_len);
    }

    /// A challenge was completed on `date`.
    pub fn complete(&mut self, date: NaiveDate, at: DateTime<Utc>) -> StreakTransition {
        let before = self.state.clone();
        let s = &mut self.state;

        s.total_completed = s.total_completed.saturating_add(1);
        if s.last_completed_date != Some(date) {
            s.current_streak = s.current_streak.saturating_add(1);
            s.longest_streak = s.longest_streak.max(s.current_streak);
            s.last_completed_date = Some(date);

            let interval = self.config.bank_day_interval;
            if interval > 0 && s.current_streak % interval == 0 && s.bank_days < self.config.max_bank_days {
                s.bank_days += 1;
                tracing::info!(streak = s.current_streak, bank_days = s.bank_days, "bank day earned");
            }
        }
        touch(s, date);

        self.record(StreakEvent::Complete, date, at, before, false)
    }

    /// A challenge was skipped on `date`.
    pub fn skip(&mut self, date: NaiveDate, at: DateTime<Utc>) -> StreakTransition {
        let before = self.state.clone();
        let used = if self.state.last_activity_date == Some(date) {
            false
        } else {
            self.absorb_miss()
        };
        touch(&mut self.state, date);
        self.record(StreakEvent::Skip, date, at, before, used)
    }

    /// A day passed with no check-in at all. Treated like a skip.
    pub fn missed_day(&mut self, date: NaiveDate, at: DateTime<Utc>) -> StreakTransition {
        let before = self.state.clone();
        let used = self.absorb_miss();
        self.record(StreakEvent::MissedDay, date, at, before, used)
    }

    /// Apply one missed day for every calendar day strictly between the
    /// last activity and `today`.
    pub fn register_missed_days(&mut self, today: NaiveDate, at: DateTime<Utc>) -> Vec<StreakTransition> {
        let Some(last) = self.state.last_activity_date else {
            return Vec::new();
        };
        let gap = (today - last).num_days() - 1;
        if gap <= 0 {
            return Vec::new();
        }

        let transitions: Vec<StreakTransition> = (1..=gap)
            .map(|offset| self.missed_day(last + Duration::days(offset), at))
            .collect();
        self.state.last_activity_date = Some(today - Duration::days(1));
        transitions
    }

    /// Grant a bank day, respecting the cap. Returns whether one was added.
    pub fn grant_bank_day(&mut self, date: NaiveDate, at: DateTime<Utc>) -> bool {
        if self.state.bank_days >= self.config.max_bank_days {
            return false;
        }
        let before = self.state.clone();
        self.state.bank_days += 1;
        self.record(StreakEvent::BankDayGranted, date, at, before, false);
        true
    }

    fn absorb_miss(&mut self) -> bool {
        if self.state.bank_days > 0 {
            self.state.bank_days -= 1;
            true
        } else {
            self.state.current_streak = 0;
            false
        }
    }

    fn record(
        &mut self,
        event: StreakEvent,
        date: NaiveDate,
        at: DateTime<Utc>,
        before: StreakState,
        bank_day_used: bool,
    ) -> StreakTransition {
        let transition = StreakTransition {
            event,
            date,
            recorded_at: at,
            before,
            after: self.state.clone(),
            bank_day_used,
        };

        tracing::info!(
            event = ?event,
            %date,
            current = transition.after.current_streak,
            longest = transition.after.longest_streak,
            bank_days = transition.after.bank_days,
            bank_day_used,
            "streak transition"
        );

        if self.config.enable_logging {
            self.history.push(transition.clone());
        }
        transition
    }
}

fn touch(state: &mut StreakState, date: NaiveDate) {
    state.last_activity_date = Some(state.last_activity_date.map_or(date, |d| d.max(date)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n - 1)
    }

    fn no_earning() -> StreakConfig {
        StreakConfig {
            bank_day_interval: 0,
            ..Default::default()
        }
    }

    #[test]
    fn completion_increments_all_counters() {
        let mut tracker = StreakTracker::new();
        let t = tracker.complete(day(1), Utc::now());
        assert_eq!(t.after.current_streak, 1);
        assert_eq!(t.after.longest_streak, 1);
        assert_eq!(t.after.total_completed, 1);
        assert_eq!(tracker.state().last_activity_date, Some(day(1)));
    }

    #[test]
    fn skip_without_bank_resets_current_only() {
        let mut tracker = StreakTracker::with_config(no_earning());
        tracker.complete(day(1), Utc::now());
        tracker.complete(day(2), Utc::now());
        let t = tracker.skip(day(3), Utc::now());
        assert_eq!(t.after.current_streak, 0);
        assert_eq!(t.after.longest_streak, 2);
        assert_eq!(t.after.total_completed, 2);
        assert!(!t.bank_day_used);
    }

    #[test]
    fn skip_with_bank_preserves_streak() {
        let mut tracker = StreakTracker::from_state(StreakState::with_bank_days(1), no_earning());
        tracker.complete(day(1), Utc::now());
        let t = tracker.skip(day(2), Utc::now());
        assert!(t.bank_day_used);
        assert!(t.streak_preserved());
        assert_eq!(t.after.bank_days, 0);
        assert_eq!(t.after.current_streak, 1);
    }

    #[test]
    fn several_completions_on_one_day_count_once() {
        let mut tracker = StreakTracker::with_config(no_earning());
        tracker.complete(day(1), Utc::now());
        let t = tracker.complete(day(1), Utc::now());
        assert_eq!(t.after.current_streak, 1);
        assert_eq!(t.after.total_completed, 2);

        tracker.complete(day(2), Utc::now());
        assert_eq!(tracker.state().current_streak, 2);
        assert_eq!(tracker.state().longest_streak, 2);
        assert!(tracker.state().invariants_hold());
    }

    #[test]
    fn skip_after_completion_on_same_day_keeps_streak() {
        let mut tracker = StreakTracker::from_state(StreakState::with_bank_days(1), no_earning());
        tracker.complete(day(1), Utc::now());
        let t = tracker.skip(day(1), Utc::now());
        assert!(!t.bank_day_used);
        assert_eq!(t.after.current_streak, 1);
        assert_eq!(t.after.bank_days, 1);

        // a second skip on an already skipped day costs nothing either
        tracker.skip(day(2), Utc::now());
        let t = tracker.skip(day(2), Utc::now());
        assert_eq!(t.before, t.after);
        assert_eq!(tracker.state().bank_days, 0);
    }

    #[test]
    fn bank_day_earned_every_interval_and_capped() {
        let config = StreakConfig {
            bank_day_interval: 2,
            max_bank_days: 2,
            enable_logging: true,
        };
        let mut tracker = StreakTracker::with_config(config);
        for d in 1..=8 {
            tracker.complete(day(d), Utc::now());
        }
        assert_eq!(tracker.state().bank_days, 2);
        assert_eq!(tracker.state().current_streak, 8);
    }

    #[test]
    fn missed_days_between_activity_and_today() {
        let mut tracker = StreakTracker::from_state(StreakState::with_bank_days(1), no_earning());
        tracker.complete(day(1), Utc::now());
        tracker.complete(day(2), Utc::now());

        // days 3 and 4 missed; first is banked, second resets
        let transitions = tracker.register_missed_days(day(5), Utc::now());
        assert_eq!(transitions.len(), 2);
        assert!(transitions[0].bank_day_used);
        assert_eq!(transitions[0].after.current_streak, 2);
        assert_eq!(transitions[1].after.current_streak, 0);
        assert_eq!(tracker.state().longest_streak, 2);

        // idempotent for the same day
        assert!(tracker.register_missed_days(day(5), Utc::now()).is_empty());
    }

    #[test]
    fn no_missed_days_without_prior_activity() {
        let mut tracker = StreakTracker::new();
        assert!(tracker.register_missed_days(day(10), Utc::now()).is_empty());
    }

    #[test]
    fn restore_undoes_transitions() {
        let mut tracker = StreakTracker::new();
        tracker.complete(day(1), Utc::now());
        let checkpoint = tracker.checkpoint();

        tracker.register_missed_days(day(4), Utc::now());
        tracker.complete(day(4), Utc::now());
        assert_eq!(tracker.history().len(), 4);

        tracker.restore(checkpoint);
        assert_eq!(tracker.state().current_streak, 1);
        assert_eq!(tracker.state().last_activity_date, Some(day(1)));
        assert_eq!(tracker.history().len(), 1);
    }

    #[test]
    fn grant_respects_cap() {
        let mut tracker = StreakTracker::with_config(StreakConfig {
            max_bank_days: 1,
            ..Default::default()
        });
        assert!(tracker.grant_bank_day(day(1), Utc::now()));
        assert!(!tracker.grant_bank_day(day(1), Utc::now()));
        assert_eq!(tracker.state().bank_days, 1);
    }

    #[test]
    fn history_logging_can_be_disabled() {
        let mut tracker = StreakTracker::with_config(StreakConfig {
            enable_logging: false,
            ..Default::default()
        });
        tracker.complete(day(1), Utc::now());
        assert!(tracker.history().is_empty());

        let mut logged = StreakTracker::new();
        logged.complete(day(1), Utc::now());
        logged.skip(day(2), Utc::now());
        assert_eq!(logged.history().len(), 2);
        assert_eq!(logged.history()[1].event, StreakEvent::Skip);
    }
}
