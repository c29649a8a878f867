//! History store abstraction over past challenges and check-ins.
//!
//! The engine reads and writes persistent state only through
//! [`HistoryStore`]. [`InMemoryHistory`] is the reference implementation;
//! [`crate::storage::Database`] is the SQLite one.

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::challenge::{ChallengeStatus, DailyChallenge, TrainingPath};
use crate::error::{CoreError, Result, ValidationError};
use crate::streak::StreakState;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days` calendar days ending at `end`, inclusive. Zero is treated
    /// as one; windows reaching past the calendar start at `NaiveDate::MIN`.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1)) - 1;
        Self {
            start: end.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |i| start + Duration::days(i))
    }
}

/// Status filter for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Active,
    Completed,
    Skipped,
}

impl StatusFilter {
    pub fn matches(&self, status: &ChallengeStatus) -> bool {
        matches!(
            (self, status),
            (StatusFilter::Active, ChallengeStatus::Active)
                | (StatusFilter::Completed, ChallengeStatus::Completed { .. })
                | (StatusFilter::Skipped, ChallengeStatus::Skipped { .. })
        )
    }
}

/// A mood check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Local calendar day the check-in belongs to
    pub date: NaiveDate,
    /// Mood on a 1..=5 scale
    pub mood: u8,
    pub note: Option<String>,
    pub path: Option<TrainingPath>,
}

impl CheckIn {
    pub const MIN_MOOD: u8 = 1;
    pub const MAX_MOOD: u8 = 5;

    pub fn new(
        recorded_at: DateTime<Utc>,
        date: NaiveDate,
        mood: u8,
        note: Option<String>,
        path: Option<TrainingPath>,
    ) -> Result<Self, ValidationError> {
        if !(Self::MIN_MOOD..=Self::MAX_MOOD).contains(&mood) {
            return Err(ValidationError::OutOfRange {
                field: "mood",
                value: mood as i64,
                min: Self::MIN_MOOD as i64,
                max: Self::MAX_MOOD as i64,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            recorded_at,
            date,
            mood,
            note,
            path,
        })
    }
}

/// Persistence boundary consumed by the engine.
///
/// Query results are ordered chronologically (by date, then creation time).
pub trait HistoryStore {
    fn query_challenges(
        &self,
        path: TrainingPath,
        range: DateRange,
        status: Option<StatusFilter>,
    ) -> Result<Vec<DailyChallenge>>;

    fn query_check_ins(&self, range: DateRange) -> Result<Vec<CheckIn>>;

    fn get_challenge(&self, id: Uuid) -> Result<Option<DailyChallenge>>;

    fn insert_challenge(&mut self, challenge: &DailyChallenge) -> Result<()>;

    fn update_challenge(&mut self, challenge: &DailyChallenge) -> Result<()>;

    fn insert_check_in(&mut self, check_in: &CheckIn) -> Result<()>;

    fn load_streak(&self) -> Result<Option<StreakState>>;

    fn save_streak(&mut self, state: &StreakState) -> Result<()>;

    /// Persist a challenge status change together with the streak it
    /// produced. Either both writes land or neither does.
    fn commit_transition(&mut self, challenge: &DailyChallenge, state: &StreakState) -> Result<()>;
}

/// Vec-backed history, used by tests and simulations.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistory {
    challenges: Vec<DailyChallenge>,
    check_ins: Vec<CheckIn>,
    streak: Option<StreakState>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_challenges(challenges: Vec<DailyChallenge>) -> Self {
        Self {
            challenges,
            ..Self::default()
        }
    }

    pub fn challenges(&self) -> &[DailyChallenge] {
        &self.challenges
    }
}

impl HistoryStore for InMemoryHistory {
    fn query_challenges(
        &self,
        path: TrainingPath,
        range: DateRange,
        status: Option<StatusFilter>,
    ) -> Result<Vec<DailyChallenge>> {
        let mut found: Vec<DailyChallenge> = self
            .challenges
            .iter()
            .filter(|c| c.path() == path && range.contains(c.date))
            .filter(|c| status.map_or(true, |s| s.matches(&c.status)))
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.date, c.created_at));
        Ok(found)
    }

    fn query_check_ins(&self, range: DateRange) -> Result<Vec<CheckIn>> {
        let mut found: Vec<CheckIn> = self
            .check_ins
            .iter()
            .filter(|c| range.contains(c.date))
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.date, c.recorded_at));
        Ok(found)
    }

    fn get_challenge(&self, id: Uuid) -> Result<Option<DailyChallenge>> {
        Ok(self.challenges.iter().find(|c| c.id == id).cloned())
    }

    fn insert_challenge(&mut self, challenge: &DailyChallenge) -> Result<()> {
        if self.challenges.iter().any(|c| c.id == challenge.id) {
            return Err(CoreError::History(format!(
                "challenge {} already exists",
                challenge.id
            )));
        }
        self.challenges.push(challenge.clone());
        Ok(())
    }

    fn update_challenge(&mut self, challenge: &DailyChallenge) -> Result<()> {
        let slot = self
            .challenges
            .iter_mut()
            .find(|c| c.id == challenge.id)
            .ok_or_else(|| CoreError::ChallengeNotFound(challenge.id.to_string()))?;
        *slot = challenge.clone();
        Ok(())
    }

    fn insert_check_in(&mut self, check_in: &CheckIn) -> Result<()> {
        self.check_ins.push(check_in.clone());
        Ok(())
    }

    fn load_streak(&self) -> Result<Option<StreakState>> {
        Ok(self.streak.clone())
    }

    fn save_streak(&mut self, state: &StreakState) -> Result<()> {
        self.streak = Some(state.clone());
        Ok(())
    }

    fn commit_transition(&mut self, challenge: &DailyChallenge, state: &StreakState) -> Result<()> {
        self.update_challenge(challenge)?;
        self.save_streak(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{Category, ChallengeTemplate, Difficulty};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn challenge(path: TrainingPath, date: NaiveDate) -> DailyChallenge {
        let t = ChallengeTemplate::new("t", path, Difficulty::Micro, Category::General, 5);
        DailyChallenge::new(t, date, Utc::now())
    }

    #[test]
    fn trailing_range_is_inclusive() {
        let r = DateRange::trailing(day(10), 7);
        assert_eq!(r.start, day(4));
        assert_eq!(r.num_days(), 7);
        assert!(r.contains(day(4)));
        assert!(!r.contains(day(3)));
        assert_eq!(r.days().count(), 7);
    }

    #[test]
    fn trailing_range_saturates_at_calendar_start() {
        let r = DateRange::trailing(day(10), u32::MAX);
        assert_eq!(r.start, NaiveDate::MIN);
        assert_eq!(r.end, day(10));
        assert!(r.contains(day(1)));

        let one = DateRange::trailing(day(10), 0);
        assert_eq!(one, DateRange::single(day(10)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(DateRange::new(day(5), day(4)).is_err());
    }

    #[test]
    fn check_in_mood_is_validated() {
        assert!(CheckIn::new(Utc::now(), day(1), 0, None, None).is_err());
        assert!(CheckIn::new(Utc::now(), day(1), 6, None, None).is_err());
        assert!(CheckIn::new(Utc::now(), day(1), 4, None, None).is_ok());
    }

    #[test]
    fn query_filters_by_path_range_and_status() {
        let mut store = InMemoryHistory::new();
        let mut done = challenge(TrainingPath::Clarity, day(2));
        done.complete(Utc::now(), None, None).unwrap();
        store.insert_challenge(&challenge(TrainingPath::Clarity, day(3))).unwrap();
        store.insert_challenge(&done).unwrap();
        store.insert_challenge(&challenge(TrainingPath::Purpose, day(2))).unwrap();
        store.insert_challenge(&challenge(TrainingPath::Clarity, day(20))).unwrap();

        let range = DateRange::new(day(1), day(10)).unwrap();
        let all = store.query_challenges(TrainingPath::Clarity, range, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date, day(2), "results are chronological");

        let completed = store
            .query_challenges(TrainingPath::Clarity, range, Some(StatusFilter::Completed))
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
    }

    #[test]
    fn commit_transition_fails_without_touching_streak() {
        let mut store = InMemoryHistory::new();
        let c = challenge(TrainingPath::Clarity, day(1));
        let state = StreakState::with_bank_days(2);
        assert!(store.commit_transition(&c, &state).is_err());
        assert!(store.load_streak().unwrap().is_none());
    }

    #[test]
    fn update_unknown_challenge_fails() {
        let mut store = InMemoryHistory::new();
        let c = challenge(TrainingPath::Clarity, day(1));
        assert!(matches!(
            store.update_challenge(&c),
            Err(CoreError::ChallengeNotFound(_))
        ));
    }
}
