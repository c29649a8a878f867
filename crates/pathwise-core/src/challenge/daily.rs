//! Daily challenge instances and their status state machine.
//!
//! A challenge starts `Active` and moves exactly once to `Completed` or
//! `Skipped`. Both are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, ChallengeTemplate, Difficulty, TrainingPath};
use crate::error::{CoreError, ValidationError};

/// Self-reported effort for a completed challenge, 1 (easy) to 5 (max).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct EffortLevel(u8);

impl EffortLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::OutOfRange {
                field: "effort_level",
                value: value as i64,
                min: Self::MIN as i64,
                max: Self::MAX as i64,
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for EffortLevel {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EffortLevel> for u8 {
    fn from(level: EffortLevel) -> Self {
        level.0
    }
}

/// Status of a daily challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChallengeStatus {
    Active,
    Completed {
        completed_at: DateTime<Utc>,
        effort_level: Option<EffortLevel>,
        notes: Option<String>,
    },
    Skipped {
        skipped_at: DateTime<Utc>,
        reason: Option<String>,
    },
}

impl ChallengeStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ChallengeStatus::Active => "active",
            ChallengeStatus::Completed { .. } => "completed",
            ChallengeStatus::Skipped { .. } => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChallengeStatus::Active)
    }
}

/// A template instantiated for a specific calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: Uuid,
    pub template: ChallengeTemplate,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status: ChallengeStatus,
}

impl DailyChallenge {
    pub fn new(template: ChallengeTemplate, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            template,
            date,
            created_at,
            status: ChallengeStatus::Active,
        }
    }

    pub fn title(&self) -> &str {
        &self.template.title
    }

    pub fn path(&self) -> TrainingPath {
        self.template.path
    }

    pub fn category(&self) -> Category {
        self.template.category
    }

    pub fn difficulty(&self) -> Difficulty {
        self.template.difficulty
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, ChallengeStatus::Completed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, ChallengeStatus::Skipped { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ChallengeStatus::Active)
    }

    pub fn effort_level(&self) -> Option<EffortLevel> {
        match &self.status {
            ChallengeStatus::Completed { effort_level, .. } => *effort_level,
            _ => None,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match &self.status {
            ChallengeStatus::Completed { notes, .. } => notes.as_deref(),
            _ => None,
        }
    }

    /// Move an active challenge to `Completed`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the challenge is already terminal.
    pub fn complete(
        &mut self,
        completed_at: DateTime<Utc>,
        effort_level: Option<EffortLevel>,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        self.ensure_active("complete")?;
        self.status = ChallengeStatus::Completed {
            completed_at,
            effort_level,
            notes,
        };
        Ok(())
    }

    /// Move an active challenge to `Skipped`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the challenge is already terminal.
    pub fn skip(&mut self, skipped_at: DateTime<Utc>, reason: Option<String>) -> Result<(), CoreError> {
        self.ensure_active("skip")?;
        self.status = ChallengeStatus::Skipped { skipped_at, reason };
        Ok(())
    }

    fn ensure_active(&self, attempted: &'static str) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                challenge_id: self.id.to_string(),
                from: self.status.name(),
                attempted,
            });
        }
        Ok(())
    }
}
