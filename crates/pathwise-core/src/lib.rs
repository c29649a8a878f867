//! # Pathwise Core Library
//!
//! This library provides the core logic for Pathwise, a personal-growth app
//! that hands out one small daily challenge per training path and tracks the
//! user's engagement over time. All operations are available through the
//! standalone CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Selection**: templates are scored against statistics derived from the
//!   user's history, filtered for recency and picked with a seeded RNG that
//!   mostly exploits the best candidate and sometimes explores
//! - **Streaks**: a state machine with banked grace days that absorb misses
//! - **Analytics**: pure aggregations (completion, runs, mood trend) over a
//!   history window
//! - **Summaries**: a bounded payload for an external text generator, with a
//!   templated fallback when the generator is unavailable
//! - **Storage**: SQLite history and TOML configuration
//!
//! ## Key Components
//!
//! - [`EngagementEngine`]: Facade owning store, clock, catalog, RNG and streak
//! - [`HistoryStore`]: Persistence boundary ([`Database`], [`InMemoryHistory`])
//! - [`Selector`] / [`ScoringEngine`]: Template ranking and choice
//! - [`StreakTracker`]: Streak transitions
//! - [`AnalyticsAggregator`]: Window snapshots
//! - [`SummaryRequestBuilder`]: Generator payloads

pub mod analytics;
pub mod catalog;
pub mod challenge;
pub mod clock;
pub mod engine;
pub mod error;
pub mod history;
pub mod scoring;
pub mod selector;
pub mod storage;
pub mod streak;
pub mod summary;

pub use analytics::{AnalyticsAggregator, AnalyticsSnapshot, MoodDataPoint, MoodTrend};
pub use catalog::TemplateCatalog;
pub use challenge::{
    Category, ChallengeStatus, ChallengeTemplate, DailyChallenge, Difficulty, EffortLevel,
    TrainingPath,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::EngagementEngine;
pub use error::{ConfigError, CoreError, DatabaseError, GenerationError, ValidationError};
pub use history::{CheckIn, DateRange, HistoryStore, InMemoryHistory, StatusFilter};
pub use scoring::{ScoringConfig, ScoringEngine, UserChallengeStats};
pub use selector::{Selector, SelectorConfig};
pub use storage::{Config, Database};
pub use streak::{
    StreakCheckpoint, StreakConfig, StreakEvent, StreakState, StreakTracker, StreakTransition,
};
pub use summary::{
    NarrativeSource, SummaryConfig, SummaryRequest, SummaryRequestBuilder, TextGenerator,
    WeeklySummary,
};
