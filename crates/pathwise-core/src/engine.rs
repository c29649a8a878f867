//! Engagement engine facade.
//!
//! [`EngagementEngine`] owns every collaborator a consumer needs: the
//! history store, the clock, the template catalog, the RNG, configuration
//! and the user's streak. There is no global state; two engines over two
//! stores are fully independent.
//!
//! Streak mutation is single-writer. Every transition takes `&mut self`, and
//! a rejected transition (completing or skipping a terminal challenge)
//! leaves both the challenge and the streak untouched. Days without any
//! activity since the last one are applied as misses before each
//! completion or skip, and the challenge status and streak are committed
//! to the store together.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use rand_pcg::Mcg128Xsl64;
use uuid::Uuid;

use crate::analytics::{completion_rate, AnalyticsAggregator, AnalyticsSnapshot};
use crate::catalog::TemplateCatalog;
use crate::challenge::{DailyChallenge, Difficulty, EffortLevel, TrainingPath};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::history::{CheckIn, DateRange, HistoryStore, StatusFilter};
use crate::scoring::{ScoringEngine, UserChallengeStats};
use crate::selector::Selector;
use crate::storage::Config;
use crate::streak::{StreakState, StreakTracker, StreakTransition};
use crate::summary::{self, SummaryRequest, SummaryRequestBuilder, TextGenerator, WeeklySummary};

pub struct EngagementEngine<S: HistoryStore> {
    store: S,
    clock: Box<dyn Clock>,
    catalog: TemplateCatalog,
    selector: Selector,
    streak: StreakTracker,
    analytics: AnalyticsAggregator,
    summaries: SummaryRequestBuilder,
    config: Config,
    rng: Mcg128Xsl64,
}

impl<S: HistoryStore> EngagementEngine<S> {
    /// Build an engine, resuming the streak persisted in `store`.
    ///
    /// # Errors
    /// Returns an error if the persisted streak cannot be read.
    pub fn new(
        store: S,
        catalog: TemplateCatalog,
        clock: impl Clock + 'static,
        config: Config,
    ) -> Result<Self> {
        let state = store.load_streak()?.unwrap_or_default();
        let streak = StreakTracker::from_state(state, config.streak.clone());
        let selector = Selector::new(
            ScoringEngine::with_config(config.scoring.clone()),
            config.selector.clone(),
        );

        Ok(Self {
            store,
            clock: Box::new(clock),
            catalog,
            selector,
            streak,
            analytics: AnalyticsAggregator::new(),
            summaries: SummaryRequestBuilder::with_config(config.summary.clone()),
            rng: config.selector.rng(),
            config,
        })
    }

    /// Replace the selection RNG.
    pub fn with_rng(mut self, rng: Mcg128Xsl64) -> Self {
        self.rng = rng;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current local calendar day.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn streak_state(&self) -> &StreakState {
        self.streak.state()
    }

    /// Transitions applied by this engine instance.
    pub fn streak_history(&self) -> &[StreakTransition] {
        self.streak.history()
    }

    /// Today's challenge for `path`.
    ///
    /// Returns the existing active challenge for today when there is one,
    /// otherwise selects a template from the catalog, persists a new
    /// challenge and returns it. `history_window` is the number of days of
    /// history used to derive scoring statistics.
    ///
    /// # Errors
    /// `NoTemplatesAvailable` when the catalog has nothing for
    /// `path`/`difficulty`; store errors are propagated.
    pub fn select_challenge(
        &mut self,
        path: TrainingPath,
        difficulty: Difficulty,
        history_window: u32,
    ) -> Result<DailyChallenge> {
        let now = self.clock.now();
        let local_now = self.clock.local(now);
        let today = local_now.date_naive();

        let existing = self.store.query_challenges(
            path,
            DateRange::single(today),
            Some(StatusFilter::Active),
        )?;
        if let Some(challenge) = existing.into_iter().last() {
            tracing::debug!(id = %challenge.id, %path, "reusing today's active challenge");
            return Ok(challenge);
        }

        let candidates = self.catalog.templates_for(path, difficulty);
        if candidates.is_empty() {
            return Err(CoreError::NoTemplatesAvailable { path, difficulty });
        }

        let history = self
            .store
            .query_challenges(path, DateRange::trailing(today, history_window), None)?;
        let stats = UserChallengeStats::from_history(&history, today);

        let recency = DateRange::trailing(today, self.selector.config().recency_window_days);
        let recent_titles: HashSet<String> = self
            .store
            .query_challenges(path, recency, None)?
            .into_iter()
            .map(|c| c.template.title)
            .collect();

        let template = self
            .selector
            .select(&candidates, &stats, &recent_titles, &local_now, &mut self.rng)
            .map_err(|_| CoreError::NoTemplatesAvailable { path, difficulty })?
            .clone();

        let challenge = DailyChallenge::new(template, today, now);
        self.store.insert_challenge(&challenge)?;

        tracing::info!(
            id = %challenge.id,
            %path,
            %difficulty,
            title = %challenge.title(),
            "daily challenge selected"
        );
        Ok(challenge)
    }

    /// Mark a challenge completed and advance the streak.
    ///
    /// Only the first completion of a calendar day extends the streak.
    ///
    /// # Errors
    /// `ChallengeNotFound` for an unknown id, `InvalidTransition` if the
    /// challenge is already completed or skipped. A store failure leaves
    /// the in-memory streak as it was.
    pub fn record_completion(
        &mut self,
        challenge_id: Uuid,
        effort_level: Option<EffortLevel>,
        notes: Option<String>,
    ) -> Result<StreakTransition> {
        let now = self.clock.now();
        let today = self.clock.today();
        let mut challenge = self.load_challenge(challenge_id)?;

        if let Err(e) = challenge.complete(now, effort_level, notes) {
            tracing::warn!(id = %challenge_id, error = %e, "completion rejected");
            return Err(e);
        }
        self.commit(&challenge, |streak| streak.complete(today, now))
    }

    /// Mark a challenge skipped; consumes a bank day or resets the streak.
    /// A skip on a day that already has a completion or skip changes
    /// nothing but the challenge.
    ///
    /// # Errors
    /// Same as [`record_completion`](Self::record_completion).
    pub fn record_skip(&mut self, challenge_id: Uuid, reason: Option<String>) -> Result<StreakTransition> {
        let now = self.clock.now();
        let today = self.clock.today();
        let mut challenge = self.load_challenge(challenge_id)?;

        if let Err(e) = challenge.skip(now, reason) {
            tracing::warn!(id = %challenge_id, error = %e, "skip rejected");
            return Err(e);
        }
        self.commit(&challenge, |streak| streak.skip(today, now))
    }

    /// Apply pending missed days and `event`, then persist the challenge and
    /// the resulting streak in one store write.
    fn commit(
        &mut self,
        challenge: &DailyChallenge,
        event: impl FnOnce(&mut StreakTracker) -> StreakTransition,
    ) -> Result<StreakTransition> {
        let checkpoint = self.streak.checkpoint();

        let missed = self
            .streak
            .register_missed_days(self.clock.today(), self.clock.now());
        if !missed.is_empty() {
            tracing::info!(days = missed.len(), "missed days applied");
        }
        let transition = event(&mut self.streak);

        if let Err(e) = self.store.commit_transition(challenge, self.streak.state()) {
            tracing::warn!(id = %challenge.id, error = %e, "transition not persisted");
            self.streak.restore(checkpoint);
            return Err(e);
        }
        Ok(transition)
    }

    /// Record a mood check-in for today.
    ///
    /// # Errors
    /// Returns a validation error if `mood` is outside 1..=5.
    pub fn record_check_in(
        &mut self,
        mood: u8,
        note: Option<String>,
        path: Option<TrainingPath>,
    ) -> Result<CheckIn> {
        let now = self.clock.now();
        let check_in = CheckIn::new(now, self.clock.today(), mood, note, path)?;
        self.store.insert_check_in(&check_in)?;
        tracing::info!(mood, date = %check_in.date, "check-in recorded");
        Ok(check_in)
    }

    /// Apply one missed day for every day without activity since the last
    /// completion or skip, up to yesterday.
    pub fn register_missed_days(&mut self) -> Result<Vec<StreakTransition>> {
        let transitions = self
            .streak
            .register_missed_days(self.clock.today(), self.clock.now());
        if !transitions.is_empty() {
            self.store.save_streak(self.streak.state())?;
        }
        Ok(transitions)
    }

    /// Grant one bank day, up to the configured cap.
    pub fn grant_bank_day(&mut self) -> Result<bool> {
        let granted = self.streak.grant_bank_day(self.clock.today(), self.clock.now());
        if granted {
            self.store.save_streak(self.streak.state())?;
        }
        Ok(granted)
    }

    /// Analytics over the trailing `window_days` days ending today.
    ///
    /// Check-ins tagged with another path are excluded; untagged ones count
    /// for every path.
    pub fn compute_analytics(&self, path: TrainingPath, window_days: u32) -> Result<AnalyticsSnapshot> {
        let range = self.window(window_days);
        let challenges = self.store.query_challenges(path, range, None)?;
        let check_ins = self.check_ins_for(path, range)?;
        Ok(self.analytics.compute(path, range, &challenges, &check_ins))
    }

    /// Package the window into a generator request.
    pub fn build_summary_request(
        &self,
        path: TrainingPath,
        window_days: u32,
        journal_excerpts: &[String],
    ) -> Result<SummaryRequest> {
        let range = self.window(window_days);
        let completed = self
            .store
            .query_challenges(path, range, Some(StatusFilter::Completed))?;
        let check_ins = self.check_ins_for(path, range)?;
        let focus = self.recommended_focus(path, range)?;

        Ok(self
            .summaries
            .build(journal_excerpts, &completed, &check_ins, path)
            .with_range(range)
            .with_recommended_focus(focus))
    }

    /// Weekly summary with a generated narrative, or the templated fallback
    /// when the generator fails or exceeds the configured timeout.
    pub async fn generate_weekly_summary(
        &self,
        path: TrainingPath,
        window_days: u32,
        journal_excerpts: &[String],
        generator: &dyn TextGenerator,
    ) -> Result<WeeklySummary> {
        let request = self.build_summary_request(path, window_days, journal_excerpts)?;
        let timeout = Duration::from_secs(self.config.summary.timeout_secs);
        let now = self.clock.now();
        Ok(summary::generate_weekly_summary(generator, &request, timeout, now).await)
    }

    /// Path with the lowest completion rate among paths with history in
    /// `range`, or `fallback` when none has any.
    fn recommended_focus(&self, fallback: TrainingPath, range: DateRange) -> Result<TrainingPath> {
        let mut rates = Vec::new();
        for path in TrainingPath::ALL {
            let challenges = self.store.query_challenges(path, range, None)?;
            if !challenges.is_empty() {
                rates.push((path, completion_rate(&challenges)));
            }
        }
        Ok(rates
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(fallback, |(path, _)| path))
    }

    fn check_ins_for(&self, path: TrainingPath, range: DateRange) -> Result<Vec<CheckIn>> {
        Ok(self
            .store
            .query_check_ins(range)?
            .into_iter()
            .filter(|c| c.path.map_or(true, |p| p == path))
            .collect())
    }

    fn window(&self, days: u32) -> DateRange {
        DateRange::trailing(self.clock.today(), days)
    }

    fn load_challenge(&self, id: Uuid) -> Result<DailyChallenge> {
        self.store
            .get_challenge(id)?
            .ok_or_else(|| CoreError::ChallengeNotFound(id.to_string()))
    }
}
