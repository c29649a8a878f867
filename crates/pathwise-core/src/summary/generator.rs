//! Text generator boundary and weekly summary assembly.
//!
//! The generator is awaited under an explicit timeout. Failure, timeout or
//! cancellation never touches streak or history state: this module only
//! reads the request it is given.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SummaryRequest;
use crate::analytics::MoodTrend;
use crate::challenge::TrainingPath;
use crate::error::GenerationError;
use crate::history::DateRange;

/// External prose generator (e.g. a language-model client).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    async fn generate(&self, request: &SummaryRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub path: TrainingPath,
    pub range: Option<DateRange>,
    pub narrative: String,
    pub narrative_source: NarrativeSource,
    /// At most five themes
    pub key_themes: Vec<String>,
    pub challenges_completed: u32,
    pub check_in_streak: u32,
    pub mood_trend: MoodTrend,
    pub recommended_focus: TrainingPath,
    pub generated_at: DateTime<Utc>,
}

/// Call the generator, failing with `Timeout` after `timeout`.
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    request: &SummaryRequest,
    timeout: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout {
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Build a weekly summary, falling back to a templated narrative when the
/// generator fails or times out.
pub async fn generate_weekly_summary(
    generator: &dyn TextGenerator,
    request: &SummaryRequest,
    timeout: Duration,
    now: DateTime<Utc>,
) -> WeeklySummary {
    let (narrative, narrative_source) = match generate_with_timeout(generator, request, timeout).await {
        Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), NarrativeSource::Generated),
        Ok(_) => {
            tracing::warn!(generator = generator.name(), "generator returned empty narrative, using fallback");
            (fallback_narrative(request), NarrativeSource::Fallback)
        }
        Err(e) => {
            tracing::warn!(generator = generator.name(), error = %e, "summary generation unavailable, using fallback");
            (fallback_narrative(request), NarrativeSource::Fallback)
        }
    };

    WeeklySummary {
        path: request.path,
        range: request.range,
        narrative,
        narrative_source,
        key_themes: request.key_themes.clone(),
        challenges_completed: request.challenges_completed,
        check_in_streak: request.check_in_streak,
        mood_trend: request.mood_trend,
        recommended_focus: request.recommended_focus,
        generated_at: now,
    }
}

/// Templated narrative built from the request counts.
pub fn fallback_narrative(request: &SummaryRequest) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(match request.challenges_completed {
        0 => format!("No {} challenges were completed this week.", request.path),
        1 => format!("You completed 1 {} challenge this week.", request.path),
        n => format!("You completed {} {} challenges this week.", n, request.path),
    });

    if let Some(last) = request.completed_titles.last() {
        parts.push(format!("Most recently: \"{}\".", last));
    }

    if request.check_in_streak > 0 {
        parts.push(format!(
            "Your check-in streak stands at {} day{}.",
            request.check_in_streak,
            if request.check_in_streak == 1 { "" } else { "s" }
        ));
    }

    parts.push(match request.mood_trend {
        MoodTrend::Improving => "Your mood has been trending upward.".to_string(),
        MoodTrend::Declining => "Your mood dipped lately, so go gently.".to_string(),
        MoodTrend::Stable => "Your mood has held steady.".to_string(),
    });

    if !request.key_themes.is_empty() {
        parts.push(format!("Themes: {}.", request.key_themes.join(", ")));
    }

    parts.push(format!(
        "Next week, focus on {}: {}.",
        request.recommended_focus,
        request.recommended_focus.focus_line()
    ));

    parts.join(" ")
}
