//! Challenge vocabulary: growth paths, difficulties, categories and templates.
//!
//! Templates are static records loaded once from the catalog. A template
//! instantiated for a calendar day becomes a [`DailyChallenge`].

mod daily;

pub use daily::{ChallengeStatus, DailyChallenge, EffortLevel};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the five fixed growth tracks. Used as a partition key everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPath {
    Discipline,
    Clarity,
    Confidence,
    Purpose,
    Authenticity,
}

impl TrainingPath {
    pub const ALL: [TrainingPath; 5] = [
        TrainingPath::Discipline,
        TrainingPath::Clarity,
        TrainingPath::Confidence,
        TrainingPath::Purpose,
        TrainingPath::Authenticity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingPath::Discipline => "discipline",
            TrainingPath::Clarity => "clarity",
            TrainingPath::Confidence => "confidence",
            TrainingPath::Purpose => "purpose",
            TrainingPath::Authenticity => "authenticity",
        }
    }

    /// Short human-readable focus line used in fallback narratives
    pub fn focus_line(&self) -> &'static str {
        match self {
            TrainingPath::Discipline => "building consistent habits",
            TrainingPath::Clarity => "quieting noise and thinking clearly",
            TrainingPath::Confidence => "acting despite discomfort",
            TrainingPath::Purpose => "aligning days with what matters",
            TrainingPath::Authenticity => "showing up as yourself",
        }
    }
}

/// How demanding a challenge is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Micro,
    Standard,
    Advanced,
    Custom,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Micro,
        Difficulty::Standard,
        Difficulty::Advanced,
        Difficulty::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Micro => "micro",
            Difficulty::Standard => "standard",
            Difficulty::Advanced => "advanced",
            Difficulty::Custom => "custom",
        }
    }
}

/// Activity domain of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Physical,
    Mental,
    Social,
    Digital,
    Creative,
    Spiritual,
    General,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Physical,
        Category::Mental,
        Category::Social,
        Category::Digital,
        Category::Creative,
        Category::Spiritual,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Physical => "physical",
            Category::Mental => "mental",
            Category::Social => "social",
            Category::Digital => "digital",
            Category::Creative => "creative",
            Category::Spiritual => "spiritual",
            Category::General => "general",
        }
    }
}

macro_rules! impl_name_traits {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| ValidationError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

impl_name_traits!(TrainingPath, "training path");
impl_name_traits!(Difficulty, "difficulty");
impl_name_traits!(Category, "category");

/// Immutable challenge template. Identity is the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeTemplate {
    pub title: String,
    pub description: String,
    pub path: TrainingPath,
    pub difficulty: Difficulty,
    pub category: Category,
    /// Estimated duration in minutes
    pub estimated_minutes: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ChallengeTemplate {
    pub fn new(
        title: impl Into<String>,
        path: TrainingPath,
        difficulty: Difficulty,
        category: Category,
        estimated_minutes: u32,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            path,
            difficulty,
            category,
            estimated_minutes,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_parses_case_insensitively() {
        assert_eq!("Clarity".parse::<TrainingPath>().unwrap(), TrainingPath::Clarity);
        assert_eq!(" purpose ".parse::<TrainingPath>().unwrap(), TrainingPath::Purpose);
        assert!("courage".parse::<TrainingPath>().is_err());
    }

    #[test]
    fn names_match_serde_representation() {
        for path in TrainingPath::ALL {
            let json = serde_json::to_string(&path).unwrap();
            assert_eq!(json, format!("\"{}\"", path));
        }
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }

    #[test]
    fn difficulty_orders_from_micro_to_custom() {
        assert!(Difficulty::Micro < Difficulty::Standard);
        assert!(Difficulty::Advanced < Difficulty::Custom);
    }

    #[test]
    fn template_builder_collects_tags() {
        let t = ChallengeTemplate::new(
            "Cold shower",
            TrainingPath::Discipline,
            Difficulty::Micro,
            Category::Physical,
            5,
        )
        .with_tags(["body", "morning"]);
        assert_eq!(t.tags.len(), 2);
        assert!(t.tags.contains("morning"));
    }
}
