//! Static, queryable collection of challenge templates.
//!
//! The catalog is read-only at runtime. It is keyed by
//! (path, difficulty, category) and identifies templates by title within
//! a path.

mod builtin;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::challenge::{Category, ChallengeTemplate, Difficulty, TrainingPath};
use crate::error::{ConfigError, CoreError};

/// On-disk catalog format: a list of `[[templates]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<ChallengeTemplate>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<ChallengeTemplate>,
}

impl TemplateCatalog {
    /// Build a catalog, dropping later duplicates of a (path, title) pair.
    pub fn new(templates: Vec<ChallengeTemplate>) -> Self {
        let mut seen: HashSet<(TrainingPath, String)> = HashSet::new();
        let mut kept = Vec::with_capacity(templates.len());
        for template in templates {
            if seen.insert((template.path, template.title.clone())) {
                kept.push(template);
            } else {
                tracing::warn!(
                    path = %template.path,
                    title = %template.title,
                    "duplicate template title dropped from catalog"
                );
            }
        }
        Self { templates: kept }
    }

    /// The starter corpus compiled into the binary.
    pub fn builtin() -> Self {
        Self::new(builtin::templates())
    }

    /// Parse a catalog from TOML text.
    ///
    /// # Errors
    /// Returns `ConfigError::ParseFailed` if the text is not a valid catalog.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(Self::new(file.templates))
    }

    /// Load a catalog file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), templates = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let file = CatalogFile {
            templates: self.templates.clone(),
        };
        toml::to_string_pretty(&file).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChallengeTemplate> {
        self.templates.iter()
    }

    /// All templates for a path, in catalog order.
    pub fn for_path(&self, path: TrainingPath) -> Vec<&ChallengeTemplate> {
        self.templates.iter().filter(|t| t.path == path).collect()
    }

    /// Candidate pool for a selection request.
    pub fn templates_for(&self, path: TrainingPath, difficulty: Difficulty) -> Vec<&ChallengeTemplate> {
        self.templates
            .iter()
            .filter(|t| t.path == path && t.difficulty == difficulty)
            .collect()
    }

    pub fn by_category(&self, path: TrainingPath, category: Category) -> Vec<&ChallengeTemplate> {
        self.templates
            .iter()
            .filter(|t| t.path == path && t.category == category)
            .collect()
    }

    pub fn find(&self, path: TrainingPath, title: &str) -> Option<&ChallengeTemplate> {
        self.templates
            .iter()
            .find(|t| t.path == path && t.title == title)
    }

    /// Paths with at least one template.
    pub fn paths(&self) -> Vec<TrainingPath> {
        TrainingPath::ALL
            .into_iter()
            .filter(|p| self.templates.iter().any(|t| t.path == *p))
            .collect()
    }

    /// Difficulties that have at least one template on the path.
    pub fn difficulties_for(&self, path: TrainingPath) -> Vec<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .filter(|d| self.templates.iter().any(|t| t.path == path && t.difficulty == *d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn builtin_has_three_standard_templates_per_path() {
        let catalog = TemplateCatalog::builtin();
        for path in TrainingPath::ALL {
            assert!(
                catalog.templates_for(path, Difficulty::Standard).len() >= 3,
                "{path} needs at least three standard templates"
            );
            assert!(catalog.templates_for(path, Difficulty::Micro).len() >= 3);
        }
    }

    #[test]
    fn duplicate_titles_within_path_are_dropped() {
        let a = ChallengeTemplate::new("Walk", TrainingPath::Discipline, Difficulty::Micro, Category::Physical, 10);
        let b = ChallengeTemplate::new("Walk", TrainingPath::Discipline, Difficulty::Standard, Category::Physical, 30);
        let c = ChallengeTemplate::new("Walk", TrainingPath::Clarity, Difficulty::Micro, Category::Physical, 10);
        let catalog = TemplateCatalog::new(vec![a, b, c]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.find(TrainingPath::Discipline, "Walk").unwrap().difficulty,
            Difficulty::Micro
        );
    }

    #[test]
    fn parses_toml_catalog() {
        let content = indoc! {r#"
            [[templates]]
            title = "Digital sunset"
            description = "No screens after 9pm"
            path = "clarity"
            difficulty = "standard"
            category = "digital"
            estimated_minutes = 60
            tags = ["evening", "screens"]

            [[templates]]
            title = "One breath"
            description = "Take one slow breath before each meeting"
            path = "clarity"
            difficulty = "micro"
            category = "mental"
            estimated_minutes = 1
        "#};

        let catalog = TemplateCatalog::from_toml_str(content).unwrap();
        assert_eq!(catalog.len(), 2);
        let sunset = catalog.find(TrainingPath::Clarity, "Digital sunset").unwrap();
        assert_eq!(sunset.category, Category::Digital);
        assert!(sunset.tags.contains("screens"));
        assert!(catalog.find(TrainingPath::Clarity, "One breath").unwrap().tags.is_empty());
    }

    #[test]
    fn rejects_unknown_path_in_toml() {
        let content = indoc! {r#"
            [[templates]]
            title = "x"
            description = ""
            path = "courage"
            difficulty = "micro"
            category = "mental"
            estimated_minutes = 1
        "#};
        assert!(matches!(
            TemplateCatalog::from_toml_str(content),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn toml_export_reloads() {
        let catalog = TemplateCatalog::builtin();
        let text = catalog.to_toml_string().unwrap();
        let reloaded = TemplateCatalog::from_toml_str(&text).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
    }

    #[test]
    fn difficulties_for_lists_only_populated_levels() {
        let catalog = TemplateCatalog::new(vec![ChallengeTemplate::new(
            "Plank",
            TrainingPath::Discipline,
            Difficulty::Advanced,
            Category::Physical,
            5,
        )]);
        assert_eq!(
            catalog.difficulties_for(TrainingPath::Discipline),
            vec![Difficulty::Advanced]
        );
        assert!(catalog.difficulties_for(TrainingPath::Purpose).is_empty());
    }
}
