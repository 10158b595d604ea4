//! Skill categories shown on the skills page.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Highest allowed proficiency level.
pub const MAX_LEVEL: u8 = 100;

/// Icon keys the site knows how to render. Unknown keys fall back to a
/// generic icon on the client, so they are accepted but never produced here.
pub const ICON_KEYS: [&str; 8] = [
    "Code",
    "Database",
    "Smartphone",
    "Cloud",
    "Settings",
    "Palette",
    "GitBranch",
    "Server",
];

/// Errors raised when a categories payload cannot be accepted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkillsError {
    #[error("Invalid payload: categories must be an array")]
    NotAnArray,
    #[error("Invalid payload: {0}")]
    Malformed(String),
    #[error("Invalid payload: skill {name:?} {reason}")]
    Invalid { name: String, reason: &'static str },
}

/// A single skill within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    /// Proficiency, 0 to 100.
    pub level: u8,
    /// Years of experience; never negative.
    #[serde(default)]
    pub years: f64,
    #[serde(default)]
    pub icon_key: Option<String>,
}

/// A named group of skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    /// Stable identifier, e.g. `frontend`.
    pub key: String,
    /// Display name.
    pub category: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Skill {
    fn validate(&self) -> Result<(), SkillsError> {
        if self.level > MAX_LEVEL {
            return Err(SkillsError::Invalid {
                name: self.name.clone(),
                reason: "level must be between 0 and 100",
            });
        }
        if !self.years.is_finite() || self.years < 0.0 {
            return Err(SkillsError::Invalid {
                name: self.name.clone(),
                reason: "years must be a non-negative number",
            });
        }
        Ok(())
    }
}

/// Parse and validate a `categories` value.
///
/// # Errors
///
/// Returns `SkillsError::NotAnArray` if `value` is not a JSON array,
/// `SkillsError::Malformed` if an entry does not have the category shape, and
/// `SkillsError::Invalid` if a skill's level or years are out of range.
pub fn parse_categories(value: &Value) -> Result<Vec<SkillCategory>, SkillsError> {
    if !value.is_array() {
        return Err(SkillsError::NotAnArray);
    }
    let categories: Vec<SkillCategory> = serde_json::from_value(value.clone())
        .map_err(|e| SkillsError::Malformed(e.to_string()))?;

    categories
        .iter()
        .flat_map(|c| c.skills.iter())
        .try_for_each(Skill::validate)?;

    Ok(categories)
}
