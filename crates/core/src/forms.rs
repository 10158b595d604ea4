//! Draft types for the admin editors.
//!
//! A draft is a disposable staging copy of a record. Edits accumulate on the
//! draft and [`ProjectDraft::to_payload`] (and friends) produce the JSON body
//! the admin API expects. Nothing here talks to the server.

use serde_json::{Map, Value, json};

use crate::types::{
    CompanyPatch, CompanyRecord, CompanySection, Project, ProjectInput, ProjectInputError, Skill,
    SkillCategory,
    project::REQUIRED_FIELDS,
    skill::MAX_LEVEL,
};

/// Metric keys the project editor offers.
pub const METRIC_KEYS: [&str; 8] = [
    "users",
    "revenue",
    "growth",
    "retention",
    "conversion",
    "satisfaction",
    "completion",
    "performance",
];

/// Staged edits for a single project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub problem: String,
    pub solution: String,
    pub impact: String,
    pub live_link: String,
    pub github_link: String,
    pub featured: bool,
    tech_stack: Vec<String>,
    images: Vec<String>,
    metrics: Map<String, Value>,
}

impl ProjectDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing an existing project.
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            problem: project.problem.clone(),
            solution: project.solution.clone(),
            impact: project.impact.clone(),
            live_link: project.live_link.clone(),
            github_link: project.github_link.clone(),
            featured: project.featured,
            tech_stack: project.tech_stack.clone(),
            images: project.images.clone(),
            metrics: project.metrics.clone(),
        }
    }

    #[must_use]
    pub fn tech_stack(&self) -> &[String] {
        &self.tech_stack
    }

    #[must_use]
    pub fn images(&self) -> &[String] {
        &self.images
    }

    #[must_use]
    pub const fn metrics(&self) -> &Map<String, Value> {
        &self.metrics
    }

    /// Append a technology. Blank input is ignored; returns whether it was added.
    pub fn add_tech(&mut self, input: &str) -> bool {
        let tech = input.trim();
        if tech.is_empty() {
            return false;
        }
        self.tech_stack.push(tech.to_owned());
        true
    }

    pub fn remove_tech(&mut self, index: usize) -> Option<String> {
        (index < self.tech_stack.len()).then(|| self.tech_stack.remove(index))
    }

    /// Append an uploaded image URL.
    pub fn add_image(&mut self, url: impl Into<String>) {
        self.images.push(url.into());
    }

    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Set a metric from form input.
    ///
    /// Blank input clears the metric; integers are stored as numbers and
    /// anything else (`"45%"`, `"$1.2M"`) as text.
    pub fn set_metric(&mut self, key: &str, input: &str) {
        let value = input.trim();
        if value.is_empty() {
            self.metrics.remove(key);
        } else if let Ok(n) = value.parse::<i64>() {
            self.metrics.insert(key.to_owned(), Value::from(n));
        } else {
            self.metrics.insert(key.to_owned(), Value::from(value));
        }
    }

    /// Required fields that are still blank.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|field| match *field {
                "title" => self.title.trim().is_empty(),
                "problem" => self.problem.trim().is_empty(),
                "solution" => self.solution.trim().is_empty(),
                _ => false,
            })
            .collect()
    }

    /// The create/update request body.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "problem": self.problem.trim(),
            "solution": self.solution.trim(),
            "impact": self.impact.trim(),
            "techStack": self.tech_stack,
            "images": self.images,
            "liveLink": self.live_link.trim(),
            "githubLink": self.github_link.trim(),
            "featured": self.featured,
            "metrics": self.metrics,
        })
    }

    /// Validate the draft the same way the server will.
    ///
    /// # Errors
    ///
    /// Returns `ProjectInputError::MissingRequired` when a required field is blank.
    pub fn validate(&self) -> Result<ProjectInput, ProjectInputError> {
        ProjectInput::from_json(&self.to_payload())
    }
}

impl From<ProjectInput> for ProjectDraft {
    fn from(input: ProjectInput) -> Self {
        Self {
            title: input.title,
            problem: input.problem,
            solution: input.solution,
            impact: input.impact,
            live_link: input.live_link,
            github_link: input.github_link,
            featured: input.featured,
            tech_stack: input.tech_stack,
            images: input.images,
            metrics: input.metrics,
        }
    }
}

/// Staged edits for the skills page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillsDraft {
    categories: Vec<SkillCategory>,
}

impl SkillsDraft {
    #[must_use]
    pub const fn new(categories: Vec<SkillCategory>) -> Self {
        Self { categories }
    }

    #[must_use]
    pub fn categories(&self) -> &[SkillCategory] {
        &self.categories
    }

    /// Add an empty category. Returns false if the key is already used.
    pub fn add_category(&mut self, key: &str, name: &str) -> bool {
        if self.categories.iter().any(|c| c.key == key) {
            return false;
        }
        self.categories.push(SkillCategory {
            key: key.to_owned(),
            category: name.to_owned(),
            skills: Vec::new(),
        });
        true
    }

    pub fn remove_category(&mut self, key: &str) -> Option<SkillCategory> {
        let index = self.categories.iter().position(|c| c.key == key)?;
        Some(self.categories.remove(index))
    }

    /// Add a skill to a category, clamping level to 0..=100 and years to >= 0.
    /// Returns false if the category does not exist.
    pub fn add_skill(
        &mut self,
        category_key: &str,
        name: &str,
        level: i64,
        years: f64,
        icon_key: Option<&str>,
    ) -> bool {
        let Some(category) = self.categories.iter_mut().find(|c| c.key == category_key) else {
            return false;
        };
        category.skills.push(Skill {
            name: name.trim().to_owned(),
            level: clamp_level(level),
            years: if years.is_finite() { years.max(0.0) } else { 0.0 },
            icon_key: icon_key.map(str::to_owned),
        });
        true
    }

    pub fn remove_skill(&mut self, category_key: &str, index: usize) -> Option<Skill> {
        let category = self.categories.iter_mut().find(|c| c.key == category_key)?;
        (index < category.skills.len()).then(|| category.skills.remove(index))
    }

    /// Change a skill's level, clamped to 0..=100.
    pub fn set_level(&mut self, category_key: &str, index: usize, level: i64) -> bool {
        self.categories
            .iter_mut()
            .find(|c| c.key == category_key)
            .and_then(|c| c.skills.get_mut(index))
            .map(|skill| skill.level = clamp_level(level))
            .is_some()
    }

    /// The `PUT /api/admin/skills` body.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({ "categories": self.categories })
    }
}

fn clamp_level(level: i64) -> u8 {
    u8::try_from(level.clamp(0, i64::from(MAX_LEVEL))).unwrap_or(MAX_LEVEL)
}

/// Staged edits for the company page.
///
/// Only sections that were staged are sent, so untouched sections are never
/// overwritten by a stale copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyDraft {
    base: CompanyRecord,
    patch: CompanyPatch,
}

impl CompanyDraft {
    #[must_use]
    pub fn new(base: CompanyRecord) -> Self {
        Self {
            base,
            patch: CompanyPatch::default(),
        }
    }

    pub fn stage(&mut self, section: CompanySection, value: Value) {
        self.patch.set(section, value);
    }

    pub fn discard(&mut self, section: CompanySection) {
        self.patch.set(section, Value::Null);
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.patch.is_empty()
    }

    /// The record as it will look after saving.
    #[must_use]
    pub fn preview(&self) -> CompanyRecord {
        let mut record = self.base.clone();
        record.apply(&self.patch);
        record
    }

    /// The `PUT /api/admin/company` body.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        Value::Object(self.patch.to_set_fields())
    }
}
