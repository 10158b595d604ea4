//! Company profile content.
//!
//! The profile is one record made of seven independent sections. Each section
//! is free-form JSON whose inner shape belongs to the UI; this module only
//! decides which sections are present and how partial updates combine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The top-level sections of the company record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanySection {
    CompanyInfo,
    Team,
    Achievements,
    Vision,
    Mission,
    Values,
    Milestones,
}

impl CompanySection {
    pub const ALL: [Self; 7] = [
        Self::CompanyInfo,
        Self::Team,
        Self::Achievements,
        Self::Vision,
        Self::Mission,
        Self::Values,
        Self::Milestones,
    ];

    /// JSON key of this section.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CompanyInfo => "companyInfo",
            Self::Team => "team",
            Self::Achievements => "achievements",
            Self::Vision => "vision",
            Self::Mission => "mission",
            Self::Values => "values",
            Self::Milestones => "milestones",
        }
    }

    /// Look up a section by JSON key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// The full company record as returned to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub company_info: Value,
    pub team: Value,
    pub achievements: Value,
    pub vision: Value,
    pub mission: Value,
    pub values: Value,
    pub milestones: Value,
}

impl CompanyRecord {
    #[must_use]
    pub const fn section(&self, section: CompanySection) -> &Value {
        match section {
            CompanySection::CompanyInfo => &self.company_info,
            CompanySection::Team => &self.team,
            CompanySection::Achievements => &self.achievements,
            CompanySection::Vision => &self.vision,
            CompanySection::Mission => &self.mission,
            CompanySection::Values => &self.values,
            CompanySection::Milestones => &self.milestones,
        }
    }

    pub const fn section_mut(&mut self, section: CompanySection) -> &mut Value {
        match section {
            CompanySection::CompanyInfo => &mut self.company_info,
            CompanySection::Team => &mut self.team,
            CompanySection::Achievements => &mut self.achievements,
            CompanySection::Vision => &mut self.vision,
            CompanySection::Mission => &mut self.mission,
            CompanySection::Values => &mut self.values,
            CompanySection::Milestones => &mut self.milestones,
        }
    }

    /// Build a record from a stored document, taking each missing or `null`
    /// section from `defaults`.
    #[must_use]
    pub fn from_document(doc: &Map<String, Value>, defaults: &Self) -> Self {
        let mut record = defaults.clone();
        for section in CompanySection::ALL {
            if let Some(value) = doc.get(section.key()).filter(|v| !v.is_null()) {
                *record.section_mut(section) = value.clone();
            }
        }
        record
    }

    /// Every section keyed by its JSON name.
    #[must_use]
    pub fn to_document(&self) -> Map<String, Value> {
        CompanySection::ALL
            .into_iter()
            .map(|s| (s.key().to_owned(), self.section(s).clone()))
            .collect()
    }

    /// Apply a patch in place; sections absent from the patch are kept.
    pub fn apply(&mut self, patch: &CompanyPatch) {
        for (section, value) in patch.sections() {
            *self.section_mut(section) = value.clone();
        }
    }
}

/// A partial company update.
///
/// Only non-null values for known section keys are retained; everything else
/// in the request body is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyPatch {
    sections: Vec<(CompanySection, Value)>,
}

impl CompanyPatch {
    /// Extract the section keys present in a request body.
    ///
    /// Non-object bodies produce an empty patch.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let mut patch = Self::default();
        if let Some(fields) = body.as_object() {
            for section in CompanySection::ALL {
                if let Some(value) = fields.get(section.key()) {
                    patch.set(section, value.clone());
                }
            }
        }
        patch
    }

    /// Stage a section; `null` removes it from the patch.
    pub fn set(&mut self, section: CompanySection, value: Value) {
        self.sections.retain(|(s, _)| *s != section);
        if !value.is_null() {
            self.sections.push((section, value));
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = (CompanySection, &Value)> {
        self.sections.iter().map(|(s, v)| (*s, v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The fields to overwrite in the stored document.
    #[must_use]
    pub fn to_set_fields(&self) -> Map<String, Value> {
        self.sections
            .iter()
            .map(|(s, v)| (s.key().to_owned(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn defaults() -> CompanyRecord {
        CompanyRecord {
            company_info: json!({ "name": "Default Co" }),
            team: json!({ "total": 1, "departments": [] }),
            achievements: json!([]),
            vision: json!({ "title": "Vision", "content": "default" }),
            mission: json!({ "title": "Mission", "content": "default" }),
            values: json!([]),
            milestones: json!([]),
        }
    }

    #[test]
    fn test_section_keys_roundtrip() {
        for section in CompanySection::ALL {
            assert_eq!(CompanySection::from_key(section.key()), Some(section));
        }
        assert_eq!(CompanySection::from_key("slug"), None);
    }

    #[test]
    fn test_from_document_fills_missing_sections() {
        let doc = json!({ "slug": "default", "vision": { "title": "V", "content": "new" }, "team": null });
        let record = CompanyRecord::from_document(doc.as_object().unwrap(), &defaults());
        assert_eq!(record.vision["content"], json!("new"));
        assert_eq!(record.team, defaults().team);
        assert_eq!(record.company_info, defaults().company_info);
    }

    #[test]
    fn test_patch_ignores_null_and_unknown_keys() {
        let patch = CompanyPatch::from_json(&json!({
            "vision": { "title": "V", "content": "c" },
            "mission": null,
            "slug": "other",
            "message": "hi"
        }));
        let fields = patch.to_set_fields();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("vision"));
    }

    #[test]
    fn test_patch_from_non_object_is_empty() {
        assert!(CompanyPatch::from_json(&json!([1, 2])).is_empty());
        assert!(CompanyPatch::from_json(&Value::Null).is_empty());
    }

    #[test]
    fn test_apply_leaves_other_sections() {
        let mut record = defaults();
        let patch = CompanyPatch::from_json(&json!({ "vision": { "title": "V2", "content": "c2" } }));
        record.apply(&patch);
        assert_eq!(record.vision["title"], json!("V2"));
        assert_eq!(record.mission, defaults().mission);
        assert_eq!(record.company_info, defaults().company_info);
    }

    #[test]
    fn test_set_replaces_and_clears() {
        let mut patch = CompanyPatch::default();
        patch.set(CompanySection::Team, json!({ "total": 2 }));
        patch.set(CompanySection::Team, json!({ "total": 3 }));
        assert_eq!(patch.to_set_fields()["team"], json!({ "total": 3 }));
        patch.set(CompanySection::Team, Value::Null);
        assert!(patch.is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(defaults()).unwrap();
        assert!(value.get("companyInfo").is_some());
        assert_eq!(Value::Object(defaults().to_document()), value);
    }
}
