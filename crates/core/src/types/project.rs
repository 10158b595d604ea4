//! Portfolio projects.
//!
//! Stored project documents are not trusted to have a fixed shape: older
//! writes left `images` or `techStack` unset, stored scalars instead of lists,
//! or kept the id as a string. [`Project::from_document`] is the single place
//! that turns such a document into a well-formed [`Project`], and
//! [`ProjectInput::from_json`] does the same for client payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::id::ProjectId;

/// Fields every create or update payload must carry as non-empty strings.
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "problem", "solution"];

/// Errors raised while normalizing a stored project document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The document is not a JSON object.
    #[error("project document is not an object")]
    NotAnObject,
    /// The document has no usable `id` field.
    #[error("project document has no id")]
    MissingId,
    /// The `id` field cannot be read as an integer.
    #[error("project id {0} is not an integer")]
    InvalidId(String),
}

/// Errors raised while validating a create/update payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectInputError {
    /// The payload is not a JSON object.
    #[error("Invalid payload: expected a JSON object")]
    NotAnObject,
    /// One or more required text fields are missing or empty.
    #[error("Missing required fields: title, problem, solution")]
    MissingRequired {
        /// The required fields that were absent.
        missing: Vec<&'static str>,
    },
}

/// A portfolio project as returned to every reader.
///
/// `tech_stack` and `images` are always lists and `metrics` is always a map,
/// whatever the stored document looked like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub problem: String,
    pub solution: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub live_link: String,
    #[serde(default)]
    pub github_link: String,
    #[serde(default)]
    pub featured: bool,
    /// Named KPIs; values are numbers or display strings.
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

impl Project {
    /// Normalize a stored document into a project.
    ///
    /// Missing text fields become empty strings, non-list `images`/`techStack`
    /// become empty lists (non-string entries are dropped), and a missing or
    /// non-object `metrics` becomes an empty map. The id may be stored as a
    /// number or as a numeric string.
    ///
    /// # Errors
    ///
    /// Returns `NormalizeError` if the document is not an object or its id
    /// cannot be read as an integer.
    pub fn from_document(doc: &Value) -> Result<Self, NormalizeError> {
        let fields = doc.as_object().ok_or(NormalizeError::NotAnObject)?;
        let id = coerce_id(fields.get("id").unwrap_or(&Value::Null))?;

        Ok(Self {
            id,
            title: text(fields, "title"),
            problem: text(fields, "problem"),
            solution: text(fields, "solution"),
            impact: text(fields, "impact"),
            tech_stack: string_list(fields.get("techStack")),
            images: string_list(fields.get("images")),
            live_link: text(fields, "liveLink"),
            github_link: text(fields, "githubLink"),
            featured: fields
                .get("featured")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            metrics: fields
                .get("metrics")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// The stored form of this project: every field, `id` as a number.
    #[must_use]
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("id".into(), Value::from(self.id.as_i64()));
        doc.insert("title".into(), Value::from(self.title.clone()));
        doc.insert("problem".into(), Value::from(self.problem.clone()));
        doc.insert("solution".into(), Value::from(self.solution.clone()));
        doc.insert("impact".into(), Value::from(self.impact.clone()));
        doc.insert("techStack".into(), Value::from(self.tech_stack.clone()));
        doc.insert("images".into(), Value::from(self.images.clone()));
        doc.insert("liveLink".into(), Value::from(self.live_link.clone()));
        doc.insert("githubLink".into(), Value::from(self.github_link.clone()));
        doc.insert("featured".into(), Value::from(self.featured));
        doc.insert("metrics".into(), Value::Object(self.metrics.clone()));
        doc
    }
}

/// A validated create/update payload.
///
/// Carries every project field except `id`, which is always assigned by the
/// repository (next id on create, the existing id on update).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInput {
    pub title: String,
    pub problem: String,
    pub solution: String,
    pub impact: String,
    pub tech_stack: Vec<String>,
    pub images: Vec<String>,
    pub live_link: String,
    pub github_link: String,
    pub featured: bool,
    pub metrics: Map<String, Value>,
}

impl ProjectInput {
    /// Validate and coerce a client payload.
    ///
    /// `techStack` and `images` accept a list, a single scalar (wrapped into a
    /// one-element list) or nothing (empty list). Any `id` in the payload is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `ProjectInputError::NotAnObject` for non-object payloads and
    /// `ProjectInputError::MissingRequired` when `title`, `problem` or
    /// `solution` is missing or empty.
    pub fn from_json(body: &Value) -> Result<Self, ProjectInputError> {
        let fields = body.as_object().ok_or(ProjectInputError::NotAnObject)?;

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .into_iter()
            .filter(|key| text(fields, key).is_empty())
            .collect();
        if !missing.is_empty() {
            return Err(ProjectInputError::MissingRequired { missing });
        }

        Ok(Self {
            title: text(fields, "title"),
            problem: text(fields, "problem"),
            solution: text(fields, "solution"),
            impact: text(fields, "impact"),
            tech_stack: coerce_list(fields.get("techStack")),
            images: coerce_list(fields.get("images")),
            live_link: text(fields, "liveLink"),
            github_link: text(fields, "githubLink"),
            featured: fields
                .get("featured")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            metrics: fields
                .get("metrics")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Stamp the payload with an id.
    #[must_use]
    pub fn into_project(self, id: ProjectId) -> Project {
        Project {
            id,
            title: self.title,
            problem: self.problem,
            solution: self.solution,
            impact: self.impact,
            tech_stack: self.tech_stack,
            images: self.images,
            live_link: self.live_link,
            github_link: self.github_link,
            featured: self.featured,
            metrics: self.metrics,
        }
    }
}

impl From<Project> for ProjectInput {
    fn from(project: Project) -> Self {
        Self {
            title: project.title,
            problem: project.problem,
            solution: project.solution,
            impact: project.impact,
            tech_stack: project.tech_stack,
            images: project.images,
            live_link: project.live_link,
            github_link: project.github_link,
            featured: project.featured,
            metrics: project.metrics,
        }
    }
}

/// Read a stored id that may be a number or a numeric string.
///
/// # Errors
///
/// Returns `NormalizeError::MissingId` for `null` and
/// `NormalizeError::InvalidId` for anything that is not an integer.
pub fn coerce_id(value: &Value) -> Result<ProjectId, NormalizeError> {
    match value {
        Value::Null => Err(NormalizeError::MissingId),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation)] // checked integral and in range
                        let id = f as i64;
                        id
                    })
            })
            .map(ProjectId::new)
            .ok_or_else(|| NormalizeError::InvalidId(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(ProjectId::new)
            .map_err(|_| NormalizeError::InvalidId(s.clone())),
        other => Err(NormalizeError::InvalidId(other.to_string())),
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Stored lists: anything but an array reads as empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

/// Payload lists: a lone scalar is wrapped into a one-element list.
fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(scalar) => scalar_to_string(scalar).into_iter().collect(),
        None => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload() -> Value {
        json!({
            "title": "Ledger",
            "problem": "Manual reconciliation",
            "solution": "Automated matching",
            "impact": "Hours saved",
            "techStack": ["Rust", "Postgres"],
            "images": ["https://cdn.example.com/a.png"],
            "liveLink": "https://ledger.example.com",
            "githubLink": "",
            "featured": true,
            "metrics": { "users": 1200, "growth": "40%" }
        })
    }

    #[test]
    fn test_from_document_full() {
        let mut doc = payload();
        doc["id"] = json!(3);
        let project = Project::from_document(&doc).unwrap();
        assert_eq!(project.id, ProjectId::new(3));
        assert_eq!(project.tech_stack, vec!["Rust", "Postgres"]);
        assert!(project.featured);
        assert_eq!(project.metrics["users"], json!(1200));
    }

    #[test]
    fn test_from_document_fills_missing_collections() {
        let doc = json!({ "id": 1, "title": "Bare" });
        let project = Project::from_document(&doc).unwrap();
        assert!(project.images.is_empty());
        assert!(project.tech_stack.is_empty());
        assert!(project.metrics.is_empty());
        assert_eq!(project.problem, "");
        assert!(!project.featured);
    }

    #[test]
    fn test_from_document_non_list_collections_read_as_empty() {
        let doc = json!({
            "id": 1,
            "images": "https://cdn.example.com/a.png",
            "techStack": null,
            "metrics": "lots"
        });
        let project = Project::from_document(&doc).unwrap();
        assert!(project.images.is_empty());
        assert!(project.tech_stack.is_empty());
        assert!(project.metrics.is_empty());
    }

    #[test]
    fn test_from_document_drops_non_string_list_entries() {
        let doc = json!({ "id": 1, "techStack": ["Rust", 5, null, "Go"] });
        let project = Project::from_document(&doc).unwrap();
        assert_eq!(project.tech_stack, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_from_document_string_id() {
        let doc = json!({ "id": " 12 " });
        assert_eq!(Project::from_document(&doc).unwrap().id, ProjectId::new(12));
    }

    #[test]
    fn test_from_document_invalid_ids() {
        assert_eq!(
            Project::from_document(&json!({ "title": "no id" })),
            Err(NormalizeError::MissingId)
        );
        assert!(matches!(
            Project::from_document(&json!({ "id": "abc" })),
            Err(NormalizeError::InvalidId(_))
        ));
        assert!(matches!(
            Project::from_document(&json!({ "id": 1.5 })),
            Err(NormalizeError::InvalidId(_))
        ));
        assert_eq!(
            Project::from_document(&json!([1, 2])),
            Err(NormalizeError::NotAnObject)
        );
    }

    #[test]
    fn test_float_id_with_zero_fraction_is_accepted() {
        assert_eq!(coerce_id(&json!(4.0)).unwrap(), ProjectId::new(4));
    }

    #[test]
    fn test_document_roundtrip() {
        let input = ProjectInput::from_json(&payload()).unwrap();
        let project = input.into_project(ProjectId::new(9));
        let doc = Value::Object(project.to_document());
        assert_eq!(Project::from_document(&doc).unwrap(), project);
    }

    #[test]
    fn test_to_document_matches_serde() {
        let project = ProjectInput::from_json(&payload())
            .unwrap()
            .into_project(ProjectId::new(2));
        assert_eq!(
            Value::Object(project.to_document()),
            serde_json::to_value(&project).unwrap()
        );
    }

    #[test]
    fn test_input_requires_fields() {
        let err = ProjectInput::from_json(&json!({ "title": "Only title" })).unwrap_err();
        assert_eq!(
            err,
            ProjectInputError::MissingRequired {
                missing: vec!["problem", "solution"]
            }
        );
        assert_eq!(
            err.to_string(),
            "Missing required fields: title, problem, solution"
        );
    }

    #[test]
    fn test_input_empty_strings_count_as_missing() {
        let mut body = payload();
        body["title"] = json!("");
        assert!(matches!(
            ProjectInput::from_json(&body),
            Err(ProjectInputError::MissingRequired { .. })
        ));
    }

    #[test]
    fn test_input_rejects_non_object() {
        assert_eq!(
            ProjectInput::from_json(&json!("title")),
            Err(ProjectInputError::NotAnObject)
        );
    }

    #[test]
    fn test_input_wraps_scalars_into_lists() {
        let mut body = payload();
        body["images"] = json!("https://cdn.example.com/one.png");
        body["techStack"] = json!("Rust");
        let input = ProjectInput::from_json(&body).unwrap();
        assert_eq!(input.images, vec!["https://cdn.example.com/one.png"]);
        assert_eq!(input.tech_stack, vec!["Rust"]);
    }

    #[test]
    fn test_input_missing_lists_become_empty() {
        let body = json!({ "title": "t", "problem": "p", "solution": "s", "images": null });
        let input = ProjectInput::from_json(&body).unwrap();
        assert!(input.images.is_empty());
        assert!(input.tech_stack.is_empty());
        assert!(input.metrics.is_empty());
    }

    #[test]
    fn test_input_ignores_payload_id() {
        let mut body = payload();
        body["id"] = json!(999);
        let project = ProjectInput::from_json(&body)
            .unwrap()
            .into_project(ProjectId::new(4));
        assert_eq!(project.id, ProjectId::new(4));
    }
}
