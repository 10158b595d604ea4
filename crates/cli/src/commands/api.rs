//! Admin API client commands.
//!
//! # Usage
//!
//! ```bash
//! # Obtain a session token
//! portfolio-cli api login -u admin
//! export PORTFOLIO_TOKEN=...
//!
//! portfolio-cli api projects list
//! portfolio-cli api projects create project.json --tech Axum --metric users=1200
//! portfolio-cli api projects update 3 project.json --remove-tech 0
//! portfolio-cli api skills import skills.json
//! portfolio-cli api skills set-level backend 0 85
//! portfolio-cli api company patch company.json --keep team --dry-run
//! portfolio-cli api upload screenshot.png
//! ```
//!
//! # Environment Variables
//!
//! - `PORTFOLIO_URL` - Site base URL (default `http://127.0.0.1:3000`)
//! - `PORTFOLIO_TOKEN` - Session token from `api login`
//! - `PORTFOLIO_PASSWORD` - Password for `api login` when `-p` is omitted

use std::path::Path;

use cookie::Cookie;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::{Method, RequestBuilder, StatusCode, redirect};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

use portfolio_core::forms::{CompanyDraft, ProjectDraft, SkillsDraft};
use portfolio_core::types::skill::parse_categories;
use portfolio_core::{CompanyRecord, CompanySection, ProjectInput, ProjectRef, SkillsError};
use portfolio_site::middleware::SESSION_COOKIE;

const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Errors that can occur when calling the admin API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Could not read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Skills(#[from] SkillsError),
}

/// Admin API client.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from `PORTFOLIO_URL` and, when `authenticated`, `PORTFOLIO_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingEnvVar` if a token is required but unset.
    pub fn from_env(authenticated: bool) -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("PORTFOLIO_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

        let mut headers = HeaderMap::new();
        if authenticated {
            let token = std::env::var("PORTFOLIO_TOKEN")
                .map(SecretString::from)
                .map_err(|_| ApiError::MissingEnvVar("PORTFOLIO_TOKEN"))?;
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::Invalid(format!("Invalid token format: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        // Login answers with a redirect that carries the cookie
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base_url))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Log in and return the session token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` if the credentials are rejected.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<String, ApiError> {
        let response = self
            .request(Method::POST, "/api/admin/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::FOUND {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body["error"].as_str().unwrap_or("Login failed").to_string(),
            });
        }

        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value).ok())
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::Invalid("Login response carried no session cookie".into()))
    }

    pub async fn list_projects(&self) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, "/api/admin/projects")).await
    }

    pub async fn get_project(&self, id: &ProjectRef) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, &format!("/api/admin/projects/{id}")))
            .await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Value, ApiError> {
        self.send(
            self.request(Method::POST, "/api/admin/projects")
                .json(&draft.to_payload()),
        )
        .await
    }

    pub async fn update_project(
        &self,
        id: &ProjectRef,
        draft: &ProjectDraft,
    ) -> Result<Value, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/api/admin/projects/{id}"))
                .json(&draft.to_payload()),
        )
        .await
    }

    pub async fn delete_project(&self, id: &ProjectRef) -> Result<Value, ApiError> {
        self.send(self.request(Method::DELETE, &format!("/api/admin/projects/{id}")))
            .await
    }

    pub async fn get_skills(&self) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET, "/api/admin/skills")).await
    }

    /// Fetch the current categories as an editable draft.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Skills` if the response categories are malformed.
    pub async fn skills_draft(&self) -> Result<SkillsDraft, ApiError> {
        let body = self.get_skills().await?;
        Ok(SkillsDraft::new(parse_categories(&body["categories"])?))
    }

    pub async fn put_skills(&self, draft: &SkillsDraft) -> Result<Value, ApiError> {
        self.send(
            self.request(Method::PUT, "/api/admin/skills")
                .json(&draft.to_payload()),
        )
        .await
    }

    pub async fn get_company(&self) -> Result<CompanyRecord, ApiError> {
        let body = self.send(self.request(Method::GET, "/api/admin/company")).await?;
        serde_json::from_value(body)
            .map_err(|e| ApiError::Invalid(format!("Unexpected company response: {e}")))
    }

    pub async fn put_company(&self, draft: &CompanyDraft) -> Result<Value, ApiError> {
        self.send(
            self.request(Method::PUT, "/api/admin/company")
                .json(&draft.to_payload()),
        )
        .await
    }

    /// Upload an image file and return the response body with its URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::File` if the file cannot be read.
    pub async fn upload(&self, path: &Path) -> Result<Value, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime(path))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.send(self.request(Method::POST, "/api/admin/upload").multipart(form))
            .await
    }
}

/// MIME type from a file extension; the server only accepts `image/*`.
fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

async fn read_json(path: &Path) -> Result<Value, ApiError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| ApiError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Load a project file into a draft, validating it the way the server will.
///
/// # Errors
///
/// Returns `ApiError::Invalid` naming the missing required fields.
pub async fn project_draft(path: &Path) -> Result<ProjectDraft, ApiError> {
    let body = read_json(path).await?;
    let input = ProjectInput::from_json(&body).map_err(|e| ApiError::Invalid(e.to_string()))?;
    Ok(ProjectDraft::from(input))
}

/// Load a skills file: either `{"categories": [...]}` or a bare array.
///
/// # Errors
///
/// Returns `ApiError::Skills` if the categories are malformed.
pub async fn skills_draft(path: &Path) -> Result<SkillsDraft, ApiError> {
    let body = read_json(path).await?;
    let categories = body.get("categories").unwrap_or(&body);
    Ok(SkillsDraft::new(parse_categories(categories)?))
}

/// Stage the sections present in a company file on top of `current`.
///
/// # Errors
///
/// Returns `ApiError::Invalid` if the file names no known section.
pub async fn company_draft(path: &Path, current: CompanyRecord) -> Result<CompanyDraft, ApiError> {
    let body = read_json(path).await?;
    let mut draft = CompanyDraft::new(current);
    for section in CompanySection::ALL {
        if let Some(value) = body.get(section.key()) {
            draft.stage(section, value.clone());
        }
    }
    if !draft.is_dirty() {
        return Err(ApiError::Invalid(format!(
            "{} contains no company sections",
            path.display()
        )));
    }
    Ok(draft)
}

/// Parse a `key=value` metric flag. An empty value clears the metric.
///
/// # Errors
///
/// Returns a message if there is no `=` or the key is blank.
pub fn parse_metric(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{input}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("metric key is empty in `{input}`"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// Edits given on the command line on top of a project file.
#[derive(Debug, Default)]
pub struct ProjectEdits {
    pub remove_tech: Vec<usize>,
    pub tech: Vec<String>,
    pub metrics: Vec<(String, String)>,
}

impl ProjectEdits {
    /// Apply removals first (highest index first), then additions, then metrics.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Invalid` if a removal index is out of range.
    pub fn apply(&self, draft: &mut ProjectDraft) -> Result<(), ApiError> {
        let mut indexes = self.remove_tech.clone();
        indexes.sort_unstable_by(|a, b| b.cmp(a));
        indexes.dedup();
        for index in indexes {
            if draft.remove_tech(index).is_none() {
                return Err(ApiError::Invalid(format!(
                    "No technology at index {index}; the stack has {}",
                    draft.tech_stack().len()
                )));
            }
        }
        for tech in &self.tech {
            if !draft.add_tech(tech) {
                tracing::warn!("Ignoring blank --tech value");
            }
        }
        for (key, value) in &self.metrics {
            draft.set_metric(key, value);
        }
        Ok(())
    }
}

/// A single change to the skill categories.
#[derive(Debug, Clone, PartialEq)]
pub enum SkillsEdit {
    AddCategory { key: String, name: String },
    RemoveCategory { key: String },
    AddSkill {
        category: String,
        name: String,
        level: i64,
        years: f64,
        icon: Option<String>,
    },
    RemoveSkill { category: String, index: usize },
    SetLevel {
        category: String,
        index: usize,
        level: i64,
    },
}

impl SkillsEdit {
    /// Apply the change to `draft`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Invalid` if the category or skill does not exist, or
    /// a new category's key is taken.
    pub fn apply(&self, draft: &mut SkillsDraft) -> Result<(), ApiError> {
        let applied = match self {
            Self::AddCategory { key, name } => draft.add_category(key, name),
            Self::RemoveCategory { key } => draft.remove_category(key).is_some(),
            Self::AddSkill {
                category,
                name,
                level,
                years,
                icon,
            } => draft.add_skill(category, name, *level, *years, icon.as_deref()),
            Self::RemoveSkill { category, index } => draft.remove_skill(category, *index).is_some(),
            Self::SetLevel {
                category,
                index,
                level,
            } => draft.set_level(category, *index, *level),
        };
        if applied {
            return Ok(());
        }
        let message = match self {
            Self::AddCategory { key, .. } => format!("Skill category `{key}` already exists"),
            Self::RemoveCategory { key } | Self::AddSkill { category: key, .. } => {
                format!("No skill category `{key}`")
            }
            Self::RemoveSkill { category, index } | Self::SetLevel { category, index, .. } => {
                format!("No skill {index} in category `{category}`")
            }
        };
        Err(ApiError::Invalid(message))
    }
}

/// Unstage the named sections so the stored copies are left alone.
///
/// # Errors
///
/// Returns `ApiError::Invalid` for an unknown section name, or if nothing is
/// left to save.
pub fn keep_sections(draft: &mut CompanyDraft, keep: &[String]) -> Result<(), ApiError> {
    for key in keep {
        let section = CompanySection::from_key(key)
            .ok_or_else(|| ApiError::Invalid(format!("Unknown company section `{key}`")))?;
        draft.discard(section);
    }
    if !draft.is_dirty() {
        return Err(ApiError::Invalid("No company sections left to save".into()));
    }
    Ok(())
}

/// Pretty-print a response body.
pub fn print(value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());

    #[allow(clippy::print_stdout)]
    {
        println!("{text}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("a.PNG")), "image/png");
        assert_eq!(image_mime(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(image_mime(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(image_mime(Path::new("noext")), "application/octet-stream");
    }

    fn project() -> ProjectDraft {
        ProjectDraft::from(
            ProjectInput::from_json(&serde_json::json!({
                "title": "T",
                "problem": "P",
                "solution": "S",
                "techStack": ["Rust", "Go", "Redis"],
                "metrics": { "users": 10 }
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(
            parse_metric("users=1200").unwrap(),
            ("users".to_string(), "1200".to_string())
        );
        assert_eq!(
            parse_metric(" uptime =99.9%").unwrap(),
            ("uptime".to_string(), "99.9%".to_string())
        );
        assert_eq!(parse_metric("users=").unwrap().1, "");
        assert!(parse_metric("users").is_err());
        assert!(parse_metric("=5").is_err());
    }

    #[test]
    fn test_project_edits_apply() {
        let mut draft = project();
        let edits = ProjectEdits {
            remove_tech: vec![0, 2],
            tech: vec!["Axum".into(), "  ".into()],
            metrics: vec![
                ("users".into(), String::new()),
                ("savings".into(), "$1.2M".into()),
                ("latencyMs".into(), "40".into()),
            ],
        };
        edits.apply(&mut draft).unwrap();

        assert_eq!(draft.tech_stack(), ["Go", "Axum"]);
        assert!(draft.metrics().get("users").is_none());
        assert_eq!(draft.metrics()["savings"], "$1.2M");
        assert_eq!(draft.metrics()["latencyMs"], 40);
    }

    #[test]
    fn test_project_edits_reject_bad_index() {
        let mut draft = project();
        let edits = ProjectEdits {
            remove_tech: vec![3],
            ..ProjectEdits::default()
        };
        let err = edits.apply(&mut draft).unwrap_err();
        assert_eq!(err.to_string(), "No technology at index 3; the stack has 3");
    }

    #[test]
    fn test_skills_edits() {
        let mut draft = SkillsDraft::default();
        SkillsEdit::AddCategory {
            key: "backend".into(),
            name: "Backend".into(),
        }
        .apply(&mut draft)
        .unwrap();
        SkillsEdit::AddSkill {
            category: "backend".into(),
            name: "Rust".into(),
            level: 140,
            years: 3.0,
            icon: None,
        }
        .apply(&mut draft)
        .unwrap();
        assert_eq!(draft.categories()[0].skills[0].level, 100);

        SkillsEdit::SetLevel {
            category: "backend".into(),
            index: 0,
            level: 70,
        }
        .apply(&mut draft)
        .unwrap();
        assert_eq!(draft.categories()[0].skills[0].level, 70);

        let err = SkillsEdit::SetLevel {
            category: "backend".into(),
            index: 4,
            level: 70,
        }
        .apply(&mut draft)
        .unwrap_err();
        assert_eq!(err.to_string(), "No skill 4 in category `backend`");

        SkillsEdit::RemoveCategory {
            key: "backend".into(),
        }
        .apply(&mut draft)
        .unwrap();
        assert!(draft.categories().is_empty());
        assert!(
            SkillsEdit::RemoveCategory {
                key: "backend".into()
            }
            .apply(&mut draft)
            .is_err()
        );
    }

    #[test]
    fn test_keep_sections() {
        let base = portfolio_core::seed::default_company();
        let mut draft = CompanyDraft::new(base.clone());
        draft.stage(CompanySection::Vision, serde_json::json!({ "title": "V", "content": "new" }));
        draft.stage(CompanySection::Mission, serde_json::json!({ "title": "M", "content": "new" }));

        keep_sections(&mut draft, &["mission".to_string()]).unwrap();
        let preview = draft.preview();
        assert_eq!(preview.mission, base.mission);
        assert_ne!(preview.vision, base.vision);
        assert_eq!(draft.to_payload().as_object().unwrap().len(), 1);

        assert!(keep_sections(&mut draft, &["history".to_string()]).is_err());
        assert!(keep_sections(&mut draft, &["vision".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_project_draft_requires_fields() {
        let dir = std::env::temp_dir().join(format!("portfolio-cli-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("project.json");
        tokio::fs::write(&path, r#"{"title": "Only title"}"#).await.unwrap();

        let err = project_draft(&path).await.err().unwrap();
        assert_eq!(
            err.to_string(),
            "Missing required fields: title, problem, solution"
        );

        tokio::fs::write(&path, r#"{"title":"T","problem":"P","solution":"S","images":"a.png"}"#)
            .await
            .unwrap();
        let draft = project_draft(&path).await.unwrap();
        assert_eq!(draft.images(), ["a.png"]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
