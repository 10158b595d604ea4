//! Project repository.
//!
//! Projects are the only true collection. Each document carries its own
//! integer `id` field, separate from the store's object id, and older
//! documents may store that id as a string. [`ProjectRef`] lookups resolve in
//! a fixed order:
//!
//! - `Numeric(n)`: `id == n`, then `id == "n"`
//! - `Legacy(s)`: `id == "s"`, then object id `== s`
//!
//! The same resolution backs get, update and delete.

use serde_json::Value;

use portfolio_core::types::project::coerce_id;
use portfolio_core::seed::default_projects;
use portfolio_core::{Project, ProjectId, ProjectInput, ProjectRef};
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, Filter, RepositoryError, StoreError};

const ID_FIELD: &str = "id";

/// Inserts tried before a colliding create gives up.
const CREATE_ATTEMPTS: u32 = 3;

/// Repository for portfolio projects.
pub struct ProjectRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProjectRepository<'a> {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Insert the default projects if the collection is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn ensure_seeded(&self) -> Result<bool, RepositoryError> {
        if self.store.count(Collection::Projects).await? > 0 {
            return Ok(false);
        }
        let docs = default_projects().iter().map(Project::to_document).collect();
        let seeded = self.store.seed(Collection::Projects, docs).await?;
        if seeded {
            tracing::info!("Seeded default projects");
        }
        Ok(seeded)
    }

    /// List every project, ascending by id.
    ///
    /// Seeds the collection first if it is empty. Documents whose id cannot
    /// be read as an integer are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        self.ensure_seeded().await?;

        let mut projects: Vec<Project> = self
            .store
            .find_all(Collection::Projects)
            .await?
            .into_iter()
            .filter_map(|doc| match Project::from_document(&Value::Object(doc.body)) {
                Ok(project) => Some(project),
                Err(e) => {
                    tracing::warn!(object_id = %doc.object_id, error = %e, "Skipping malformed project document");
                    None
                }
            })
            .collect();
        projects.sort_by_key(|p| p.id);

        Ok(projects)
    }

    /// Get a project by reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    /// Returns `RepositoryError::DataCorruption` if the matched document has no
    /// usable id.
    pub async fn get(&self, project_ref: &ProjectRef) -> Result<Option<Project>, RepositoryError> {
        let Some(doc) = self.resolve(project_ref).await? else {
            tracing::debug!(%project_ref, "Project not found");
            return Ok(None);
        };
        normalize(&doc).map(Some)
    }

    /// Create a project with the next sequential id.
    ///
    /// The id is one more than the highest readable id in the collection, or
    /// 1 for an empty collection. The store assigns it atomically; a write
    /// that still collides on the unique id index is retried.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails, the id space is
    /// exhausted, or every attempt collides.
    pub async fn create(&self, input: ProjectInput) -> Result<Project, RepositoryError> {
        // The stored id is overwritten by the store
        let mut project = input.into_project(ProjectId::new(0));

        let mut attempt = 1;
        let id = loop {
            match self
                .store
                .insert_sequenced(Collection::Projects, ID_FIELD, project.to_document())
                .await
            {
                Ok(id) => break id,
                Err(StoreError::Conflict(e)) if attempt < CREATE_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "Project id collided; retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };
        project.id = id;

        tracing::info!(project_id = %project.id, "Project created");
        Ok(project)
    }

    /// Replace a project's fields, keeping its id.
    ///
    /// The stored `id` is rewritten as a number even if it was a string.
    /// Returns `None` if no project matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    /// Returns `RepositoryError::DataCorruption` if the matched document has no
    /// usable id.
    pub async fn update(
        &self,
        project_ref: &ProjectRef,
        input: ProjectInput,
    ) -> Result<Option<Project>, RepositoryError> {
        let Some(doc) = self.resolve(project_ref).await? else {
            return Ok(None);
        };
        let id = existing_id(&doc)?;
        let project = input.into_project(id);

        let matched = self
            .store
            .update_one(
                Collection::Projects,
                &Filter::ObjectId(doc.object_id),
                project.to_document(),
                false,
            )
            .await?;
        if !matched {
            // Deleted between lookup and update.
            return Ok(None);
        }

        tracing::info!(project_id = %project.id, "Project updated");
        Ok(Some(project))
    }

    /// Delete a project. Returns whether one was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn delete(&self, project_ref: &ProjectRef) -> Result<bool, RepositoryError> {
        let Some(doc) = self.resolve(project_ref).await? else {
            return Ok(false);
        };
        let deleted = self
            .store
            .delete_one(Collection::Projects, &Filter::ObjectId(doc.object_id))
            .await?;
        if deleted {
            tracing::info!(%project_ref, "Project deleted");
        }
        Ok(deleted)
    }

    async fn resolve(&self, project_ref: &ProjectRef) -> Result<Option<Document>, RepositoryError> {
        for filter in lookup_order(project_ref) {
            if let Some(doc) = self.store.find_one(Collection::Projects, &filter).await? {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }
}

/// Filters tried, in order, to find the document a reference points at.
fn lookup_order(project_ref: &ProjectRef) -> Vec<Filter> {
    match project_ref {
        ProjectRef::Numeric(id) => vec![
            Filter::FieldEq(ID_FIELD, Value::from(id.as_i64())),
            Filter::FieldEq(ID_FIELD, Value::from(id.to_string())),
        ],
        ProjectRef::Legacy(raw) => {
            let mut filters = vec![Filter::FieldEq(ID_FIELD, Value::from(raw.as_str()))];
            if let Ok(object_id) = Uuid::parse_str(raw) {
                filters.push(Filter::ObjectId(object_id));
            }
            filters
        }
    }
}

fn normalize(doc: &Document) -> Result<Project, RepositoryError> {
    Project::from_document(&Value::Object(doc.body.clone())).map_err(|e| {
        RepositoryError::DataCorruption(format!("project document {}: {e}", doc.object_id))
    })
}

fn existing_id(doc: &Document) -> Result<ProjectId, RepositoryError> {
    doc.body
        .get(ID_FIELD)
        .ok_or_else(|| {
            RepositoryError::DataCorruption(format!("project document {} has no id", doc.object_id))
        })
        .and_then(|v| {
            coerce_id(v).map_err(|e| {
                RepositoryError::DataCorruption(format!("project document {}: {e}", doc.object_id))
            })
        })
}
