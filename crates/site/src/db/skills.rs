//! Skills repository.
//!
//! All categories live in one `{slug: "default", categories: [...]}` document
//! that is replaced wholesale on save.

use serde_json::{Map, Value};

use portfolio_core::seed::{DEFAULT_SLUG, default_skills};
use portfolio_core::types::skill::parse_categories;
use portfolio_core::SkillCategory;

use super::{Collection, DocumentStore, Filter, RepositoryError, SLUG_FIELD};

const CATEGORIES_FIELD: &str = "categories";

/// Repository for skill categories.
pub struct SkillsRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> SkillsRepository<'a> {
    /// Create a new skills repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Insert the default skills document if the collection is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn ensure_seeded(&self) -> Result<bool, RepositoryError> {
        if self.store.count(Collection::Skills).await? > 0 {
            return Ok(false);
        }
        let seeded = self
            .store
            .seed(Collection::Skills, vec![skills_document(&default_skills())])
            .await?;
        if seeded {
            tracing::info!("Seeded default skills");
        }
        Ok(seeded)
    }

    /// Get the current skill categories.
    ///
    /// Reads the `default` document, or any document if that is missing. A
    /// document without `categories` reads as the defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    /// Returns `RepositoryError::DataCorruption` if the stored categories are malformed.
    pub async fn get(&self) -> Result<Vec<SkillCategory>, RepositoryError> {
        self.ensure_seeded().await?;

        let doc = match self
            .store
            .find_one(Collection::Skills, &Filter::slug(DEFAULT_SLUG))
            .await?
        {
            Some(doc) => Some(doc),
            None => self.store.find_one(Collection::Skills, &Filter::Any).await?,
        };

        let Some(categories) = doc.as_ref().and_then(|d| d.body.get(CATEGORIES_FIELD)) else {
            return Ok(default_skills());
        };
        parse_categories(categories)
            .map_err(|e| RepositoryError::DataCorruption(format!("skills document: {e}")))
    }

    /// Replace every category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn replace(
        &self,
        categories: Vec<SkillCategory>,
    ) -> Result<Vec<SkillCategory>, RepositoryError> {
        self.store
            .update_one(
                Collection::Skills,
                &Filter::slug(DEFAULT_SLUG),
                skills_document(&categories),
                true,
            )
            .await?;

        tracing::info!(categories = categories.len(), "Skills replaced");
        Ok(categories)
    }
}

fn skills_document(categories: &[SkillCategory]) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert(SLUG_FIELD.to_owned(), Value::from(DEFAULT_SLUG));
    doc.insert(
        CATEGORIES_FIELD.to_owned(),
        serde_json::to_value(categories).unwrap_or_else(|_| Value::Array(Vec::new())),
    );
    doc
}
