//! Company repository.

use serde_json::{Map, Value};

use portfolio_core::seed::{DEFAULT_SLUG, default_company};
use portfolio_core::{CompanyPatch, CompanyRecord};

use super::{Collection, DocumentStore, Filter, RepositoryError, SLUG_FIELD};

/// Repository for the single company record.
pub struct CompanyRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CompanyRepository<'a> {
    /// Create a new company repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Insert the default company document if the collection is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn ensure_seeded(&self) -> Result<bool, RepositoryError> {
        if self.store.count(Collection::Company).await? > 0 {
            return Ok(false);
        }
        let mut doc = default_company().to_document();
        doc.insert(SLUG_FIELD.to_owned(), Value::from(DEFAULT_SLUG));
        let seeded = self.store.seed(Collection::Company, vec![doc]).await?;
        if seeded {
            tracing::info!("Seeded default company record");
        }
        Ok(seeded)
    }

    /// Get the company record; missing sections read as their defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn get(&self) -> Result<CompanyRecord, RepositoryError> {
        self.ensure_seeded().await?;

        let doc = match self
            .store
            .find_one(Collection::Company, &Filter::slug(DEFAULT_SLUG))
            .await?
        {
            Some(doc) => Some(doc),
            None => self.store.find_one(Collection::Company, &Filter::Any).await?,
        };

        let defaults = default_company();
        Ok(doc.map_or_else(
            || defaults.clone(),
            |d| CompanyRecord::from_document(&d.body, &defaults),
        ))
    }

    /// Overwrite the sections present in `patch`, then return the merged record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store fails.
    pub async fn merge(&self, patch: &CompanyPatch) -> Result<CompanyRecord, RepositoryError> {
        let mut set: Map<String, Value> = patch.to_set_fields();
        set.insert(SLUG_FIELD.to_owned(), Value::from(DEFAULT_SLUG));

        self.store
            .update_one(Collection::Company, &Filter::slug(DEFAULT_SLUG), set, true)
            .await?;

        tracing::info!(
            sections = ?patch.sections().map(|(s, _)| s.key()).collect::<Vec<_>>(),
            "Company record updated"
        );
        self.get().await
    }
}
