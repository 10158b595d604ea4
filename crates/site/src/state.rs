//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::db::{CompanyRepository, DocumentStore, ProjectRepository, SkillsRepository};
use crate::services::{BlobStore, CredentialVerifier, TokenCodec};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: Arc<dyn DocumentStore>,
    blob: Option<Arc<dyn BlobStore>>,
    credentials: CredentialVerifier,
}

impl AppState {
    /// Build state from configuration and already-connected collaborators.
    #[must_use]
    pub fn new(
        config: SiteConfig,
        store: Arc<dyn DocumentStore>,
        blob: Option<Arc<dyn BlobStore>>,
    ) -> Self {
        let codec = TokenCodec::new(&config.auth.jwt_secret);
        let credentials = CredentialVerifier::new(&config.auth, config.environment, codec);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                blob,
                credentials,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn blob(&self) -> Option<&dyn BlobStore> {
        self.inner.blob.as_deref()
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialVerifier {
        &self.inner.credentials
    }

    #[must_use]
    pub fn projects(&self) -> ProjectRepository<'_> {
        ProjectRepository::new(self.store())
    }

    #[must_use]
    pub fn skills(&self) -> SkillsRepository<'_> {
        SkillsRepository::new(self.store())
    }

    #[must_use]
    pub fn company(&self) -> CompanyRepository<'_> {
        CompanyRepository::new(self.store())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("blob", &self.inner.blob.is_some())
            .finish_non_exhaustive()
    }
}
