//! Document storage for site content.
//!
//! # Storage model
//!
//! Content is kept as schemaless JSON documents grouped into collections
//! (`projects`, `skills`, `company`). Every document has a store-assigned
//! object id (UUID) that is distinct from any id field inside the body.
//!
//! Two [`DocumentStore`] implementations exist:
//!
//! - [`PgDocumentStore`] - `PostgreSQL` JSONB rows in `portfolio.documents`
//! - [`MemoryDocumentStore`] - process-local, for local development and tests
//!
//! Repositories ([`ProjectRepository`], [`SkillsRepository`],
//! [`CompanyRepository`]) sit on top of the store and own seeding,
//! normalization and id resolution.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p portfolio-cli -- migrate
//! ```

pub mod company;
pub mod memory;
pub mod postgres;
pub mod projects;
pub mod skills;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use portfolio_core::ProjectId;
use portfolio_core::types::project::coerce_id;

pub use company::CompanyRepository;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use projects::ProjectRepository;
pub use skills::SkillsRepository;

/// Field that marks the single skills/company document.
pub const SLUG_FIELD: &str = "slug";

/// A named group of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Skills,
    Company,
}

impl Collection {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Skills => "skills",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which document(s) an operation targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Top-level body field equals a JSON value. Numbers compare by value,
    /// so `1` never matches `"1"`.
    FieldEq(&'static str, Value),
    /// The store-assigned object id.
    ObjectId(Uuid),
    /// Any document; the oldest one for single-document operations.
    Any,
}

impl Filter {
    #[must_use]
    pub fn slug(slug: &str) -> Self {
        Self::FieldEq(SLUG_FIELD, Value::from(slug))
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier.
    pub object_id: Uuid,
    /// JSON body; always an object.
    pub body: Map<String, Value>,
}

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write collided with a unique index.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// No id is left after the highest stored one.
    #[error("no {0} value left after {1}")]
    SequenceExhausted(&'static str, i64),
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Schemaless document collection store.
///
/// Every method is a single store round-trip. Implementations must be safe to
/// share across request tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Number of documents in a collection.
    async fn count(&self, collection: Collection) -> Result<u64, StoreError>;

    /// Every document in a collection, oldest first.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// The oldest document matching `filter`.
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Insert a document, returning its new object id.
    async fn insert_one(
        &self,
        collection: Collection,
        body: Map<String, Value>,
    ) -> Result<Uuid, StoreError>;

    /// Insert several documents in order.
    async fn insert_many(
        &self,
        collection: Collection,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<(), StoreError>;

    /// Insert `bodies` only if the collection is empty. Returns whether they
    /// were inserted.
    ///
    /// The emptiness check and the insert happen atomically, so concurrent
    /// first reads seed once.
    async fn seed(
        &self,
        collection: Collection,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<bool, StoreError>;

    /// Insert `body` with `field` set to the next id (see [`next_id`]),
    /// returning the assigned id.
    ///
    /// Reading the current maximum and inserting happen atomically with
    /// respect to other sequenced inserts and seeding of the collection.
    async fn insert_sequenced(
        &self,
        collection: Collection,
        field: &'static str,
        body: Map<String, Value>,
    ) -> Result<ProjectId, StoreError>;

    /// Overwrite the given top-level fields of the oldest matching document.
    ///
    /// With `upsert`, a missing document is created from the filter's field
    /// (for [`Filter::FieldEq`]) plus `set`. Returns whether a document was
    /// matched or created.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<bool, StoreError>;

    /// Delete the oldest matching document. Returns whether one was deleted.
    async fn delete_one(&self, collection: Collection, filter: &Filter)
    -> Result<bool, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// One more than the highest value readable as a project id, or 1 when
/// there is none.
///
/// # Errors
///
/// Returns `StoreError::SequenceExhausted` when the highest id is `i64::MAX`.
pub fn next_id<'v>(
    field: &'static str,
    values: impl IntoIterator<Item = &'v Value>,
) -> Result<ProjectId, StoreError> {
    match values.into_iter().filter_map(|v| coerce_id(v).ok()).max() {
        None => Ok(ProjectId::new(1)),
        Some(max) => max
            .checked_next()
            .ok_or(StoreError::SequenceExhausted(field, max.as_i64())),
    }
}

/// JSON equality with numbers compared by value (`1 == 1.0`), matching how
/// `PostgreSQL` compares `jsonb` numerics.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_eq_numbers_by_value() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(json_eq(&json!(-3), &json!(-3)));
        assert!(!json_eq(&json!(1), &json!("1")));
        assert!(!json_eq(&json!(1), &json!(2)));
        assert!(json_eq(&json!("default"), &json!("default")));
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id("id", std::iter::empty()).unwrap(), ProjectId::new(1));
        assert_eq!(
            next_id("id", &[json!(3), json!("7"), json!("legacy"), json!(null)]).unwrap(),
            ProjectId::new(8)
        );
        assert!(matches!(
            next_id("id", &[json!(i64::MAX)]),
            Err(StoreError::SequenceExhausted("id", i64::MAX))
        ));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Projects.to_string(), "projects");
        assert_eq!(Collection::Skills.name(), "skills");
        assert_eq!(Collection::Company.name(), "company");
    }

    #[test]
    fn test_slug_filter() {
        assert_eq!(
            Filter::slug("default"),
            Filter::FieldEq("slug", json!("default"))
        );
    }
}
