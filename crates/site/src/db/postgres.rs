//! `PostgreSQL` document store.
//!
//! Documents live in `portfolio.documents` as JSONB bodies. Queries are
//! built at runtime with [`QueryBuilder`] since filters vary per call.
//! "Oldest first" is insertion order via the `seq` column.
//!
//! Seeding and sequenced inserts take a transaction-scoped advisory lock per
//! collection, and a unique index on project `body -> 'id'` backs it up.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use portfolio_core::ProjectId;

use super::{Collection, Document, DocumentStore, Filter, StoreError, next_id};

/// Internal row type for document queries.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    object_id: Uuid,
    body: Json<Map<String, Value>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            object_id: row.object_id,
            body: row.body.0,
        }
    }
}

/// [`DocumentStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Append `AND <filter>` to a query already scoped to a collection.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::FieldEq(field, value) => {
            qb.push(" AND body -> ");
            qb.push_bind(*field);
            qb.push(" = ");
            qb.push_bind(Json(value.clone()));
        }
        Filter::ObjectId(id) => {
            qb.push(" AND object_id = ");
            qb.push_bind(*id);
        }
        Filter::Any => {}
    }
}

/// Multi-row insert of new documents.
fn insert_values(
    collection: Collection,
    bodies: Vec<Map<String, Value>>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb =
        QueryBuilder::new("INSERT INTO portfolio.documents (object_id, collection, body) ");
    qb.push_values(bodies, |mut row, body| {
        row.push_bind(Uuid::new_v4())
            .push_bind(collection.name())
            .push_bind(Json(body));
    });
    qb
}

/// Unique violations become `StoreError::Conflict`.
fn write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Database(e),
    }
}

/// Hold the collection's advisory lock until the transaction ends.
async fn lock_collection(conn: &mut PgConnection, collection: Collection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(format!("portfolio.documents:{collection}"))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// `SELECT object_id ... LIMIT 1` for the oldest document matching `filter`.
fn push_target(qb: &mut QueryBuilder<'_, Postgres>, collection: Collection, filter: &Filter) {
    qb.push("SELECT object_id FROM portfolio.documents WHERE collection = ");
    qb.push_bind(collection.name());
    push_filter(qb, filter);
    qb.push(" ORDER BY seq LIMIT 1");
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM portfolio.documents WHERE collection = $1")
                .bind(collection.name())
                .fetch_one(&self.pool)
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r"
            SELECT object_id, body FROM portfolio.documents
            WHERE collection = $1
            ORDER BY seq
            ",
        )
        .bind(collection.name())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb = QueryBuilder::new("SELECT object_id, body FROM portfolio.documents WHERE collection = ");
        qb.push_bind(collection.name());
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY seq LIMIT 1");

        let row: Option<DocumentRow> = qb.build_query_as().fetch_optional(&self.pool).await?;
        Ok(row.map(Document::from))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        body: Map<String, Value>,
    ) -> Result<Uuid, StoreError> {
        let object_id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO portfolio.documents (object_id, collection, body)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(object_id)
        .bind(collection.name())
        .bind(Json(body))
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(object_id)
    }

    async fn insert_many(
        &self,
        collection: Collection,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<(), StoreError> {
        if bodies.is_empty() {
            return Ok(());
        }

        insert_values(collection, bodies)
            .build()
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(())
    }

    async fn seed(
        &self,
        collection: Collection,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_collection(&mut tx, collection).await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM portfolio.documents WHERE collection = $1")
                .bind(collection.name())
                .fetch_one(&mut *tx)
                .await?;
        if count > 0 {
            return Ok(false);
        }

        if !bodies.is_empty() {
            insert_values(collection, bodies)
                .build()
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        tx.commit().await?;

        Ok(true)
    }

    async fn insert_sequenced(
        &self,
        collection: Collection,
        field: &'static str,
        mut body: Map<String, Value>,
    ) -> Result<ProjectId, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_collection(&mut tx, collection).await?;

        let existing: Vec<Json<Value>> = sqlx::query_scalar(
            r"
            SELECT body -> $2 FROM portfolio.documents
            WHERE collection = $1 AND body -> $2 IS NOT NULL
            ",
        )
        .bind(collection.name())
        .bind(field)
        .fetch_all(&mut *tx)
        .await?;

        let id = next_id(field, existing.iter().map(|v| &v.0))?;
        body.insert(field.to_owned(), Value::from(id.as_i64()));

        sqlx::query(
            r"
            INSERT INTO portfolio.documents (object_id, collection, body)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(Uuid::new_v4())
        .bind(collection.name())
        .bind(Json(body))
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;
        tx.commit().await?;

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<bool, StoreError> {
        let mut qb = QueryBuilder::new("UPDATE portfolio.documents SET body = body || ");
        qb.push_bind(Json(set.clone()));
        qb.push(", updated_at = NOW() WHERE object_id = (");
        push_target(&mut qb, collection, filter);
        qb.push(")");

        let result = qb.build().execute(&self.pool).await.map_err(write_error)?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if !upsert {
            return Ok(false);
        }

        let mut body = Map::new();
        if let Filter::FieldEq(field, value) = filter {
            body.insert((*field).to_owned(), value.clone());
        }
        body.extend(set);
        self.insert_one(collection, body).await?;

        Ok(true)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<bool, StoreError> {
        let mut qb = QueryBuilder::new("DELETE FROM portfolio.documents WHERE object_id = (");
        push_target(&mut qb, collection, filter);
        qb.push(")");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
