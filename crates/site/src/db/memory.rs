//! Process-local document store.
//!
//! Backs local development (`PORTFOLIO_STORE=memory`) and the HTTP tests.
//! Documents are kept per collection in insertion order, which doubles as
//! the "oldest first" order the [`DocumentStore`] contract asks for.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use portfolio_core::ProjectId;

use super::{Collection, Document, DocumentStore, Filter, StoreError, json_eq, next_id};

/// In-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::FieldEq(field, value) => doc.body.get(*field).is_some_and(|v| json_eq(v, value)),
        Filter::ObjectId(id) => doc.object_id == *id,
        Filter::Any => true,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn count(&self, collection: Collection) -> Result<u64, StoreError> {
        let guard = self.collections.read().await;
        let len = guard.get(&collection).map_or(0, Vec::len);
        Ok(u64::try_from(len).unwrap_or(u64::MAX))
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, filter)))
            .cloned())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        body: Map<String, Value>,
    ) -> Result<Uuid, StoreError> {
        let object_id = Uuid::new_v4();
        let mut guard = self.collections.write().await;
        guard
            .entry(collection)
            .or_default()
            .push(Document { object_id, body });
        Ok(object_id)
    }

    async fn insert_many(
        &self,
        collection: Collection,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        docs.extend(bodies.into_iter().map(|body| Document {
            object_id: Uuid::new_v4(),
            body,
        }));
        Ok(())
    }

    async fn seed(
        &self,
        collection: Collection,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<bool, StoreError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        if !docs.is_empty() {
            return Ok(false);
        }
        docs.extend(bodies.into_iter().map(|body| Document {
            object_id: Uuid::new_v4(),
            body,
        }));
        Ok(true)
    }

    async fn insert_sequenced(
        &self,
        collection: Collection,
        field: &'static str,
        mut body: Map<String, Value>,
    ) -> Result<ProjectId, StoreError> {
        // One write lock covers both the max scan and the push
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();

        let id = next_id(field, docs.iter().filter_map(|d| d.body.get(field)))?;
        body.insert(field.to_owned(), Value::from(id.as_i64()));
        docs.push(Document {
            object_id: Uuid::new_v4(),
            body,
        });
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Map<String, Value>,
        upsert: bool,
    ) -> Result<bool, StoreError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();

        if let Some(doc) = docs.iter_mut().find(|d| matches(d, filter)) {
            doc.body.extend(set);
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
        docs.push(Document {
            object_id: Uuid::new_v4(),
            body,
        });
        Ok(true)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<bool, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| matches(d, filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
