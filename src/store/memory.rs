/// In-process document store.
/// Backs the `--memory` mode of the binary and most of the test suite.

use super::{child_path, merge_fields, Document, DocumentStore, Fields, UpsertMode};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

type Collections = HashMap<String, BTreeMap<String, Document>>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.lock().await;
        collections.get(collection).map(|docs| docs.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>> {
        let collections = self.collections.lock().await;
        let matches = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches!(doc.fields.get(field), Some(Value::String(s)) if s == value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.lock().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn list_children(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        let path = child_path(collection, parent_id, subcollection);
        let collections = self.collections.lock().await;
        Ok(collections
            .get(&path)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, collection: &str, id: &str, fields: Fields, mode: UpsertMode) -> Result<()> {
        let now = self.server_timestamp();
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.get_mut(id) {
            Some(existing) => match mode {
                UpsertMode::Merge => merge_fields(&mut existing.fields, fields),
                UpsertMode::Replace => existing.fields = fields,
            },
            None => {
                docs.insert(
                    id.to_string(),
                    Document {
                        id: id.to_string(),
                        fields,
                        created_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.lock().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
