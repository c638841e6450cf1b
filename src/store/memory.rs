use crate::domain::DataStore;
use crate::errors::StoreError;
use crate::query::ListQuery;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Process-local `DataStore`. Backs development runs and tests; evaluates
/// query descriptions with the shared semantics from [`crate::query`].
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_id(record: &Value) -> Result<String, StoreError> {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(|id| id.to_string())
        .ok_or_else(|| StoreError::InvalidRecord("record has no string 'id' field".to_string()))
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        let records: Vec<Value> = collections
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        let matched = query.apply(records);
        tracing::debug!(
            collection,
            matched = matched.len(),
            conditions = query.conditions.len(),
            "Memory store: list"
        );
        Ok(matched)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn create(&self, collection: &str, record: Value) -> Result<(), StoreError> {
        let id = record_id(&record)?;
        let mut collections = self.collections.write().expect("store lock poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::InvalidRecord(
                    "update patch must be a JSON object".to_string(),
                ));
            }
        };

        let mut collections = self.collections.write().expect("store lock poisoned");
        let record = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        let fields = record.as_object_mut().ok_or_else(|| {
            StoreError::Corrupt(format!("record '{id}' in '{collection}' is not an object"))
        })?;
        for (key, value) in patch {
            fields.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");
        if let Some(c) = collections.get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }
}
