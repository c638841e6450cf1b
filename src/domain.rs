use crate::errors::StoreError;
use crate::query::ListQuery;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// An entity persisted in a named collection of the data store.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Every collection the service owns, in table-creation order.
pub const COLLECTIONS: &[&str] = &[
    crate::models::Gif::COLLECTION,
    crate::models::Category::COLLECTION,
    crate::models::Favorite::COLLECTION,
    crate::models::Collection::COLLECTION,
    crate::models::NewsletterSubscriber::COLLECTION,
];

/// The opaque list/create/update/delete surface of the hosted data store.
///
/// Records cross this boundary as JSON values keyed by their `id` field;
/// [`Records`] provides the typed view. Implementations must honor the
/// [`ListQuery`] semantics defined in [`crate::query`].
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    /// Returns the records of `collection` matching the query, in the
    /// query's sort order, capped at the query's limit.
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>, StoreError>;

    /// Fetches a single record. `Ok(None)` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Stores a record, replacing any existing record with the same id.
    /// The record must carry a string `id` field.
    async fn create(&self, collection: &str, record: Value) -> Result<(), StoreError>;

    /// Merges the top-level fields of `patch` into an existing record.
    /// Fails with [`StoreError::NotFound`] when the record is absent.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// Removes a record. Deleting an absent record is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Typed handle over one collection of a [`DataStore`].
#[derive(Clone)]
pub struct Records<T> {
    store: Arc<dyn DataStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Records<T> {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Records { store, _marker: PhantomData }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<T>, StoreError> {
        let raw = self.store.list(T::COLLECTION, query).await?;
        raw.into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    StoreError::Corrupt(format!(
                        "failed to decode record from collection '{}': {e}",
                        T::COLLECTION
                    ))
                })
            })
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                StoreError::Corrupt(format!(
                    "failed to decode record '{id}' from collection '{}': {e}",
                    T::COLLECTION
                ))
            }),
            None => Ok(None),
        }
    }

    pub async fn create(&self, record: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(record).map_err(|e| {
            StoreError::Corrupt(format!(
                "failed to encode record for collection '{}': {e}",
                T::COLLECTION
            ))
        })?;
        self.store.create(T::COLLECTION, value).await
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<(), StoreError> {
        self.store.update(T::COLLECTION, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}
