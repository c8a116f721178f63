use super::store::KvStore;
use serde::{de::DeserializeOwned, Serialize};
use service_core::error::AppError;
use std::sync::Arc;

/// Typed JSON access over a [`KvStore`], plus the id-array secondary indexes.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KvStore>,
}

fn store_error(err: anyhow::Error) -> AppError {
    tracing::error!(error = %err, "Store operation failed");
    AppError::StoreError(err)
}

impl Repository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.store.health_check().await
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        self.store.get(key).await.map_err(store_error)
    }

    pub async fn put_raw_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: u64,
    ) -> Result<(), AppError> {
        self.store
            .put_with_expiry(key, value, expiry_seconds)
            .await
            .map_err(store_error)
    }

    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get_raw(key).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                tracing::error!(key, error = %e, "Corrupt record");
                AppError::StoreError(anyhow::anyhow!("Corrupt record at {}: {}", key, e))
            }),
            None => Ok(None),
        }
    }

    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.store.put(key, raw).await.map_err(store_error)
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.store.delete(key).await.map_err(store_error)
    }

    /// Ids held by an index key; a missing index is empty.
    pub async fn index(&self, key: &str) -> Result<Vec<String>, AppError> {
        Ok(self.load::<Vec<String>>(key).await?.unwrap_or_default())
    }

    /// Appends `id` unless already present. Returns the new index length.
    pub async fn index_push(&self, key: &str, id: &str) -> Result<usize, AppError> {
        let mut ids = self.index(key).await?;
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
            self.save(key, &ids).await?;
        }
        Ok(ids.len())
    }

    pub async fn index_remove(&self, key: &str, id: &str) -> Result<(), AppError> {
        let mut ids = self.index(key).await?;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() != before {
            self.save(key, &ids).await?;
        }
        Ok(())
    }

    /// Keeps the first `len` ids and returns the ones dropped.
    pub async fn index_truncate(&self, key: &str, len: usize) -> Result<Vec<String>, AppError> {
        let mut ids = self.index(key).await?;
        if ids.len() <= len {
            return Ok(Vec::new());
        }
        let dropped = ids.split_off(len);
        self.save(key, &ids).await?;
        Ok(dropped)
    }

    /// Loads every id through `key_for`, skipping ids whose record is gone.
    pub async fn load_many<T, F>(&self, ids: &[String], key_for: F) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned,
        F: Fn(&str) -> String,
    {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.load(&key_for(id)).await? {
                Some(record) => records.push(record),
                None => tracing::debug!(id = %id, "Skipping dangling index entry"),
            }
        }
        Ok(records)
    }
}
