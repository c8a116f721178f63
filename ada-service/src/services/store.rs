use async_trait::async_trait;
use dashmap::DashMap;
use redis::{aio::ConnectionManager, Client};
use secrecy::{ExposeSecret, Secret};
use std::time::{Duration, Instant};

/// Flat string-keyed store holding every record as a JSON string.
///
/// There are no transactions: callers doing multi-key updates issue
/// sequential writes and tolerate partially applied sequences.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;
    async fn put(&self, key: &str, value: String) -> Result<(), anyhow::Error>;
    async fn put_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: u64,
    ) -> Result<(), anyhow::Error>;
    async fn delete(&self, key: &str) -> Result<(), anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        // Expired; the read guard is released before evicting
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn put(&self, key: &str, value: String) -> Result<(), anyhow::Error> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn put_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: u64,
    ) -> Result<(), anyhow::Error> {
        let now = Instant::now();
        // Drop expired entries nobody read back
        self.entries.retain(|_, entry| entry.is_live(now));
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Some(now + Duration::from_secs(expiry_seconds)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error> {
        self.entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct RedisStore {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &Secret<String>) -> Result<Self, anyhow::Error> {
        tracing::info!("Connecting to Redis");
        let client = Client::open(url.expose_secret().as_str())?;

        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", key, e))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", key, e))
    }

    async fn put_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry_seconds: u64,
    ) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expiry_seconds.max(1))
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", key, e))
    }

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete {}: {}", key, e))
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("user:ada").await.unwrap(), None);

        store.put("user:ada", "{}".to_string()).await.unwrap();
        assert_eq!(store.get("user:ada").await.unwrap().as_deref(), Some("{}"));

        store.delete("user:ada").await.unwrap();
        assert_eq!(store.get("user:ada").await.unwrap(), None);
        assert!(store.entries.is_empty());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", "1".to_string()).await.unwrap();
        store.put("k", "2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let store = MemoryStore::new();
        store
            .put_with_expiry("session:t", "ada".to_string(), 0)
            .await
            .unwrap();
        assert_eq!(store.get("session:t").await.unwrap(), None);
        assert!(store.entries.is_empty());

        store
            .put_with_expiry("session:u", "ada".to_string(), 60)
            .await
            .unwrap();
        assert_eq!(store.get("session:u").await.unwrap().as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn unread_expired_entries_are_swept() {
        let store = MemoryStore::new();
        for token in ["a", "b", "c"] {
            store
                .put_with_expiry(&format!("session:{}", token), "ada".to_string(), 0)
                .await
                .unwrap();
        }
        store.put("user:ada", "{}".to_string()).await.unwrap();

        // Nobody reads the dead sessions; the next login clears them
        store
            .put_with_expiry("session:live", "ada".to_string(), 60)
            .await
            .unwrap();
        assert_eq!(store.entries.len(), 2);
        assert!(store.entries.contains_key("user:ada"));
        assert!(store.entries.contains_key("session:live"));
    }
}
