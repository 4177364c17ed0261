use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::common::errors::StoreError;

/// Persistent key-value storage holding arrays of hostnames.
#[async_trait]
pub trait DomainStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError>;
    async fn set(&self, key: &str, hosts: &[String]) -> Result<(), StoreError>;
}

/// A single JSON object on disk, `{ key: [hosts...] }`, mirroring extension
/// local storage.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> Result<HashMap<String, Value>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DomainStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        let mut all = self.read_all().await?;
        match all.remove(key) {
            Some(value) => Ok(serde_json::from_value(value).ok()),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, hosts: &[String]) -> Result<(), StoreError> {
        let mut all = self.read_all().await?;
        all.insert(key.to_string(), serde_json::to_value(hosts)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, serde_json::to_vec(&all)?).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, hosts: &[String]) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), hosts.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_roundtrips_and_keeps_other_keys() {
        let dir = std::env::temp_dir().join(format!("admute-store-{}", std::process::id()));
        let path = dir.join("storage.json");
        let _ = tokio::fs::remove_file(&path).await;
        let store = JsonFileStore::new(&path);

        assert_eq!(store.get("adServers").await.unwrap(), None);

        store.set("other", &["x.example".to_string()]).await.unwrap();
        store
            .set("adServers", &["a.example".to_string(), "b.example".to_string()])
            .await
            .unwrap();

        assert_eq!(
            store.get("adServers").await.unwrap(),
            Some(vec!["a.example".to_string(), "b.example".to_string()])
        );
        assert_eq!(
            store.get("other").await.unwrap(),
            Some(vec!["x.example".to_string()])
        );
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("admute-corrupt-{}.json", std::process::id()));
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("adServers").await, Err(StoreError::Json(_))));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
