use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Persistence primitives of the hosting batch platform: an append-only
/// dataset of records plus a key-value store of named output slots.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<Value>>;

    async fn set_value(&self, key: &str, value: Value) -> Result<()>;

    async fn push_data(&self, item: Value) -> Result<()>;
}

/// Filesystem layout used by Apify-style local runs:
///
/// ```text
/// <root>/datasets/default/000000001.json
/// <root>/key_value_stores/default/<KEY>.json
/// ```
pub struct LocalStorage {
    dataset_dir: PathBuf,
    store_dir: PathBuf,
    next_item: AtomicU64,
}

impl LocalStorage {
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let dataset_dir = root.join("datasets").join("default");
        let store_dir = root.join("key_value_stores").join("default");
        tokio::fs::create_dir_all(&dataset_dir).await?;
        tokio::fs::create_dir_all(&store_dir).await?;

        // Continue numbering after the highest item a previous run left behind.
        let mut last = 0;
        let mut entries = tokio::fs::read_dir(&dataset_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(index) = item_index(&entry.path()) {
                last = last.max(index);
            }
        }

        Ok(Self {
            dataset_dir,
            store_dir,
            next_item: AtomicU64::new(last + 1),
        })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::StorageError(format!("Invalid key-value store key: {:?}", key)));
        }
        Ok(self.store_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl OutputSink for LocalStorage {
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::StorageError(format!("{} is not valid JSON: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        let path = self.key_path(key)?;
        write_json(&path, &value).await
    }

    async fn push_data(&self, item: Value) -> Result<()> {
        let index = self.next_item.fetch_add(1, Ordering::SeqCst);
        let path = self.dataset_dir.join(format!("{:09}.json", index));
        write_json(&path, &item).await
    }
}

fn item_index(path: &Path) -> Option<u64> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

async fn write_json(path: &Path, value: &Value) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| AppError::StorageError(format!("Failed to serialize {}: {}", path.display(), e)))?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// In-memory sink, handy for dry runs and tests.
#[derive(Default)]
pub struct MemorySink {
    items: Mutex<Vec<Value>>,
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySink {
    pub fn with_input(input: Value) -> Self {
        let sink = MemorySink::default();
        sink.lock_values().insert(super::INPUT_KEY.to_string(), input);
        sink
    }

    pub fn items(&self) -> Vec<Value> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.lock_values().get(key).cloned()
    }

    fn lock_values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.value(key))
    }

    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        self.lock_values().insert(key.to_string(), value);
        Ok(())
    }

    async fn push_data(&self, item: Value) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(item);
        Ok(())
    }
}
