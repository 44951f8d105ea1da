use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::{NavError, Result};
use crate::source::ContentSource;
use crate::types::EntryRef;

/// Local key/value store backing the content cache
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a stored value by key
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store a value
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;

    /// Remove a key from the store
    async fn remove(&self, key: &str) -> Result<()>;

    /// Clear all stored values
    async fn clear(&self) -> Result<()>;
}

/// In-memory store, lost when the session ends
pub struct MemoryStore {
    store: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let store = self.store.read().await;
        Ok(store.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let mut store = self.store.write().await;
        store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut store = self.store.write().await;
        store.clear();
        Ok(())
    }
}

/// Disk-backed store that survives restarts
pub struct DiskStore {
    root_dir: PathBuf,
}

impl DiskStore {
    /// Create a new disk store at the specified directory
    pub async fn new(root_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root_dir).await?;
        Ok(Self { root_dir })
    }

    /// Keys are file paths themselves, so they are hashed into a sharded name
    fn key_to_path(&self, key: &str) -> PathBuf {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash_str = format!("{:x}", hasher.finalize());

        self.root_dir.join(&hash_str[..2]).join(&hash_str[2..])
    }
}

#[async_trait]
impl Store for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = self.key_to_path(key);

        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NavError::Cache {
                message: format!("Failed to read from disk store: {}", e),
            }),
        }
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let path = self.key_to_path(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, &value).await.map_err(|e| NavError::Cache {
            message: format!("Failed to write to disk store: {}", e),
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_to_path(key);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NavError::Cache {
                message: format!("Failed to remove from disk store: {}", e),
            }),
        }
    }

    async fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.root_dir).await?;
        fs::create_dir_all(&self.root_dir).await?;
        Ok(())
    }
}

/// Store that keeps nothing
pub struct NoStore;

#[async_trait]
impl Store for NoStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// Default ceiling for cached payloads: one mebibyte
pub const DEFAULT_SIZE_CEILING: u64 = 1024 * 1024;

/// Outcome of a freshness check against the remote hash
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Stored data matches the remote hash
    Hit { data: Bytes, hash: String },
    /// Nothing usable is stored; carries the remote hash to store with the
    /// data once it has been read
    Miss { remote_hash: String },
}

/// Content cache keyed by path and validated by remote content hash
///
/// Keys are `<path>-hash` and `<path>-data` in the underlying store. Data is
/// only served when a fresh remote hash equals the stored one.
#[derive(Clone)]
pub struct ContentCache {
    store: Arc<dyn Store>,
    size_ceiling: u64,
}

impl ContentCache {
    pub fn new(store: Arc<dyn Store>, size_ceiling: u64) -> Self {
        Self { store, size_ceiling }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_SIZE_CEILING)
    }

    pub fn size_ceiling(&self) -> u64 {
        self.size_ceiling
    }

    fn hash_key(path: &str) -> String {
        format!("{}-hash", path)
    }

    fn data_key(path: &str) -> String {
        format!("{}-data", path)
    }

    /// Whether a payload of `len` bytes read for `entry` may be stored
    pub fn is_cacheable(&self, entry: &EntryRef, len: u64) -> bool {
        !entry.is_directory && len < self.size_ceiling
    }

    /// Hash stored for `path`, if any
    pub async fn stored_hash(&self, path: &str) -> Result<Option<String>> {
        let raw = self.store.get(&Self::hash_key(path)).await?;
        Ok(raw.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Compare a remote hash with the stored one and return the data on match
    pub async fn lookup(&self, path: &str, remote_hash: &str) -> Result<CacheLookup> {
        let stored = self.stored_hash(path).await?;

        if stored.as_deref() == Some(remote_hash) {
            if let Some(data) = self.store.get(&Self::data_key(path)).await? {
                tracing::debug!("Cache hit for {}", path);
                return Ok(CacheLookup::Hit {
                    data,
                    hash: remote_hash.to_string(),
                });
            }
        }

        tracing::debug!("Cache miss for {}", path);
        Ok(CacheLookup::Miss {
            remote_hash: remote_hash.to_string(),
        })
    }

    /// Fetch the remote hash for `path` and check the stored data against it
    ///
    /// A failed hash fetch is returned unchanged and leaves the store alone.
    pub async fn get(&self, path: &str, source: &dyn ContentSource) -> Result<CacheLookup> {
        let remote_hash = source.fetch_hash(path).await?;
        self.lookup(path, &remote_hash).await
    }

    /// Store `data` under `hash` for `path`
    ///
    /// The old hash goes first and the new one last, so a write that fails
    /// half way leaves a miss behind rather than stale data under a new hash.
    pub async fn put(&self, path: &str, data: Bytes, hash: &str) -> Result<()> {
        let hash_key = Self::hash_key(path);

        self.store.remove(&hash_key).await?;
        self.store.set(&Self::data_key(path), data).await?;
        self.store.set(&hash_key, Bytes::from(hash.to_string())).await?;

        tracing::debug!("Cached {} under hash {}", path, hash);
        Ok(())
    }

    /// Forget everything stored for `path`
    pub async fn invalidate(&self, path: &str) -> Result<()> {
        self.store.remove(&Self::hash_key(path)).await?;
        self.store.remove(&Self::data_key(path)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
