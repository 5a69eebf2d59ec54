use slatedb::Db;
use slatedb::object_store::ObjectStore;
use slatedb::object_store::local::LocalFileSystem;
use slatedb::object_store::memory::InMemory;
use slatedb::object_store::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Persistent state store backed by SlateDB.
/// On disk for the server, in memory for tests.
#[derive(Clone)]
pub struct StateStore {
    db: Db,
    backend: String,
}

impl StateStore {
    /// Open (or create) a state store rooted at `path` on the local filesystem.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        info!("Opening SlateDB state store at {}", path);

        // Ensure the data directory exists before opening the object store
        std::fs::create_dir_all(path)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory {}: {}", path, e))?;

        let object_store = Arc::new(
            LocalFileSystem::new_with_prefix(path)
                .map_err(|e| anyhow::anyhow!("Failed to create local object store: {}", e))?,
        );
        Self::open(object_store, format!("SlateDB (local: {})", path)).await
    }

    /// Open an empty store that lives only as long as the process.
    pub async fn in_memory() -> anyhow::Result<Self> {
        debug!("Opening in-memory SlateDB state store");
        Self::open(Arc::new(InMemory::new()), "SlateDB (memory)".to_string()).await
    }

    async fn open(object_store: Arc<dyn ObjectStore>, backend: String) -> anyhow::Result<Self> {
        let db = Db::open(Path::from("/"), object_store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open SlateDB: {}", e))?;
        Ok(Self { db, backend })
    }

    /// Human-readable description of the backing store.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Store a value under the given key.
    pub async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.db
            .put(key.as_bytes(), value)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("SlateDB put failed: {}", e))
    }

    /// Retrieve the value for a key, or `None` if it does not exist.
    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        match self.db.get(key.as_bytes()).await {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(anyhow::anyhow!("SlateDB get failed: {}", e)),
        }
    }

    /// Delete a key from the store.
    pub async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.db
            .delete(key.as_bytes())
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("SlateDB delete failed: {}", e))
    }

    /// List all key-value pairs whose keys start with `prefix`, in
    /// lexicographic key order. Returns them as `(key_string, raw_bytes)`.
    pub async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let mut results = Vec::new();
        let mut iter = self
            .db
            .scan_prefix(prefix.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan_prefix failed: {}", e))?;

        while let Some(kv) = iter
            .next()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan failed: {}", e))?
        {
            let key = String::from_utf8_lossy(&kv.key).to_string();
            results.push((key, kv.value.to_vec()));
        }
        Ok(results)
    }

    /// Gracefully close the state store.
    pub async fn close(self) -> anyhow::Result<()> {
        info!("Closing SlateDB state store");
        self.db
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB close failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = StateStore::in_memory().await.unwrap();
        store.put("/registry/a", b"one").await.unwrap();

        assert_eq!(store.get("/registry/a").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.get("/registry/b").await.unwrap(), None);

        store.delete("/registry/a").await.unwrap();
        assert_eq!(store.get("/registry/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_prefix_is_ordered_and_scoped() {
        let store = StateStore::in_memory().await.unwrap();
        store.put("/registry/x/2", b"2").await.unwrap();
        store.put("/registry/x/1", b"1").await.unwrap();
        store.put("/registry/y/1", b"other").await.unwrap();

        let entries = store.list_prefix("/registry/x/").await.unwrap();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["/registry/x/1", "/registry/x/2"]);
    }

    #[tokio::test]
    async fn test_backend_description() {
        let store = StateStore::in_memory().await.unwrap();
        assert_eq!(store.backend(), "SlateDB (memory)");
        store.close().await.unwrap();
    }
}
