use anyhow::Context;
use chrono::Utc;
use pkg_constants::state::CLUSTERS_PREFIX;
use pkg_state::client::StateStore;
use pkg_types::cluster::{Cluster, ClusterUpdate, Kind, NewCluster};
use pkg_types::validate::{validate_cluster_update, validate_new_cluster};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::id::IdGenerator;
use crate::keys::cluster_key;

/// CRUD access to registered clusters, keyed by id.
///
/// Writes are serialized so an update racing a delete cannot bring the
/// deleted entry back.
#[derive(Clone)]
pub struct ClusterRegistry {
    store: StateStore,
    ids: Arc<IdGenerator>,
    writes: Arc<Mutex<()>>,
}

impl ClusterRegistry {
    pub fn new(store: StateStore, ids: Arc<IdGenerator>) -> Self {
        Self {
            store,
            ids,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// List clusters in ascending id order, optionally only those of `kind`.
    pub async fn list(&self, kind: Option<Kind>, limit: usize) -> anyhow::Result<Vec<Cluster>> {
        debug!("Listing clusters (kind={:?}, limit={})", kind, limit);
        let entries = self.store.list_prefix(CLUSTERS_PREFIX).await?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| decode(&key, &value))
            .filter(|c| kind.is_none_or(|k| c.kind == k))
            .take(limit)
            .collect())
    }

    pub async fn get(&self, id: i64) -> anyhow::Result<Option<Cluster>> {
        debug!("Fetching cluster {}", id);
        let Some(key) = cluster_key(id) else {
            return Ok(None);
        };
        match self.store.get(&key).await? {
            Some(data) => {
                let cluster = serde_json::from_slice(&data)
                    .with_context(|| format!("Corrupt cluster entry at {}", key))?;
                Ok(Some(cluster))
            }
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Validate and store a new cluster under a freshly generated id.
    pub async fn insert(&self, req: NewCluster) -> anyhow::Result<Cluster> {
        validate_new_cluster(&req)?;

        let now = Utc::now();
        let cluster = Cluster {
            id: self.ids.next_id()?,
            kind: req.kind,
            name: req.name,
            config: req.config,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.writes.lock().await;
        self.put(&cluster).await?;
        info!(
            "Created cluster {} (id={}, kind={})",
            cluster.name, cluster.id, cluster.kind
        );
        Ok(cluster)
    }

    /// Replace name and config of an existing cluster. Returns `None` if
    /// there is no cluster with this id.
    pub async fn update(&self, id: i64, req: ClusterUpdate) -> anyhow::Result<Option<Cluster>> {
        validate_cluster_update(&req)?;

        let _guard = self.writes.lock().await;
        let Some(mut cluster) = self.get(id).await? else {
            return Ok(None);
        };
        cluster.name = req.name;
        cluster.config = req.config;
        cluster.updated_at = Utc::now();

        self.put(&cluster).await?;
        info!("Updated cluster {} (id={})", cluster.name, cluster.id);
        Ok(Some(cluster))
    }

    /// Delete a cluster. Its subscriptions are left in place.
    /// Returns `false` if there was nothing to delete.
    pub async fn remove(&self, id: i64) -> anyhow::Result<bool> {
        let Some(key) = cluster_key(id) else {
            return Ok(false);
        };

        let _guard = self.writes.lock().await;
        if self.store.get(&key).await?.is_none() {
            return Ok(false);
        }
        self.store.delete(&key).await?;
        info!("Deleted cluster {}", id);
        Ok(true)
    }

    pub async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.store.list_prefix(CLUSTERS_PREFIX).await?.len())
    }

    async fn put(&self, cluster: &Cluster) -> anyhow::Result<()> {
        let key = cluster_key(cluster.id)
            .ok_or_else(|| anyhow::anyhow!("invalid cluster id {}", cluster.id))?;
        let data = serde_json::to_vec(cluster)?;
        self.store
            .put(&key, &data)
            .await
            .with_context(|| format!("Failed to store cluster {}", cluster.id))
    }
}

fn decode(key: &str, value: &[u8]) -> Option<Cluster> {
    match serde_json::from_slice(value) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Skipping corrupt cluster entry {}: {}", key, e);
            None
        }
    }
}
