use anyhow::Context;
use chrono::Utc;
use pkg_constants::state::SUBSCRIPTIONS_PREFIX;
use pkg_state::client::StateStore;
use pkg_types::subscription::{NewSubscription, Subscription, SubscriptionUpdate};
use pkg_types::validate::{validate_new_subscription, validate_subscription_update};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::id::IdGenerator;
use crate::keys::{subscription_key, subscriptions_prefix};

/// CRUD access to topic subscriptions, grouped under their cluster id and
/// ordered newest first within a cluster.
///
/// The registry does not check that `cluster_id` refers to a registered
/// cluster; that rule belongs to the caller, which sees both registries.
#[derive(Clone)]
pub struct SubscriptionRegistry {
    store: StateStore,
    ids: Arc<IdGenerator>,
    writes: Arc<Mutex<()>>,
}

impl SubscriptionRegistry {
    pub fn new(store: StateStore, ids: Arc<IdGenerator>) -> Self {
        Self {
            store,
            ids,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Subscriptions of one cluster, id descending.
    pub async fn list(&self, cluster_id: i64, limit: usize) -> anyhow::Result<Vec<Subscription>> {
        debug!("Listing subscriptions of cluster {} (limit={})", cluster_id, limit);
        let Some(prefix) = subscriptions_prefix(cluster_id) else {
            return Ok(Vec::new());
        };
        self.scan(&prefix, limit).await
    }

    /// Subscriptions of every cluster: ascending cluster id, then id
    /// descending.
    pub async fn list_all(&self, limit: usize) -> anyhow::Result<Vec<Subscription>> {
        debug!("Listing all subscriptions (limit={})", limit);
        self.scan(SUBSCRIPTIONS_PREFIX, limit).await
    }

    pub async fn get(&self, cluster_id: i64, id: i64) -> anyhow::Result<Option<Subscription>> {
        debug!("Fetching subscription {}/{}", cluster_id, id);
        let Some(key) = subscription_key(cluster_id, id) else {
            return Ok(None);
        };
        match self.store.get(&key).await? {
            Some(data) => {
                let sub = serde_json::from_slice(&data)
                    .with_context(|| format!("Corrupt subscription entry at {}", key))?;
                Ok(Some(sub))
            }
            None => Ok(None),
        }
    }

    pub async fn insert(&self, req: NewSubscription) -> anyhow::Result<Subscription> {
        validate_new_subscription(&req)?;
        if req.cluster_id < 0 {
            anyhow::bail!("invalid cluster id {}", req.cluster_id);
        }

        let now = Utc::now();
        let sub = Subscription {
            id: self.ids.next_id()?,
            cluster_id: req.cluster_id,
            topic_name: req.topic_name,
            config: req.config,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.writes.lock().await;
        self.put(&sub).await?;
        info!(
            "Created subscription {}/{} for topic {}",
            sub.cluster_id, sub.id, sub.topic_name
        );
        Ok(sub)
    }

    /// Replace topic and config of an existing subscription. Returns `None`
    /// if it does not exist.
    pub async fn update(
        &self,
        cluster_id: i64,
        id: i64,
        req: SubscriptionUpdate,
    ) -> anyhow::Result<Option<Subscription>> {
        validate_subscription_update(&req)?;

        let _guard = self.writes.lock().await;
        let Some(mut sub) = self.get(cluster_id, id).await? else {
            return Ok(None);
        };
        sub.topic_name = req.topic_name;
        sub.config = req.config;
        sub.updated_at = Utc::now();

        self.put(&sub).await?;
        info!("Updated subscription {}/{}", cluster_id, id);
        Ok(Some(sub))
    }

    /// Returns `false` if there was nothing to delete.
    pub async fn remove(&self, cluster_id: i64, id: i64) -> anyhow::Result<bool> {
        let Some(key) = subscription_key(cluster_id, id) else {
            return Ok(false);
        };

        let _guard = self.writes.lock().await;
        if self.store.get(&key).await?.is_none() {
            return Ok(false);
        }
        self.store.delete(&key).await?;
        info!("Deleted subscription {}/{}", cluster_id, id);
        Ok(true)
    }

    pub async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.store.list_prefix(SUBSCRIPTIONS_PREFIX).await?.len())
    }

    async fn scan(&self, prefix: &str, limit: usize) -> anyhow::Result<Vec<Subscription>> {
        let entries = self.store.list_prefix(prefix).await?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_slice(&value) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("Skipping corrupt subscription entry {}: {}", key, e);
                    None
                }
            })
            .take(limit)
            .collect())
    }

    async fn put(&self, sub: &Subscription) -> anyhow::Result<()> {
        let key = subscription_key(sub.cluster_id, sub.id).ok_or_else(|| {
            anyhow::anyhow!("invalid subscription key {}/{}", sub.cluster_id, sub.id)
        })?;
        let data = serde_json::to_vec(sub)?;
        self.store
            .put(&key, &data)
            .await
            .with_context(|| format!("Failed to store subscription {}/{}", sub.cluster_id, sub.id))
    }
}
