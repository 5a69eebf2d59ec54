use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A per-cluster topic subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    /// The cluster this subscription belongs to.
    pub cluster_id: i64,
    pub topic_name: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/v1/subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub cluster_id: i64,
    pub topic_name: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
}

/// Body of `PUT /api/v1/subscriptions/{cluster_id}/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub topic_name: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
}
