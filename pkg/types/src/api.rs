//! Response envelopes shared by the API server and `seekrctl`.

use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;
use crate::subscription::Subscription;

/// Returned by create and update calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterListResponse {
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub subscription: Subscription,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// --- Server info ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub endpoint: String,
    pub version: String,
    pub state_store: String,
    pub cluster_count: usize,
    pub subscription_count: usize,
}
