//! Cluster and subscription registries on top of the state store.

pub mod clusters;
pub mod id;
pub mod keys;
pub mod subscriptions;

use std::sync::Arc;

use pkg_state::client::StateStore;

use crate::clusters::ClusterRegistry;
use crate::id::IdGenerator;
use crate::subscriptions::SubscriptionRegistry;

/// Both registries, sharing one store and one id generator.
#[derive(Clone)]
pub struct Registry {
    pub clusters: ClusterRegistry,
    pub subscriptions: SubscriptionRegistry,
}

impl Registry {
    pub fn new(store: StateStore, ids: IdGenerator) -> Self {
        let ids = Arc::new(ids);
        Self {
            clusters: ClusterRegistry::new(store.clone(), ids.clone()),
            subscriptions: SubscriptionRegistry::new(store, ids),
        }
    }
}
