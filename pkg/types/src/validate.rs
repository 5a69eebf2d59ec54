use anyhow::{Result, bail};
use pkg_constants::cluster::{
    BOOTSTRAP_SERVERS, MAX_CLUSTER_NAME_LEN, MAX_TOPIC_NAME_LEN, METADATA_POLL_INTERVAL,
    METRICS_POLL_INTERVAL, SEEKR_GROUP_ID,
};
use std::collections::HashMap;

use crate::cluster::{ClusterUpdate, Kind, NewCluster};
use crate::subscription::{NewSubscription, SubscriptionUpdate};

/// Rejected client input. Request validators wrap their failures in this
/// type so callers can tell bad input apart from storage errors with
/// `anyhow::Error::downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn invalid(e: anyhow::Error) -> anyhow::Error {
    ValidationError(e.to_string()).into()
}

pub fn validate_new_cluster(req: &NewCluster) -> Result<()> {
    if req.kind == Kind::Unknown {
        return Err(invalid(anyhow::anyhow!(
            "cluster kind must be one of: {}",
            Kind::Kafka
        )));
    }
    validate_cluster_name(&req.name)
        .and_then(|_| validate_cluster_config(&req.config))
        .map_err(invalid)
}

pub fn validate_cluster_update(req: &ClusterUpdate) -> Result<()> {
    validate_cluster_name(&req.name)
        .and_then(|_| validate_cluster_config(&req.config))
        .map_err(invalid)
}

pub fn validate_new_subscription(req: &NewSubscription) -> Result<()> {
    validate_topic_name(&req.topic_name)
        .and_then(|_| validate_config(&req.config))
        .map_err(invalid)
}

pub fn validate_subscription_update(req: &SubscriptionUpdate) -> Result<()> {
    validate_topic_name(&req.topic_name)
        .and_then(|_| validate_config(&req.config))
        .map_err(invalid)
}

/// Validate a cluster display name: non-blank, at most 255 characters.
pub fn validate_cluster_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("cluster name must not be empty");
    }
    let len = name.chars().count();
    if len > MAX_CLUSTER_NAME_LEN {
        bail!(
            "cluster name exceeds {} characters (got {})",
            MAX_CLUSTER_NAME_LEN,
            len
        );
    }
    Ok(())
}

/// Validate a Kafka topic name.
/// Rules: `[a-zA-Z0-9._-]`, 1..=249 chars, not `.` or `..`.
pub fn validate_topic_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("topic name must not be empty");
    }
    if name.len() > MAX_TOPIC_NAME_LEN {
        bail!(
            "topic name '{}' exceeds {} characters (got {})",
            name,
            MAX_TOPIC_NAME_LEN,
            name.len()
        );
    }
    if name == "." || name == ".." {
        bail!("topic name cannot be '.' or '..'");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        bail!(
            "topic name '{}' must contain only ASCII letters, digits, '.', '_' and '-'",
            name
        );
    }
    Ok(())
}

/// Validate a free-form config map: keys must be non-empty and free of
/// whitespace.
pub fn validate_config(config: &HashMap<String, String>) -> Result<()> {
    for key in config.keys() {
        if key.is_empty() {
            bail!("config keys must not be empty");
        }
        if key.chars().any(char::is_whitespace) {
            bail!("config key '{}' must not contain whitespace", key);
        }
    }
    Ok(())
}

/// Validate a cluster config map, including the well-known keys when set.
pub fn validate_cluster_config(config: &HashMap<String, String>) -> Result<()> {
    validate_config(config)?;

    if let Some(servers) = config.get(BOOTSTRAP_SERVERS) {
        validate_bootstrap_servers(servers)?;
    }
    if let Some(group) = config.get(SEEKR_GROUP_ID) {
        if group.trim().is_empty() {
            bail!("'{}' must not be empty", SEEKR_GROUP_ID);
        }
    }
    for key in [METADATA_POLL_INTERVAL, METRICS_POLL_INTERVAL] {
        if let Some(v) = config.get(key) {
            match v.parse::<u64>() {
                Ok(ms) if ms > 0 => {}
                _ => bail!("'{}' must be a positive integer (got '{}')", key, v),
            }
        }
    }
    Ok(())
}

/// `host:port[,host:port...]`
fn validate_bootstrap_servers(servers: &str) -> Result<()> {
    if servers.trim().is_empty() {
        bail!("'{}' must not be empty", BOOTSTRAP_SERVERS);
    }
    for server in servers.split(',').map(str::trim) {
        let Some((host, port)) = server.rsplit_once(':') else {
            bail!("bootstrap server '{}' must be in host:port form", server);
        };
        if host.is_empty() {
            bail!("bootstrap server '{}' has an empty host", server);
        }
        if port.parse::<u16>().is_err() {
            bail!("bootstrap server '{}' has an invalid port", server);
        }
    }
    Ok(())
}
