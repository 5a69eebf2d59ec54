//! Well-known cluster config keys and the defaults readers fall back to.

pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const SEEKR_GROUP_ID: &str = "seekr.group.id";
pub const METADATA_POLL_INTERVAL: &str = "metadata.poll.interval.ms";
pub const METRICS_POLL_INTERVAL: &str = "metrics.poll.interval.ms";

pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:9092";
pub const DEFAULT_SEEKR_GROUP_ID: &str = "seekr.io";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// Maximum length of a cluster name.
pub const MAX_CLUSTER_NAME_LEN: usize = 255;

/// Maximum length of a Kafka topic name.
pub const MAX_TOPIC_NAME_LEN: usize = 249;
