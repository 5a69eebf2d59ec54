use chrono::{DateTime, Utc};
use pkg_constants::cluster::{
    BOOTSTRAP_SERVERS, DEFAULT_BOOTSTRAP_SERVERS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SEEKR_GROUP_ID, METADATA_POLL_INTERVAL, METRICS_POLL_INTERVAL, SEEKR_GROUP_ID,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

// --- Kind ---

/// The kind of a registered cluster. Stored as a small integer; rendered
/// on the wire as the upper-case name.
#[repr(i32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    #[default]
    Unknown = 0,
    Kafka = 1,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Unknown => "UNKNOWN",
            Kind::Kafka => "KAFKA",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UNKNOWN" => Ok(Kind::Unknown),
            "KAFKA" => Ok(Kind::Kafka),
            other => {
                // Accept the integer form as well, e.g. `?kind=1`.
                let v: i32 = other
                    .parse()
                    .map_err(|_| anyhow::anyhow!("unknown cluster kind '{}'", s))?;
                Kind::try_from(v)
            }
        }
    }
}

impl TryFrom<i32> for Kind {
    type Error = anyhow::Error;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            x if x == Kind::Unknown as i32 => Ok(Kind::Unknown),
            x if x == Kind::Kafka as i32 => Ok(Kind::Kafka),
            _ => anyhow::bail!("unknown cluster kind {}", v),
        }
    }
}

impl From<Kind> for i32 {
    fn from(k: Kind) -> i32 {
        k as i32
    }
}

// --- Persisted Cluster object ---

/// A registered Kafka cluster connection profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: i64,
    pub kind: Kind,
    pub name: String,
    /// Free-form connection options, e.g. `bootstrap.servers`.
    #[serde(default)]
    pub config: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cluster {
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn bootstrap_servers(&self) -> &str {
        self.config_value(BOOTSTRAP_SERVERS)
            .unwrap_or(DEFAULT_BOOTSTRAP_SERVERS)
    }

    pub fn group_id(&self) -> &str {
        self.config_value(SEEKR_GROUP_ID)
            .unwrap_or(DEFAULT_SEEKR_GROUP_ID)
    }

    pub fn metadata_poll_interval(&self) -> Duration {
        self.interval(METADATA_POLL_INTERVAL)
    }

    pub fn metrics_poll_interval(&self) -> Duration {
        self.interval(METRICS_POLL_INTERVAL)
    }

    fn interval(&self, key: &str) -> Duration {
        let ms = self
            .config_value(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        Duration::from_millis(ms)
    }
}

// --- Write requests ---

/// Body of `POST /api/v1/clusters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCluster {
    pub kind: Kind,
    pub name: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
}

/// Body of `PUT /api/v1/clusters/{id}`. The kind of a cluster is fixed at
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterUpdate {
    pub name: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
}
