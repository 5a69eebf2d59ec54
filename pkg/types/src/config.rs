use serde::{Deserialize, Serialize};

/// Server configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// host: 0.0.0.0
/// port: 5000
/// data-dir: /var/lib/seekr/data
/// datacenter-id: 0
/// worker-id: 1
/// log: info
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigFile {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "data-dir")]
    pub data_dir: Option<String>,
    #[serde(default, alias = "datacenter-id")]
    pub datacenter_id: Option<u16>,
    #[serde(default, alias = "worker-id")]
    pub worker_id: Option<u16>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default, alias = "log-json")]
    pub log_json: Option<bool>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg: ServerConfigFile =
            load_config_file("/nonexistent/seekr/config.yaml").unwrap();
        assert!(cfg.port.is_none());
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn kebab_case_aliases() {
        let cfg: ServerConfigFile = serde_yaml::from_str(
            "port: 5050\ndata-dir: /var/lib/seekr\nworker-id: 3\nlog-json: true\n",
        )
        .unwrap();
        assert_eq!(cfg.port, Some(5050));
        assert_eq!(cfg.data_dir.as_deref(), Some("/var/lib/seekr"));
        assert_eq!(cfg.worker_id, Some(3));
        assert_eq!(cfg.log_json, Some(true));
    }
}
