use anyhow::Context;
use clap::Parser;
use pkg_api::server::{ServerConfig, start_server};
use pkg_constants::network::{DEFAULT_API_HOST, DEFAULT_API_PORT};
use pkg_constants::paths::{DEFAULT_SERVER_CONFIG, DEFAULT_SERVER_DATA_DIR};
use pkg_types::config::{ServerConfigFile, load_config_file};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seekr-server", version, about = "Seekr configuration registry server")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_SERVER_CONFIG)]
    config: String,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for SlateDB state storage
    #[arg(long)]
    data_dir: Option<String>,

    /// Datacenter id for generated identifiers (0-31)
    #[arg(long)]
    datacenter_id: Option<u16>,

    /// Worker id for generated identifiers (0-31)
    #[arg(long)]
    worker_id: Option<u16>,

    /// Log filter, e.g. "info" or "pkg_registry=debug"
    #[arg(long, env = "SEEKR_LOG")]
    log: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

/// `--log` wins over `RUST_LOG`, which wins over the config file's `log`.
fn log_filter(cli_log: Option<String>, file_log: Option<String>) -> EnvFilter {
    if let Some(directive) = cli_log {
        return EnvFilter::new(directive);
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(file_log.as_deref().unwrap_or("info")))
}

fn init_tracing(filter: EnvFilter, json: bool) {
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Merge: CLI args > config file > defaults
fn server_config(cli: Cli, file_cfg: ServerConfigFile) -> ServerConfig {
    ServerConfig {
        host: cli
            .host
            .or(file_cfg.host)
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
        port: cli.port.or(file_cfg.port).unwrap_or(DEFAULT_API_PORT),
        data_dir: cli
            .data_dir
            .or(file_cfg.data_dir)
            .unwrap_or_else(|| DEFAULT_SERVER_DATA_DIR.to_string()),
        datacenter_id: cli.datacenter_id.or(file_cfg.datacenter_id).unwrap_or(0),
        worker_id: cli.worker_id.or(file_cfg.worker_id).unwrap_or(0),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    // Load config file (returns defaults if file not found)
    let mut file_cfg: ServerConfigFile = load_config_file(&cli.config)
        .with_context(|| format!("failed to load config file {}", cli.config))?;

    let log_json = cli.log_json || file_cfg.log_json.unwrap_or(false);
    init_tracing(log_filter(cli.log.take(), file_cfg.log.take()), log_json);
    info!("Config file: {}", cli.config);

    let config = server_config(cli, file_cfg);

    info!("Starting seekr-server");
    info!("  Listen:    {}:{}", config.host, config.port);
    info!("  Data dir:  {}", config.data_dir);
    info!(
        "  Node:      datacenter={} worker={}",
        config.datacenter_id, config.worker_id
    );

    start_server(config).await?;

    Ok(())
}
