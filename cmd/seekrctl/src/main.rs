mod client;

use clap::{Parser, Subcommand, ValueEnum};
use client::ApiClient;
use pkg_constants::network::DEFAULT_API_ADDR;
use pkg_types::api::{
    ClusterListResponse, ClusterResponse, IdResponse, ServerInfo, SubscriptionListResponse,
    SubscriptionResponse,
};
use pkg_types::cluster::{Cluster, ClusterUpdate, Kind, NewCluster};
use pkg_types::subscription::{NewSubscription, Subscription, SubscriptionUpdate};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

#[derive(Parser)]
#[command(name = "seekrctl", version, about = "CLI tool for the seekr configuration registry")]
struct Cli {
    /// Server API endpoint
    #[arg(long, env = "SEEKR_SERVER", default_value = DEFAULT_API_ADDR)]
    server: String,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = Output::Table, global = true)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server information
    Info,
    /// Manage Kafka clusters
    Cluster {
        #[command(subcommand)]
        action: ClusterAction,
    },
    /// Manage topic subscriptions
    #[command(alias = "sub")]
    Subscription {
        #[command(subcommand)]
        action: SubscriptionAction,
    },
}

#[derive(Subcommand)]
enum ClusterAction {
    /// List clusters
    List {
        /// Only show clusters of this kind
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one cluster
    Get { id: i64 },
    /// Register a cluster
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "KAFKA")]
        kind: String,
        /// Config entry, repeatable (e.g. --set bootstrap.servers=broker:9092)
        #[arg(long = "set", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
    },
    /// Rename a cluster or change its config
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "set", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
        /// Config key to remove, repeatable
        #[arg(long)]
        unset: Vec<String>,
    },
    /// Delete a cluster (its subscriptions are kept)
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SubscriptionAction {
    /// List subscriptions, newest first within a cluster
    List {
        /// Only show subscriptions of this cluster
        #[arg(long)]
        cluster: Option<i64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one subscription
    Get { cluster_id: i64, id: i64 },
    /// Subscribe to a topic
    Create {
        #[arg(long)]
        cluster: i64,
        #[arg(long)]
        topic: String,
        #[arg(long = "set", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
    },
    /// Change a subscription's topic or config
    Update {
        cluster_id: i64,
        id: i64,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long = "set", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
        #[arg(long)]
        unset: Vec<String>,
    },
    /// Delete a subscription
    Delete { cluster_id: i64, id: i64 },
}

/// Parse a `key=value` pair.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Apply `--set` and `--unset` edits to an existing config map.
fn merge_config(
    mut config: HashMap<String, String>,
    set: Vec<(String, String)>,
    unset: &[String],
) -> HashMap<String, String> {
    for key in unset {
        config.remove(key);
    }
    config.extend(set);
    config
}

fn list_path(base: &str, params: &[(&str, Option<String>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{}={}", k, v)))
        .collect();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn sorted_config(config: &HashMap<String, String>) -> Vec<(&String, &String)> {
    let mut entries: Vec<_> = config.iter().collect();
    entries.sort();
    entries
}

fn print_clusters(clusters: &[Cluster]) {
    println!(
        "{:<20} {:<8} {:<32} {:<32} {}",
        "ID", "KIND", "NAME", "BOOTSTRAP SERVERS", "CREATED"
    );
    for c in clusters {
        println!(
            "{:<20} {:<8} {:<32} {:<32} {}",
            c.id,
            c.kind,
            c.name,
            c.bootstrap_servers(),
            c.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if clusters.is_empty() {
        println!("(no clusters registered)");
    }
}

fn print_cluster(c: &Cluster) {
    println!("ID:                 {}", c.id);
    println!("Kind:               {}", c.kind);
    println!("Name:               {}", c.name);
    println!("Bootstrap Servers:  {}", c.bootstrap_servers());
    println!("Group ID:           {}", c.group_id());
    println!("Metadata Poll:      {:?}", c.metadata_poll_interval());
    println!("Metrics Poll:       {:?}", c.metrics_poll_interval());
    println!("Created:            {}", c.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated:            {}", c.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if !c.config.is_empty() {
        println!("Config:");
        for (k, v) in sorted_config(&c.config) {
            println!("  {} = {}", k, v);
        }
    }
}

fn print_subscriptions(subs: &[Subscription]) {
    println!(
        "{:<20} {:<20} {:<40} {}",
        "CLUSTER", "ID", "TOPIC", "CREATED"
    );
    for s in subs {
        println!(
            "{:<20} {:<20} {:<40} {}",
            s.cluster_id,
            s.id,
            s.topic_name,
            s.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if subs.is_empty() {
        println!("(no subscriptions)");
    }
}

fn print_subscription(s: &Subscription) {
    println!("ID:       {}", s.id);
    println!("Cluster:  {}", s.cluster_id);
    println!("Topic:    {}", s.topic_name);
    println!("Created:  {}", s.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("Updated:  {}", s.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if !s.config.is_empty() {
        println!("Config:");
        for (k, v) in sorted_config(&s.config) {
            println!("  {} = {}", k, v);
        }
    }
}

async fn run_cluster(
    client: &ApiClient,
    output: Output,
    action: ClusterAction,
) -> anyhow::Result<()> {
    match action {
        ClusterAction::List { kind, limit } => {
            let path = list_path(
                "/api/v1/clusters",
                &[("kind", kind), ("limit", limit.map(|l| l.to_string()))],
            );
            let resp: ClusterListResponse = client.get(&path).await?;
            match output {
                Output::Json => print_json(&resp.clusters)?,
                Output::Table => print_clusters(&resp.clusters),
            }
        }
        ClusterAction::Get { id } => {
            let resp: ClusterResponse = client.get(&format!("/api/v1/clusters/{}", id)).await?;
            match output {
                Output::Json => print_json(&resp.cluster)?,
                Output::Table => print_cluster(&resp.cluster),
            }
        }
        ClusterAction::Create { name, kind, set } => {
            let req = NewCluster {
                kind: kind.parse::<Kind>()?,
                name,
                config: set.into_iter().collect(),
            };
            let resp: IdResponse = client.post("/api/v1/clusters", &req).await?;
            println!("cluster/{} created", resp.id);
        }
        ClusterAction::Update {
            id,
            name,
            set,
            unset,
        } => {
            let path = format!("/api/v1/clusters/{}", id);
            let ClusterResponse { cluster } = client.get(&path).await?;
            let req = ClusterUpdate {
                name: name.unwrap_or(cluster.name),
                config: merge_config(cluster.config, set, &unset),
            };
            let resp: IdResponse = client.put(&path, &req).await?;
            println!("cluster/{} updated", resp.id);
        }
        ClusterAction::Delete { id } => {
            client.delete(&format!("/api/v1/clusters/{}", id)).await?;
            println!("cluster/{} deleted", id);
        }
    }
    Ok(())
}

async fn run_subscription(
    client: &ApiClient,
    output: Output,
    action: SubscriptionAction,
) -> anyhow::Result<()> {
    match action {
        SubscriptionAction::List { cluster, limit } => {
            let base = match cluster {
                Some(cluster_id) => format!("/api/v1/subscriptions/{}", cluster_id),
                None => "/api/v1/subscriptions".to_string(),
            };
            let path = list_path(&base, &[("limit", limit.map(|l| l.to_string()))]);
            let resp: SubscriptionListResponse = client.get(&path).await?;
            match output {
                Output::Json => print_json(&resp.subscriptions)?,
                Output::Table => print_subscriptions(&resp.subscriptions),
            }
        }
        SubscriptionAction::Get { cluster_id, id } => {
            let resp: SubscriptionResponse = client
                .get(&format!("/api/v1/subscriptions/{}/{}", cluster_id, id))
                .await?;
            match output {
                Output::Json => print_json(&resp.subscription)?,
                Output::Table => print_subscription(&resp.subscription),
            }
        }
        SubscriptionAction::Create {
            cluster,
            topic,
            set,
        } => {
            let req = NewSubscription {
                cluster_id: cluster,
                topic_name: topic,
                config: set.into_iter().collect(),
            };
            let resp: IdResponse = client.post("/api/v1/subscriptions", &req).await?;
            println!("subscription/{} created in cluster {}", resp.id, cluster);
        }
        SubscriptionAction::Update {
            cluster_id,
            id,
            topic,
            set,
            unset,
        } => {
            let path = format!("/api/v1/subscriptions/{}/{}", cluster_id, id);
            let SubscriptionResponse { subscription } = client.get(&path).await?;
            let req = SubscriptionUpdate {
                topic_name: topic.unwrap_or(subscription.topic_name),
                config: merge_config(subscription.config, set, &unset),
            };
            let resp: IdResponse = client.put(&path, &req).await?;
            println!("subscription/{} updated", resp.id);
        }
        SubscriptionAction::Delete { cluster_id, id } => {
            client
                .delete(&format!("/api/v1/subscriptions/{}/{}", cluster_id, id))
                .await?;
            println!("subscription/{} deleted", id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server)?;

    match cli.command {
        Commands::Info => {
            info!("Querying server info from {}", cli.server);
            let info: ServerInfo = client.get("/api/v1/info").await?;
            match cli.output {
                Output::Json => print_json(&info)?,
                Output::Table => {
                    println!("Endpoint:       {}", info.endpoint);
                    println!("Version:        {}", info.version);
                    println!("State Store:    {}", info.state_store);
                    println!("Clusters:       {}", info.cluster_count);
                    println!("Subscriptions:  {}", info.subscription_count);
                }
            }
        }
        Commands::Cluster { action } => run_cluster(&client, cli.output, action).await?,
        Commands::Subscription { action } => {
            run_subscription(&client, cli.output, action).await?
        }
    }

    Ok(())
}
