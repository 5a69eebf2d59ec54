use anyhow::Context;
use axum::{
    Router, middleware,
    routing::get,
};
use pkg_registry::Registry;
use pkg_registry::id::IdGenerator;
use pkg_state::client::StateStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::{clusters, info, subscriptions};
use crate::request_id::request_id_middleware;

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    /// Host name or IP address to bind, e.g. `localhost` or `0.0.0.0`.
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub datacenter_id: u16,
    pub worker_id: u16,
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/info", get(info::server_info))
        // Clusters
        .route(
            "/api/v1/clusters",
            get(clusters::list_clusters).post(clusters::create_cluster),
        )
        .route(
            "/api/v1/clusters/{id}",
            get(clusters::get_cluster)
                .put(clusters::update_cluster)
                .delete(clusters::delete_cluster),
        )
        // Subscriptions
        .route(
            "/api/v1/subscriptions",
            get(subscriptions::list_all_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/api/v1/subscriptions/{cluster_id}",
            get(subscriptions::list_subscriptions),
        )
        .route(
            "/api/v1/subscriptions/{cluster_id}/{id}",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".to_string())
}

/// Bind the API listener. The host is resolved, so names like `localhost`
/// work as well as literal addresses.
pub async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize core subsystems
    let store = StateStore::new(&config.data_dir).await?;
    let ids = IdGenerator::new(config.datacenter_id, config.worker_id)?;
    let registry = Registry::new(store.clone(), ids);

    let listener = bind_listener(&config.host, config.port).await?;
    let listen_addr = listener.local_addr()?.to_string();

    let state = AppState {
        registry,
        state_store: store.backend().to_string(),
        listen_addr: listen_addr.clone(),
    };

    info!("Starting API server on {}", listen_addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped, flushing state store");
    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Global shutdown has been initiated..."),
        Err(e) => {
            // Without a signal handler the server runs until killed.
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
