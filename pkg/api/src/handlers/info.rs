use axum::{Json, extract::State};
use pkg_types::api::ServerInfo;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;

/// GET /api/v1/info: return server metadata and registry sizes.
pub async fn server_info(State(state): State<AppState>) -> Result<Json<ServerInfo>, ApiError> {
    info!("Serving server info request");

    let cluster_count = state.registry.clusters.count().await?;
    let subscription_count = state.registry.subscriptions.count().await?;

    Ok(Json(ServerInfo {
        endpoint: format!("http://{}", state.listen_addr),
        version: format!("v{}+seekr", env!("CARGO_PKG_VERSION")),
        state_store: state.state_store.clone(),
        cluster_count,
        subscription_count,
    }))
}
