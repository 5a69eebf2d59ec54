use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use pkg_types::api::{ClusterListResponse, ClusterResponse, IdResponse};
use pkg_types::cluster::{ClusterUpdate, Kind, NewCluster};
use tracing::info;

use super::ListQuery;
use crate::AppState;
use crate::error::ApiError;

/// GET /api/v1/clusters?kind=KAFKA&limit=N: list clusters, optionally of one kind.
pub async fn list_clusters(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ClusterListResponse>, ApiError> {
    let Query(query) = query?;
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<Kind>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    info!("Fetching clusters (kind={:?})", kind);
    let clusters = state.registry.clusters.list(kind, query.limit()).await?;
    Ok(Json(ClusterListResponse { clusters }))
}

/// GET /api/v1/clusters/{id}
pub async fn get_cluster(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ClusterResponse>, ApiError> {
    let Path(id) = path?;
    info!("Fetching cluster with id {}", id);

    match state.registry.clusters.get(id).await? {
        Some(cluster) => Ok(Json(ClusterResponse { cluster })),
        None => Err(ApiError::cluster_not_found(id)),
    }
}

/// POST /api/v1/clusters
pub async fn create_cluster(
    State(state): State<AppState>,
    body: Result<Json<NewCluster>, JsonRejection>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    let Json(req) = body?;
    info!("Creating a new cluster");

    let cluster = state.registry.clusters.insert(req).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id: cluster.id })))
}

/// PUT /api/v1/clusters/{id}
pub async fn update_cluster(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ClusterUpdate>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    let Path(id) = path?;
    let Json(req) = body?;
    info!("Updating cluster with id {}", id);

    match state.registry.clusters.update(id, req).await? {
        Some(cluster) => Ok(Json(IdResponse { id: cluster.id })),
        None => Err(ApiError::cluster_not_found(id)),
    }
}

/// DELETE /api/v1/clusters/{id}: subscriptions of the cluster are kept.
pub async fn delete_cluster(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    info!("Deleting cluster with id {}", id);

    if state.registry.clusters.remove(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::cluster_not_found(id))
    }
}
