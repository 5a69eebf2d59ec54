use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use pkg_types::api::{IdResponse, SubscriptionListResponse, SubscriptionResponse};
use pkg_types::subscription::{NewSubscription, SubscriptionUpdate};
use tracing::info;

use super::ListQuery;
use crate::AppState;
use crate::error::ApiError;

/// Subscriptions may only be attached to, and read through, a registered
/// cluster.
async fn ensure_cluster(state: &AppState, cluster_id: i64) -> Result<(), ApiError> {
    if state.registry.clusters.exists(cluster_id).await? {
        Ok(())
    } else {
        Err(ApiError::cluster_not_found(cluster_id))
    }
}

/// GET /api/v1/subscriptions?limit=N: subscriptions of every cluster.
pub async fn list_all_subscriptions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<SubscriptionListResponse>, ApiError> {
    let Query(query) = query?;
    info!("Listing all subscriptions");

    let subscriptions = state.registry.subscriptions.list_all(query.limit()).await?;
    Ok(Json(SubscriptionListResponse { subscriptions }))
}

/// POST /api/v1/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    body: Result<Json<NewSubscription>, JsonRejection>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    let Json(req) = body?;
    info!("Creating a new subscription in cluster {}", req.cluster_id);

    ensure_cluster(&state, req.cluster_id).await?;
    let sub = state.registry.subscriptions.insert(req).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id: sub.id })))
}

/// GET /api/v1/subscriptions/{cluster_id}: newest first.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<SubscriptionListResponse>, ApiError> {
    let Path(cluster_id) = path?;
    let Query(query) = query?;
    info!("Listing all subscriptions in cluster with id {}", cluster_id);

    ensure_cluster(&state, cluster_id).await?;
    let subscriptions = state
        .registry
        .subscriptions
        .list(cluster_id, query.limit())
        .await?;
    Ok(Json(SubscriptionListResponse { subscriptions }))
}

/// GET /api/v1/subscriptions/{cluster_id}/{id}
pub async fn get_subscription(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let Path((cluster_id, id)) = path?;
    info!("Fetching subscription from cluster id {} with id {}", cluster_id, id);

    ensure_cluster(&state, cluster_id).await?;
    match state.registry.subscriptions.get(cluster_id, id).await? {
        Some(subscription) => Ok(Json(SubscriptionResponse { subscription })),
        None => Err(ApiError::subscription_not_found(cluster_id, id)),
    }
}

/// PUT /api/v1/subscriptions/{cluster_id}/{id}
pub async fn update_subscription(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
    body: Result<Json<SubscriptionUpdate>, JsonRejection>,
) -> Result<Json<IdResponse>, ApiError> {
    let Path((cluster_id, id)) = path?;
    let Json(req) = body?;
    info!("Updating subscription from cluster id {} with id {}", cluster_id, id);

    ensure_cluster(&state, cluster_id).await?;
    match state
        .registry
        .subscriptions
        .update(cluster_id, id, req)
        .await?
    {
        Some(sub) => Ok(Json(IdResponse { id: sub.id })),
        None => Err(ApiError::subscription_not_found(cluster_id, id)),
    }
}

/// DELETE /api/v1/subscriptions/{cluster_id}/{id}: also works after the
/// owning cluster is gone, so orphans can be cleaned up.
pub async fn delete_subscription(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((cluster_id, id)) = path?;
    info!("Deleting subscription from cluster id {} with id {}", cluster_id, id);

    if state.registry.subscriptions.remove(cluster_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::subscription_not_found(cluster_id, id))
    }
}
