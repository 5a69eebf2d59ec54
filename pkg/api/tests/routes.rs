use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use pkg_api::{AppState, server::router};
use pkg_registry::{Registry, id::IdGenerator};
use pkg_state::client::StateStore;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let store = StateStore::in_memory().await.unwrap();
    let registry = Registry::new(store.clone(), IdGenerator::new(0, 0).unwrap());
    router(AppState {
        registry,
        state_store: store.backend().to_string(),
        listen_addr: "127.0.0.1:5000".to_string(),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_cluster(app: &Router, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/clusters",
        Some(json!({
            "kind": "KAFKA",
            "name": name,
            "config": { "bootstrap.servers": "localhost:9092" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_subscription(app: &Router, cluster_id: i64, topic: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/subscriptions",
        Some(json!({ "cluster_id": cluster_id, "topic_name": topic, "config": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_cluster_lifecycle() {
    let app = app().await;
    let id = create_cluster(&app, "acme.factory.east-us").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/clusters/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cluster"]["id"], id);
    assert_eq!(body["cluster"]["kind"], "KAFKA");
    assert_eq!(body["cluster"]["name"], "acme.factory.east-us");
    assert_eq!(body["cluster"]["config"]["bootstrap.servers"], "localhost:9092");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/clusters/{}", id),
        Some(json!({ "name": "acme.factory.west-us", "config": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/clusters/{}", id), None).await;
    assert_eq!(body["cluster"]["name"], "acme.factory.west-us");
    assert_eq!(body["cluster"]["kind"], "KAFKA");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/clusters/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/clusters/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id.to_string()));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/clusters/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_clusters_by_kind() {
    let app = app().await;
    let a = create_cluster(&app, "a").await;
    let b = create_cluster(&app, "b").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/clusters", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["clusters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![a, b]);

    let (_, body) = send(&app, Method::GET, "/api/v1/clusters?kind=KAFKA", None).await;
    assert_eq!(body["clusters"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, Method::GET, "/api/v1/clusters?kind=unknown", None).await;
    assert!(body["clusters"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, Method::GET, "/api/v1/clusters?limit=1", None).await;
    assert_eq!(body["clusters"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/v1/clusters?kind=pulsar", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/v1/clusters?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cluster_input_errors() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/clusters",
        Some(json!({ "kind": "KAFKA", "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/clusters",
        Some(json!({ "kind": "UNKNOWN", "name": "dev" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/clusters",
        Some(json!({ "kind": "KAFKA", "name": "dev", "config": { "metadata.poll.interval.ms": "often" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/api/v1/clusters", Some(json!({ "name": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/clusters/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/clusters/12345",
        Some(json!({ "name": "ghost", "config": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/v1/clusters", None).await;
    assert!(body["clusters"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_subscriptions_are_listed_newest_first() {
    let app = app().await;
    let cluster = create_cluster(&app, "dev").await;
    let first = create_subscription(&app, cluster, "orders").await;
    let second = create_subscription(&app, cluster, "payments").await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/subscriptions/{}", cluster),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["subscriptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/subscriptions/{}/{}", cluster, first),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription"]["topic_name"], "orders");
    assert_eq!(body["subscription"]["cluster_id"], cluster);
}

#[tokio::test]
async fn test_subscription_requires_cluster() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/subscriptions",
        Some(json!({ "cluster_id": 777, "topic_name": "orders" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("777"));

    let (status, _) = send(&app, Method::GET, "/api/v1/subscriptions/777", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cluster = create_cluster(&app, "dev").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/subscriptions",
        Some(json!({ "cluster_id": cluster, "topic_name": "bad/topic" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscription_update_and_delete() {
    let app = app().await;
    let cluster = create_cluster(&app, "dev").await;
    let id = create_subscription(&app, cluster, "orders").await;
    let uri = format!("/api/v1/subscriptions/{}/{}", cluster, id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "topic_name": "orders.v2", "config": { "auto.offset.reset": "earliest" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["subscription"]["topic_name"], "orders.v2");
    assert_eq!(body["subscription"]["config"]["auto.offset.reset"], "earliest");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscription_update_not_found() {
    let app = app().await;
    let cluster = create_cluster(&app, "dev").await;
    let id = create_subscription(&app, cluster, "orders").await;
    let body = json!({ "topic_name": "orders.v2", "config": {} });

    // Unknown subscription in a known cluster.
    let (status, body_json) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/subscriptions/{}/{}", cluster, id + 1),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body_json["error"].is_string());

    // Known subscription id under a missing cluster.
    let (status, body_json) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/subscriptions/{}/{}", cluster + 1, id),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        body_json["error"]
            .as_str()
            .unwrap()
            .contains(&(cluster + 1).to_string())
    );

    // Neither request created anything.
    let (_, body_json) = send(&app, Method::GET, "/api/v1/subscriptions", None).await;
    let subs = body_json["subscriptions"].as_array().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0]["topic_name"], "orders");
}

#[tokio::test]
async fn test_deleting_cluster_does_not_cascade() {
    let app = app().await;
    let cluster = create_cluster(&app, "dev").await;
    let sub = create_subscription(&app, cluster, "orders").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/clusters/{}", cluster), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/api/v1/subscriptions", None).await;
    assert_eq!(status, StatusCode::OK);
    let subs = body["subscriptions"].as_array().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0]["id"], sub);

    // The orphan can still be removed.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/subscriptions/{}/{}", cluster, sub),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_server_info_counts() {
    let app = app().await;
    let cluster = create_cluster(&app, "dev").await;
    create_subscription(&app, cluster, "orders").await;
    create_subscription(&app, cluster, "payments").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cluster_count"], 1);
    assert_eq!(body["subscription_count"], 2);
    assert_eq!(body["state_store"], "SlateDB (memory)");
    assert_eq!(body["endpoint"], "http://127.0.0.1:5000");
}

#[tokio::test]
async fn test_request_id_header() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/info").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(!generated.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/info")
                .header("x-request-id", "trace-me-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-me-42");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/v2/topics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
