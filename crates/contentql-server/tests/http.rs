//! End-to-end HTTP tests against the in-process router.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use contentql_server::{AppConfig, ContentPackage, ServerBuilder};
use serde_json::{Value, json};
use tower::ServiceExt;

const PACKAGE: &str = r#"{
    "languages": [{ "isoCode": "da-DK", "fallback": "en-US" }],
    "contentTypes": [
        {
            "alias": "page",
            "properties": [
                { "alias": "title", "valueType": "String", "variesByCulture": true },
                { "alias": "summary", "valueType": "String" }
            ]
        }
    ],
    "content": [
        {
            "id": 1000,
            "contentType": "page",
            "name": "Home",
            "names": { "en-US": "Home", "da-DK": "Hjem" },
            "values": {
                "title": { "en-US": "Welcome", "da-DK": "Velkommen" },
                "summary": "Start here"
            }
        }
    ],
    "indexes": [{ "name": "External" }]
}"#;

async fn router(eager_build: bool) -> Router {
    let mut cfg = AppConfig::default();
    cfg.graphql.eager_build = eager_build;
    ServerBuilder::new()
        .with_config(cfg)
        .with_package(ContentPackage::from_json(PACKAGE).unwrap())
        .build()
        .await
        .unwrap()
        .router()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn graphql_post(query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/graphql")
        .header("content-type", "application/json")
        .header("x-request-id", "req-1")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_schema_state() {
    let app = router(false).await;
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["schema"], "uninitialized");

    let app = router(true).await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["schema"], "ready");
}

#[tokio::test]
async fn test_post_query() {
    let app = router(true).await;
    let response = app
        .oneshot(graphql_post(
            r#"{ content(id: 1000) { _name ... on Page { title summary } } }"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-1")
    );
    assert_eq!(
        body_json(response).await,
        json!({ "data": { "content": { "_name": "Home", "title": "Welcome", "summary": "Start here" } } })
    );
}

#[tokio::test]
async fn test_get_query_with_accept_language() {
    let app = router(true).await;
    let request = Request::get("/graphql?query=%7B%20content(id%3A%201000)%20%7B%20_name%20%7D%20%7D")
        .header("accept-language", "da-DK,da;q=0.9")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "data": { "content": { "_name": "Hjem" } } })
    );
}

#[tokio::test]
async fn test_search_over_http() {
    let app = router(true).await;
    let response = app
        .oneshot(graphql_post(
            r#"{ searchers { external { search(query: "start") { totalItemCount items { id } } } } }"#,
        ))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        json!({ "data": { "searchers": { "external": { "search": {
            "totalItemCount": 1,
            "items": [{ "id": "1000" }]
        } } } } })
    );
}

#[tokio::test]
async fn test_graphql_disabled() {
    let mut cfg = AppConfig::default();
    cfg.graphql.enabled = false;
    let app = ServerBuilder::new()
        .with_config(cfg)
        .build()
        .await
        .unwrap()
        .router();

    let response = app.oneshot(graphql_post("{ _health }")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
