//! Admin API behavior against an in-process router.

use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use gatekeeper::admin::{setup_admin_router, AdminState};

mod common;
use common::{Deployment, API_KEY};

fn router(deployment: &Deployment) -> axum::Router {
    let service = Arc::new(deployment.start());
    setup_admin_router(AdminState::new(service, API_KEY))
}

fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", API_KEY))
        .body(body)
        .unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn deployment() -> Deployment {
    let deployment = Deployment::new();
    deployment.write_datasets();
    deployment.write_config(true, true);
    deployment
}

#[tokio::test]
async fn test_requires_api_key() {
    let deployment = deployment();
    let app = router(&deployment);

    let response = app
        .clone()
        .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::get("/admin/status")
                .header(AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_report() {
    let deployment = deployment();
    let response = router(&deployment)
        .oneshot(request("GET", "/admin/status", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["group_users"], 2);
    assert_eq!(body["whitelist_enabled"], true);
    assert_eq!(body["fixed_addresses"], 1);
    assert_eq!(body["password_users"], 3);
    assert_eq!(body["refresh_identifiers"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_refresh_commands() {
    let deployment = deployment();
    let app = router(&deployment);

    let response = app
        .clone()
        .oneshot(request("POST", "/admin/refresh/REFRESH_WHITE_LIST", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], 0);

    let response = app
        .clone()
        .oneshot(request("POST", "/admin/refresh/NOPE", Body::from(r#"{"args":["a"]}"#)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["message"], "Invalid identifier: NOPE");

    let response = app
        .clone()
        .oneshot(request("POST", "/admin/refresh/REFRESH_PASSWORD", Body::from("{not json")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    std::fs::remove_file(deployment.path("groups")).unwrap();
    let response = app
        .oneshot(request("POST", "/admin/refresh/REFRESH_USER_GROUPS", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json(response).await["status"], -1);
}

#[tokio::test]
async fn test_groups_lookup() {
    let deployment = deployment();
    let response = router(&deployment)
        .oneshot(request("GET", "/admin/groups/user3", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["user"], "user3");
    assert_eq!(body["groups"], serde_json::json!(["group2", "group3"]));
}

#[tokio::test]
async fn test_refresh_after_unregister_is_not_found() {
    let deployment = deployment();
    let service = Arc::new(deployment.start());
    let app = setup_admin_router(AdminState::new(service.clone(), API_KEY));

    service.shutdown();
    let response = app
        .oneshot(request("POST", "/admin/refresh/REFRESH_WHITE_LIST", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["message"], "Invalid identifier: REFRESH_WHITE_LIST");
}
