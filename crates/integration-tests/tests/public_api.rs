//! Public content endpoints and health checks.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use portfolio_core::seed::{default_company, default_projects, default_skills};
use portfolio_integration_tests::{TestApp, UnreachableStore, body_json, request};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.send(request("GET", "/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reflects_store() {
    let app = TestApp::new();
    assert_eq!(
        app.send(request("GET", "/health/ready")).await.status(),
        StatusCode::OK
    );

    let down = TestApp::with_store(Arc::new(UnreachableStore));
    assert_eq!(
        down.send(request("GET", "/health/ready")).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_public_projects_seed_on_first_read() {
    let app = TestApp::new();

    let first = body_json(app.send(request("GET", "/api/public/projects")).await).await;
    let second = body_json(app.send(request("GET", "/api/public/projects")).await).await;

    let projects = first["projects"].as_array().unwrap();
    assert_eq!(projects.len(), default_projects().len());
    assert_eq!(projects[0]["id"], json!(1));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_public_reads_fall_back_when_store_is_down() {
    let app = TestApp::with_store(Arc::new(UnreachableStore));

    let response = app.send(request("GET", "/api/public/projects")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["projects"],
        serde_json::to_value(default_projects()).unwrap()
    );

    let body = body_json(app.send(request("GET", "/api/public/skills")).await).await;
    assert_eq!(
        body["categories"],
        serde_json::to_value(default_skills()).unwrap()
    );

    let body = body_json(app.send(request("GET", "/api/public/company")).await).await;
    assert_eq!(body, serde_json::to_value(default_company()).unwrap());
}

#[tokio::test]
async fn test_admin_reads_propagate_store_failure() {
    let app = TestApp::with_store(Arc::new(UnreachableStore));
    let cookie = app.login().await;

    let response = app
        .send(portfolio_integration_tests::with_cookie(
            request("GET", "/api/admin/projects"),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = body_json(response).await;
    assert_eq!(body["error"], "Internal server error");
    // Development mode exposes the cause
    assert!(body["details"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_public_responses_carry_security_headers() {
    let app = TestApp::new();
    let response = app.send(request("GET", "/api/public/skills")).await;

    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().get("cache-control").is_none());
}
