//! Admin content management: projects, skills, company and uploads.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;

use portfolio_core::seed::{default_company, default_projects};
use portfolio_integration_tests::{
    TestApp, body_json, json_request, multipart_request, request, with_cookie,
};

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn new_project() -> Value {
    json!({
        "title": "Inventory Sync",
        "problem": "Stock counts drifted between channels.",
        "solution": "A nightly reconciliation job.",
        "techStack": ["Rust", "PostgreSQL"],
        "featured": true
    })
}

#[tokio::test]
async fn test_create_then_fetch_project() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            json_request("POST", "/api/admin/projects", &new_project()),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Project created successfully");

    // Creating does not seed, so the empty collection starts at 1
    let id = body["project"]["id"].as_i64().unwrap();
    assert_eq!(id, 1);

    let response = app
        .send(with_cookie(
            request("GET", &format!("/api/admin/projects/{id}")),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["project"]["title"], "Inventory Sync");
    assert_eq!(body["project"]["techStack"], json!(["Rust", "PostgreSQL"]));

    // New projects show up publicly too
    let public = body_json(app.send(request("GET", "/api/public/projects")).await).await;
    assert!(
        public["projects"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p["id"] == json!(id))
    );
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let router = app.router.clone();
            let mut project = new_project();
            project["title"] = json!(format!("Project {i}"));
            let request = with_cookie(
                json_request("POST", "/api/admin/projects", &project),
                &cookie,
            );
            tokio::spawn(async move { router.oneshot(request).await.unwrap() })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        let response = task.await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        ids.push(body_json(response).await["project"]["id"].as_i64().unwrap());
    }

    ids.sort_unstable();
    assert_eq!(ids, (1..=32).collect::<Vec<i64>>());

    let listed = body_json(
        app.send(with_cookie(request("GET", "/api/admin/projects"), &cookie))
            .await,
    )
    .await;
    let mut listed_ids: Vec<i64> = listed["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    listed_ids.sort_unstable();
    assert_eq!(listed_ids, ids);
}

#[tokio::test]
async fn test_create_after_seeding_continues_sequence() {
    let app = TestApp::new();
    let cookie = app.login().await;

    app.send(with_cookie(request("GET", "/api/admin/projects"), &cookie))
        .await;
    let response = app
        .send(with_cookie(
            json_request("POST", "/api/admin/projects", &new_project()),
            &cookie,
        ))
        .await;
    let id = body_json(response).await["project"]["id"].as_i64().unwrap();
    assert_eq!(id, i64::try_from(default_projects().len()).unwrap() + 1);
}

#[tokio::test]
async fn test_create_project_requires_fields() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            json_request("POST", "/api/admin/projects", &json!({ "title": "Only" })),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Missing required fields: title, problem, solution" })
    );
}

#[tokio::test]
async fn test_update_and_delete_project() {
    let app = TestApp::new();
    let cookie = app.login().await;

    // Listing seeds the defaults
    app.send(with_cookie(request("GET", "/api/admin/projects"), &cookie))
        .await;

    let mut changed = new_project();
    changed["title"] = json!("Renamed");
    let response = app
        .send(with_cookie(
            json_request("PUT", "/api/admin/projects/1", &changed),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["project"]["id"], json!(1));
    assert_eq!(body["project"]["title"], "Renamed");

    let response = app
        .send(with_cookie(request("DELETE", "/api/admin/projects/1"), &cookie))
        .await;
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Project deleted successfully" })
    );

    let response = app
        .send(with_cookie(request("GET", "/api/admin/projects/1"), &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Project not found" }));
}

#[tokio::test]
async fn test_missing_project_update_is_not_found() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            json_request("PUT", "/api/admin/projects/999", &new_project()),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_skills_replace_and_reject_non_array() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let categories = json!([{
        "key": "backend",
        "category": "Backend",
        "skills": [{ "name": "Rust", "level": 90, "years": 4 }]
    }]);
    let response = app
        .send(with_cookie(
            json_request("PUT", "/api/admin/skills", &json!({ "categories": categories })),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Skills updated successfully");

    let public = body_json(app.send(request("GET", "/api/public/skills")).await).await;
    assert_eq!(public["categories"].as_array().unwrap().len(), 1);
    assert_eq!(public["categories"][0]["skills"][0]["name"], "Rust");

    let response = app
        .send(with_cookie(
            json_request("PUT", "/api/admin/skills", &json!({ "categories": "backend" })),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Invalid payload: categories must be an array" })
    );
}

#[tokio::test]
async fn test_company_partial_update_keeps_other_sections() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            json_request(
                "PUT",
                "/api/admin/company",
                &json!({ "vision": { "title": "Vision", "content": "Ship less, better." } }),
            ),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Company data updated successfully");
    assert_eq!(body["vision"]["content"], "Ship less, better.");

    let public = body_json(app.send(request("GET", "/api/public/company")).await).await;
    let defaults = serde_json::to_value(default_company()).unwrap();
    assert_eq!(public["vision"]["content"], "Ship less, better.");
    assert_eq!(public["mission"], defaults["mission"]);
    assert_eq!(public["companyInfo"], defaults["companyInfo"]);
}

#[tokio::test]
async fn test_upload_image() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            multipart_request("my photo.png", "image/png", b"\x89PNG\r\n"),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["url"], "https://blob.test/my_photo.png");
    assert_eq!(
        app.blob.uploads(),
        vec![("my_photo.png".to_string(), "image/png".to_string(), 6)]
    );
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            multipart_request("notes.txt", "text/plain", b"hello"),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Only image uploads are allowed" })
    );
    assert!(app.blob.uploads().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_oversize_file() {
    let app = TestApp::new();
    let cookie = app.login().await;

    let big = vec![0_u8; MAX_UPLOAD_BYTES + 1];
    let response = app
        .send(with_cookie(
            multipart_request("big.jpg", "image/jpeg", &big),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "File is too large. Maximum size is 5MB." })
    );
}

#[tokio::test]
async fn test_upload_without_blob_store() {
    let app = TestApp::without_uploads();
    let cookie = app.login().await;

    let response = app
        .send(with_cookie(
            multipart_request("a.png", "image/png", b"png"),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "File storage is not configured");
}
