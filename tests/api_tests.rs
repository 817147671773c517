//! In-process API tests.
//!
//! Each test drives the full router with `tower::ServiceExt::oneshot`; no
//! running server or external toolchain is required. Cases that need network
//! access are `#[ignore]`d.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use buildforge_backend::api::{routes, AppState, SharedState};
use buildforge_backend::config::Config;
use buildforge_backend::services::build_service::BuildService;
use buildforge_backend::store::memory::MemoryStore;
use buildforge_backend::store::JobStore;

const PASSWORD: &str = "test-password";

fn test_state(root: &Path) -> SharedState {
    let config = Config {
        bind_address: "127.0.0.1:0".into(),
        uploads_dir: root.join("uploads").to_string_lossy().into_owned(),
        builds_dir: root.join("builds").to_string_lossy().into_owned(),
        owner_name: "Example Owner".into(),
        owner_email: None,
        dashboard_password: PASSWORD.into(),
        max_concurrent_builds: 2,
    };
    let store: Arc<dyn JobStore> = Arc::new(MemoryStore::new());
    let builder = BuildService::new(store.clone(), &config);
    Arc::new(AppState::new(config, store, builder))
}

fn app(root: &Path) -> axum::Router {
    routes::create_router(test_state(root))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn multipart_upload(filename: &str, content: &str, options: Option<&str>) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n"
    );
    if let Some(options) = options {
        body.push_str(&format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"options\"\r\n\r\n\
             {options}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/build/source")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn job_listing_starts_empty() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path()).oneshot(get("/api/jobs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn unknown_job_is_404() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let response = app.clone().oneshot(get("/api/jobs/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/jobs/999/files")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_file_download_is_404() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path())
        .oneshot(get("/api/files/999/download"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_password_is_rejected_and_raises_an_alert() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let response = app
        .clone()
        .oneshot(post_json("/api/auth", r#"{"password": "nope"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(get("/api/alerts")).await.unwrap();
    let alerts = body_json(response).await;
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["kind"], "security");
    assert!(alerts[0]["message"]
        .as_str()
        .unwrap()
        .contains("Unauthorized access attempt"));
}

#[tokio::test]
async fn correct_password_authenticates() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path())
        .oneshot(post_json(
            "/api/auth",
            &format!(r#"{{"password": "{PASSWORD}"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn remote_build_rejects_non_github_urls() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path())
        .oneshot(post_json(
            "/api/build/remote",
            r#"{"url": "https://example.com/owner/repo"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"options\"\r\n\r\n\
         {{}}\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/build/source")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app(dir.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_is_accepted_and_job_becomes_queryable() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let response = app
        .clone()
        .oneshot(multipart_upload(
            "hello.py",
            "print('hi')",
            Some(r#"{"oneFile": true, "customName": "greeter"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let job_id = body["jobId"].as_i64().unwrap();
    assert!(job_id >= 1);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/jobs/{job_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let job = body_json(response).await;
    assert_eq!(job["filename"], "hello.py");
    assert_eq!(job["source"], "file");
    assert!(matches!(
        job["status"].as_str().unwrap(),
        "building" | "success" | "failed"
    ));

    let response = app
        .oneshot(get(&format!("/api/jobs/{job_id}/files")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn uploads_list_newest_first() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    for name in ["first.py", "second.py"] {
        let response = app
            .clone()
            .oneshot(multipart_upload(name, "print()", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/api/jobs")).await.unwrap();
    let jobs = body_json(response).await;
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["filename"], "second.py");
    assert_eq!(jobs[1]["filename"], "first.py");
}

/// Requires network access to github.com; run explicitly with --ignored.
#[tokio::test]
#[ignore]
async fn remote_build_accepts_github_url() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path())
        .oneshot(post_json(
            "/api/build/remote",
            r#"{"url": "https://github.com/octocat/Hello-World"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["jobId"].as_i64().unwrap() >= 1);
}
