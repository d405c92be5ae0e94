//! HTTP API tests for overlap-server.
//!
//! The router is exercised in-process with `tower::ServiceExt::oneshot`;
//! PSI-binary-backed tests use stub shell scripts and are Unix-only.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::{engine::general_purpose, Engine as _};
use overlap_core::{EngineConfig, PsiEngine};
use overlap_server::http::build_router;
use std::path::{Path, PathBuf};
use tower::ServiceExt;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("overlap-api-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_engine(binary: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> PsiEngine {
    PsiEngine::new(
        EngineConfig::builder()
            .binary(binary)
            .work_dir(work_dir)
            .build()
            .unwrap(),
    )
    .unwrap()
}

fn psi_request_body(sender: &str, receiver: &str) -> String {
    serde_json::json!({
        "sender_csv": general_purpose::STANDARD.encode(sender),
        "receiver_csv": general_purpose::STANDARD.encode(receiver),
        "config_json": {},
    })
    .to_string()
}

fn post_psi(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/psi")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[cfg(unix)]
fn stub_binary(dir: &Path, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("psi-stub.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn health_endpoint_responds() {
    let router = build_router(test_engine("/usr/local/bin/dpca_psi", "/tmp/overlap-health"));
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn invalid_base64_is_a_bad_request() {
    let dir = temp_dir("bad-base64");
    let router = build_router(test_engine("/nonexistent/psi", dir.join("work")));

    let body = serde_json::json!({
        "sender_csv": "!!not base64!!",
        "receiver_csv": general_purpose::STANDARD.encode("r\n"),
        "config_json": {},
    })
    .to_string();
    let response = router.oneshot(post_psi(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("sender_csv"));
    std::fs::remove_dir_all(dir).ok();
}

#[cfg(unix)]
#[tokio::test]
async fn psi_request_round_trips() {
    let dir = temp_dir("round-trip");
    let bin = stub_binary(&dir, "echo 42; echo 100");
    let router = build_router(test_engine(&bin, dir.join("work")));

    let response = router
        .oneshot(post_psi(psi_request_body("id\na\nb\n", "id\nb\nc\n")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!({"audience_size": 42, "impressions": 100}));

    // No workspace artifact survives the request.
    let leftovers = std::fs::read_dir(dir.join("work"))
        .map(|rd| rd.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
    std::fs::remove_dir_all(dir).ok();
}

#[cfg(unix)]
#[tokio::test]
async fn failing_binary_is_a_bad_gateway() {
    let dir = temp_dir("bad-gateway");
    let bin = stub_binary(&dir, "echo 'bad config' >&2; exit 1");
    let router = build_router(test_engine(&bin, dir.join("work")));

    let response = router
        .oneshot(post_psi(psi_request_body("s\n", "r\n")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("bad config"));
    std::fs::remove_dir_all(dir).ok();
}

#[cfg(unix)]
#[tokio::test]
async fn malformed_binary_output_is_an_internal_error() {
    let dir = temp_dir("malformed");
    let bin = stub_binary(&dir, "echo 'no counts here'");
    let router = build_router(test_engine(&bin, dir.join("work")));

    let response = router
        .oneshot(post_psi(psi_request_body("s\n", "r\n")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    std::fs::remove_dir_all(dir).ok();
}
