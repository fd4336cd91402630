//! Integration tests for version history and revert.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_revert_to_first_version() {
    let app = TestApp::new();
    let file_id = app.upload(1, "notes.txt", b"v1 content").await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/revert"),
            Some(json!({ "version": 1 })),
            Some(1),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["file_id"], file_id.to_string());
    assert_eq!(data["new_file_id"], file_id.to_string());
    assert_eq!(data["version"], 2);

    let response = app
        .request("GET", &format!("/api/files/{file_id}/versions"), None, Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let versions = response.body["data"].as_array().unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0]["version_number"], 2);
    assert_eq!(versions[1]["version_number"], 1);
    assert_eq!(versions[0]["size_bytes"], 10);
    assert!(versions[0].get("storage_key").is_none());

    let latest = app.download(1, file_id).await;
    assert_eq!(latest.bytes, b"v1 content");
    assert_eq!(latest.headers["x-file-version"], "2");

    let original = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/versions/1/content"),
            None,
            Some(1),
        )
        .await;
    assert_eq!(original.status, StatusCode::OK);
    assert_eq!(original.bytes, b"v1 content");
}

#[tokio::test]
async fn test_revert_is_owner_only() {
    let app = TestApp::new();
    let file_id = app.upload(1, "notes.txt", b"x").await;
    app.share(1, file_id, &[(2, 1)]).await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/revert"),
            Some(json!({ "version": 1 })),
            Some(2),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("GET", &format!("/api/files/{file_id}/versions"), None, Some(2))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_revert_to_missing_version() {
    let app = TestApp::new();
    let file_id = app.upload(1, "notes.txt", b"x").await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/revert"),
            Some(json!({ "version": 4 })),
            Some(1),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/revert"),
            Some(json!({ "version": 0 })),
            Some(1),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.blobs.len().await, 1);
}

#[tokio::test]
async fn test_version_content_checks() {
    let app = TestApp::new();
    let file_id = app.upload(1, "notes.txt", b"x").await;

    let response = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/versions/9/content"),
            None,
            Some(1),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/versions/first/content"),
            None,
            Some(1),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/versions/1/content"),
            None,
            Some(3),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
