//! Integration tests for per-file sharing.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_owner_sets_and_lists_permissions() {
    let app = TestApp::new();
    let file_id = app.upload(1, "doc.txt", b"doc").await;

    let response = app.share(1, file_id, &[(3, 1), (2, 2)]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let response = app
        .request("GET", &format!("/api/files/{file_id}/permissions"), None, Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        json!([
            { "user_id": 2, "permission_level": 2 },
            { "user_id": 3, "permission_level": 1 },
        ])
    );
}

#[tokio::test]
async fn test_setting_permissions_is_idempotent() {
    let app = TestApp::new();
    let file_id = app.upload(1, "doc.txt", b"doc").await;
    let path = format!("/api/files/{file_id}/permissions");

    app.share(1, file_id, &[(2, 1)]).await;
    let first = app.request("GET", &path, None, Some(1)).await.body;
    app.share(1, file_id, &[(2, 1)]).await;
    let second = app.request("GET", &path, None, Some(1)).await.body;

    assert_eq!(first, second);
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_replacement_revokes_previous_grants() {
    let app = TestApp::new();
    let file_id = app.upload(1, "doc.txt", b"doc").await;

    app.share(1, file_id, &[(2, 1)]).await;
    assert_eq!(app.download(2, file_id).await.status, StatusCode::OK);

    app.share(1, file_id, &[(3, 1)]).await;
    assert_eq!(app.download(2, file_id).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.download(3, file_id).await.status, StatusCode::OK);

    app.share(1, file_id, &[]).await;
    assert_eq!(app.download(3, file_id).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.download(1, file_id).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_zero_level_grants_nothing() {
    let app = TestApp::new();
    let file_id = app.upload(1, "doc.txt", b"doc").await;
    app.share(1, file_id, &[(2, 0)]).await;

    assert_eq!(app.download(2, file_id).await.status, StatusCode::FORBIDDEN);
    let response = app
        .request("GET", "/api/files?include_shared=true", None, Some(2))
        .await;
    assert!(response.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_owner_manages_permissions() {
    let app = TestApp::new();
    let file_id = app.upload(1, "doc.txt", b"doc").await;
    app.share(1, file_id, &[(2, 1)]).await;

    let response = app.share(2, file_id, &[(2, 5), (3, 1)]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("GET", &format!("/api/files/{file_id}/permissions"), None, Some(2))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.download(3, file_id).await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_grants_are_rejected() {
    let app = TestApp::new();
    let file_id = app.upload(1, "doc.txt", b"doc").await;

    for grants in [vec![(0, 1)], vec![(2, -1)], vec![(2, 1), (2, 2)]] {
        let response = app.share(1, file_id, &grants).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{grants:?}");
    }

    let response = app
        .request("GET", &format!("/api/files/{file_id}/permissions"), None, Some(1))
        .await;
    assert!(response.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_permissions_on_unknown_file() {
    let app = TestApp::new();
    let response = app
        .share(1, uuid::Uuid::new_v4(), &[(2, 1)])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
