//! Integration tests for file upload, download, listing, rename, and delete.

mod helpers;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use serde_json::json;

use filevault_core::traits::storage::BlobStore;
use helpers::TestApp;

#[tokio::test]
async fn test_upload_then_download_round_trip() {
    let app = TestApp::new();

    for content in [&b""[..], &b"hi"[..], &vec![7u8; 100_000][..]] {
        let file_id = app.upload(1, "blob.bin", content).await;
        let response = app.download(1, file_id).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.bytes, content);
        assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers["x-file-version"], "1");
    }
}

#[tokio::test]
async fn test_upload_without_content_length_is_buffered() {
    let app = TestApp::new();
    let body = chunked_body(&[b"hel", b"lo"]);
    let req = Request::builder()
        .method("POST")
        .uri("/api/files")
        .header(header::AUTHORIZATION, format!("Bearer {}", TestApp::token_for(1)))
        .header("x-file-name", "stream.txt")
        .body(body)
        .unwrap();

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let file_id = response.body["data"]["file_id"].as_str().unwrap().parse().unwrap();

    let download = app.download(1, file_id).await;
    assert_eq!(download.bytes, b"hello");
    assert_eq!(
        download.headers[header::CONTENT_TYPE],
        "application/octet-stream"
    );
}

fn chunked_body(chunks: &[&'static [u8]]) -> Body {
    let chunks: Vec<Result<&'static [u8], std::io::Error>> =
        chunks.iter().map(|c| Ok(*c)).collect();
    Body::from_stream(futures::stream::iter(chunks))
}

#[tokio::test]
async fn test_upload_requires_name() {
    let app = TestApp::new();
    let req = Request::builder()
        .method("POST")
        .uri("/api/files")
        .header(header::AUTHORIZATION, format!("Bearer {}", TestApp::token_for(1)))
        .body(Body::from("data"))
        .unwrap();

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::with_config(|c| c.storage.max_upload_size_bytes = 4);

    let response = app.upload_as(1, "big.bin", "text/plain", b"12345").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthenticated() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/files", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/files")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("POST")
        .uri("/api/files")
        .header("x-file-name", "a.txt")
        .body(Body::from("x"))
        .unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::UNAUTHORIZED);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_list_files_with_and_without_shared() {
    let app = TestApp::new();
    let own = app.upload(2, "mine.txt", b"m").await;
    let shared = app.upload(1, "theirs.txt", b"tt").await;
    app.upload(1, "private.txt", b"p").await;
    assert_eq!(app.share(1, shared, &[(2, 1)]).await.status, StatusCode::OK);

    let response = app.request("GET", "/api/files", None, Some(2)).await;
    assert_eq!(response.status, StatusCode::OK);
    let files = response.body["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], own.to_string());
    assert_eq!(files[0]["is_owner"], true);

    let response = app
        .request("GET", "/api/files?include_shared=true", None, Some(2))
        .await;
    let files = response.body["data"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    let entry = files
        .iter()
        .find(|f| f["id"] == shared.to_string())
        .unwrap();
    assert_eq!(entry["is_owner"], false);
    assert_eq!(entry["size_bytes"], 2);
    assert_eq!(entry["name"], "theirs.txt");
}

#[tokio::test]
async fn test_get_file_info() {
    let app = TestApp::new();
    let file_id = app.upload(1, "info.txt", b"four").await;

    let response = app
        .request("GET", &format!("/api/files/{file_id}"), None, Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let info = &response.body["data"];
    assert_eq!(info["name"], "info.txt");
    assert_eq!(info["size_bytes"], 4);
    assert_eq!(info["version"], 1);
    assert_eq!(info["content_type"], "text/plain");
    assert_eq!(info["is_owner"], true);

    let response = app
        .request("GET", &format!("/api/files/{file_id}"), None, Some(2))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_and_unknown_ids() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/files/not-a-uuid", None, Some(1)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "GET",
            "/api/files/00000000-0000-0000-0000-999999999999",
            None,
            Some(1),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_file() {
    let app = TestApp::new();
    let file_id = app.upload(1, "old.txt", b"x").await;
    let path = format!("/api/files/{file_id}");

    let response = app
        .request("PATCH", &path, Some(json!({ "new_name": "new.txt" })), Some(2))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("PATCH", &path, Some(json!({ "new_name": "" })), Some(1))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("PATCH", &path, Some(json!({ "new_name": "new.txt" })), Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    let info = app.request("GET", &path, None, Some(1)).await;
    assert_eq!(info.body["data"]["name"], "new.txt");
}

#[tokio::test]
async fn test_control_characters_in_names_are_rejected() {
    let app = TestApp::new();
    let file_id = app.upload(1, "a.txt", b"abc").await;
    let path = format!("/api/files/{file_id}");

    let response = app
        .request("PATCH", &path, Some(json!({ "new_name": "a\u{1}b.txt" })), Some(1))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.upload_as(1, "tab\tname.txt", "text/plain", b"x").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.download(1, file_id).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"abc");
    let info = app.request("GET", &path, None, Some(1)).await;
    assert_eq!(info.body["data"]["name"], "a.txt");
}

#[tokio::test]
async fn test_non_ascii_names_round_trip() {
    let app = TestApp::new();

    let response = app.upload_as(1, "résumé.txt", "text/plain", b"cv").await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let file_id = response.body["data"]["file_id"].as_str().unwrap().to_string();
    let path = format!("/api/files/{file_id}");

    let info = app.request("GET", &path, None, Some(1)).await;
    assert_eq!(info.body["data"]["name"], "résumé.txt");

    let response = app
        .request("GET", &format!("{path}/content"), None, Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"cv");
    let disposition = response.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("filename*=UTF-8''r%C3%A9sum%C3%A9%2Etxt"));

    let response = app
        .request("PATCH", &path, Some(json!({ "new_name": "報告 \"final\".txt" })), Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app
        .request("GET", &format!("{path}/content"), None, Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"cv");
}

#[tokio::test]
async fn test_upload_name_must_be_utf8() {
    let app = TestApp::new();
    let req = Request::builder()
        .method("POST")
        .uri("/api/files")
        .header("Authorization", format!("Bearer {}", TestApp::token_for(1)))
        .header("x-file-name", HeaderValue::from_bytes(&[b'a', 0xff, b'b']).unwrap())
        .header("Content-Length", 1)
        .body(Body::from("x"))
        .unwrap();

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_share_download_delete_scenario() {
    let app = TestApp::new();
    let file_id = app.upload(1, "hello.txt", b"hi").await;
    app.share(1, file_id, &[(2, 1)]).await;

    let response = app.download(2, file_id).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"hi");

    let response = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(2))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(1))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(app.blobs.is_empty().await);

    for user in [1, 2] {
        let response = app.download(user, file_id).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        let response = app
            .request("GET", &format!("/api/files/{file_id}"), None, Some(user))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_missing_blob_is_masked_internal_error() {
    let app = TestApp::new();
    let file_id = app.upload(1, "gone.txt", b"x").await;
    app.blobs
        .delete(&format!("{file_id}/v1"))
        .await
        .unwrap();

    let response = app.download(1, file_id).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Internal server error");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}
