//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use filevault_auth::JwtIdentityResolver;
use filevault_core::config::{AppConfig, StorageProviderKind};
use filevault_database::InMemoryFileStore;
use filevault_storage::MemoryBlobStore;

/// Secret shared by the test token minter and the server.
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Metadata store behind the router
    pub metadata: InMemoryFileStore,
    /// Blob store behind the router
    pub blobs: MemoryBlobStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over in-memory stores
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the default config
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.storage.provider = StorageProviderKind::Memory;
        config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
        adjust(&mut config);

        let metadata = InMemoryFileStore::new();
        let blobs = MemoryBlobStore::new();
        let identity = Arc::new(JwtIdentityResolver::new(&config.auth));

        let state = filevault_api::AppState::new(
            config.clone(),
            Arc::new(metadata.clone()),
            Arc::new(blobs.clone()),
            identity,
        );

        Self {
            router: filevault_api::build_app(state),
            metadata,
            blobs,
            config,
        }
    }

    /// Mint a valid bearer token for a user
    pub fn token_for(user_id: i64) -> String {
        let exp = chrono::Utc::now().timestamp() + 3600;
        encode(
            &Header::default(),
            &json!({ "sub": user_id.to_string(), "exp": exp }),
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to mint token")
    }

    /// Send a JSON request as `user` (no Authorization header when `None`)
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<i64>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user_id) = user {
            req = req.header("Authorization", format!("Bearer {}", Self::token_for(user_id)));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload `content` as a new file owned by `user`
    pub async fn upload_as(
        &self,
        user_id: i64,
        name: &str,
        content_type: &str,
        content: &[u8],
    ) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/files")
            .header("Authorization", format!("Bearer {}", Self::token_for(user_id)))
            .header("x-file-name", name)
            .header("Content-Type", content_type)
            .header("Content-Length", content.len())
            .body(Body::from(content.to_vec()))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload and return the new file's ID
    pub async fn upload(&self, user_id: i64, name: &str, content: &[u8]) -> Uuid {
        let response = self.upload_as(user_id, name, "text/plain", content).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["file_id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("Upload response carries a file_id")
    }

    /// Replace a file's grants
    pub async fn share(&self, owner: i64, file_id: Uuid, grants: &[(i64, i32)]) -> TestResponse {
        let permissions: Vec<Value> = grants
            .iter()
            .map(|(user_id, level)| json!({ "user_id": user_id, "permission_level": level }))
            .collect();
        self.request(
            "PUT",
            &format!("/api/files/{file_id}/permissions"),
            Some(json!({ "permissions": permissions })),
            Some(owner),
        )
        .await
    }

    /// Download the latest content of a file as `user`
    pub async fn download(&self, user_id: i64, file_id: Uuid) -> TestResponse {
        self.request(
            "GET",
            &format!("/api/files/{file_id}/content"),
            None,
            Some(user_id),
        )
        .await
    }

    /// Send a prepared request through the router
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body")
            .to_vec();

        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Vec<u8>,
    /// Parsed JSON body, `Null` for non-JSON bodies
    pub body: Value,
}
