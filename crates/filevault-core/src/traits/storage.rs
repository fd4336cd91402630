//! Blob store trait for pluggable content backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Content type recorded when the uploader did not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Stores opaque, write-once byte sequences under opaque keys.
///
/// A blob store knows nothing about files, versions, or owners. `get` on
/// a missing key fails with `ErrorKind::NotFound`; every other failure is
/// reported as `ErrorKind::Storage`. `put` under an existing key overwrites.
///
/// Implementations live in `filevault-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write `stream` under `key`, returning the number of bytes stored.
    ///
    /// `size` is the number of bytes the caller promises to deliver;
    /// a stream that ends short or long fails with `ErrorKind::Storage`.
    async fn put(
        &self,
        key: &str,
        stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> AppResult<u64>;

    /// Open the blob under `key` as a lazy byte stream.
    async fn get(&self, key: &str) -> AppResult<ByteStream>;

    /// Delete the blob under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a blob exists under `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Write an in-memory payload under `key`.
    async fn put_bytes(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<u64> {
        let size = data.len() as u64;
        let stream: ByteStream = Box::pin(futures::stream::once(async move { Ok(data) }));
        self.put(key, stream, size, content_type).await
    }
}
