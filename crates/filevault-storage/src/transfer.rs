//! Helpers for moving blob content between request bodies and blob streams.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::ByteStream;

/// Buffer a whole upload, failing with `Validation` once it exceeds `max_bytes`.
pub async fn collect_upload(mut stream: ByteStream, max_bytes: u64) -> AppResult<Bytes> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Upload stream error", e))?;
        if (buffer.len() + chunk.len()) as u64 > max_bytes {
            return Err(AppError::validation(format!(
                "Upload exceeds the maximum size of {max_bytes} bytes"
            )));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

/// Re-slice a stream so that no emitted chunk is larger than `max_chunk` bytes.
///
/// Chunks are split zero-copy; smaller chunks pass through untouched and
/// empty chunks are dropped. A `max_chunk` of zero disables splitting.
pub fn rechunk(stream: ByteStream, max_chunk: usize) -> ByteStream {
    if max_chunk == 0 {
        return stream;
    }
    Box::pin(stream.flat_map(move |item| {
        let pieces: Vec<Result<Bytes, std::io::Error>> = match item {
            Ok(mut chunk) => {
                let mut pieces = Vec::with_capacity(chunk.len().div_ceil(max_chunk));
                while !chunk.is_empty() {
                    let take = chunk.len().min(max_chunk);
                    pieces.push(Ok(chunk.split_to(take)));
                }
                pieces
            }
            Err(e) => vec![Err(e)],
        };
        stream::iter(pieces)
    }))
}
