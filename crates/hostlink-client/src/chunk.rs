//! Chunked file transfer.
//!
//! Large files move as a sequence of byte-range commands instead of one
//! envelope, keeping each frame small enough for proxies and the WebSocket
//! path. Reads walk `offset` forward from a size probe; writes send the
//! first chunk with the caller's append flag and every later chunk with
//! append on. A failure mid-transfer reports the byte offset where it
//! stopped, so a caller can diagnose or resume.

use async_trait::async_trait;

use hostlink_core::{Error, Result};

/// Byte-range file access; the transfer loops drive this.
///
/// [`Computer`](crate::Computer) implements it over `read_bytes` /
/// `write_bytes` / `get_file_size` commands.
#[async_trait]
pub trait ByteRangeIo: Send + Sync {
    async fn size(&self, path: &str) -> Result<u64>;
    async fn read_range(&self, path: &str, offset: u64, length: u64) -> Result<Vec<u8>>;
    async fn write_range(&self, path: &str, data: &[u8], append: bool) -> Result<()>;
}

/// Read a whole file in `chunk_size` pieces.
pub async fn read_chunked(io: &dyn ByteRangeIo, path: &str, chunk_size: u64) -> Result<Vec<u8>> {
    let total = io.size(path).await?;
    let mut buf = Vec::with_capacity(total as usize);
    let mut offset = 0u64;

    while offset < total {
        let length = chunk_size.min(total - offset);
        let chunk = io
            .read_range(path, offset, length)
            .await
            .map_err(|e| chunk_error(offset, e))?;
        if chunk.is_empty() {
            // File shrank under us.
            return Err(Error::ChunkTransfer {
                offset,
                message: "unexpected empty read".into(),
            });
        }
        offset += chunk.len() as u64;
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

/// Write `data` in `chunk_size` pieces.
///
/// The first chunk carries the caller's `append` flag (false truncates),
/// every later chunk appends behind it.
pub async fn write_chunked(
    io: &dyn ByteRangeIo,
    path: &str,
    data: &[u8],
    append: bool,
    chunk_size: u64,
) -> Result<()> {
    if data.is_empty() {
        // Still creates or truncates the file.
        return io.write_range(path, &[], append).await;
    }

    let mut offset = 0u64;
    for chunk in data.chunks(chunk_size.max(1) as usize) {
        let append_flag = if offset == 0 { append } else { true };
        io.write_range(path, chunk, append_flag)
            .await
            .map_err(|e| chunk_error(offset, e))?;
        offset += chunk.len() as u64;
    }

    Ok(())
}

fn chunk_error(offset: u64, source: Error) -> Error {
    match source {
        already @ Error::ChunkTransfer { .. } => already,
        other => Error::ChunkTransfer {
            offset,
            message: other.to_string(),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    /// In-memory file with recorded write calls.
    #[derive(Default)]
    struct MemIo {
        content: Mutex<Vec<u8>>,
        writes: Mutex<Vec<(u64, bool)>>,
        fail_at_offset: Option<u64>,
    }

    impl MemIo {
        fn with_content(data: &[u8]) -> Self {
            Self {
                content: Mutex::new(data.to_vec()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ByteRangeIo for MemIo {
        async fn size(&self, _path: &str) -> Result<u64> {
            Ok(self.content.lock().unwrap().len() as u64)
        }

        async fn read_range(&self, _path: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
            if self.fail_at_offset == Some(offset) {
                return Err(Error::transport("link dropped"));
            }
            let content = self.content.lock().unwrap();
            let start = offset as usize;
            let end = (offset + length).min(content.len() as u64) as usize;
            Ok(content[start.min(content.len())..end].to_vec())
        }

        async fn write_range(&self, _path: &str, data: &[u8], append: bool) -> Result<()> {
            if self.fail_at_offset == Some(self.writes.lock().unwrap().len() as u64) {
                return Err(Error::transport("link dropped"));
            }
            let mut content = self.content.lock().unwrap();
            let offset = if append { content.len() as u64 } else { 0 };
            if !append {
                content.clear();
            }
            content.extend_from_slice(data);
            self.writes.lock().unwrap().push((offset, append));
            Ok(())
        }
    }

    #[tokio::test]
    async fn read_reassembles_in_order() {
        let io = MemIo::with_content(b"abcdefghij");
        let data = read_chunked(&io, "f", 3).await.unwrap();
        assert_eq!(data, b"abcdefghij");
    }

    #[tokio::test]
    async fn read_with_chunk_larger_than_file() {
        let io = MemIo::with_content(b"short");
        let data = read_chunked(&io, "f", 1024).await.unwrap();
        assert_eq!(data, b"short");
    }

    #[tokio::test]
    async fn read_failure_reports_offset() {
        let mut io = MemIo::with_content(b"abcdefghij");
        io.fail_at_offset = Some(6);
        let err = read_chunked(&io, "f", 3).await.unwrap_err();
        match err {
            Error::ChunkTransfer { offset, .. } => assert_eq!(offset, 6),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn write_first_chunk_truncates_rest_append() {
        let io = MemIo::with_content(b"old content");
        write_chunked(&io, "f", b"0123456789", false, 4)
            .await
            .unwrap();

        assert_eq!(*io.content.lock().unwrap(), b"0123456789");
        let writes = io.writes.lock().unwrap();
        assert_eq!(writes.as_slice(), &[(0, false), (4, true), (8, true)]);
    }

    #[tokio::test]
    async fn write_append_keeps_existing_content() {
        let io = MemIo::with_content(b"keep:");
        write_chunked(&io, "f", b"abcdef", true, 4).await.unwrap();
        assert_eq!(*io.content.lock().unwrap(), b"keep:abcdef");
    }

    #[tokio::test]
    async fn empty_write_still_truncates() {
        let io = MemIo::with_content(b"old");
        write_chunked(&io, "f", b"", false, 4).await.unwrap();
        assert!(io.content.lock().unwrap().is_empty());
    }
}
