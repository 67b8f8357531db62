//! Local filesystem capability.

use std::io::SeekFrom;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use hostlink_core::Result;

use crate::capability::FilesystemOps;

/// Filesystem access rooted at an optional base directory.
///
/// With a root configured, all paths are resolved relative to it; this is
/// how tests and sandboxed deployments confine file commands.
#[derive(Debug, Clone, Default)]
pub struct LocalFilesystem {
    root: Option<PathBuf>,
}

impl LocalFilesystem {
    /// Unrooted access: paths are used as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access confined under `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }
}

#[async_trait]
impl FilesystemOps for LocalFilesystem {
    async fn file_exists(&self, path: &str) -> Result<bool> {
        match fs::metadata(self.resolve(path)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn directory_exists(&self, path: &str) -> Result<bool> {
        match fs::metadata(self.resolve(path)).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(self.resolve(path)).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort_unstable();
        Ok(names)
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.resolve(path)).await?)
    }

    async fn write_text(&self, path: &str, content: &str, append: bool) -> Result<()> {
        self.write_bytes(path, content.as_bytes(), append).await
    }

    async fn read_bytes(
        &self,
        path: &str,
        offset: Option<u64>,
        length: Option<u64>,
    ) -> Result<Vec<u8>> {
        let path = self.resolve(path);
        match (offset, length) {
            (None, None) => Ok(fs::read(path).await?),
            (offset, length) => {
                let mut file = fs::File::open(path).await?;
                if let Some(off) = offset {
                    file.seek(SeekFrom::Start(off)).await?;
                }
                match length {
                    Some(len) => {
                        // `len` comes off the wire; allocate only what the
                        // file can actually provide past the offset.
                        let remaining = file
                            .metadata()
                            .await?
                            .len()
                            .saturating_sub(offset.unwrap_or(0));
                        let mut buf = vec![0u8; len.min(remaining) as usize];
                        let mut filled = 0;
                        // Short read at EOF is not an error; return what's there.
                        while filled < buf.len() {
                            let n = file.read(&mut buf[filled..]).await?;
                            if n == 0 {
                                break;
                            }
                            filled += n;
                        }
                        buf.truncate(filled);
                        Ok(buf)
                    }
                    None => {
                        let mut buf = Vec::new();
                        file.read_to_end(&mut buf).await?;
                        Ok(buf)
                    }
                }
            }
        }
    }

    async fn write_bytes(&self, path: &str, data: &[u8], append: bool) -> Result<()> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn file_size(&self, path: &str) -> Result<u64> {
        Ok(fs::metadata(self.resolve(path)).await?.len())
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        Ok(fs::remove_file(self.resolve(path)).await?)
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        Ok(fs::create_dir_all(self.resolve(path)).await?)
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        Ok(fs::remove_dir_all(self.resolve(path)).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================
