//! Local filesystem backend

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::destination::DestinationKind;
use crate::error::{Error, Result};
use crate::resource::WritableResource;

/// A created (or truncated) local file
#[derive(Debug)]
pub struct LocalResource {
    file: File,
    path: PathBuf,
}

impl LocalResource {
    /// Create the file at `path`, truncating it if it exists
    ///
    /// Parent directories are not created.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .await
            .map_err(|source| Error::ResourceCreateFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WritableResource for LocalResource {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Local
    }

    async fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf).await
    }

    async fn close(&mut self) -> std::io::Result<()> {
        self.file.flush().await?;

        // Character devices and pipes (e.g. /dev/stdout) cannot be synced.
        match self.file.sync_all().await {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.kind(), ErrorKind::InvalidInput | ErrorKind::Unsupported) => {
                tracing::debug!(path = %self.path.display(), error = %e, "skipping sync");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_write_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let mut resource = LocalResource::create(&path).await.unwrap();
        assert_eq!(resource.kind(), DestinationKind::Local);
        assert_eq!(resource.path(), path.as_path());

        let n = resource.write(b"hello\n").await.unwrap();
        assert_eq!(n, 6);
        resource.close().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello\n");
    }

    #[tokio::test]
    async fn test_create_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "previous contents that are long").unwrap();

        let mut resource = LocalResource::create(&path).await.unwrap();
        resource.write(b"new\n").await.unwrap();
        resource.close().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[tokio::test]
    async fn test_create_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        let err = LocalResource::create(&path).await.unwrap_err();
        match err {
            Error::ResourceCreateFailed { path: failed, source } => {
                assert_eq!(failed, path);
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
