use actix_web::web::Bytes;
use futures_util::{Stream, TryStreamExt};
use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use crate::errors::AppError;
use crate::utils::validation::validate_stored_name;

/// Flat directory of uploaded blobs, each named by a random token.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

#[derive(Debug)]
pub struct StoredBlob {
    pub stored_name: String,
    pub size: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of a stored blob, or `None` when the name could escape the directory.
    pub fn path_for(&self, stored_name: &str) -> Option<PathBuf> {
        if stored_name.is_empty() || validate_stored_name(stored_name).is_err() {
            return None;
        }
        Some(self.dir.join(stored_name))
    }

    /// Streams `chunks` into a new blob. Anything past `max_bytes` aborts the
    /// write and the partial file is removed.
    pub async fn store<S, E>(&self, chunks: S, max_bytes: usize) -> Result<StoredBlob, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let stored_name = uuid::Uuid::new_v4().simple().to_string();
        let path = self.dir.join(&stored_name);

        match self.write_blob(&path, chunks, max_bytes).await {
            Ok(size) => {
                debug!("Stored upload {} ({} bytes)", stored_name, size);
                Ok(StoredBlob { stored_name, size })
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!("Could not remove partial upload {}: {}", path.display(), cleanup);
                    }
                }
                Err(err)
            }
        }
    }

    async fn write_blob<S, E>(&self, path: &Path, mut chunks: S, max_bytes: usize) -> Result<usize, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let mut file = tokio::fs::File::create(path).await.map_err(|err| {
            error!("Failed to create {}: {}", path.display(), err);
            AppError::from(err)
        })?;

        let mut size = 0usize;
        while let Some(chunk) = chunks
            .try_next()
            .await
            .map_err(|err| AppError::BadRequest(format!("Upload read error: {}", err)))?
        {
            size += chunk.len();
            if size > max_bytes {
                return Err(AppError::BadRequest("File too large".to_string()));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(size)
    }

    /// Best-effort delete; a blob that is already gone is not an error.
    pub async fn remove(&self, stored_name: &str) -> Result<bool, AppError> {
        let Some(path) = self.path_for(stored_name) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed upload {}", stored_name);
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn temp_store() -> UploadStore {
        let dir = std::env::temp_dir().join(format!("meeting-uploads-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        UploadStore::new(dir)
    }

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, std::io::Error>(Bytes::from_static(*p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn store_writes_all_chunks_under_random_name() {
        let store = temp_store();
        let blob = store.store(chunks(&[b"%PDF-1.4\n", b"body"]), 1024).await.unwrap();

        assert_eq!(blob.size, 13);
        assert_eq!(blob.stored_name.len(), 32);
        let written = std::fs::read(store.dir().join(&blob.stored_name)).unwrap();
        assert_eq!(written, b"%PDF-1.4\nbody");
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[tokio::test]
    async fn oversized_upload_leaves_nothing_behind() {
        let store = temp_store();
        let res = store.store(chunks(&[b"0123456789", b"0123456789"]), 15).await;

        assert!(matches!(res, Err(AppError::BadRequest(_))));
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[tokio::test]
    async fn remove_is_best_effort() {
        let store = temp_store();
        let blob = store.store(chunks(&[b"x"]), 10).await.unwrap();

        assert!(store.remove(&blob.stored_name).await.unwrap());
        assert!(!store.remove(&blob.stored_name).await.unwrap());
        assert!(!store.remove("../escape").await.unwrap());
        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[test]
    fn path_for_rejects_traversal() {
        let store = UploadStore::new("/srv/uploads");
        assert_eq!(store.path_for("abc"), Some(PathBuf::from("/srv/uploads/abc")));
        assert!(store.path_for("../data.json").is_none());
        assert!(store.path_for("").is_none());
    }
}
