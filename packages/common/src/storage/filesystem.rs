use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;
use tracing::{debug, info};

use super::error::StorageError;
use super::key::{EntityKind, ImageExtension};
use super::traits::{BoxReader, ImageStore};

/// File name of the fallback image at the media root.
pub const DEFAULT_IMAGE: &str = "default.png";

/// Built-in fallback image, installed when the media root has none.
pub const DEFAULT_IMAGE_PNG: &[u8] = include_bytes!("../../assets/default.png");

/// Filesystem-backed image store.
///
/// Layout: `{base_path}/{kind}/{id}{ext}` with the fallback image at
/// `{base_path}/default.png`.
pub struct FilesystemImageStore {
    base_path: PathBuf,
}

impl FilesystemImageStore {
    /// Create a new filesystem image store, creating the per-kind directories
    /// and installing the built-in fallback image if the media root lacks one.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        for kind in EntityKind::ALL {
            fs::create_dir_all(base_path.join(kind.dir_name())).await?;
        }
        fs::create_dir_all(base_path.join(".tmp")).await?;

        let default_path = base_path.join(DEFAULT_IMAGE);
        if !fs::try_exists(&default_path).await? {
            fs::write(&default_path, DEFAULT_IMAGE_PNG).await?;
            info!(path = %default_path.display(), "Installed built-in default image");
        }
        Ok(Self { base_path })
    }

    /// Compute the filesystem path for an entity image.
    pub fn image_path(&self, kind: EntityKind, id: i32, ext: ImageExtension) -> PathBuf {
        self.base_path
            .join(kind.dir_name())
            .join(format!("{id}{ext}"))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn open(path: &Path) -> Result<BoxReader, StorageError> {
        match fs::File::open(path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn put(
        &self,
        kind: EntityKind,
        id: i32,
        ext: ImageExtension,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let image_path = self.image_path(kind, id, ext);
        let temp_path = self.temp_path();

        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &image_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(path = %image_path.display(), size = data.len(), "Image stored");
        Ok(())
    }

    async fn get_stream(
        &self,
        kind: EntityKind,
        id: i32,
        ext: ImageExtension,
    ) -> Result<BoxReader, StorageError> {
        Self::open(&self.image_path(kind, id, ext)).await
    }

    async fn delete(
        &self,
        kind: EntityKind,
        id: i32,
        ext: ImageExtension,
    ) -> Result<bool, StorageError> {
        match fs::remove_file(self.image_path(kind, id, ext)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn relocate(
        &self,
        kind: EntityKind,
        from_id: i32,
        to_id: i32,
        ext: ImageExtension,
    ) -> Result<bool, StorageError> {
        let from = self.image_path(kind, from_id, ext);
        let to = self.image_path(kind, to_id, ext);
        match fs::rename(&from, &to).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self, kind: EntityKind) -> Result<usize, StorageError> {
        let dir = self.base_path.join(kind.dir_name());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn default_image(&self) -> Result<BoxReader, StorageError> {
        match Self::open(&self.base_path.join(DEFAULT_IMAGE)).await {
            Err(StorageError::NotFound(path)) => {
                debug!(%path, "Default image missing, serving built-in image");
                Ok(Box::new(Cursor::new(DEFAULT_IMAGE_PNG)))
            }
            other => other,
        }
    }
}
