use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::key::{EntityKind, ImageExtension};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Per-entity image storage.
///
/// Images are keyed by entity kind, entity id and extension. At most one
/// image is expected per entity; writing replaces the previous file.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store image bytes for an entity.
    async fn put(
        &self,
        kind: EntityKind,
        id: i32,
        ext: ImageExtension,
        data: &[u8],
    ) -> Result<(), StorageError>;

    /// Retrieve an entity image as a streaming async reader.
    async fn get_stream(
        &self,
        kind: EntityKind,
        id: i32,
        ext: ImageExtension,
    ) -> Result<BoxReader, StorageError>;

    /// Delete an entity image.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(
        &self,
        kind: EntityKind,
        id: i32,
        ext: ImageExtension,
    ) -> Result<bool, StorageError>;

    /// Move an image to a new entity id, e.g. after the entity was re-keyed.
    ///
    /// Returns `false` if there was no image to move.
    async fn relocate(
        &self,
        kind: EntityKind,
        from_id: i32,
        to_id: i32,
        ext: ImageExtension,
    ) -> Result<bool, StorageError>;

    /// Remove every image of the given kind. Returns the number of files removed.
    async fn clear(&self, kind: EntityKind) -> Result<usize, StorageError>;

    /// The fallback image served when an entity has none.
    async fn default_image(&self) -> Result<BoxReader, StorageError>;
}
