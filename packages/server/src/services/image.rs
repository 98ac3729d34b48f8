use common::storage::{BoxReader, EntityKind, ImageExtension, ImageStore, StorageError};
use tracing::{debug, warn};

use crate::models::upload::UploadedFile;

/// An image ready to be streamed back to a client.
pub struct ImageFile {
    pub reader: BoxReader,
    pub content_type: String,
}

impl ImageFile {
    fn new(reader: BoxReader, ext: ImageExtension) -> Self {
        let content_type = mime_guess::from_ext(ext.as_str().trim_start_matches('.'))
            .first_or_octet_stream()
            .to_string();
        Self {
            reader,
            content_type,
        }
    }
}

/// Write an uploaded image for an entity when its extension is accepted.
///
/// Returns the stored extension, or `None` when there was no upload or its
/// extension is not `.png` / `.jpg`.
pub async fn store_upload(
    images: &dyn ImageStore,
    kind: EntityKind,
    id: i32,
    upload: Option<&UploadedFile>,
) -> Result<Option<ImageExtension>, StorageError> {
    let Some(upload) = upload else {
        return Ok(None);
    };
    let Some(ext) = upload.image_extension() else {
        debug!(%kind, id, file_name = %upload.file_name, "Ignoring unsupported image");
        return Ok(None);
    };

    images.put(kind, id, ext, &upload.data).await?;
    Ok(Some(ext))
}

/// Open an entity image.
///
/// Returns `None` when the record claims no image, or when the claimed file
/// is missing (the caller then clears the stale reference).
pub async fn open_entity_image(
    images: &dyn ImageStore,
    kind: EntityKind,
    id: i32,
    stored_ext: Option<&str>,
) -> Result<Option<ImageFile>, StorageError> {
    let Some(ext) = stored_ext.and_then(ImageExtension::parse) else {
        return Ok(None);
    };
    match images.get_stream(kind, id, ext).await {
        Ok(reader) => Ok(Some(ImageFile::new(reader, ext))),
        Err(StorageError::NotFound(path)) => {
            warn!(%kind, id, %path, "Image file missing, clearing stale reference");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub async fn default_image(images: &dyn ImageStore) -> Result<ImageFile, StorageError> {
    Ok(ImageFile::new(
        images.default_image().await?,
        ImageExtension::Png,
    ))
}

/// Remove the image recorded for an entity, if any.
///
/// Runs after the record is gone, so a failure is only logged: the file is
/// orphaned and no longer reachable through the catalog.
pub async fn remove_entity_image(
    images: &dyn ImageStore,
    kind: EntityKind,
    id: i32,
    stored_ext: Option<&str>,
) {
    let Some(ext) = stored_ext.and_then(ImageExtension::parse) else {
        return;
    };
    if let Err(e) = images.delete(kind, id, ext).await {
        warn!(%kind, id, error = %e, "Failed to remove image of deleted record");
    }
}
