use std::path::Path;

use axum::body::Bytes;
use common::storage::ImageExtension;

/// A file part received in a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Extension of the original file name, without the dot.
    ///
    /// A leading dot starts a hidden name, not an extension: `.csv` has none.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// The accepted image extension of this upload, if any.
    pub fn image_extension(&self) -> Option<ImageExtension> {
        ImageExtension::from_filename(&self.file_name)
    }
}

/// Positional list of uploaded images. A `None` slot is an empty part that
/// still occupies its position.
pub type ImageList = [Option<UploadedFile>];

/// The image at `index`, treating a short list or an empty slot as "no image".
pub fn image_at(images: &ImageList, index: usize) -> Option<&UploadedFile> {
    images.get(index).and_then(Option::as_ref)
}
