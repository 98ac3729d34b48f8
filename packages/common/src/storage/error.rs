use thiserror::Error;

/// Errors raised by an [`ImageStore`](super::ImageStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// No image file at the given path.
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
