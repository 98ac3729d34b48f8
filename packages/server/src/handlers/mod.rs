pub mod comuna;
pub mod import;
pub mod region;

use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::error::AppError;
use crate::services::DeleteError;
use crate::services::image::ImageFile;

/// Stream an image back with its media type.
pub(crate) fn image_response(image: ImageFile) -> Result<Response, AppError> {
    Response::builder()
        .header(header::CONTENT_TYPE, image.content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(ReaderStream::new(image.reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Map a deletion failure onto the response body. Store-level failures are
/// reported, never re-raised.
pub(crate) fn delete_failure(err: DeleteError, not_found: &str, rejected: &str) -> AppError {
    match err {
        DeleteError::NotFound => AppError::NotFound(not_found.into()),
        other => {
            warn!(error = %other, "Deletion rejected");
            AppError::CannotDelete(rejected.into())
        }
    }
}
