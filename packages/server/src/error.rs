use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Response envelope shared by every mutation and by every failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DefaultResponse {
    /// Status (`"ok"`, `"error"`) or a human-readable outcome.
    #[schema(example = "error")]
    pub respuesta: String,
    /// Detail of the outcome, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Región no encontrada")]
    pub mensaje: Option<String>,
}

impl DefaultResponse {
    pub fn new(respuesta: impl Into<String>) -> Self {
        Self {
            respuesta: respuesta.into(),
            mensaje: None,
        }
    }

    pub fn ok(mensaje: impl Into<String>) -> Self {
        Self {
            respuesta: "ok".into(),
            mensaje: Some(mensaje.into()),
        }
    }

    pub fn error(mensaje: impl Into<String>) -> Self {
        Self {
            respuesta: "error".into(),
            mensaje: Some(mensaje.into()),
        }
    }
}

/// Application-level error type.
///
/// Business-rule failures keep status 200 with an error-shaped body; only
/// malformed requests and infrastructure faults use other status codes.
#[derive(Debug)]
pub enum AppError {
    /// Entity id absent.
    NotFound(String),
    /// Name collision on create or rename.
    AlreadyRegistered(String),
    /// Upload with the wrong file extension.
    InvalidFile,
    /// The store rejected a deletion.
    CannotDelete(String),
    /// Malformed request payload.
    Validation(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, DefaultResponse) {
        match self {
            AppError::NotFound(msg)
            | AppError::AlreadyRegistered(msg)
            | AppError::CannotDelete(msg) => (StatusCode::OK, DefaultResponse::error(msg)),
            AppError::InvalidFile => (StatusCode::OK, DefaultResponse::error("Archivo inválido")),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, DefaultResponse::error(msg)),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    DefaultResponse::error("Ha ocurrido un error inesperado"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}
