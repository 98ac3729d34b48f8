pub mod comuna;
pub mod csv;
pub mod image;
pub mod import;
pub mod region;

use sea_orm::DbErr;
use thiserror::Error;

/// Why a deletion did not happen.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("record not found")]
    NotFound,
    #[error("store rejected deletion: {0}")]
    Rejected(#[from] DbErr),
}
