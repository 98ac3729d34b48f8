use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, DefaultResponse};
use crate::extractors::form::FormData;
use crate::models::import::{ImportResponse, RegionBatch, parse_batch};
use crate::services::csv::batch_from_upload;
use crate::services::import::ImportService;
use crate::state::AppState;

async fn run_import(
    state: &AppState,
    batch: &[RegionBatch],
    form: &mut FormData,
) -> Result<Json<ImportResponse>, AppError> {
    let region_images = form.take_files("imagenes_reg");
    let comuna_images = form.take_files("imagenes_com");

    let summary = ImportService::new(&state.db, &*state.images)
        .reconcile(batch, &region_images, &comuna_images)
        .await?;
    Ok(Json(ImportResponse::batch(&summary)))
}

#[utoipa::path(
    post,
    path = "/region/comuna",
    tag = "Import",
    operation_id = "importRegionsJson",
    summary = "Bulk import regions and comunas from JSON",
    description = "`request` is a JSON array of `{\"region\": ..., \"comunas\": [...]}`. \
        `imagenes_reg` is matched by position to the regions and `imagenes_com` to the comunas \
        counted across the whole batch. Existing names are skipped and reported.",
    request_body(content_type = "multipart/form-data", description = "Batch and positional images"),
    responses(
        (status = 200, description = "Import summary", body = ImportResponse),
        (status = 400, description = "Malformed batch", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form))]
pub async fn import_json(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<ImportResponse>, AppError> {
    let batch = parse_batch(form.require_text("request")?)?;
    run_import(&state, &batch, &mut form).await
}

#[utoipa::path(
    post,
    path = "/csv/region/comuna",
    tag = "Import",
    operation_id = "importRegionsCsv",
    summary = "Bulk import regions and comunas from CSV",
    description = "`request` is a `.csv` file with a header line followed by `region;comuna` \
        lines. Images are matched exactly as for the JSON import.",
    request_body(content_type = "multipart/form-data", description = "CSV file and positional images"),
    responses(
        (status = 200, description = "Import summary, or `Archivo inválido`", body = ImportResponse),
        (status = 400, description = "Malformed CSV", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form))]
pub async fn import_csv(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<ImportResponse>, AppError> {
    let file = form
        .take_file("request")
        .ok_or_else(|| AppError::Validation("Missing 'request' file".into()))?;
    let batch = batch_from_upload(&file)?;
    run_import(&state, &batch, &mut form).await
}
