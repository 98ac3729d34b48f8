use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use tracing::instrument;

use super::{delete_failure, image_response};
use crate::error::{AppError, DefaultResponse};
use crate::extractors::form::FormData;
use crate::models::comuna::{
    COMUNA_CANNOT_DELETE, COMUNA_DELETED, COMUNA_FOUND, COMUNA_NOT_FOUND, COMUNA_SAVED,
    COMUNA_UPDATED, ComunaFields, ComunaResponse, GetComunaResponse,
};
use crate::services::comuna::ComunaService;
use crate::state::AppState;

fn comuna_fields(form: &FormData) -> Result<ComunaFields, AppError> {
    Ok(ComunaFields {
        id: form.parse("idcomuna")?,
        region_id: form.parse("idregion")?,
        name: form.text("nombre").map(str::to_owned),
        active: form.parse("active")?,
    })
}

#[utoipa::path(
    get,
    path = "/comuna/{id}",
    tag = "Comunas",
    operation_id = "getComuna",
    summary = "Get a comuna by ID",
    description = "The response carries the name of the comuna's region.",
    params(("id" = i32, Path, description = "Comuna ID")),
    responses(
        (status = 200, description = "Comuna found, or `Comuna no encontrada`", body = GetComunaResponse),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_comuna(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GetComunaResponse>, AppError> {
    let (comuna, region_name) = ComunaService::new(&state.db, &*state.images).get(id).await?;

    let mut comuna = ComunaResponse::from(comuna);
    comuna.region = Some(region_name);
    Ok(Json(GetComunaResponse {
        mensaje: COMUNA_FOUND.into(),
        comuna,
    }))
}

#[utoipa::path(
    get,
    path = "/comuna/{id}/imagen",
    tag = "Comunas",
    operation_id = "getComunaImage",
    summary = "Download the image of a comuna",
    params(("id" = i32, Path, description = "Comuna ID")),
    responses(
        (status = 200, description = "Image bytes, or the default image"),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_comuna_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let image = ComunaService::new(&state.db, &*state.images).image(id).await?;
    image_response(image)
}

#[utoipa::path(
    post,
    path = "/comuna",
    tag = "Comunas",
    operation_id = "saveComuna",
    summary = "Create a comuna",
    description = "Multipart form with `idregion`, `nombre`, optional `idcomuna`, `active` and `imagen`.",
    request_body(content_type = "multipart/form-data", description = "Comuna fields and optional image"),
    responses(
        (status = 200, description = "`Comuna guardada`, or an error envelope", body = DefaultResponse),
        (status = 400, description = "Malformed form", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form))]
pub async fn save_comuna(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<DefaultResponse>, AppError> {
    let fields = comuna_fields(&form)?;
    let image = form.take_file("imagen");

    ComunaService::new(&state.db, &*state.images)
        .create(fields, image.as_ref())
        .await?;
    Ok(Json(DefaultResponse::new(COMUNA_SAVED)))
}

#[utoipa::path(
    put,
    path = "/comuna/{id}",
    tag = "Comunas",
    operation_id = "updateComuna",
    summary = "Update a comuna",
    params(("id" = i32, Path, description = "Comuna ID")),
    request_body(content_type = "multipart/form-data", description = "Fields to change and optional image"),
    responses(
        (status = 200, description = "`Comuna actualizada`, or an error envelope", body = DefaultResponse),
        (status = 400, description = "Malformed form", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn update_comuna(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: FormData,
) -> Result<Json<DefaultResponse>, AppError> {
    let fields = comuna_fields(&form)?;
    let image = form.take_file("imagen");

    ComunaService::new(&state.db, &*state.images)
        .update(id, fields, image.as_ref())
        .await?;
    Ok(Json(DefaultResponse::new(COMUNA_UPDATED)))
}

#[utoipa::path(
    delete,
    path = "/comuna/{id}",
    tag = "Comunas",
    operation_id = "deleteComuna",
    summary = "Delete a comuna",
    params(("id" = i32, Path, description = "Comuna ID")),
    responses(
        (status = 200, description = "Deleted, not found, or rejected by the store", body = DefaultResponse),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_comuna(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DefaultResponse>, AppError> {
    ComunaService::new(&state.db, &*state.images)
        .remove(id)
        .await
        .map_err(|e| delete_failure(e, COMUNA_NOT_FOUND, COMUNA_CANNOT_DELETE))?;
    Ok(Json(DefaultResponse::ok(COMUNA_DELETED)))
}
