use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use tracing::instrument;

use super::{delete_failure, image_response};
use crate::error::{AppError, DefaultResponse};
use crate::extractors::form::FormData;
use crate::models::comuna::ComunaResponse;
use crate::models::import::{ImportResponse, parse_comuna_names};
use crate::models::region::{
    ALL_CANNOT_DELETE, ALL_DELETED, GetRegionResponse, NO_REGIONS, PageQuery, REGION_CANNOT_DELETE,
    REGION_DELETED, REGION_FOUND, REGION_NOT_FOUND, REGION_SAVED, REGION_UPDATED,
    REGION_WITH_COMUNAS_FOUND, REGIONS_FOUND, RegionComunasPage, RegionFields, RegionListResponse,
    RegionWithComunaNames,
};
use crate::services::region::RegionService;
use crate::state::AppState;

fn region_fields(form: &FormData) -> Result<RegionFields, AppError> {
    Ok(RegionFields {
        id: form.parse("idregion")?,
        name: form.text("nombre").map(str::to_owned),
        active: form.parse("active")?,
    })
}

#[utoipa::path(
    get,
    path = "/region/{id}",
    tag = "Regions",
    operation_id = "getRegion",
    summary = "Get a region by ID",
    params(("id" = i32, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Region found, or `Región no encontrada`", body = GetRegionResponse),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_region(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GetRegionResponse>, AppError> {
    let region = RegionService::new(&state.db, &*state.images).get(id).await?;
    Ok(Json(GetRegionResponse {
        mensaje: REGION_FOUND.into(),
        region: region.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/region/{id}/comuna",
    tag = "Regions",
    operation_id = "getRegionComunas",
    summary = "Get a region with a page of its comunas",
    params(("id" = i32, Path, description = "Region ID"), PageQuery),
    responses(
        (status = 200, description = "Region and comunas, or `Región no encontrada`", body = RegionComunasPage),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn get_region_comunas(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RegionComunasPage>, AppError> {
    let (limit, offset) = (query.limit(), query.offset());
    let (region, comunas, total) = RegionService::new(&state.db, &*state.images)
        .get_with_comunas(id, limit, offset)
        .await?;

    Ok(Json(RegionComunasPage {
        mensaje: REGION_WITH_COMUNAS_FOUND.into(),
        region: region.into(),
        comunas: comunas.into_iter().map(ComunaResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

#[utoipa::path(
    get,
    path = "/region/{id}/imagen",
    tag = "Regions",
    operation_id = "getRegionImage",
    summary = "Download the image of a region",
    description = "Streams the stored image, or the default image when the region has none. \
        A record whose image file has disappeared is repaired on the fly.",
    params(("id" = i32, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Image bytes"),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_region_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let image = RegionService::new(&state.db, &*state.images).image(id).await?;
    image_response(image)
}

#[utoipa::path(
    get,
    path = "/region",
    tag = "Regions",
    operation_id = "listRegions",
    summary = "List regions with their comuna names",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of regions", body = RegionListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_regions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RegionListResponse>, AppError> {
    let (limit, offset) = (query.limit(), query.offset());
    let (page, total) = RegionService::new(&state.db, &*state.images)
        .list_with_comunas(limit, offset)
        .await?;

    if page.is_empty() {
        return Ok(Json(RegionListResponse {
            mensaje: NO_REGIONS.into(),
            regiones: None,
            total: None,
            limit: None,
            offset: None,
        }));
    }

    let regiones = page
        .into_iter()
        .map(|(region, comunas)| RegionWithComunaNames {
            region: region.into(),
            comunas,
        })
        .collect();

    Ok(Json(RegionListResponse {
        mensaje: REGIONS_FOUND.into(),
        regiones: Some(regiones),
        total: Some(total),
        limit: Some(limit),
        offset: Some(offset),
    }))
}

#[utoipa::path(
    post,
    path = "/region",
    tag = "Regions",
    operation_id = "saveRegion",
    summary = "Create a region",
    description = "Multipart form with `nombre`, optional `idregion`, `active` and `imagen`. \
        Only `.png` and `.jpg` images are kept; other files are ignored.",
    request_body(content_type = "multipart/form-data", description = "Region fields and optional image"),
    responses(
        (status = 200, description = "`Región guardada`, or an error envelope", body = DefaultResponse),
        (status = 400, description = "Malformed form", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form))]
pub async fn save_region(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<DefaultResponse>, AppError> {
    let fields = region_fields(&form)?;
    let image = form.take_file("imagen");

    RegionService::new(&state.db, &*state.images)
        .create(fields, image.as_ref())
        .await?;
    Ok(Json(DefaultResponse::new(REGION_SAVED)))
}

#[utoipa::path(
    post,
    path = "/region/{id}/comuna",
    tag = "Regions",
    operation_id = "saveRegionComunas",
    summary = "Add comunas to a region",
    description = "`request` is a JSON array of comuna names; `imagenes` holds one file part per \
        name, matched by position. Names that already exist are skipped and reported.",
    params(("id" = i32, Path, description = "Region ID")),
    request_body(content_type = "multipart/form-data", description = "Comuna names and images"),
    responses(
        (status = 200, description = "Import summary, or `Región no encontrada`", body = ImportResponse),
        (status = 400, description = "Malformed request", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn save_region_comunas(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: FormData,
) -> Result<Json<ImportResponse>, AppError> {
    let names = parse_comuna_names(form.require_text("request")?)?;
    let images = form.take_files("imagenes");

    let summary = RegionService::new(&state.db, &*state.images)
        .save_comunas(id, &names, &images)
        .await?;
    Ok(Json(ImportResponse::comunas(&summary)))
}

#[utoipa::path(
    put,
    path = "/region/{id}",
    tag = "Regions",
    operation_id = "updateRegion",
    summary = "Update a region",
    description = "Only the fields present in the form are changed. A different `idregion` \
        moves the region to that id.",
    params(("id" = i32, Path, description = "Region ID")),
    request_body(content_type = "multipart/form-data", description = "Fields to change and optional image"),
    responses(
        (status = 200, description = "`Región actualizada`, or an error envelope", body = DefaultResponse),
        (status = 400, description = "Malformed form", body = DefaultResponse),
    ),
)]
#[instrument(skip(state, form), fields(id))]
pub async fn update_region(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut form: FormData,
) -> Result<Json<DefaultResponse>, AppError> {
    let fields = region_fields(&form)?;
    let image = form.take_file("imagen");

    RegionService::new(&state.db, &*state.images)
        .update(id, fields, image.as_ref())
        .await?;
    Ok(Json(DefaultResponse::new(REGION_UPDATED)))
}

#[utoipa::path(
    delete,
    path = "/region/{id}",
    tag = "Regions",
    operation_id = "deleteRegion",
    summary = "Delete a region",
    params(("id" = i32, Path, description = "Region ID")),
    responses(
        (status = 200, description = "Deleted, not found, or rejected by the store", body = DefaultResponse),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn delete_region(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DefaultResponse>, AppError> {
    RegionService::new(&state.db, &*state.images)
        .remove(id)
        .await
        .map_err(|e| delete_failure(e, REGION_NOT_FOUND, REGION_CANNOT_DELETE))?;
    Ok(Json(DefaultResponse::ok(REGION_DELETED)))
}

#[utoipa::path(
    delete,
    path = "/region",
    tag = "Regions",
    operation_id = "deleteAllRegions",
    summary = "Delete every region, comuna and image",
    responses(
        (status = 200, description = "Everything deleted, or rejected by the store", body = DefaultResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DefaultResponse>, AppError> {
    RegionService::new(&state.db, &*state.images)
        .remove_all()
        .await
        .map_err(|e| delete_failure(e, ALL_CANNOT_DELETE, ALL_CANNOT_DELETE))?;
    Ok(Json(DefaultResponse::ok(ALL_DELETED)))
}
