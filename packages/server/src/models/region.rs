use serde::{Deserialize, Serialize};

use crate::entity::region;

/// Region as exposed over HTTP.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegionResponse {
    #[schema(example = 13)]
    pub idregion: i32,
    #[schema(example = "Metropolitana")]
    pub nombre: String,
    #[schema(example = 1)]
    pub active: i16,
    /// Extension of the attached image (`.png` / `.jpg`), if any.
    #[schema(example = ".png")]
    pub url: Option<String>,
}

impl From<region::Model> for RegionResponse {
    fn from(model: region::Model) -> Self {
        Self {
            idregion: model.id,
            nombre: model.name,
            active: model.active,
            url: model.image_extension,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GetRegionResponse {
    pub mensaje: String,
    pub region: RegionResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegionComunasPage {
    pub mensaje: String,
    pub region: RegionResponse,
    pub comunas: Vec<super::comuna::ComunaResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// A region paired with the names of its comunas.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegionWithComunaNames {
    pub region: RegionResponse,
    pub comunas: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegionListResponse {
    pub mensaje: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regiones: Option<Vec<RegionWithComunaNames>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Default page size for region and comuna listings.
pub const DEFAULT_LIMIT: u64 = 1000;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size (default 1000).
    pub limit: Option<u64>,
    /// Number of rows to skip (default 0).
    pub offset: Option<u64>,
}

impl PageQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Fields accepted when saving or updating a region. `None` leaves the
/// stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct RegionFields {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub active: Option<i16>,
}

pub const REGION_FOUND: &str = "Región obtenida";
pub const REGION_WITH_COMUNAS_FOUND: &str = "Región y comunas obtenidas";
pub const REGIONS_FOUND: &str = "Regiones y comunas obtenidas";
pub const NO_REGIONS: &str = "No hay regiones ni comunas disponibles";
pub const REGION_NOT_FOUND: &str = "Región no encontrada";
pub const REGION_REGISTERED: &str = "Región ya ha sido registrada anteriormente";
pub const REGION_SAVED: &str = "Región guardada";
pub const REGION_UPDATED: &str = "Región actualizada";
pub const REGION_DELETED: &str = "Región ha sido eliminada";
pub const REGION_CANNOT_DELETE: &str = "Región no puede ser eliminada";
pub const ALL_DELETED: &str = "Registros han sido eliminados";
pub const ALL_CANNOT_DELETE: &str = "Registros no pueden ser eliminados";
