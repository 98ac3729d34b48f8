use serde::Serialize;

use crate::entity::comuna;

/// Comuna as exposed over HTTP.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ComunaResponse {
    #[schema(example = 101)]
    pub idcomuna: i32,
    #[schema(example = 13)]
    pub idregion: i32,
    #[schema(example = "Providencia")]
    pub nombre: String,
    #[schema(example = 1)]
    pub active: i16,
    /// Extension of the attached image (`.png` / `.jpg`), if any.
    pub url: Option<String>,
    /// Parent region name, resolved at read time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl From<comuna::Model> for ComunaResponse {
    fn from(model: comuna::Model) -> Self {
        Self {
            idcomuna: model.id,
            idregion: model.region_id,
            nombre: model.name,
            active: model.active,
            url: model.image_extension,
            region: None,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GetComunaResponse {
    pub mensaje: String,
    pub comuna: ComunaResponse,
}

/// Fields accepted when saving or updating a comuna. `None` leaves the
/// stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct ComunaFields {
    pub id: Option<i32>,
    pub region_id: Option<i32>,
    pub name: Option<String>,
    pub active: Option<i16>,
}

pub const COMUNA_FOUND: &str = "Comuna obtenida";
pub const COMUNA_NOT_FOUND: &str = "Comuna no encontrada";
pub const COMUNA_REGISTERED: &str = "Comuna ya ha sido registrada anteriormente";
pub const COMUNA_SAVED: &str = "Comuna guardada";
pub const COMUNA_UPDATED: &str = "Comuna actualizada";
pub const COMUNA_DELETED: &str = "Comuna ha sido eliminada";
pub const COMUNA_CANNOT_DELETE: &str = "Comuna no puede ser eliminada";
