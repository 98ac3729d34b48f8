use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{comuna, import, region};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(region_routes())
        .merge(comuna_routes())
        .merge(import_routes())
}

fn region_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            region::list_regions,
            region::save_region,
            region::delete_all
        ))
        .routes(routes!(
            region::get_region,
            region::update_region,
            region::delete_region
        ))
        .routes(routes!(
            region::get_region_comunas,
            region::save_region_comunas
        ))
        .routes(routes!(region::get_region_image))
}

fn comuna_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(comuna::save_comuna))
        .routes(routes!(
            comuna::get_comuna,
            comuna::update_comuna,
            comuna::delete_comuna
        ))
        .routes(routes!(comuna::get_comuna_image))
}

fn import_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(import::import_json))
        .routes(routes!(import::import_csv))
}
