use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::{
    reservation::show_availability,
    unit::{
        delete_unit, register_unit, show_unit, show_unit_list, update_unit, update_unit_status,
    },
};

pub fn build_unit_routers() -> Router<AppRegistry> {
    let units_routers = Router::new()
        .route("/", post(register_unit))
        .route("/", get(show_unit_list))
        .route("/:unit_id", get(show_unit))
        .route("/:unit_id", put(update_unit))
        .route("/:unit_id", delete(delete_unit))
        .route("/:unit_id/status", put(update_unit_status))
        .route("/:unit_id/availability", get(show_availability));

    Router::new().nest("/units", units_routers)
}
