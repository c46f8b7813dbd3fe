use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{
    confirm_reservation, create_reservation, show_reservation, show_reservation_by_code,
    show_reservation_list, update_payment, update_reservation_status,
};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservations_routers = Router::new()
        .route("/", post(create_reservation))
        .route("/", get(show_reservation_list))
        .route("/code/:booking_code", get(show_reservation_by_code))
        .route("/:reservation_id", get(show_reservation))
        .route("/:reservation_id/status", put(update_reservation_status))
        .route("/:reservation_id/confirm", post(confirm_reservation))
        .route("/:reservation_id/payment", put(update_payment));

    Router::new().nest("/reservations", reservations_routers)
}
