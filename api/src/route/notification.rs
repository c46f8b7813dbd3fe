use axum::{
    routing::{get, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::notification::{mark_notification_read, show_notifications};

pub fn build_notification_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", get(show_notifications))
        .route("/:notification_id/read", put(mark_notification_read));

    Router::new().nest("/notifications", routers)
}
