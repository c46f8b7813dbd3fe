use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::plan::{
    delete_plan, register_plan, show_plan, show_plan_list, show_quote, update_plan,
};

pub fn build_plan_routers() -> Router<AppRegistry> {
    let plans_routers = Router::new()
        .route("/", post(register_plan))
        .route("/", get(show_plan_list))
        .route("/quote", get(show_quote))
        .route("/:plan_id", get(show_plan))
        .route("/:plan_id", put(update_plan))
        .route("/:plan_id", delete(delete_plan));

    Router::new().nest("/plans", plans_routers)
}
