//! Resource routes. Paths are parameterized; handlers resolve the resource by name.

use crate::handlers::{
    create, delete as delete_handler, list, merge, merge_singular, nested_create, nested_list, read, replace,
    replace_singular, snapshot,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/db", get(snapshot))
        .route(
            "/:resource",
            get(list).post(create).put(replace_singular).patch(merge_singular),
        )
        .route("/:resource/", get(list).post(create))
        .route(
            "/:resource/:id",
            get(read).put(replace).patch(merge).delete(delete_handler),
        )
        .route("/:resource/:id/:nested", get(nested_list).post(nested_create))
        .with_state(state)
}
