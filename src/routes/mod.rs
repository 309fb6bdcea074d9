//! Router assembly: common routes at the root, resource routes under the prefix,
//! then body limit, CORS and request tracing layers.

pub mod common;
pub mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::config::ServerConfig;
use crate::response::error_body;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

async fn fallback(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(error_body("not_found", format!("no route for {}", uri.path()), None)),
    )
}

/// Full application router for a loaded state.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let api = resource_routes(state.clone());
    let prefix = config.prefix.trim_end_matches('/');

    let mut app = Router::new().merge(common_routes(state));
    app = if prefix.is_empty() {
        app.merge(api)
    } else {
        app.nest(prefix, api)
    };

    let app = app
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.no_cors {
        app
    } else {
        app.layer(CorsLayer::permissive())
    }
}
