//! Whole-database snapshot and the root index.

use crate::config::ResourceKind;
use crate::error::AppError;
use crate::response::success_one_ok;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// GET /db: every resource in one document, not wrapped in the `data` envelope.
pub async fn snapshot(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db = state.read_db()?;
    Ok(Json(db.to_value()))
}

/// GET /: server name and the resources it serves.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let resources: Vec<_> = state
        .model
        .resources
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "kind": match r.kind {
                    ResourceKind::Collection => "collection",
                    ResourceKind::Singular => "singular",
                },
                "foreignKey": r.foreign_key,
            })
        })
        .collect();
    success_one_ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "resources": resources,
    }))
}
