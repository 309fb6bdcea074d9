//! Resource handlers: list, create, read, replace, merge, delete, nested list/create,
//! and the singular-resource variants of GET/PUT/PATCH on `/<resource>`.

use crate::config::ResourceKind;
use crate::error::AppError;
use crate::extractors::{JsonBody, ListParams};
use crate::response::{success_empty, success_many, success_one, success_one_ok};
use crate::service::{ListOutput, ResourceService};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use serde_json::Value;

fn list_response(output: ListOutput, uri: &Uri) -> Response {
    let mut many = success_many(output.items);
    many.total_count = output.total;
    many.link = output
        .links
        .and_then(|links| links.to_header(uri.path(), uri.query().unwrap_or("")));
    many.into_response()
}

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    OriginalUri(uri): OriginalUri,
    ListParams(query): ListParams,
) -> Result<Response, AppError> {
    let db = state.read_db()?;
    let spec = ResourceService::spec(&state.model, &resource)?;
    if spec.kind == ResourceKind::Singular {
        let data = ResourceService::read_singular(&db, &resource)?;
        return Ok(success_one_ok(data).into_response());
    }
    let output = ResourceService::list(&db, &state.model, &resource, &query)?;
    Ok(list_response(output, &uri))
}

pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let created = {
        let mut db = state.write_db()?;
        ResourceService::create(&mut db, &state.model, &resource, body)?
    };
    state.persist().await;
    Ok(success_one(created))
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    ListParams(query): ListParams,
) -> Result<impl IntoResponse, AppError> {
    let db = state.read_db()?;
    let record = ResourceService::read(&db, &state.model, &resource, &id, &query)?;
    Ok(success_one_ok(record))
}

async fn write_record(state: AppState, resource: String, id: String, body: Value, merge: bool) -> Result<Value, AppError> {
    let updated = {
        let mut db = state.write_db()?;
        ResourceService::update(&mut db, &state.model, &resource, &id, body, merge)?
    };
    state.persist().await;
    Ok(updated)
}

pub async fn replace(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let updated = write_record(state, resource, id, body, false).await?;
    Ok(success_one_ok(updated))
}

pub async fn merge(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let updated = write_record(state, resource, id, body, true).await?;
    Ok(success_one_ok(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    {
        let mut db = state.write_db()?;
        ResourceService::delete(&mut db, &state.model, &resource, &id)?;
    }
    state.persist().await;
    Ok(success_empty())
}

pub async fn nested_list(
    State(state): State<AppState>,
    Path((parent, parent_id, child)): Path<(String, String, String)>,
    OriginalUri(uri): OriginalUri,
    ListParams(query): ListParams,
) -> Result<Response, AppError> {
    let db = state.read_db()?;
    let output = ResourceService::nested_list(&db, &state.model, &parent, &parent_id, &child, query)?;
    Ok(list_response(output, &uri))
}

pub async fn nested_create(
    State(state): State<AppState>,
    Path((parent, parent_id, child)): Path<(String, String, String)>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let created = {
        let mut db = state.write_db()?;
        ResourceService::nested_create(&mut db, &state.model, &parent, &parent_id, &child, body)?
    };
    state.persist().await;
    Ok(success_one(created))
}

async fn write_singular(state: AppState, resource: String, body: Value, merge: bool) -> Result<Value, AppError> {
    let updated = {
        let mut db = state.write_db()?;
        ResourceService::write_singular(&mut db, &resource, body, merge)?
    };
    state.persist().await;
    Ok(updated)
}

/// PUT /<resource> on a singular resource.
pub async fn replace_singular(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let updated = write_singular(state, resource, body, false).await?;
    Ok(success_one_ok(updated))
}

/// PATCH /<resource> on a singular resource.
pub async fn merge_singular(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let updated = write_singular(state, resource, body, true).await?;
    Ok(success_one_ok(updated))
}
