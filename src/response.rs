//! Standard response envelope helpers.
//!
//! Every success body is `{ "data": <payload> }`. Windowed list responses also carry
//! `X-Total-Count` and, for pages, a `Link` header.

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, Json(Envelope { data }))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::OK, Json(Envelope { data }))
}

/// `{ "data": {} }`, used as the delete confirmation.
pub fn success_empty() -> (StatusCode, Json<Envelope<serde_json::Value>>) {
    success_one_ok(serde_json::Value::Object(serde_json::Map::new()))
}

/// List payload plus the out-of-band headers produced by pagination or slicing.
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub total_count: Option<usize>,
    pub link: Option<String>,
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> SuccessMany<T> {
    SuccessMany {
        data,
        total_count: None,
        link: None,
    }
}

impl<T: Serialize> IntoResponse for SuccessMany<T> {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        let mut exposed = Vec::new();
        if let Some(total) = self.total_count {
            headers.insert(HeaderName::from_static(TOTAL_COUNT_HEADER), HeaderValue::from(total));
            exposed.push("X-Total-Count");
        }
        if let Some(link) = self.link.and_then(|l| HeaderValue::from_str(&l).ok()) {
            headers.insert(header::LINK, link);
            exposed.push("Link");
        }
        if !exposed.is_empty() {
            if let Ok(v) = HeaderValue::from_str(&exposed.join(", ")) {
                headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, v);
            }
        }
        (StatusCode::OK, headers, Json(Envelope { data: self.data })).into_response()
    }
}

/// Error envelope for failures raised outside `AppError`, such as unmatched routes.
pub fn error_body(code: &str, message: String, details: Option<serde_json::Value>) -> serde_json::Value {
    let mut error = serde_json::json!({ "code": code, "message": message });
    if let (Some(details), Some(obj)) = (details, error.as_object_mut()) {
        obj.insert("details".to_string(), details);
    }
    serde_json::json!({ "error": error })
}
