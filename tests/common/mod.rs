//! Shared fixture: a JSONPlaceholder-shaped database and a oneshot request helper.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use json_mock_api::{build_app, resolve, AppState, Database, ServerConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use tower::ServiceExt;

const WORDS: [&str; 10] = [
    "sunt", "qui", "est", "lorem", "dolor", "eum", "nesciunt", "ea", "molestias", "quasi",
];

pub fn post(i: usize) -> Value {
    json!({
        "userId": (i - 1) / 10 + 1,
        "id": i,
        "title": format!("{} {} {}", WORDS[i % 10], WORDS[(i * 3) % 10], WORDS[(i * 7) % 10]),
        "body": format!("body of post {} {}", i, WORDS[(i * 9) % 10]),
    })
}

pub fn database() -> Value {
    let users: Vec<Value> = (1..=10)
        .map(|i| json!({ "id": i, "name": format!("user {}", i), "username": format!("u{}", i), "email": format!("u{}@example.com", i) }))
        .collect();
    let posts: Vec<Value> = (1..=100).map(post).collect();
    let comments: Vec<Value> = (1..=500)
        .map(|i| json!({ "postId": (i - 1) / 5 + 1, "id": i, "name": format!("comment {}", i), "body": "nice" }))
        .collect();
    json!({
        "posts": posts,
        "comments": comments,
        "users": users,
        "profile": { "name": "typicode" }
    })
}

pub fn state_with(config: &ServerConfig) -> AppState {
    let db = Database::from_value(database()).expect("fixture database");
    let model = resolve(&db, &HashMap::new(), &config.foreign_key_suffix).expect("fixture model");
    AppState::from_config(db, model, config)
}

pub fn app_with(config: ServerConfig) -> Router {
    let state = state_with(&config);
    build_app(state, &config)
}

pub fn app() -> Router {
    app_with(ServerConfig::default())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn ids(&self) -> Vec<i64> {
        self.data()
            .as_array()
            .expect("data is an array")
            .iter()
            .map(|r| r["id"].as_i64().expect("numeric id"))
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    send_raw(app, method, uri, body.map(|v| v.to_string())).await
}

/// Like `send`, with the body text passed through untouched.
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: Option<String>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header("content-type", "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request");
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse { status, headers, body }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None).await
}
