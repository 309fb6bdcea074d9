//! CRUD behavior of resource endpoints over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::{app, app_with, get, post, send, send_raw};
use json_mock_api::ServerConfig;
use serde_json::json;

#[tokio::test]
async fn create_assigns_next_id_and_is_readable() {
    let app = app();
    let created = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({ "title": "title", "body": "body", "userId": 1 })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["id"], json!(101));

    let read = get(&app, "/api/posts/101").await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(
        read.body,
        json!({ "data": { "title": "title", "body": "body", "userId": 1, "id": 101 } })
    );
}

#[tokio::test]
async fn create_with_supplied_id_keeps_it() {
    let app = app();
    let created = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "name", "username": "username", "id": 11 })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let read = get(&app, "/api/users/11").await;
    assert_eq!(read.data()["username"], json!("username"));
}

#[tokio::test]
async fn create_after_largest_numeric_id_still_succeeds() {
    let app = app();
    let max = send(&app, Method::POST, "/api/users", Some(json!({ "id": i64::MAX }))).await;
    assert_eq!(max.status, StatusCode::CREATED);

    let next = send(&app, Method::POST, "/api/users", Some(json!({ "name": "x" }))).await;
    assert_eq!(next.status, StatusCode::CREATED);
    assert!(next.data()["id"].is_string());
}

#[tokio::test]
async fn create_with_existing_id_is_server_error() {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({ "id": 50, "title": "title", "body": "body", "userId": 1 })),
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"]["code"], json!("conflict"));
    assert_eq!(get(&app, "/api/posts/50").await.data()["title"], post(50)["title"]);
}

#[tokio::test]
async fn create_rejects_non_object_body() {
    let app = app();
    let response = send(&app, Method::POST, "/api/posts", Some(json!([1, 2]))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_uses_error_envelope() {
    let app = app();
    let response = send_raw(&app, Method::POST, "/api/posts", Some("{ title: }".to_string())).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["code"], json!("bad_request"));

    let patch = send_raw(&app, Method::PATCH, "/api/posts/1", Some("not json".to_string())).await;
    assert_eq!(patch.status, StatusCode::BAD_REQUEST);
    assert_eq!(patch.body["error"]["code"], json!("bad_request"));
}

#[tokio::test]
async fn reads_whole_collection_and_single_record() {
    let app = app();
    let all = get(&app, "/api/posts").await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.data().as_array().unwrap().len(), 100);
    assert!(all.header("x-total-count").is_none());

    let one = get(&app, "/api/posts/1").await;
    assert_eq!(one.body, json!({ "data": post(1) }));
}

#[tokio::test]
async fn missing_ids_and_resources_are_not_found() {
    let app = app();
    for uri in [
        "/api/posts/1234567",
        "/api/posts/impossible-filter",
        "/api/users/no-id-like-this",
        "/api/nothing",
        "/api/nothing/1",
        "/nowhere/at/all/here",
    ] {
        assert_eq!(get(&app, uri).await.status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn put_replaces_record_and_keeps_path_id() {
    let app = app();
    let response = send(
        &app,
        Method::PUT,
        "/api/posts/18",
        Some(json!({ "id": 999, "userId": 2, "title": "updated title" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let read = get(&app, "/api/posts/18").await;
    assert_eq!(read.data(), &json!({ "id": 18, "userId": 2, "title": "updated title" }));
    assert_eq!(get(&app, "/api/posts/999").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_merges_into_record() {
    let app = app();
    let response = send(&app, Method::PATCH, "/api/posts/7", Some(json!({ "title": "patched" }))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["title"], json!("patched"));
    assert_eq!(response.data()["body"], post(7)["body"]);
    assert_eq!(response.data()["id"], json!(7));
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let app = app();
    let body = Some(json!({ "userId": 1, "title": "updated title", "body": "updated body" }));
    assert_eq!(
        send(&app, Method::PUT, "/api/posts/180", body.clone()).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&app, Method::PATCH, "/api/posts/180", body).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn delete_removes_record_and_dependents() {
    let app = app();
    let response = send(&app, Method::DELETE, "/api/posts/89", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "data": {} }));

    assert_eq!(get(&app, "/api/posts/89").await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        send(&app, Method::DELETE, "/api/posts/89", None).await.status,
        StatusCode::NOT_FOUND
    );
    let comments = get(&app, "/api/comments?postId=89").await;
    assert!(comments.data().as_array().unwrap().is_empty());
    assert_eq!(get(&app, "/api/comments").await.data().as_array().unwrap().len(), 495);
}

#[tokio::test]
async fn delete_of_missing_record_is_not_found() {
    let app = app();
    assert_eq!(
        send(&app, Method::DELETE, "/api/posts/12345", None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn nested_create_sets_foreign_key() {
    let app = app();
    let created = send(&app, Method::POST, "/api/posts/3/comments", Some(json!({ "body": "hello" }))).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["postId"], json!(3));
    assert_eq!(created.data()["id"], json!(501));

    let nested = get(&app, "/api/posts/3/comments").await;
    assert_eq!(nested.data().as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn singular_resource_supports_get_put_patch() {
    let app = app();
    assert_eq!(get(&app, "/api/profile").await.body, json!({ "data": { "name": "typicode" } }));

    let merged = send(&app, Method::PATCH, "/api/profile", Some(json!({ "age": 3 }))).await;
    assert_eq!(merged.data(), &json!({ "name": "typicode", "age": 3 }));

    let replaced = send(&app, Method::PUT, "/api/profile", Some(json!({ "name": "x" }))).await;
    assert_eq!(replaced.data(), &json!({ "name": "x" }));
    assert_eq!(get(&app, "/api/profile/1").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn read_only_mode_rejects_mutations() {
    let app = app_with(ServerConfig {
        read_only: true,
        ..Default::default()
    });
    let attempts = [
        (Method::POST, "/api/posts", Some(json!({ "title": "x" }))),
        (Method::PUT, "/api/posts/1", Some(json!({ "title": "x" }))),
        (Method::PATCH, "/api/posts/1", Some(json!({ "title": "x" }))),
        (Method::DELETE, "/api/posts/1", None),
    ];
    for (method, uri, body) in attempts {
        assert_eq!(send(&app, method, uri, body).await.status, StatusCode::FORBIDDEN);
    }
    assert_eq!(get(&app, "/api/posts/1").await.body, json!({ "data": post(1) }));
}

#[tokio::test]
async fn persist_writes_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, common::database().to_string()).unwrap();
    let app = app_with(ServerConfig {
        persist: true,
        db: path.clone(),
        ..Default::default()
    });

    send(&app, Method::POST, "/api/users", Some(json!({ "name": "new" }))).await;

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let users = saved["users"].as_array().unwrap();
    assert_eq!(users.len(), 11);
    assert_eq!(users[10], json!({ "name": "new", "id": 11 }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_persist_final_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let app = app_with(ServerConfig {
        persist: true,
        db: path.clone(),
        ..Default::default()
    });

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let app = app.clone();
        tasks.spawn(async move {
            send(&app, Method::POST, "/api/users", Some(json!({ "name": format!("n{}", i) }))).await
        });
    }
    while let Some(done) = tasks.join_next().await {
        assert_eq!(done.unwrap().status, StatusCode::CREATED);
    }

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["users"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn custom_prefix_moves_resource_routes() {
    let app = app_with(ServerConfig {
        prefix: "/v2/".into(),
        ..Default::default()
    });
    assert_eq!(get(&app, "/v2/posts/1").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/api/posts/1").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_health_and_snapshot() {
    let app = app();
    let index = get(&app, "/").await;
    assert_eq!(index.status, StatusCode::OK);
    assert_eq!(index.data()["resources"].as_array().unwrap().len(), 4);

    assert_eq!(get(&app, "/health").await.body, json!({ "status": "ok" }));
    assert_eq!(get(&app, "/ready").await.body["status"], json!("ok"));
    assert_eq!(get(&app, "/version").await.body["name"], json!("json-mock-api"));

    let db = get(&app, "/api/db").await;
    assert_eq!(db.status, StatusCode::OK);
    assert!(db.body.get("data").is_none());
    assert_eq!(db.body["posts"].as_array().unwrap().len(), 100);
    assert_eq!(db.body["profile"]["name"], json!("typicode"));
}
