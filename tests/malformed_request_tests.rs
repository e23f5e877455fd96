mod common;

use axum::http::StatusCode;
use common::{media, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_unparseable_json_body_gets_json_error() {
    let app = spawn_app().await;

    let (status, body) = app
        .request_raw("POST", "/auth/register", None, "{\"username\": ")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{body}");
}

#[tokio::test]
async fn test_missing_json_field_gets_json_error() {
    let app = spawn_app().await;

    let (status, body) = app
        .request("POST", "/auth/login", None, Some(json!({ "username": "nobody" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("password")), "{body}");
}

#[tokio::test]
async fn test_wrongly_typed_rating_gets_json_error() {
    let app = spawn_app().await;
    let token = app.register("typo").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/user/ratings",
            Some(&token),
            Some(json!({ "anime_id": "one", "rating": 5 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn test_non_numeric_anime_id_gets_json_error() {
    let app = spawn_app().await;
    let token = app.register("pathy").await;

    let (status, body) = app.get("/api/anime/abc", &token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
    assert_eq!(app.catalog.hits(), 0);
}

#[tokio::test]
async fn test_invalid_refresh_flag_gets_json_error() {
    let app = spawn_app().await;
    app.catalog
        .set_media(vec![media(1, "Frieren", &["Drama"], Some(90), 1_000)]);
    let token = app.register("flaggy").await;

    let (status, body) = app.get("/api/anime/1?refresh=notabool", &token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
    assert_eq!(app.catalog.hits(), 0);
}

#[tokio::test]
async fn test_unknown_route_gets_json_error() {
    let app = spawn_app().await;

    let (status, body) = app.request("GET", "/api/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}
