mod common;

use axum::http::StatusCode;
use common::{TEST_PASSWORD, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": TEST_PASSWORD,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"]["id"].as_i64().unwrap() > 0);
    assert!(body["access"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_register_is_mounted_under_api_prefix() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "bob", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = spawn_app().await;
    app.register("carol").await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "username": "carol", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    for password in ["short1!", "alllowercase1!", "NoDigits!!", "NoSpecial123"] {
        let (status, body) = app
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({ "username": "dave", "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {password}");
        assert!(body["error"].is_string());
    }

    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "username": "has space", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "username": "erin", "email": "not-an-email", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let app = spawn_app().await;
    app.register("frank").await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "frank", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "frank", "password": "Wr0ng!pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_kinds_are_not_interchangeable() {
    let app = spawn_app().await;
    app.register("gina").await;

    let (_, tokens) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "gina", "password": TEST_PASSWORD })),
        )
        .await;
    let access = tokens["access"].as_str().unwrap();
    let refresh = tokens["refresh"].as_str().unwrap();

    let (status, _) = app.get("/api/user/preferences", refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            "POST",
            "/auth/token/refresh",
            None,
            Some(json!({ "refresh": access })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(
            "POST",
            "/auth/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let new_access = body["access"].as_str().unwrap();
    let (status, body) = app.get("/api/user/preferences", new_access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "gina");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = spawn_app().await;

    for uri in [
        "/api/anime/search?q=x",
        "/anime/recommendations",
        "/api/genres",
        "/user/preferences",
        "/api/user/ratings",
    ] {
        let (status, body) = app.request("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} was not protected");
        assert!(body["error"].is_string());
    }

    let (status, _) = app.get("/api/genres", "garbage.token.value").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.catalog.hits(), 0);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = app.request("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}
