#![allow(dead_code)]

use anirec::api::{self, AppState};
use anirec::config::Config;
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Str0ng!pass";

/// How the fake catalog answers the next requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMode {
    Normal,
    /// 503 for every request.
    Failing,
    /// `{"data": null}` for every request.
    NoData,
}

#[derive(Clone)]
struct CatalogState {
    hits: Arc<AtomicUsize>,
    mode: Arc<Mutex<CatalogMode>>,
    media: Arc<Mutex<Vec<Value>>>,
    genres: Arc<Mutex<Vec<String>>>,
}

/// Local stand-in for the AniList GraphQL endpoint.
#[derive(Clone)]
pub struct FakeCatalog {
    pub url: String,
    state: CatalogState,
}

impl FakeCatalog {
    pub async fn start() -> Self {
        let state = CatalogState {
            hits: Arc::new(AtomicUsize::new(0)),
            mode: Arc::new(Mutex::new(CatalogMode::Normal)),
            media: Arc::new(Mutex::new(Vec::new())),
            genres: Arc::new(Mutex::new(vec![
                "Action".to_string(),
                "Comedy".to_string(),
                "Drama".to_string(),
            ])),
        };

        let app = Router::new()
            .route("/", post(graphql))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/"),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn set_mode(&self, mode: CatalogMode) {
        *self.state.mode.lock().unwrap() = mode;
    }

    pub fn set_media(&self, media: Vec<Value>) {
        *self.state.media.lock().unwrap() = media;
    }

    pub fn set_genres(&self, genres: &[&str]) {
        *self.state.genres.lock().unwrap() = genres.iter().map(ToString::to_string).collect();
    }
}

async fn graphql(State(state): State<CatalogState>, Json(body): Json<Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    match *state.mode.lock().unwrap() {
        CatalogMode::Failing => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
        CatalogMode::NoData => return Json(json!({ "data": null })).into_response(),
        CatalogMode::Normal => {}
    }

    let query = body["query"].as_str().unwrap_or_default();
    let vars = &body["variables"];
    let media = state.media.lock().unwrap().clone();

    let data = if query.contains("GenreCollection") {
        let genres = state.genres.lock().unwrap().clone();
        json!({ "GenreCollection": genres })
    } else if query.contains("Media(id:") {
        let id = vars["id"].as_i64().unwrap_or_default();
        let found = media.into_iter().find(|m| m["id"].as_i64() == Some(id));
        json!({ "Media": found })
    } else if query.contains("genre_in") {
        let wanted: Vec<String> = vars["genres"]
            .as_array()
            .map(|a| a.iter().filter_map(|g| g.as_str().map(String::from)).collect())
            .unwrap_or_default();
        let matches: Vec<Value> = media
            .into_iter()
            .filter(|m| has_any_genre(m, &wanted))
            .collect();
        page(matches, vars)
    } else {
        let search = vars["search"].as_str().map(str::to_lowercase);
        let genre = vars["genre"].as_str().map(String::from);
        let matches: Vec<Value> = media
            .into_iter()
            .filter(|m| {
                search.as_ref().is_none_or(|s| {
                    m["title"]["romaji"]
                        .as_str()
                        .is_some_and(|t| t.to_lowercase().contains(s))
                })
            })
            .filter(|m| genre.as_ref().is_none_or(|g| has_any_genre(m, std::slice::from_ref(g))))
            .collect();
        page(matches, vars)
    };

    Json(json!({ "data": data })).into_response()
}

fn has_any_genre(media: &Value, wanted: &[String]) -> bool {
    media["genres"]
        .as_array()
        .is_some_and(|gs| gs.iter().any(|g| wanted.iter().any(|w| g == w)))
}

fn page(matches: Vec<Value>, vars: &Value) -> Value {
    let page = vars["page"].as_i64().unwrap_or(1).max(1);
    let per_page = vars["perPage"].as_i64().unwrap_or(10).max(1);
    let total = matches.len() as i64;
    let last_page = ((total + per_page - 1) / per_page).max(1);

    let items: Vec<Value> = matches
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .collect();

    json!({
        "Page": {
            "pageInfo": {
                "total": total,
                "currentPage": page,
                "lastPage": last_page,
                "hasNextPage": page < last_page,
                "perPage": per_page,
            },
            "media": items,
        }
    })
}

/// A catalog media record in AniList's wire shape.
pub fn media(id: i32, romaji: &str, genres: &[&str], score: Option<i32>, popularity: i32) -> Value {
    json!({
        "id": id,
        "title": { "romaji": romaji, "english": null, "native": null },
        "description": format!("{romaji} description"),
        "genres": genres,
        "averageScore": score,
        "popularity": popularity,
        "episodes": 12,
        "status": "FINISHED",
        "coverImage": { "large": format!("https://img.example/{id}.jpg") },
    })
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("Authorization", format!("Bearer {token}")),
        None => builder,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub catalog: FakeCatalog,
}

pub fn test_config(catalog_url: &str) -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.catalog.api_url = catalog_url.to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let catalog = FakeCatalog::start().await;
    let mut config = test_config(&catalog.url);
    customize(&mut config);

    let state = api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    TestApp {
        router: api::router(state.clone()),
        state,
        catalog,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => self.request_raw(method, uri, token, &body.to_string()).await,
            None => self.send(builder(method, uri, token).body(Body::empty()).unwrap()).await,
        }
    }

    /// Sends `body` verbatim as `application/json`, well-formed or not.
    pub async fn request_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = builder(method, uri, token)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", uri, Some(token), None).await
    }

    /// Registers `username` and returns its access token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["access"].as_str().unwrap().to_string()
    }

    pub async fn set_preferences(&self, token: &str, genres: &[&str], watched: &[i32]) {
        let (status, body) = self
            .request(
                "PUT",
                "/api/user/preferences",
                Some(token),
                Some(json!({ "favorite_genres": genres, "watched_anime": watched })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "preferences update failed: {body}");
    }
}
