mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::FromRequestParts,
    http::{Request, StatusCode, header},
    response::IntoResponse,
};
use common::{FakeSpotify, USER_ID, artist, date, engine, track};
use playmgr::{
    api::{ApiError, CurrentUser, USER_ID_HEADER},
    server::{AppState, router},
    spotify::SpotifyError,
    sync::{RemoteStoreError, Stage, StoreOp, SyncError},
    types::{PlaylistId, TimeRange, TopItems},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

async fn extract(request: Request<()>) -> Result<CurrentUser, ApiError> {
    let (mut parts, _) = request.into_parts();
    CurrentUser::from_request_parts(&mut parts, &()).await
}

#[tokio::test]
async fn test_current_user_from_header() {
    let request = Request::builder()
        .header(USER_ID_HEADER, "user-1")
        .body(())
        .unwrap();

    assert_eq!(extract(request).await.unwrap(), CurrentUser("user-1".to_string()));
}

#[tokio::test]
async fn test_current_user_missing_or_blank_header() {
    let missing = Request::builder().body(()).unwrap();
    assert!(matches!(extract(missing).await, Err(ApiError::MissingUser)));

    let blank = Request::builder()
        .header(USER_ID_HEADER, "  ")
        .body(())
        .unwrap();
    assert!(matches!(extract(blank).await, Err(ApiError::MissingUser)));
}

fn batch_failure() -> SyncError {
    SyncError::RemoteStore {
        stage: Stage::DeleteAll,
        destination_modified: true,
        created_playlist: None,
        source: RemoteStoreError::Batch {
            op: StoreOp::Delete,
            playlist: PlaylistId::parse("pl"),
            batch: 1,
            total: 3,
            source: SpotifyError::Status {
                status: 429,
                message: "rate limited".to_string(),
            },
        },
    }
}

#[test]
fn test_status_mapping() {
    let cases = [
        (ApiError::MissingUser, StatusCode::UNAUTHORIZED),
        (
            ApiError::Sync(SyncError::Unauthenticated("x".into())),
            StatusCode::UNAUTHORIZED,
        ),
        (
            ApiError::Sync(SyncError::TokenRefreshRequired("x".into())),
            StatusCode::UNAUTHORIZED,
        ),
        (
            ApiError::Sync(SyncError::InvalidOperation("x".into())),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApiError::Sync(SyncError::NotFound("x".into())),
            StatusCode::NOT_FOUND,
        ),
        (
            ApiError::Sync(SyncError::Conflict("x".into())),
            StatusCode::CONFLICT,
        ),
        (ApiError::Sync(batch_failure()), StatusCode::BAD_GATEWAY),
        (
            ApiError::Sync(SyncError::Storage("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, status) in cases {
        assert_eq!(error.status(), status, "{error}");
    }
}

#[test]
fn test_partial_failure_message() {
    let message = batch_failure().to_string();

    assert!(message.contains("delete batch 1 of 3 on playlist pl failed"));
    assert!(message.contains("partially modified"));
    assert!(message.contains("re-run"));
}

#[test]
fn test_error_response_status() {
    let response = ApiError::Sync(SyncError::NotFound("playlist gone".into())).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn app(api: Arc<FakeSpotify>) -> Router {
    router(AppState {
        sync: Arc::new(engine(api)),
    })
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, USER_ID);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn playlist_ids(body: &Value) -> Vec<String> {
    body["playlist"]["tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_sort_route_returns_playlist() {
    let api = FakeSpotify::new().with_playlist(
        "pl",
        vec![
            track("old", "A", date(2001, 1, 1), 1),
            track("new", "B", date(2023, 1, 1), 1),
        ],
    );
    let app = app(api.clone());

    let (status, body) = send(&app, request("POST", "/playlists/pl/sort", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
    assert_eq!(body["playlist"]["id"], "pl");
    assert_eq!(body["playlist"]["totalTracks"], 2);
    assert_eq!(playlist_ids(&body), vec!["new", "old"]);
    assert_eq!(api.track_ids("pl"), vec!["new", "old"]);
}

#[tokio::test]
async fn test_copy_route_to_new_playlist() {
    let api = FakeSpotify::new().with_playlist("src", vec![track("s1", "S", date(2020, 1, 1), 1)]);
    let app = app(api.clone());

    let (status, body) = send(
        &app,
        request("POST", "/playlists/src/copy/new-playlist", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["playlist"]["name"], "Playlist src copy");
    assert_eq!(body["playlist"]["id"], "created-1");
    assert_eq!(api.track_ids("created-1"), vec!["s1"]);
}

#[tokio::test]
async fn test_sorting_liked_songs_is_bad_request() {
    let app = app(FakeSpotify::new());

    let (status, body) = send(&app, request("POST", "/playlists/liked-songs/sort", None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("Liked Songs"));
}

#[tokio::test]
async fn test_missing_playlist_is_not_found() {
    let app = app(FakeSpotify::new());

    let (status, body) = send(&app, request("GET", "/playlists/gone", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_favorite_routes() {
    let app = app(FakeSpotify::new());
    let add = || request("POST", "/playlists/favorites", Some(json!({ "playlistId": "p1" })));

    let (status, body) = send(&app, add()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": false, "favoritePlaylists": ["p1"] }));

    let (status, body) = send(&app, add()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], true);

    let (status, _) = send(&app, request("DELETE", "/playlists/favorites/p9", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, request("DELETE", "/playlists/favorites/p1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favoritePlaylists"], json!([]));
}

#[tokio::test]
async fn test_auto_sort_route_rejects_blank_playlist_id() {
    let app = app(FakeSpotify::new());

    let (status, body) = send(
        &app,
        request("POST", "/playlists/auto-sort", Some(json!({ "playlistId": "  " }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_routes_require_user_header() {
    let app = app(FakeSpotify::new());
    let request = Request::builder()
        .method("GET")
        .uri("/playlists")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_top_items_route() {
    let api = FakeSpotify::new().with_top(
        TimeRange::ShortTerm,
        TopItems::Artists(vec![artist("a1", 10)]),
    );
    let app = app(api);

    let (status, body) = send(&app, request("GET", "/playlists/top/artists", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
    assert_eq!(body["topItems"]["short_term"][0]["id"], "a1");
    assert_eq!(body["topItems"]["long_term"], json!([]));

    let (status, _) = send(&app, request("GET", "/playlists/top/albums", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_route() {
    let app = app(FakeSpotify::new());

    let (status, _) = send(&app, request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
}
