use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, ApiResult, CurrentUser};
use crate::{
    management::PreferenceList,
    server::AppState,
    types::{CopyDestination, PlaylistId, PlaylistView, TopItemKind},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRef {
    pub playlist_id: String,
}

fn playlist(view: PlaylistView) -> Json<Value> {
    Json(json!({ "error": false, "playlist": view }))
}

/// GET /playlists
pub async fn list_playlists(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Value>> {
    let playlists = state.sync.list_playlists(&user_id).await?;
    Ok(Json(json!({ "error": false, "playlists": playlists })))
}

/// GET /playlists/{id}
pub async fn get_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let view = state
        .sync
        .playlist_view(&user_id, &PlaylistId::parse(&id))
        .await?;
    Ok(playlist(view))
}

/// POST /playlists/{id}/sort
pub async fn sort_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let view = state
        .sync
        .sort_by_release_date(&user_id, &PlaylistId::parse(&id))
        .await?;
    Ok(playlist(view))
}

/// POST /playlists/{id}/shuffle
pub async fn shuffle_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let view = state.sync.shuffle(&user_id, &PlaylistId::parse(&id)).await?;
    Ok(playlist(view))
}

/// POST /playlists/{id}/clear
pub async fn clear_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let view = state.sync.clear(&user_id, &PlaylistId::parse(&id)).await?;
    Ok(playlist(view))
}

/// POST /playlists/{source}/copy/{destination}
///
/// `destination` is either a playlist id, `liked-songs`, or `new-playlist`.
pub async fn copy_playlist(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((source, destination)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let view = state
        .sync
        .copy_content(
            &user_id,
            &PlaylistId::parse(&source),
            &CopyDestination::parse(&destination),
        )
        .await?;
    Ok(playlist(view))
}

/// GET /playlists/top/{kind}
///
/// `kind` is `tracks` or `artists`.
pub async fn get_top_items(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(kind): Path<String>,
) -> ApiResult<Json<Value>> {
    let kind = TopItemKind::parse(&kind).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown top item type {kind}, expected tracks or artists"))
    })?;

    let items = state.sync.top_items(&user_id, kind).await?;
    Ok(Json(json!({ "error": false, "topItems": items })))
}

async fn update_preference(
    state: &AppState,
    user_id: &str,
    list: PreferenceList,
    playlist_id: &str,
    present: bool,
) -> ApiResult<Json<Value>> {
    let playlist_id = playlist_id.trim();
    if playlist_id.is_empty() {
        return Err(ApiError::BadRequest("playlistId must not be empty".to_string()));
    }

    let updated = state
        .sync
        .update_preference(user_id, list, playlist_id, present)
        .await?;

    let field = match list {
        PreferenceList::Favorites => "favoritePlaylists",
        PreferenceList::AutoSort => "autoSortPlaylists",
    };
    Ok(Json(json!({ "error": false, field: updated })))
}

/// POST /playlists/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<PlaylistRef>,
) -> ApiResult<Json<Value>> {
    update_preference(&state, &user_id, PreferenceList::Favorites, &body.playlist_id, true).await
}

/// DELETE /playlists/favorites/{id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    update_preference(&state, &user_id, PreferenceList::Favorites, &id, false).await
}

/// POST /playlists/auto-sort
pub async fn add_auto_sort(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<PlaylistRef>,
) -> ApiResult<Json<Value>> {
    update_preference(&state, &user_id, PreferenceList::AutoSort, &body.playlist_id, true).await
}

/// DELETE /playlists/auto-sort/{id}
pub async fn remove_auto_sort(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    update_preference(&state, &user_id, PreferenceList::AutoSort, &id, false).await
}
