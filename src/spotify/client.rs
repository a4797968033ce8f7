use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use super::{ErrorEnvelope, PlaylistApi, SpotifyError};
use crate::{
    config,
    types::{
        CreatePlaylistRequest, PlaylistDetails, PlaylistId, PlaylistPage, TimeRange, TopItemKind,
        TopItems, TrackPage,
    },
};

/// HTTP client for the Spotify Web API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    pub(super) http: Client,
    pub(super) api_url: String,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, SpotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self::new(config::spotify_apiurl(), config::http_timeout()?)?)
    }

    /// The underlying HTTP client, for other callers of Spotify endpoints
    /// that should share its pool and timeout.
    pub fn http_client(&self) -> Client {
        self.http.clone()
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{uri}{path}", uri = self.api_url)
    }
}

/// Turns a non-success response into a [`SpotifyError::Status`], keeping the
/// message Spotify put in the error envelope when there is one.
pub(super) async fn check(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(SpotifyError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn track_page(
        &self,
        playlist: &PlaylistId,
        cursor: Option<&str>,
        token: &str,
    ) -> Result<TrackPage, SpotifyError> {
        self.get_track_page(playlist, cursor, token).await
    }

    async fn remove_tracks(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        token: &str,
    ) -> Result<(), SpotifyError> {
        self.delete_track_batch(playlist, references, token).await
    }

    async fn add_tracks(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        token: &str,
    ) -> Result<(), SpotifyError> {
        self.insert_track_batch(playlist, references, token).await
    }

    async fn playlist_details(
        &self,
        playlist_id: &str,
        token: &str,
    ) -> Result<PlaylistDetails, SpotifyError> {
        self.get_playlist(playlist_id, token).await
    }

    async fn create_playlist(
        &self,
        spotify_user_id: &str,
        request: &CreatePlaylistRequest,
        token: &str,
    ) -> Result<PlaylistDetails, SpotifyError> {
        self.create(spotify_user_id, request, token).await
    }

    async fn playlists_page(
        &self,
        cursor: Option<&str>,
        token: &str,
    ) -> Result<PlaylistPage, SpotifyError> {
        self.get_playlists_page(cursor, token).await
    }

    async fn saved_tracks_total(&self, token: &str) -> Result<u32, SpotifyError> {
        self.get_saved_tracks_total(token).await
    }

    async fn top_items(
        &self,
        kind: TopItemKind,
        range: TimeRange,
        limit: usize,
        token: &str,
    ) -> Result<TopItems, SpotifyError> {
        self.get_top_items(kind, range, limit, token).await
    }
}
