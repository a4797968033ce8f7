//! # Spotify Integration Module
//!
//! The remote side of the playlist manager. Everything the sync engine needs
//! from the Spotify Web API is expressed by the [`PlaylistApi`] trait; the
//! reqwest-backed [`SpotifyClient`] implements it.
//!
//! ```text
//! Sync Engine (TrackStore, PlaylistSync)
//!          ↓
//! PlaylistApi trait
//!          ↓
//! SpotifyClient (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me/tracks`, `GET /playlists/{id}/tracks` - paginated track listings
//! - `DELETE /me/tracks`, `DELETE /playlists/{id}/tracks` - batched removal
//! - `PUT /me/tracks`, `POST /playlists/{id}/tracks` - batched insertion
//! - `GET /playlists/{id}`, `GET /me/playlists` - playlist metadata
//! - `POST /users/{user_id}/playlists` - playlist creation
//! - `GET /me/top/{tracks|artists}` - the user's top items per time range
//!
//! Calls are single attempts bounded by the client timeout. Retrying is left
//! to whoever drives the operation.

mod client;
mod playlists;
mod top;
mod tracks;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    CreatePlaylistRequest, PlaylistDetails, PlaylistId, PlaylistPage, TimeRange, TopItemKind,
    TopItems, TrackPage,
};

pub use client::SpotifyClient;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify responded with {status}: {message}")]
    Status { status: u16, message: String },
}

impl SpotifyError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotifyError::Http(e) => e.status().map(|s| s.as_u16()),
            SpotifyError::Status { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// The primitive operations of the Remote Playlist API.
///
/// Implementations issue exactly one remote call per method. Pagination and
/// batch partitioning are the caller's concern.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    /// Fetches one page of `playlist`. `cursor` is the continuation returned
    /// by the previous page, `None` for the first page.
    async fn track_page(
        &self,
        playlist: &PlaylistId,
        cursor: Option<&str>,
        token: &str,
    ) -> Result<TrackPage, SpotifyError>;

    /// Removes one batch. References are track ids for the liked-list and
    /// URIs for normal playlists.
    async fn remove_tracks(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        token: &str,
    ) -> Result<(), SpotifyError>;

    /// Appends one batch, in order.
    async fn add_tracks(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        token: &str,
    ) -> Result<(), SpotifyError>;

    async fn playlist_details(
        &self,
        playlist_id: &str,
        token: &str,
    ) -> Result<PlaylistDetails, SpotifyError>;

    async fn create_playlist(
        &self,
        spotify_user_id: &str,
        request: &CreatePlaylistRequest,
        token: &str,
    ) -> Result<PlaylistDetails, SpotifyError>;

    async fn playlists_page(
        &self,
        cursor: Option<&str>,
        token: &str,
    ) -> Result<PlaylistPage, SpotifyError>;

    async fn saved_tracks_total(&self, token: &str) -> Result<u32, SpotifyError>;

    /// The user's first `limit` top items of `kind` over `range`.
    async fn top_items(
        &self,
        kind: TopItemKind,
        range: TimeRange,
        limit: usize,
        token: &str,
    ) -> Result<TopItems, SpotifyError>;
}
