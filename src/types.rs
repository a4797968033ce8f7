use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils;

/// Identifier used by callers for the user's saved tracks.
pub const LIKED_SONGS_ID: &str = "liked-songs";

/// Identifier used by callers to ask for a freshly created copy destination.
pub const NEW_PLAYLIST_ID: &str = "new-playlist";

pub const LIKED_BATCH_SIZE: usize = 50;
pub const PLAYLIST_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// A playlist as addressed on the remote service.
///
/// The liked-list has its own endpoints, batch size and reference kind
/// (bare track ids instead of URIs), so it is kept apart from normal
/// playlists at the type level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaylistId {
    Liked,
    Playlist(String),
}

impl PlaylistId {
    pub fn parse(raw: &str) -> Self {
        if raw == LIKED_SONGS_ID {
            PlaylistId::Liked
        } else {
            PlaylistId::Playlist(raw.to_string())
        }
    }

    pub fn is_liked(&self) -> bool {
        matches!(self, PlaylistId::Liked)
    }

    pub fn batch_size(&self) -> usize {
        match self {
            PlaylistId::Liked => LIKED_BATCH_SIZE,
            PlaylistId::Playlist(_) => PLAYLIST_BATCH_SIZE,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlaylistId::Liked => LIKED_SONGS_ID,
            PlaylistId::Playlist(id) => id,
        }
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the content of a copy ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyDestination {
    Existing(PlaylistId),
    NewPlaylist,
}

impl CopyDestination {
    pub fn parse(raw: &str) -> Self {
        if raw == NEW_PLAYLIST_ID {
            CopyDestination::NewPlaylist
        } else {
            CopyDestination::Existing(PlaylistId::parse(raw))
        }
    }
}

/// Snapshot of one playlist entry as fetched from the remote store.
///
/// Fields the remote may omit for stale or unplayable placeholders are
/// optional; `TrackFilter` decides which entries are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: String,
    pub artist_name: String,
    pub album_id: Option<String>,
    pub album_name: String,
    pub release_date: Option<NaiveDate>,
    pub track_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub image_url: Option<String>,
}

impl Track {
    /// The reference a remote batch call uses for this track on `playlist`.
    pub fn reference(&self, playlist: &PlaylistId) -> Option<&str> {
        match playlist {
            PlaylistId::Liked => self.id.as_deref(),
            PlaylistId::Playlist(_) => self.uri.as_deref(),
        }
    }
}

/// One response page of a track listing.
#[derive(Debug, Clone, Default)]
pub struct TrackPage {
    pub tracks: Vec<Track>,
    pub next: Option<String>,
}

/// Playlist metadata as returned by the remote service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistDetails {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: bool,
    pub owner_name: Option<String>,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub total_tracks: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub playlists: Vec<PlaylistDetails>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackView {
    pub id: Option<String>,
    pub name: String,
    pub artist_name: String,
    pub album_name: String,
    pub is_explicit: bool,
    pub image_url: Option<String>,
    pub duration: u64,
}

impl From<&Track> for TrackView {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            artist_name: track.artist_name.clone(),
            album_name: track.album_name.clone(),
            is_explicit: track.explicit,
            image_url: track.image_url.clone(),
            duration: track.duration_ms,
        }
    }
}

/// The consistent view returned to callers after an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub description: Option<String>,
    pub total_tracks: usize,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub public: bool,
    pub is_favorite: bool,
    pub auto_sort: bool,
    pub tracks: Vec<TrackView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub description: Option<String>,
    pub total_tracks: u32,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub public: bool,
    pub is_favorite: bool,
    pub auto_sort: bool,
}

/// Number of items requested per time range for the top-items listing.
pub const TOP_ITEMS_LIMIT: usize = 30;

/// What a top-items listing ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopItemKind {
    Tracks,
    Artists,
}

impl TopItemKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tracks" => Some(TopItemKind::Tracks),
            "artists" => Some(TopItemKind::Artists),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TopItemKind::Tracks => "tracks",
            TopItemKind::Artists => "artists",
        }
    }
}

impl fmt::Display for TopItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Affinity window of a top-items listing: roughly four weeks, six months
/// and about a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [
        TimeRange::ShortTerm,
        TimeRange::MediumTerm,
        TimeRange::LongTerm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub followers: u64,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
}

/// One ranked listing as returned by the remote service.
#[derive(Debug, Clone, PartialEq)]
pub enum TopItems {
    Tracks(Vec<Track>),
    Artists(Vec<Artist>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistView {
    pub id: String,
    pub name: String,
    pub followers: u64,
    pub genres: Vec<String>,
    pub popularity: u32,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
}

impl From<Artist> for ArtistView {
    fn from(a: Artist) -> Self {
        Self {
            id: a.id,
            name: a.name,
            followers: a.followers,
            genres: a.genres,
            popularity: a.popularity,
            image_url: a.image_url,
            spotify_url: a.spotify_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TopItemView {
    Track(TrackView),
    Artist(ArtistView),
}

impl TopItems {
    pub fn into_views(self) -> Vec<TopItemView> {
        match self {
            TopItems::Tracks(tracks) => tracks
                .iter()
                .map(|t| TopItemView::Track(TrackView::from(t)))
                .collect(),
            TopItems::Artists(artists) => artists
                .into_iter()
                .map(|a| TopItemView::Artist(ArtistView::from(a)))
                .collect(),
        }
    }
}

/// The user's top items for every [`TimeRange`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopItemsView {
    pub short_term: Vec<TopItemView>,
    pub medium_term: Vec<TopItemView>,
    pub long_term: Vec<TopItemView>,
}

impl TopItemsView {
    pub fn range(&self, range: TimeRange) -> &[TopItemView] {
        match range {
            TimeRange::ShortTerm => &self.short_term,
            TimeRange::MediumTerm => &self.medium_term,
            TimeRange::LongTerm => &self.long_term,
        }
    }

    pub fn range_mut(&mut self, range: TimeRange) -> &mut Vec<TopItemView> {
        match range {
            TimeRange::ShortTerm => &mut self.short_term,
            TimeRange::MediumTerm => &mut self.medium_term,
            TimeRange::LongTerm => &mut self.long_term,
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub position: usize,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub length: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub tracks: u32,
    pub favorite: bool,
    pub auto_sort: bool,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub position: usize,
    pub name: String,
    pub followers: u64,
    pub popularity: u32,
    pub genres: String,
}

#[derive(Tabled)]
pub struct UserTableRow {
    pub id: String,
    pub username: String,
    pub spotify_user: String,
    pub auto_sort: usize,
}

// Spotify wire format.

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPageResponse {
    #[serde(default)]
    pub items: Vec<TrackItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumObject {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

impl From<TrackItem> for Track {
    fn from(item: TrackItem) -> Self {
        let Some(track) = item.track else {
            return Track::default();
        };

        let album = track.album;
        Track {
            id: track.id,
            uri: track.uri,
            name: track.name,
            artist_name: track
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            album_id: album.as_ref().and_then(|a| a.id.clone()),
            album_name: album.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            release_date: album.as_ref().and_then(|a| {
                a.release_date.as_deref().and_then(|date| {
                    utils::parse_release_date(date, a.release_date_precision.as_deref())
                })
            }),
            track_number: track.track_number,
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            image_url: album.and_then(|a| a.images.into_iter().next().map(|i| i.url)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistObject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub owner: Option<OwnerObject>,
    pub images: Option<Vec<Image>>,
    pub external_urls: Option<ExternalUrls>,
    pub tracks: Option<TracksRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerObject {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksRef {
    #[serde(default)]
    pub total: u32,
}

impl From<PlaylistObject> for PlaylistDetails {
    fn from(p: PlaylistObject) -> Self {
        PlaylistDetails {
            id: p.id,
            name: p.name,
            description: p.description,
            public: p.public.unwrap_or(false),
            owner_name: p.owner.and_then(|o| o.display_name),
            image_url: p.images.and_then(|i| i.into_iter().next().map(|i| i.url)),
            spotify_url: p.external_urls.and_then(|u| u.spotify),
            total_tracks: p.tracks.map(|t| t.total).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPageResponse {
    #[serde(default)]
    pub items: Vec<PlaylistObject>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopTracksResponse {
    #[serde(default)]
    pub items: Vec<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopArtistsResponse {
    #[serde(default)]
    pub items: Vec<ArtistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub followers: Option<Followers>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub images: Vec<Image>,
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

impl From<ArtistObject> for Artist {
    fn from(a: ArtistObject) -> Self {
        Artist {
            id: a.id,
            name: a.name,
            followers: a.followers.map(|f| f.total).unwrap_or(0),
            genres: a.genres,
            popularity: a.popularity,
            image_url: a.images.into_iter().next().map(|i| i.url),
            spotify_url: a.external_urls.and_then(|u| u.spotify),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedTracksTotal {
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovePlaylistTracksRequest {
    pub tracks: Vec<UriRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UriRef {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedTracksRequest {
    pub ids: Vec<String>,
}
