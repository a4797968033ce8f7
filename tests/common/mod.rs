#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use playmgr::{
    management::{TokenError, TokenProvider, UserEdit, UserRecord, UserStore, UserStoreError},
    spotify::{PlaylistApi, SpotifyError},
    sync::{PlaylistSync, TrackStore},
    types::{
        Artist, CreatePlaylistRequest, LIKED_SONGS_ID, PlaylistDetails, PlaylistId, PlaylistPage,
        TimeRange, TopItemKind, TopItems, Track, TrackPage,
    },
};

pub const USER_ID: &str = "user-1";
pub const TOKEN: &str = "access-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Page {
        playlist: String,
        cursor: Option<String>,
    },
    Remove {
        playlist: String,
        references: Vec<String>,
    },
    Add {
        playlist: String,
        references: Vec<String>,
    },
    Details(String),
    Create(String),
    PlaylistsPage,
    SavedTotal,
    Top {
        kind: TopItemKind,
        range: TimeRange,
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Page,
    Remove,
    Add,
    Details,
    Create,
    Top,
}

struct Failure {
    op: Op,
    nth: usize,
    status: u16,
}

#[derive(Default)]
struct State {
    playlists: HashMap<String, Vec<Track>>,
    details: HashMap<String, PlaylistDetails>,
    catalog: HashMap<String, Track>,
    calls: Vec<Call>,
    counts: HashMap<Op, usize>,
    failures: Vec<Failure>,
    created: usize,
    top: HashMap<(TopItemKind, TimeRange), TopItems>,
}

/// In-memory stand-in for the Spotify Web API.
///
/// Normal playlists append inserted tracks at the end. The liked-list puts
/// every saved track in front, the way Spotify lists the most recently saved
/// track first.
#[derive(Default)]
pub struct FakeSpotify {
    state: Mutex<State>,
}

impl FakeSpotify {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_playlist(self: Arc<Self>, id: &str, tracks: Vec<Track>) -> Arc<Self> {
        {
            let mut state = self.state.lock().unwrap();
            for t in &tracks {
                if let Some(track_id) = &t.id {
                    state.catalog.insert(track_id.clone(), t.clone());
                }
            }
            if id != LIKED_SONGS_ID {
                state.details.insert(id.to_string(), details(id, &format!("Playlist {id}")));
            }
            state.playlists.insert(id.to_string(), tracks);
        }
        self
    }

    pub fn with_top(self: Arc<Self>, range: TimeRange, items: TopItems) -> Arc<Self> {
        let kind = match &items {
            TopItems::Tracks(_) => TopItemKind::Tracks,
            TopItems::Artists(_) => TopItemKind::Artists,
        };
        self.state.lock().unwrap().top.insert((kind, range), items);
        self
    }

    /// Makes the `nth` call (0-based) of kind `op` fail with `status`.
    pub fn fail_on(self: Arc<Self>, op: Op, nth: usize, status: u16) -> Arc<Self> {
        self.state
            .lock()
            .unwrap()
            .failures
            .push(Failure { op, nth, status });
        self
    }

    pub fn tracks(&self, id: &str) -> Vec<Track> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn track_ids(&self, id: &str) -> Vec<String> {
        self.tracks(id)
            .into_iter()
            .map(|t| t.id.unwrap_or_default())
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn batch_sizes(&self, op: Op) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|c| match (c, op) {
                (Call::Remove { references, .. }, Op::Remove) => Some(references.len()),
                (Call::Add { references, .. }, Op::Add) => Some(references.len()),
                _ => None,
            })
            .collect()
    }

    fn enter(&self, op: Op, call: Call) -> Result<(), SpotifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let count = state.counts.entry(op).or_insert(0);
        let nth = *count;
        *count += 1;

        match state.failures.iter().find(|f| f.op == op && f.nth == nth) {
            Some(f) => Err(SpotifyError::Status {
                status: f.status,
                message: format!("injected failure of {op:?} call {nth}"),
            }),
            None => Ok(()),
        }
    }
}

pub fn details(id: &str, name: &str) -> PlaylistDetails {
    PlaylistDetails {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} description")),
        public: true,
        owner_name: Some("owner".to_string()),
        image_url: None,
        spotify_url: Some(format!("https://open.spotify.com/playlist/{id}")),
        total_tracks: 0,
    }
}

fn parse_cursor(cursor: Option<&str>) -> usize {
    cursor
        .and_then(|c| c.rsplit("offset=").next())
        .and_then(|o| o.parse().ok())
        .unwrap_or(0)
}

fn not_found(id: &str) -> SpotifyError {
    SpotifyError::Status {
        status: 404,
        message: format!("playlist {id} not found"),
    }
}

#[async_trait]
impl PlaylistApi for FakeSpotify {
    async fn track_page(
        &self,
        playlist: &PlaylistId,
        cursor: Option<&str>,
        _token: &str,
    ) -> Result<TrackPage, SpotifyError> {
        self.enter(
            Op::Page,
            Call::Page {
                playlist: playlist.to_string(),
                cursor: cursor.map(str::to_string),
            },
        )?;

        let state = self.state.lock().unwrap();
        let all = match state.playlists.get(playlist.as_str()) {
            Some(all) => all,
            None if playlist.is_liked() => return Ok(TrackPage::default()),
            None => return Err(not_found(playlist.as_str())),
        };

        let offset = parse_cursor(cursor);
        let end = (offset + playlist.batch_size()).min(all.len());
        let tracks = all.get(offset..end).map(<[Track]>::to_vec).unwrap_or_default();
        let next = (end < all.len()).then(|| format!("{}?offset={end}", playlist.as_str()));

        Ok(TrackPage { tracks, next })
    }

    async fn remove_tracks(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        _token: &str,
    ) -> Result<(), SpotifyError> {
        self.enter(
            Op::Remove,
            Call::Remove {
                playlist: playlist.to_string(),
                references: references.to_vec(),
            },
        )?;

        let mut state = self.state.lock().unwrap();
        let tracks = state
            .playlists
            .entry(playlist.as_str().to_string())
            .or_default();
        tracks.retain(|t| {
            t.reference(playlist)
                .is_none_or(|r| !references.iter().any(|x| x == r))
        });
        Ok(())
    }

    async fn add_tracks(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        _token: &str,
    ) -> Result<(), SpotifyError> {
        self.enter(
            Op::Add,
            Call::Add {
                playlist: playlist.to_string(),
                references: references.to_vec(),
            },
        )?;

        let mut state = self.state.lock().unwrap();
        let resolved: Vec<Track> = references
            .iter()
            .map(|r| {
                state
                    .catalog
                    .values()
                    .find(|t| t.reference(playlist) == Some(r.as_str()))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        let tracks = state
            .playlists
            .entry(playlist.as_str().to_string())
            .or_default();
        if playlist.is_liked() {
            for track in resolved {
                tracks.insert(0, track);
            }
        } else {
            tracks.extend(resolved);
        }
        Ok(())
    }

    async fn playlist_details(
        &self,
        playlist_id: &str,
        _token: &str,
    ) -> Result<PlaylistDetails, SpotifyError> {
        self.enter(Op::Details, Call::Details(playlist_id.to_string()))?;

        let state = self.state.lock().unwrap();
        let mut found = state
            .details
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| not_found(playlist_id))?;
        found.total_tracks = state
            .playlists
            .get(playlist_id)
            .map(|t| t.len() as u32)
            .unwrap_or(0);
        Ok(found)
    }

    async fn create_playlist(
        &self,
        _spotify_user_id: &str,
        request: &CreatePlaylistRequest,
        _token: &str,
    ) -> Result<PlaylistDetails, SpotifyError> {
        self.enter(Op::Create, Call::Create(request.name.clone()))?;

        let mut state = self.state.lock().unwrap();
        state.created += 1;
        let id = format!("created-{}", state.created);
        let mut created = details(&id, &request.name);
        created.description = Some(request.description.clone());
        created.public = request.public;
        state.details.insert(id.clone(), created.clone());
        state.playlists.insert(id, Vec::new());
        Ok(created)
    }

    async fn playlists_page(
        &self,
        _cursor: Option<&str>,
        _token: &str,
    ) -> Result<PlaylistPage, SpotifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::PlaylistsPage);

        let mut playlists: Vec<PlaylistDetails> = state
            .details
            .values()
            .cloned()
            .map(|mut d| {
                d.total_tracks = state.playlists.get(&d.id).map(|t| t.len() as u32).unwrap_or(0);
                d
            })
            .collect();
        playlists.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(PlaylistPage {
            playlists,
            next: None,
        })
    }

    async fn saved_tracks_total(&self, _token: &str) -> Result<u32, SpotifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::SavedTotal);
        Ok(state
            .playlists
            .get(LIKED_SONGS_ID)
            .map(|t| t.len() as u32)
            .unwrap_or(0))
    }

    async fn top_items(
        &self,
        kind: TopItemKind,
        range: TimeRange,
        limit: usize,
        _token: &str,
    ) -> Result<TopItems, SpotifyError> {
        self.enter(Op::Top, Call::Top { kind, range, limit })?;

        let state = self.state.lock().unwrap();
        Ok(match state.top.get(&(kind, range)).cloned() {
            Some(TopItems::Tracks(mut tracks)) => {
                tracks.truncate(limit);
                TopItems::Tracks(tracks)
            }
            Some(TopItems::Artists(mut artists)) => {
                artists.truncate(limit);
                TopItems::Artists(artists)
            }
            None => match kind {
                TopItemKind::Tracks => TopItems::Tracks(Vec::new()),
                TopItemKind::Artists => TopItems::Artists(Vec::new()),
            },
        })
    }
}

/// Hands out a fixed token to known users.
pub struct StaticTokens {
    users: Arc<dyn UserStore>,
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn access_token(&self, user_id: &str) -> Result<String, TokenError> {
        match self.users.find(user_id).await? {
            Some(_) => Ok(TOKEN.to_string()),
            None => Err(TokenError::Unauthenticated(format!(
                "user {user_id} does not exist"
            ))),
        }
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryUsers {
    pub fn with(users: Vec<UserRecord>) -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(users),
        })
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn save(&self, user: UserRecord) -> Result<(), UserStoreError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        Ok(())
    }

    async fn update(
        &self,
        user_id: &str,
        edit: UserEdit,
    ) -> Result<Option<(UserRecord, bool)>, UserStoreError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == user_id).map(|user| {
            let changed = edit(user);
            (user.clone(), changed)
        }))
    }

    async fn all(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        Ok(self.users.lock().unwrap().clone())
    }
}

pub fn user(id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        spotify_user_id: format!("spotify-{id}"),
        username: format!("name-{id}"),
        ..Default::default()
    }
}

/// Engine over `api` with a single known user and a fixed shuffle seed.
pub fn engine(api: Arc<FakeSpotify>) -> PlaylistSync {
    engine_with_users(api, MemoryUsers::with(vec![user(USER_ID)]))
}

pub fn engine_with_users(api: Arc<FakeSpotify>, users: Arc<MemoryUsers>) -> PlaylistSync {
    let users: Arc<dyn UserStore> = users;
    let tokens = Arc::new(StaticTokens {
        users: Arc::clone(&users),
    });
    PlaylistSync::new(TrackStore::new(api), tokens, users).with_shuffle_seed(7)
}

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// A playable album track.
pub fn track(id: &str, album: &str, release_date: Option<NaiveDate>, number: u32) -> Track {
    Track {
        id: Some(id.to_string()),
        uri: Some(format!("spotify:track:{id}")),
        name: format!("Track {id}"),
        artist_name: "Artist".to_string(),
        album_id: Some(album.to_string()),
        album_name: format!("Album {album}"),
        release_date,
        track_number: number,
        duration_ms: 180_000,
        explicit: false,
        image_url: None,
    }
}

/// `count` tracks, each on its own album.
pub fn many_tracks(prefix: &str, count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| track(&format!("{prefix}{i}"), &format!("{prefix}-album{i}"), date(2020, 1, 1), 1))
        .collect()
}

pub fn artist(id: &str, followers: u64) -> Artist {
    Artist {
        id: id.to_string(),
        name: format!("Artist {id}"),
        followers,
        genres: vec!["indie".to_string()],
        popularity: 50,
        image_url: None,
        spotify_url: Some(format!("https://open.spotify.com/artist/{id}")),
    }
}

pub fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.clone().unwrap_or_default()).collect()
}
