//! # Playlist Synchronization
//!
//! The engine that rewrites remote playlists. Every operation runs the same
//! sequence of stages:
//!
//! ```text
//! RESOLVE_CREDENTIAL → FETCH_ALL → FILTER_VALID → COMPUTE_TARGET
//!     → DELETE_ALL → INSERT_TARGET → REFRESH_VIEW
//! ```
//!
//! The four operations differ only in their [`MutationPlan`]: source and
//! destination, which entries are kept, the ordering policy, and whether
//! anything is inserted at all.
//!
//! Deletes and inserts are not atomic. Once a delete batch has gone through,
//! a later failure leaves the destination partially rewritten; the resulting
//! error says so, and re-running the whole operation repairs it.

pub mod autosort;
pub mod ordering;
pub mod store;

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{Instrument, debug, info, info_span};

use crate::{
    management::{
        PreferenceError, PreferenceList, TokenError, TokenProvider, UserRecord, UserStore,
        UserStoreError, update_list,
    },
    spotify::{PlaylistApi, SpotifyError},
    types::{
        CopyDestination, CreatePlaylistRequest, LIKED_SONGS_ID, PlaylistDetails, PlaylistId,
        PlaylistSummary, PlaylistView, TOP_ITEMS_LIMIT, TimeRange, TopItemKind, TopItemsView,
        TrackView,
    },
};

pub use ordering::{OrderingPolicy, TrackFilter};
pub use store::{RemoteStoreError, StoreOp, TrackStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveCredential,
    FetchAll,
    FilterValid,
    ComputeTarget,
    ResolveDestination,
    DeleteAll,
    InsertTarget,
    RefreshView,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ResolveCredential => "resolve_credential",
            Stage::FetchAll => "fetch_all",
            Stage::FilterValid => "filter_valid",
            Stage::ComputeTarget => "compute_target",
            Stage::ResolveDestination => "resolve_destination",
            Stage::DeleteAll => "delete_all",
            Stage::InsertTarget => "insert_target",
            Stage::RefreshView => "refresh_view",
        })
    }
}

fn partial_note(destination_modified: &bool, created_playlist: &Option<String>) -> String {
    match (created_playlist, destination_modified) {
        (Some(id), _) => format!(
            "playlist {id} was created for the copy and left incomplete; copy into {id} to repair it"
        ),
        (None, true) => {
            "the destination playlist was left partially modified; re-run the operation to repair it"
                .to_string()
        }
        (None, false) => "the destination playlist was not modified".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("re-authentication with Spotify is required: {0}")]
    TokenRefreshRequired(String),
    #[error("reading from Spotify failed during {stage}: {source}")]
    UpstreamFetch { stage: Stage, source: SpotifyError },
    #[error("{source}; {}", partial_note(.destination_modified, .created_playlist))]
    RemoteStore {
        stage: Stage,
        destination_modified: bool,
        /// Id of the playlist created as copy destination, if any.
        created_playlist: Option<String>,
        source: RemoteStoreError,
    },
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error(
        "operation cancelled during {stage}; {}",
        partial_note(.destination_modified, .created_playlist)
    )]
    Cancelled {
        stage: Stage,
        destination_modified: bool,
        created_playlist: Option<String>,
    },
}

impl SyncError {
    /// Whether the destination may be in a mixed state after this error.
    pub fn destination_modified(&self) -> bool {
        match self {
            SyncError::RemoteStore {
                destination_modified,
                ..
            }
            | SyncError::Cancelled {
                destination_modified,
                ..
            } => *destination_modified,
            _ => false,
        }
    }

    /// The playlist created as copy destination before the failure.
    pub fn created_playlist(&self) -> Option<&str> {
        match self {
            SyncError::RemoteStore {
                created_playlist, ..
            }
            | SyncError::Cancelled {
                created_playlist, ..
            } => created_playlist.as_deref(),
            _ => None,
        }
    }

    fn upstream(stage: Stage, source: SpotifyError) -> Self {
        match source.status() {
            Some(404) => SyncError::NotFound(source.to_string()),
            Some(401) => SyncError::Unauthenticated(source.to_string()),
            _ => SyncError::UpstreamFetch { stage, source },
        }
    }

    fn store(stage: Stage, err: RemoteStoreError) -> Self {
        SyncError::store_after(stage, err, &Progress::default())
    }

    /// Maps a store failure that happened after `progress` was made on the
    /// destination.
    fn store_after(stage: Stage, err: RemoteStoreError, progress: &Progress) -> Self {
        let destination_modified = progress.modified() || err.completed_batches() > 0;
        let created_playlist = progress.created.clone();
        match err {
            RemoteStoreError::Fetch { source, .. } => SyncError::upstream(stage, source),
            RemoteStoreError::Cancelled { .. } => SyncError::Cancelled {
                stage,
                destination_modified,
                created_playlist,
            },
            err @ RemoteStoreError::Batch { .. } => SyncError::RemoteStore {
                stage,
                destination_modified,
                created_playlist,
                source: err,
            },
        }
    }
}

impl From<TokenError> for SyncError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Unauthenticated(msg) => SyncError::Unauthenticated(msg),
            TokenError::RefreshRequired(msg) => SyncError::TokenRefreshRequired(msg),
            TokenError::Refresh(msg) => SyncError::Unauthenticated(msg),
            TokenError::Store(e) => SyncError::Storage(e.to_string()),
        }
    }
}

impl From<UserStoreError> for SyncError {
    fn from(err: UserStoreError) -> Self {
        SyncError::Storage(err.to_string())
    }
}

impl From<PreferenceError> for SyncError {
    fn from(err: PreferenceError) -> Self {
        match err {
            PreferenceError::UnknownUser(_) => SyncError::Unauthenticated(err.to_string()),
            PreferenceError::AlreadyPresent { .. } => SyncError::Conflict(err.to_string()),
            PreferenceError::Missing { .. } => SyncError::NotFound(err.to_string()),
            PreferenceError::Store(e) => SyncError::Storage(e.to_string()),
        }
    }
}

/// Description of one rewrite.
#[derive(Debug, Clone)]
pub struct MutationPlan {
    pub operation: &'static str,
    pub source: PlaylistId,
    pub destination: CopyDestination,
    /// `None` keeps every fetched entry.
    pub filter: Option<TrackFilter>,
    /// `None` means nothing is inserted after the delete.
    pub ordering: Option<OrderingPolicy>,
}

/// What a rewrite has already changed on the remote side.
#[derive(Debug, Default)]
struct Progress {
    created: Option<String>,
    deleted_batches: usize,
}

impl Progress {
    fn modified(&self) -> bool {
        self.created.is_some() || self.deleted_batches > 0
    }
}

struct Credential {
    user: UserRecord,
    access_token: String,
}

/// The playlist mutation orchestrator.
///
/// Holds no per-invocation state, so one instance serves concurrent callers.
/// Invocations against the same remote playlist are not serialised.
pub struct PlaylistSync {
    store: TrackStore,
    tokens: Arc<dyn TokenProvider>,
    users: Arc<dyn UserStore>,
    reverse_liked_inserts: bool,
    shuffle_seed: Option<u64>,
}

impl PlaylistSync {
    pub fn new(
        store: TrackStore,
        tokens: Arc<dyn TokenProvider>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            store,
            tokens,
            users,
            reverse_liked_inserts: true,
            shuffle_seed: None,
        }
    }

    /// Whether inserts into the liked-list are issued in reverse target
    /// order. Spotify surfaces the most recently saved track first, so this
    /// is what makes the visible order match the target.
    pub fn with_liked_reversal(mut self, enabled: bool) -> Self {
        self.reverse_liked_inserts = enabled;
        self
    }

    /// Makes shuffles reproducible.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    fn api(&self) -> &dyn PlaylistApi {
        self.store.api()
    }

    pub async fn sort_by_release_date(
        &self,
        user_id: &str,
        playlist: &PlaylistId,
    ) -> Result<PlaylistView, SyncError> {
        if playlist.is_liked() {
            return Err(SyncError::InvalidOperation(
                "the Liked Songs playlist can not be sorted".to_string(),
            ));
        }

        self.execute(
            user_id,
            MutationPlan {
                operation: "sort_by_release_date",
                source: playlist.clone(),
                destination: CopyDestination::Existing(playlist.clone()),
                filter: Some(TrackFilter::Album),
                ordering: Some(OrderingPolicy::ReleaseDate),
            },
        )
        .await
    }

    pub async fn shuffle(
        &self,
        user_id: &str,
        playlist: &PlaylistId,
    ) -> Result<PlaylistView, SyncError> {
        self.execute(
            user_id,
            MutationPlan {
                operation: "shuffle",
                source: playlist.clone(),
                destination: CopyDestination::Existing(playlist.clone()),
                filter: Some(TrackFilter::Playable),
                ordering: Some(OrderingPolicy::Shuffle {
                    seed: self.shuffle_seed,
                }),
            },
        )
        .await
    }

    /// Replaces the content of `destination` with the valid tracks of
    /// `source`, in source order.
    pub async fn copy_content(
        &self,
        user_id: &str,
        source: &PlaylistId,
        destination: &CopyDestination,
    ) -> Result<PlaylistView, SyncError> {
        self.execute(
            user_id,
            MutationPlan {
                operation: "copy_content",
                source: source.clone(),
                destination: destination.clone(),
                filter: Some(TrackFilter::Album),
                ordering: Some(OrderingPolicy::Identity),
            },
        )
        .await
    }

    pub async fn clear(
        &self,
        user_id: &str,
        playlist: &PlaylistId,
    ) -> Result<PlaylistView, SyncError> {
        self.execute(
            user_id,
            MutationPlan {
                operation: "clear",
                source: playlist.clone(),
                destination: CopyDestination::Existing(playlist.clone()),
                filter: None,
                ordering: None,
            },
        )
        .await
    }

    pub async fn execute(
        &self,
        user_id: &str,
        plan: MutationPlan,
    ) -> Result<PlaylistView, SyncError> {
        let span = info_span!(
            "mutation",
            operation = plan.operation,
            user_id,
            source = %plan.source,
        );

        async move {
            info!("starting");
            let result = self.run(user_id, plan).await;
            match &result {
                Ok(view) => info!(destination = %view.id, tracks = view.total_tracks, "done"),
                Err(e) => info!(error = %e, "failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, user_id: &str, plan: MutationPlan) -> Result<PlaylistView, SyncError> {
        let credential = self.resolve_credential(user_id).await?;
        let token = credential.access_token.as_str();

        let fetched = self
            .store
            .fetch_all_tracks(&plan.source, token)
            .await
            .map_err(|e| SyncError::store(Stage::FetchAll, e))?;

        let fetched_count = fetched.len();
        let valid = match plan.filter {
            Some(filter) => filter.apply(fetched),
            None => fetched,
        };
        debug!(
            stage = %Stage::FilterValid,
            fetched = fetched_count,
            valid = valid.len(),
            "entries filtered"
        );

        let target = plan.ordering.map(|policy| policy.apply(valid.clone()));
        if let Some(target) = &target {
            debug!(stage = %Stage::ComputeTarget, tracks = target.len(), "target computed");
        }

        let mut progress = Progress::default();
        let (destination, current) = match &plan.destination {
            CopyDestination::Existing(id) if *id == plan.source => (id.clone(), valid),
            CopyDestination::Existing(id) => {
                let current = self
                    .store
                    .fetch_all_tracks(id, token)
                    .await
                    .map_err(|e| SyncError::store(Stage::ResolveDestination, e))?;
                (id.clone(), current)
            }
            CopyDestination::NewPlaylist => {
                let created = self.create_copy_destination(&credential, &plan.source).await?;
                progress.created = Some(created.as_str().to_string());
                (created, Vec::new())
            }
        };

        if !current.is_empty() {
            let batches = self
                .store
                .delete_tracks(&destination, &current, token)
                .await
                .map_err(|e| SyncError::store_after(Stage::DeleteAll, e, &progress))?;
            progress.deleted_batches = batches;
            debug!(stage = %Stage::DeleteAll, playlist = %destination, batches, "tracks deleted");
        }

        if let Some(mut target) = target {
            if destination.is_liked() && self.reverse_liked_inserts {
                target.reverse();
            }

            let batches = self
                .store
                .insert_tracks(&destination, &target, token)
                .await
                .map_err(|e| SyncError::store_after(Stage::InsertTarget, e, &progress))?;
            debug!(stage = %Stage::InsertTarget, playlist = %destination, batches, "tracks inserted");
        }

        self.view(&credential, &destination).await
    }

    async fn resolve_credential(&self, user_id: &str) -> Result<Credential, SyncError> {
        let user = self
            .users
            .find(user_id)
            .await?
            .ok_or_else(|| SyncError::Unauthenticated(format!("user {user_id} does not exist")))?;

        let access_token = self.tokens.access_token(user_id).await?;
        Ok(Credential { user, access_token })
    }

    async fn create_copy_destination(
        &self,
        credential: &Credential,
        source: &PlaylistId,
    ) -> Result<PlaylistId, SyncError> {
        let token = credential.access_token.as_str();
        let details = match source {
            PlaylistId::Liked => liked_details(&credential.user, 0),
            PlaylistId::Playlist(id) => self
                .api()
                .playlist_details(id, token)
                .await
                .map_err(|e| SyncError::upstream(Stage::ResolveDestination, e))?,
        };

        let request = CreatePlaylistRequest {
            name: format!("{} copy", details.name),
            description: details.description.unwrap_or_default(),
            public: details.public,
        };

        let created = self
            .api()
            .create_playlist(&credential.user.spotify_user_id, &request, token)
            .await
            .map_err(|e| SyncError::upstream(Stage::ResolveDestination, e))?;

        info!(playlist_id = %created.id, name = %created.name, "playlist created");
        Ok(PlaylistId::Playlist(created.id))
    }

    async fn view(
        &self,
        credential: &Credential,
        playlist: &PlaylistId,
    ) -> Result<PlaylistView, SyncError> {
        let token = credential.access_token.as_str();
        let tracks = self
            .store
            .fetch_all_tracks(playlist, token)
            .await
            .map_err(|e| SyncError::store(Stage::RefreshView, e))?;

        let details = match playlist {
            PlaylistId::Liked => liked_details(&credential.user, tracks.len() as u32),
            PlaylistId::Playlist(id) => self
                .api()
                .playlist_details(id, token)
                .await
                .map_err(|e| SyncError::upstream(Stage::RefreshView, e))?,
        };

        let user = &credential.user;
        Ok(PlaylistView {
            is_favorite: user.favorite_playlists.contains(&details.id),
            auto_sort: user.auto_sort_playlists.contains(&details.id),
            owner_name: details
                .owner_name
                .unwrap_or_else(|| user.username.clone()),
            id: details.id,
            name: details.name,
            description: details.description,
            total_tracks: tracks.len(),
            image_url: details.image_url,
            spotify_url: details.spotify_url,
            public: details.public,
            tracks: tracks.iter().map(TrackView::from).collect(),
        })
    }

    /// The refreshed view of one playlist, without modifying it.
    pub async fn playlist_view(
        &self,
        user_id: &str,
        playlist: &PlaylistId,
    ) -> Result<PlaylistView, SyncError> {
        let credential = self.resolve_credential(user_id).await?;
        self.view(&credential, playlist).await
    }

    /// All playlists of the user, followed by the liked-list.
    pub async fn list_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, SyncError> {
        let credential = self.resolve_credential(user_id).await?;
        let token = credential.access_token.as_str();
        let user = &credential.user;

        let mut summaries = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .api()
                .playlists_page(cursor.as_deref(), token)
                .await
                .map_err(|e| SyncError::upstream(Stage::FetchAll, e))?;

            summaries.extend(page.playlists.into_iter().map(|p| summarize(p, user)));
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let liked_total = self
            .api()
            .saved_tracks_total(token)
            .await
            .map_err(|e| SyncError::upstream(Stage::FetchAll, e))?;
        summaries.push(summarize(liked_details(user, liked_total), user));

        Ok(summaries)
    }

    /// The user's top tracks or artists for every time range.
    pub async fn top_items(
        &self,
        user_id: &str,
        kind: TopItemKind,
    ) -> Result<TopItemsView, SyncError> {
        let credential = self.resolve_credential(user_id).await?;
        let token = credential.access_token.as_str();

        let mut view = TopItemsView::default();
        for range in TimeRange::ALL {
            let items = self
                .api()
                .top_items(kind, range, TOP_ITEMS_LIMIT, token)
                .await
                .map_err(|e| SyncError::upstream(Stage::FetchAll, e))?;
            *view.range_mut(range) = items.into_views();
        }

        debug!(user_id, %kind, "top items fetched");
        Ok(view)
    }

    /// Adds or removes a playlist from one of the user's preference lists.
    pub async fn update_preference(
        &self,
        user_id: &str,
        list: PreferenceList,
        playlist_id: &str,
        present: bool,
    ) -> Result<Vec<String>, SyncError> {
        let updated = update_list(self.users.as_ref(), user_id, list, playlist_id, present).await?;
        info!(user_id, playlist_id, list = list.label(), present, "preferences updated");
        Ok(updated)
    }
}

fn liked_details(user: &UserRecord, total_tracks: u32) -> PlaylistDetails {
    PlaylistDetails {
        id: LIKED_SONGS_ID.to_string(),
        name: "Liked Songs".to_string(),
        description: Some("Your liked songs on Spotify".to_string()),
        public: false,
        owner_name: Some(user.username.clone()),
        image_url: None,
        spotify_url: None,
        total_tracks,
    }
}

fn summarize(details: PlaylistDetails, user: &UserRecord) -> PlaylistSummary {
    PlaylistSummary {
        is_favorite: user.favorite_playlists.contains(&details.id),
        auto_sort: user.auto_sort_playlists.contains(&details.id),
        owner_name: details.owner_name.unwrap_or_default(),
        id: details.id,
        name: details.name,
        description: details.description,
        total_tracks: details.total_tracks,
        image_url: details.image_url,
        spotify_url: details.spotify_url,
        public: details.public,
    }
}
