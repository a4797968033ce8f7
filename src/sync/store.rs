use std::{fmt, sync::Arc};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    spotify::{PlaylistApi, SpotifyError},
    types::{PlaylistId, Track},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Fetch,
    Delete,
    Insert,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOp::Fetch => "fetch",
            StoreOp::Delete => "delete",
            StoreOp::Insert => "insert",
        })
    }
}

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("fetching page {page} of playlist {playlist} failed: {source}")]
    Fetch {
        playlist: PlaylistId,
        page: usize,
        source: SpotifyError,
    },
    #[error("{op} batch {batch} of {total} on playlist {playlist} failed: {source}")]
    Batch {
        op: StoreOp,
        playlist: PlaylistId,
        batch: usize,
        total: usize,
        source: SpotifyError,
    },
    #[error("{op} on playlist {playlist} cancelled after {completed} of {total} steps")]
    Cancelled {
        op: StoreOp,
        playlist: PlaylistId,
        completed: usize,
        total: usize,
    },
}

impl RemoteStoreError {
    /// Number of batches that went through before the failure.
    pub fn completed_batches(&self) -> usize {
        match self {
            RemoteStoreError::Fetch { .. } => 0,
            RemoteStoreError::Batch { batch, .. } => *batch,
            RemoteStoreError::Cancelled { op, completed, .. } => match op {
                StoreOp::Fetch => 0,
                _ => *completed,
            },
        }
    }

    pub fn upstream(&self) -> Option<&SpotifyError> {
        match self {
            RemoteStoreError::Fetch { source, .. } | RemoteStoreError::Batch { source, .. } => {
                Some(source)
            }
            RemoteStoreError::Cancelled { .. } => None,
        }
    }
}

/// Client for the three primitive track operations of a remote playlist.
///
/// Hides pagination on reads and batch-size limits on writes. Pages and
/// batches are issued strictly one after another; the cancellation token is
/// checked between them, never during an in-flight call.
#[derive(Clone)]
pub struct TrackStore {
    api: Arc<dyn PlaylistApi>,
    cancel: CancellationToken,
}

impl TrackStore {
    pub fn new(api: Arc<dyn PlaylistApi>) -> Self {
        Self {
            api,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn api(&self) -> &dyn PlaylistApi {
        self.api.as_ref()
    }

    /// Follows the continuation cursor from the first page until it runs out
    /// and returns every entry in the order received.
    pub async fn fetch_all_tracks(
        &self,
        playlist: &PlaylistId,
        token: &str,
    ) -> Result<Vec<Track>, RemoteStoreError> {
        let mut tracks = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(RemoteStoreError::Cancelled {
                    op: StoreOp::Fetch,
                    playlist: playlist.clone(),
                    completed: page,
                    total: page + 1,
                });
            }

            let res = self
                .api
                .track_page(playlist, cursor.as_deref(), token)
                .await
                .map_err(|source| RemoteStoreError::Fetch {
                    playlist: playlist.clone(),
                    page,
                    source,
                })?;

            tracks.extend(res.tracks);
            page += 1;

            match res.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(playlist = %playlist, pages = page, tracks = tracks.len(), "tracks retrieved");
        Ok(tracks)
    }

    /// Deletes `tracks` in batches of the playlist's batch size. Returns the
    /// number of batches issued.
    pub async fn delete_tracks(
        &self,
        playlist: &PlaylistId,
        tracks: &[Track],
        token: &str,
    ) -> Result<usize, RemoteStoreError> {
        self.run_batches(StoreOp::Delete, playlist, tracks, token)
            .await
    }

    /// Inserts `tracks` in batches, preserving their order within and across
    /// batches. Returns the number of batches issued.
    pub async fn insert_tracks(
        &self,
        playlist: &PlaylistId,
        tracks: &[Track],
        token: &str,
    ) -> Result<usize, RemoteStoreError> {
        self.run_batches(StoreOp::Insert, playlist, tracks, token)
            .await
    }

    async fn run_batches(
        &self,
        op: StoreOp,
        playlist: &PlaylistId,
        tracks: &[Track],
        token: &str,
    ) -> Result<usize, RemoteStoreError> {
        let references: Vec<String> = tracks
            .iter()
            .filter_map(|t| t.reference(playlist))
            .map(str::to_string)
            .collect();

        let batches: Vec<&[String]> = references.chunks(playlist.batch_size()).collect();
        let total = batches.len();

        for (batch, chunk) in batches.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(RemoteStoreError::Cancelled {
                    op,
                    playlist: playlist.clone(),
                    completed: batch,
                    total,
                });
            }

            debug!(
                playlist = %playlist,
                %op,
                batch,
                size = chunk.len(),
                "{} tracks {} to {}",
                op,
                batch * playlist.batch_size(),
                batch * playlist.batch_size() + chunk.len(),
            );

            let result = match op {
                StoreOp::Insert => self.api.add_tracks(playlist, chunk, token).await,
                _ => self.api.remove_tracks(playlist, chunk, token).await,
            };

            result.map_err(|source| RemoteStoreError::Batch {
                op,
                playlist: playlist.clone(),
                batch,
                total,
                source,
            })?;
        }

        Ok(total)
    }
}
