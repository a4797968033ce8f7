use std::sync::Arc;

use chrono::{Local, NaiveTime};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::{PlaylistSync, SyncError};
use crate::{types::PlaylistId, utils};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AutoSortReport {
    pub sorted: usize,
    pub failed: usize,
}

/// Sorts every playlist users have opted into, once per run.
///
/// A failing playlist is logged and counted; it never stops the others.
pub struct AutoSortDriver {
    sync: Arc<PlaylistSync>,
}

impl AutoSortDriver {
    pub fn new(sync: Arc<PlaylistSync>) -> Self {
        Self { sync }
    }

    pub async fn run_once(&self) -> Result<AutoSortReport, SyncError> {
        let users = self.sync.users().auto_sort_users().await?;
        let mut report = AutoSortReport::default();

        for user in &users {
            for playlist_id in &user.auto_sort_playlists {
                let playlist = PlaylistId::parse(playlist_id);
                match self.sync.sort_by_release_date(&user.id, &playlist).await {
                    Ok(view) => {
                        info!(
                            user_id = %user.id,
                            playlist_id = %playlist_id,
                            tracks = view.total_tracks,
                            "auto-sorted"
                        );
                        report.sorted += 1;
                    }
                    Err(e) => {
                        warn!(
                            user_id = %user.id,
                            playlist_id = %playlist_id,
                            error = %e,
                            "auto-sort failed"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Runs [`run_once`](Self::run_once) every day at `at` local time until
    /// `cancel` fires.
    pub async fn run_daily(&self, at: NaiveTime, cancel: CancellationToken) {
        loop {
            let now = Local::now().naive_local();
            let next = utils::next_run_after(now, at);
            let wait = (next - now).to_std().unwrap_or_default();
            info!(next_run = %next, "auto-sort scheduled");

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("auto-sort scheduler stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            match self.run_once().await {
                Ok(report) => info!(
                    sorted = report.sorted,
                    failed = report.failed,
                    "auto-sort run finished"
                ),
                Err(e) => error!(error = %e, "auto-sort run aborted"),
            }
        }
    }
}
