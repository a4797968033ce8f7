//! # CLI Module
//!
//! Command implementations behind the `playmgr` binary. Each command builds
//! the same engine the HTTP server uses (see [`Context`]), runs one
//! operation and reports the outcome on the terminal.
//!
//! ## Commands
//!
//! - [`serve`] - HTTP API plus the daily auto-sort until Ctrl-C
//! - [`sort`], [`shuffle`], [`copy`], [`clear`] - one-shot playlist rewrites
//! - [`show`], [`playlists`], [`top`] - read-only views
//! - [`run_auto_sort`] - a single auto-sort pass over every opted-in playlist
//! - [`update_preference`] - favorites and auto-sort lists
//! - [`add_user`], [`list_users`] - user store administration
//!
//! ## Usage
//!
//! ```bash
//! playmgr users add --id me --spotify-user-id abc --username me --refresh-token ...
//! playmgr playlists --user me
//! playmgr sort 37i9dQZF1DX0XUsuxWHRQd --user me
//! playmgr copy liked-songs new-playlist --user me
//! playmgr top artists --user me
//! playmgr serve
//! ```
//!
//! Fatal problems (unreadable configuration, a failed operation) are printed
//! with `error!`, which exits with status 1.

mod autosort;
mod playlist;
mod preferences;
mod serve;
mod top;
mod users;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::{
    Res, config, error,
    management::{TokenManager, UserManager, UserStore},
    spotify::SpotifyClient,
    sync::{PlaylistSync, TrackStore},
};

pub use autosort::run_auto_sort;
pub use playlist::clear;
pub use playlist::copy;
pub use playlist::playlists;
pub use playlist::show;
pub use playlist::shuffle;
pub use playlist::sort;
pub use preferences::update_preference;
pub use serve::serve;
pub use top::top;
pub use users::NewUser;
pub use users::add_user;
pub use users::list_users;

/// Everything a command needs, wired from configuration.
pub struct Context {
    pub sync: Arc<PlaylistSync>,
}

impl Context {
    pub async fn from_env(cancel: CancellationToken) -> Res<Self> {
        let user_store: Arc<dyn UserStore> =
            Arc::new(UserManager::load(config::users_path()).await?);

        let client = SpotifyClient::from_env()?;
        let tokens = TokenManager::new(
            Arc::clone(&user_store),
            client.http_client(),
            config::spotify_apitoken_url(),
            config::spotify_client_id().ok(),
            config::spotify_client_secret(),
        );

        let store = TrackStore::new(Arc::new(client)).with_cancellation(cancel);
        let sync = PlaylistSync::new(store, Arc::new(tokens), user_store)
            .with_liked_reversal(config::reverse_liked_inserts()?);

        Ok(Self {
            sync: Arc::new(sync),
        })
    }
}

async fn context() -> Context {
    match Context::from_env(CancellationToken::new()).await {
        Ok(ctx) => ctx,
        Err(e) => error!("Cannot set up the playlist manager. Err: {}", e),
    }
}

fn spinner(message: impl Into<std::borrow::Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
