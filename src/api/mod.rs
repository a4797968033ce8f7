//! # API Module
//!
//! HTTP endpoints over the playlist operations.
//!
//! Callers are identified by the `x-user-id` header, which the authenticating
//! gateway in front of this service sets; see [`CurrentUser`]. Successful
//! responses carry `"error": false` next to the payload field (`playlist`,
//! `playlists`, `topItems`, `favoritePlaylists` or `autoSortPlaylists`);
//! failures carry `"error": true` and a `message`, with the status code
//! picked by [`ApiError::status`].
//!
//! ## Endpoints
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/health` | [`health`] |
//! | GET | `/playlists` | [`list_playlists`] |
//! | GET | `/playlists/top/{kind}` | [`get_top_items`] |
//! | GET | `/playlists/{id}` | [`get_playlist`] |
//! | POST | `/playlists/{id}/sort` | [`sort_playlist`] |
//! | POST | `/playlists/{id}/shuffle` | [`shuffle_playlist`] |
//! | POST | `/playlists/{id}/clear` | [`clear_playlist`] |
//! | POST | `/playlists/{source}/copy/{destination}` | [`copy_playlist`] |
//! | POST | `/playlists/favorites` | [`add_favorite`] |
//! | DELETE | `/playlists/favorites/{id}` | [`remove_favorite`] |
//! | POST | `/playlists/auto-sort` | [`add_auto_sort`] |
//! | DELETE | `/playlists/auto-sort/{id}` | [`remove_auto_sort`] |
//!
//! The liked-list is addressed with the id `liked-songs`; `new-playlist` as a
//! copy destination creates a fresh playlist.

mod error;
mod extract;
mod health;
mod playlists;

pub use error::ApiError;
pub use error::ApiResult;
pub use extract::CurrentUser;
pub use extract::USER_ID_HEADER;
pub use health::health;
pub use playlists::add_auto_sort;
pub use playlists::add_favorite;
pub use playlists::clear_playlist;
pub use playlists::copy_playlist;
pub use playlists::get_playlist;
pub use playlists::get_top_items;
pub use playlists::list_playlists;
pub use playlists::remove_auto_sort;
pub use playlists::remove_favorite;
pub use playlists::shuffle_playlist;
pub use playlists::sort_playlist;
