use thiserror::Error;

use super::{UserEdit, UserRecord, UserStore, UserStoreError};
use crate::utils;

/// The two per-user playlist lists a caller can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceList {
    Favorites,
    AutoSort,
}

impl PreferenceList {
    pub fn label(&self) -> &'static str {
        match self {
            PreferenceList::Favorites => "favorites",
            PreferenceList::AutoSort => "auto-sort playlists",
        }
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("user {0} does not exist")]
    UnknownUser(String),
    #[error("playlist {playlist_id} is already in the user's {list}")]
    AlreadyPresent {
        playlist_id: String,
        list: &'static str,
    },
    #[error("playlist {playlist_id} is not in the user's {list}")]
    Missing {
        playlist_id: String,
        list: &'static str,
    },
    #[error(transparent)]
    Store(#[from] UserStoreError),
}

/// Adds (`present = true`) or removes a playlist id from one of the user's
/// lists and returns the updated list.
pub async fn update_list(
    users: &dyn UserStore,
    user_id: &str,
    list: PreferenceList,
    playlist_id: &str,
    present: bool,
) -> Result<Vec<String>, PreferenceError> {
    let entry = playlist_id.to_string();
    let edit: UserEdit = Box::new(move |user: &mut UserRecord| {
        utils::set_membership(entries_mut(user, list), &entry, present)
    });

    let (user, changed) = users
        .update(user_id, edit)
        .await?
        .ok_or_else(|| PreferenceError::UnknownUser(user_id.to_string()))?;

    if !changed {
        let playlist_id = playlist_id.to_string();
        let list = list.label();
        return Err(if present {
            PreferenceError::AlreadyPresent { playlist_id, list }
        } else {
            PreferenceError::Missing { playlist_id, list }
        });
    }

    Ok(match list {
        PreferenceList::Favorites => user.favorite_playlists,
        PreferenceList::AutoSort => user.auto_sort_playlists,
    })
}

fn entries_mut(user: &mut UserRecord, list: PreferenceList) -> &mut Vec<String> {
    match list {
        PreferenceList::Favorites => &mut user.favorite_playlists,
        PreferenceList::AutoSort => &mut user.auto_sort_playlists,
    }
}
