use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::types::Token;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("user store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("user store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub spotify_user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub favorite_playlists: Vec<String>,
    #[serde(default)]
    pub auto_sort_playlists: Vec<String>,
    #[serde(default)]
    pub token: Option<Token>,
}

/// Edit applied to a stored record by [`UserStore::update`]. Returns whether
/// the record changed; an unchanged record is not written back.
pub type UserEdit = Box<dyn FnOnce(&mut UserRecord) -> bool + Send>;

/// Persistence of per-user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, UserStoreError>;

    /// Inserts or replaces the record with the same id.
    async fn save(&self, user: UserRecord) -> Result<(), UserStoreError>;

    /// Applies `edit` to the stored record of `user_id` and persists it, with
    /// no other write in between. Returns the record after the edit and
    /// whether it changed, or `None` for an unknown user.
    async fn update(
        &self,
        user_id: &str,
        edit: UserEdit,
    ) -> Result<Option<(UserRecord, bool)>, UserStoreError>;

    async fn all(&self) -> Result<Vec<UserRecord>, UserStoreError>;

    /// Users with at least one playlist opted into auto-sort.
    async fn auto_sort_users(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|u| !u.auto_sort_playlists.is_empty())
            .collect())
    }
}

/// JSON file backed [`UserStore`].
///
/// The whole file is rewritten on every save; writes are serialised by the
/// inner lock.
pub struct UserManager {
    path: PathBuf,
    users: Mutex<Vec<UserRecord>>,
}

impl UserManager {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, UserStoreError> {
        let path = path.as_ref().to_path_buf();
        let users = match async_fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, users: &[UserRecord]) -> Result<(), UserStoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(users)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for UserManager {
    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, UserStoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn save(&self, user: UserRecord) -> Result<(), UserStoreError> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        self.persist(&users).await
    }

    async fn update(
        &self,
        user_id: &str,
        edit: UserEdit,
    ) -> Result<Option<(UserRecord, bool)>, UserStoreError> {
        let mut users = self.users.lock().await;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };

        let changed = edit(user);
        let updated = user.clone();
        if changed {
            self.persist(&users).await?;
        }
        Ok(Some((updated, changed)))
    }

    async fn all(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        Ok(self.users.lock().await.clone())
    }
}
