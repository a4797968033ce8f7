use chrono::Utc;
use tabled::Table;

use crate::{
    config, error,
    management::{UserManager, UserRecord, UserStore},
    success,
    types::{Token, UserTableRow},
    warning,
};

/// Fields of a new or updated user record.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub id: String,
    pub spotify_user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: u64,
}

async fn load_users() -> UserManager {
    match UserManager::load(config::users_path()).await {
        Ok(users) => users,
        Err(e) => error!("Cannot load user store. Err: {}", e),
    }
}

/// Creates a user, or updates the identity and token of an existing one.
/// Preference lists of an existing user are kept.
pub async fn add_user(new: NewUser) {
    let users = load_users().await;

    let existing = match users.find(&new.id).await {
        Ok(existing) => existing,
        Err(e) => error!("Cannot read user store. Err: {}", e),
    };

    let token = new.refresh_token.map(|refresh_token| {
        let access_token = new.access_token.unwrap_or_default();
        Token {
            // an empty access token is refreshed on first use
            expires_in: if access_token.is_empty() { 0 } else { new.expires_in },
            access_token,
            refresh_token,
            scope: new.scope.unwrap_or_default(),
            obtained_at: Utc::now().timestamp() as u64,
        }
    });

    let mut record = existing.unwrap_or_default();
    if record.id.is_empty() {
        record.id = new.id;
    } else {
        warning!("User {} exists, updating", record.id);
    }
    record.spotify_user_id = new.spotify_user_id;
    record.username = new.username;
    if new.email.is_some() {
        record.email = new.email;
    }
    if token.is_some() {
        record.token = token;
    }

    let id = record.id.clone();
    if let Err(e) = users.save(record).await {
        error!("Cannot save user. Err: {}", e);
    }
    success!("User {} saved to {}", id, users.path().display());
}

pub async fn list_users() {
    let users = load_users().await;

    let records: Vec<UserRecord> = match users.all().await {
        Ok(records) => records,
        Err(e) => error!("Cannot read user store. Err: {}", e),
    };

    if records.is_empty() {
        warning!("No users in {}", users.path().display());
        return;
    }

    let rows: Vec<UserTableRow> = records
        .into_iter()
        .map(|u| UserTableRow {
            id: u.id,
            username: u.username,
            spotify_user: u.spotify_user_id,
            auto_sort: u.auto_sort_playlists.len(),
        })
        .collect();

    println!("{}", Table::new(rows));
}
