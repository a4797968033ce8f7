mod auth;
mod preferences;
mod users;

pub use auth::EXPIRY_MARGIN_SECS;
pub use auth::TokenError;
pub use auth::TokenManager;
pub use auth::TokenProvider;
pub use auth::is_expired;
pub use preferences::PreferenceError;
pub use preferences::PreferenceList;
pub use preferences::update_list;
pub use users::UserEdit;
pub use users::UserManager;
pub use users::UserRecord;
pub use users::UserStore;
pub use users::UserStoreError;
