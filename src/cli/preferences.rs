use super::context;
use crate::{error, info, management::PreferenceList, success};

pub async fn update_preference(
    user_id: String,
    list: PreferenceList,
    playlist_id: String,
    present: bool,
) {
    let ctx = context().await;

    match ctx
        .sync
        .update_preference(&user_id, list, &playlist_id, present)
        .await
    {
        Ok(entries) => {
            let verb = if present { "added to" } else { "removed from" };
            success!("Playlist {} {} {}", playlist_id, verb, list.label());
            for entry in entries {
                info!("{}", entry);
            }
        }
        Err(e) => error!("Cannot update {}. Err: {}", list.label(), e),
    }
}
