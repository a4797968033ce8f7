use tabled::Table;

use super::{context, spinner};
use crate::{
    error, info, success,
    sync::SyncError,
    types::{CopyDestination, PlaylistId, PlaylistTableRow, PlaylistView, TrackTableRow},
    utils, warning,
};

pub async fn sort(user_id: String, playlist: String) {
    let ctx = context().await;
    let playlist = PlaylistId::parse(&playlist);

    let pb = spinner(format!("Sorting {} by release date...", playlist));
    let result = ctx.sync.sort_by_release_date(&user_id, &playlist).await;
    pb.finish_and_clear();

    report("sorted", result);
}

pub async fn shuffle(user_id: String, playlist: String) {
    let ctx = context().await;
    let playlist = PlaylistId::parse(&playlist);

    let pb = spinner(format!("Shuffling {}...", playlist));
    let result = ctx.sync.shuffle(&user_id, &playlist).await;
    pb.finish_and_clear();

    report("shuffled", result);
}

pub async fn copy(user_id: String, source: String, destination: String) {
    let ctx = context().await;
    let source = PlaylistId::parse(&source);
    let destination = CopyDestination::parse(&destination);

    let pb = spinner(format!("Copying {}...", source));
    let result = ctx.sync.copy_content(&user_id, &source, &destination).await;
    pb.finish_and_clear();

    report("copied", result);
}

pub async fn clear(user_id: String, playlist: String) {
    let ctx = context().await;
    let playlist = PlaylistId::parse(&playlist);

    let pb = spinner(format!("Clearing {}...", playlist));
    let result = ctx.sync.clear(&user_id, &playlist).await;
    pb.finish_and_clear();

    report("cleared", result);
}

pub async fn show(user_id: String, playlist: String) {
    let ctx = context().await;
    let playlist = PlaylistId::parse(&playlist);

    let pb = spinner(format!("Loading {}...", playlist));
    let result = ctx.sync.playlist_view(&user_id, &playlist).await;
    pb.finish_and_clear();

    match result {
        Ok(view) => print_view(&view),
        Err(e) => error!("Cannot load playlist. Err: {}", e),
    }
}

pub async fn playlists(user_id: String) {
    let ctx = context().await;

    let pb = spinner("Fetching playlists...");
    let result = ctx.sync.list_playlists(&user_id).await;
    pb.finish_and_clear();

    let summaries = match result {
        Ok(summaries) => summaries,
        Err(e) => error!("Cannot list playlists. Err: {}", e),
    };

    let rows: Vec<PlaylistTableRow> = summaries
        .into_iter()
        .map(|p| PlaylistTableRow {
            id: p.id,
            name: p.name,
            tracks: p.total_tracks,
            favorite: p.is_favorite,
            auto_sort: p.auto_sort,
        })
        .collect();

    println!("{}", Table::new(rows));
}

fn report(action: &str, result: Result<PlaylistView, SyncError>) {
    match result {
        Ok(view) => {
            success!("Playlist {} {} ({} tracks)", view.name, action, view.total_tracks);
            print_view(&view);
        }
        Err(e) => {
            if let Some(id) = e.created_playlist() {
                warning!("Playlist {} was created but not filled. Copy into {} to finish.", id, id);
            } else if e.destination_modified() {
                warning!("The playlist was only partly rewritten. Run the command again.");
            }
            error!("Operation failed. Err: {}", e);
        }
    }
}

fn print_view(view: &PlaylistView) {
    info!("{} by {} ({} tracks)", view.name, view.owner_name, view.total_tracks);
    if let Some(url) = &view.spotify_url {
        info!("{}", url);
    }

    let rows: Vec<TrackTableRow> = view
        .tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            position: i + 1,
            name: t.name.clone(),
            artist: t.artist_name.clone(),
            album: t.album_name.clone(),
            length: utils::format_duration(t.duration),
        })
        .collect();

    println!("{}", Table::new(rows));
}
