use tabled::Table;

use super::{context, spinner};
use crate::{
    error, info,
    types::{ArtistTableRow, TimeRange, TopItemKind, TopItemView, TrackTableRow},
    utils,
};

pub async fn top(user_id: String, kind: String) {
    let Some(kind) = TopItemKind::parse(&kind) else {
        error!("Unknown top item type {}. Use tracks or artists.", kind);
    };

    let ctx = context().await;

    let pb = spinner(format!("Fetching top {}...", kind));
    let result = ctx.sync.top_items(&user_id, kind).await;
    pb.finish_and_clear();

    let view = match result {
        Ok(view) => view,
        Err(e) => error!("Cannot fetch top {}. Err: {}", kind, e),
    };

    for range in TimeRange::ALL {
        info!("Top {} ({})", kind, range);
        print_items(view.range(range));
    }
}

fn print_items(items: &[TopItemView]) {
    let mut tracks = Vec::new();
    let mut artists = Vec::new();

    for (i, item) in items.iter().enumerate() {
        match item {
            TopItemView::Track(t) => tracks.push(TrackTableRow {
                position: i + 1,
                name: t.name.clone(),
                artist: t.artist_name.clone(),
                album: t.album_name.clone(),
                length: utils::format_duration(t.duration),
            }),
            TopItemView::Artist(a) => artists.push(ArtistTableRow {
                position: i + 1,
                name: a.name.clone(),
                followers: a.followers,
                popularity: a.popularity,
                genres: a.genres.join(", "),
            }),
        }
    }

    if !tracks.is_empty() {
        println!("{}", Table::new(tracks));
    }
    if !artists.is_empty() {
        println!("{}", Table::new(artists));
    }
}
