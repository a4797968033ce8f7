use super::{SpotifyClient, SpotifyError, client::check};
use crate::types::{
    Artist, TimeRange, TopArtistsResponse, TopItemKind, TopItems, TopTracksResponse, Track,
    TrackItem,
};

impl SpotifyClient {
    pub(super) async fn get_top_items(
        &self,
        kind: TopItemKind,
        range: TimeRange,
        limit: usize,
        token: &str,
    ) -> Result<TopItems, SpotifyError> {
        let response = self
            .http
            .get(self.url(&format!("/me/top/{kind}?time_range={range}&limit={limit}")))
            .bearer_auth(token)
            .send()
            .await?;
        let response = check(response).await?;

        Ok(match kind {
            TopItemKind::Tracks => {
                let page = response.json::<TopTracksResponse>().await?;
                TopItems::Tracks(
                    page.items
                        .into_iter()
                        .map(|track| Track::from(TrackItem { track: Some(track) }))
                        .collect(),
                )
            }
            TopItemKind::Artists => {
                let page = response.json::<TopArtistsResponse>().await?;
                TopItems::Artists(page.items.into_iter().map(Artist::from).collect())
            }
        })
    }
}
