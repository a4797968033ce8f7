use super::{SpotifyClient, SpotifyError, client::check};
use crate::types::{
    AddTrackToPlaylistRequest, LIKED_BATCH_SIZE, PLAYLIST_BATCH_SIZE, PlaylistId,
    RemovePlaylistTracksRequest, SavedTracksRequest, SavedTracksTotal, Track, TrackPage,
    TrackPageResponse, UriRef,
};

impl SpotifyClient {
    /// Retrieves one page of tracks.
    ///
    /// The first page is requested from `/me/tracks` for the liked-list and
    /// from `/playlists/{id}/tracks` otherwise, with the largest page size each
    /// endpoint accepts. Later pages follow the absolute `next` URL Spotify
    /// hands back, which is used verbatim as the cursor.
    pub(super) async fn get_track_page(
        &self,
        playlist: &PlaylistId,
        cursor: Option<&str>,
        token: &str,
    ) -> Result<TrackPage, SpotifyError> {
        let api_url = match cursor {
            Some(next) => next.to_string(),
            None => match playlist {
                PlaylistId::Liked => {
                    self.url(&format!("/me/tracks?limit={limit}", limit = LIKED_BATCH_SIZE))
                }
                PlaylistId::Playlist(id) => self.url(&format!(
                    "/playlists/{id}/tracks?limit={limit}",
                    limit = PLAYLIST_BATCH_SIZE
                )),
            },
        };

        let response = self.http.get(&api_url).bearer_auth(token).send().await?;
        let page = check(response).await?.json::<TrackPageResponse>().await?;

        Ok(TrackPage {
            tracks: page.items.into_iter().map(Track::from).collect(),
            next: page.next,
        })
    }

    pub(super) async fn delete_track_batch(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        token: &str,
    ) -> Result<(), SpotifyError> {
        let request = match playlist {
            PlaylistId::Liked => self
                .http
                .delete(self.url("/me/tracks"))
                .json(&SavedTracksRequest {
                    ids: references.to_vec(),
                }),
            PlaylistId::Playlist(id) => self
                .http
                .delete(self.url(&format!("/playlists/{id}/tracks")))
                .json(&RemovePlaylistTracksRequest {
                    tracks: references
                        .iter()
                        .map(|uri| UriRef { uri: uri.clone() })
                        .collect(),
                }),
        };

        check(request.bearer_auth(token).send().await?).await?;
        Ok(())
    }

    pub(super) async fn insert_track_batch(
        &self,
        playlist: &PlaylistId,
        references: &[String],
        token: &str,
    ) -> Result<(), SpotifyError> {
        let request = match playlist {
            PlaylistId::Liked => self
                .http
                .put(self.url("/me/tracks"))
                .json(&SavedTracksRequest {
                    ids: references.to_vec(),
                }),
            PlaylistId::Playlist(id) => self
                .http
                .post(self.url(&format!("/playlists/{id}/tracks")))
                .json(&AddTrackToPlaylistRequest {
                    uris: references.to_vec(),
                }),
        };

        check(request.bearer_auth(token).send().await?).await?;
        Ok(())
    }

    pub(super) async fn get_saved_tracks_total(&self, token: &str) -> Result<u32, SpotifyError> {
        let response = self
            .http
            .get(self.url("/me/tracks?limit=1"))
            .bearer_auth(token)
            .send()
            .await?;

        let res = check(response).await?.json::<SavedTracksTotal>().await?;
        Ok(res.total)
    }
}
