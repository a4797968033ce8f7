use super::{SpotifyClient, SpotifyError, client::check};
use crate::types::{
    CreatePlaylistRequest, PlaylistDetails, PlaylistObject, PlaylistPage, PlaylistPageResponse,
};

impl SpotifyClient {
    pub(super) async fn get_playlist(
        &self,
        playlist_id: &str,
        token: &str,
    ) -> Result<PlaylistDetails, SpotifyError> {
        let response = self
            .http
            .get(self.url(&format!(
                "/playlists/{playlist_id}?fields=id,name,description,public,owner(display_name),images,external_urls,tracks(total)"
            )))
            .bearer_auth(token)
            .send()
            .await?;

        let playlist = check(response).await?.json::<PlaylistObject>().await?;
        Ok(playlist.into())
    }

    /// Creates a playlist owned by `spotify_user_id`.
    pub(super) async fn create(
        &self,
        spotify_user_id: &str,
        request: &CreatePlaylistRequest,
        token: &str,
    ) -> Result<PlaylistDetails, SpotifyError> {
        let response = self
            .http
            .post(self.url(&format!("/users/{spotify_user_id}/playlists")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let playlist = check(response).await?.json::<PlaylistObject>().await?;
        Ok(playlist.into())
    }

    pub(super) async fn get_playlists_page(
        &self,
        cursor: Option<&str>,
        token: &str,
    ) -> Result<PlaylistPage, SpotifyError> {
        let api_url = match cursor {
            Some(next) => next.to_string(),
            None => self.url("/me/playlists?limit=50"),
        };

        let response = self.http.get(&api_url).bearer_auth(token).send().await?;
        let page = check(response).await?.json::<PlaylistPageResponse>().await?;

        Ok(PlaylistPage {
            playlists: page.items.into_iter().map(PlaylistDetails::from).collect(),
            next: page.next,
        })
    }
}
