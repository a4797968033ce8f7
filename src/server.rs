use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{api, sync::PlaylistSync};

#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<PlaylistSync>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/playlists", get(api::list_playlists))
        .route("/playlists/favorites", post(api::add_favorite))
        .route("/playlists/favorites/{id}", delete(api::remove_favorite))
        .route("/playlists/auto-sort", post(api::add_auto_sort))
        .route("/playlists/auto-sort/{id}", delete(api::remove_auto_sort))
        .route("/playlists/top/{kind}", get(api::get_top_items))
        .route("/playlists/{id}", get(api::get_playlist))
        .route("/playlists/{id}/sort", post(api::sort_playlist))
        .route("/playlists/{id}/shuffle", post(api::shuffle_playlist))
        .route("/playlists/{id}/clear", post(api::clear_playlist))
        .route(
            "/playlists/{source}/copy/{destination}",
            post(api::copy_playlist),
        )
        .with_state(state)
}

/// Serves the API on `addr` until `cancel` fires, then drains in-flight
/// requests.
pub async fn start_api_server(
    state: AppState,
    addr: SocketAddr,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "api server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("api server stopped");
    Ok(())
}
