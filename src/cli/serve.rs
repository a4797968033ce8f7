use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::Context;
use crate::{
    config, error, info,
    server::{self, AppState},
    success,
    sync::autosort::AutoSortDriver,
};

/// Runs the HTTP API and the daily auto-sort until Ctrl-C.
pub async fn serve() {
    let addr = match config::server_addr() {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };
    let at = match config::auto_sort_at() {
        Ok(at) => at,
        Err(e) => error!("Failed to parse auto-sort time: {}", e),
    };

    let cancel = CancellationToken::new();
    let ctx = match Context::from_env(cancel.clone()).await {
        Ok(ctx) => ctx,
        Err(e) => error!("Cannot set up the playlist manager. Err: {}", e),
    };

    let driver = AutoSortDriver::new(Arc::clone(&ctx.sync));
    let scheduler = tokio::spawn({
        let cancel = cancel.clone();
        async move { driver.run_daily(at, cancel).await }
    });

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for ctrl-c");
                return;
            }
            cancel.cancel();
        }
    });

    info!("Serving on {} (auto-sort daily at {})", addr, at);
    let state = AppState { sync: ctx.sync };
    if let Err(e) = server::start_api_server(state, addr, cancel.clone()).await {
        cancel.cancel();
        error!("Server failed. Err: {}", e);
    }

    if let Err(e) = scheduler.await {
        warn!(error = %e, "auto-sort scheduler ended abnormally");
    }
    success!("Stopped");
}
