use super::{context, spinner};
use crate::{error, success, sync::autosort::AutoSortDriver, warning};

pub async fn run_auto_sort() {
    let ctx = context().await;
    let driver = AutoSortDriver::new(ctx.sync);

    let pb = spinner("Sorting auto-sort playlists...");
    let result = driver.run_once().await;
    pb.finish_and_clear();

    match result {
        Ok(report) if report.failed > 0 => warning!(
            "{} playlists sorted, {} failed. Check the logs for details.",
            report.sorted,
            report.failed
        ),
        Ok(report) => success!("{} playlists sorted", report.sorted),
        Err(e) => error!("Auto-sort aborted. Err: {}", e),
    }
}
