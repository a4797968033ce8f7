mod common;

use common::{FakeSpotify, MemoryUsers, date, engine_with_users, track, user};
use playmgr::sync::autosort::{AutoSortDriver, AutoSortReport};
use std::sync::Arc;

#[tokio::test]
async fn test_run_once_isolates_failures() {
    let mut first = user("u1");
    first.auto_sort_playlists = vec!["missing".to_string(), "p1".to_string()];
    let mut second = user("u2");
    second.auto_sort_playlists = vec!["p2".to_string()];
    let idle = user("u3");

    let api = FakeSpotify::new()
        .with_playlist(
            "p1",
            vec![
                track("old", "O", date(2001, 1, 1), 1),
                track("new", "N", date(2021, 1, 1), 1),
            ],
        )
        .with_playlist(
            "p2",
            vec![
                track("x2", "X", date(2010, 1, 1), 2),
                track("x1", "X", date(2010, 1, 1), 1),
            ],
        );
    let sync = engine_with_users(api.clone(), MemoryUsers::with(vec![first, second, idle]));
    let driver = AutoSortDriver::new(Arc::new(sync));

    let report = driver.run_once().await.unwrap();

    assert_eq!(report, AutoSortReport { sorted: 2, failed: 1 });
    assert_eq!(api.track_ids("p1"), vec!["new", "old"]);
    assert_eq!(api.track_ids("p2"), vec!["x1", "x2"]);
}

#[tokio::test]
async fn test_liked_songs_in_auto_sort_list_counts_as_failure() {
    let mut me = user("u1");
    me.auto_sort_playlists = vec!["liked-songs".to_string()];
    let sync = engine_with_users(FakeSpotify::new(), MemoryUsers::with(vec![me]));
    let driver = AutoSortDriver::new(Arc::new(sync));

    let report = driver.run_once().await.unwrap();

    assert_eq!(report, AutoSortReport { sorted: 0, failed: 1 });
}

#[tokio::test]
async fn test_run_once_without_opted_in_users() {
    let sync = engine_with_users(FakeSpotify::new(), MemoryUsers::with(vec![user("u1")]));
    let driver = AutoSortDriver::new(Arc::new(sync));

    let report = driver.run_once().await.unwrap();

    assert_eq!(report, AutoSortReport::default());
}

#[tokio::test]
async fn test_run_daily_stops_on_cancel() {
    let sync = engine_with_users(FakeSpotify::new(), MemoryUsers::with(Vec::new()));
    let driver = AutoSortDriver::new(Arc::new(sync));
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();

    let at = chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), driver.run_daily(at, cancel))
        .await
        .expect("scheduler should stop once cancelled");
}
