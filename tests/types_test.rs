use chrono::NaiveDate;
use playmgr::types::*;

#[test]
fn test_playlist_id_parse() {
    assert_eq!(PlaylistId::parse("liked-songs"), PlaylistId::Liked);
    assert_eq!(
        PlaylistId::parse("37i9dQZF1DX0XUsuxWHRQd"),
        PlaylistId::Playlist("37i9dQZF1DX0XUsuxWHRQd".to_string())
    );
    assert_eq!(PlaylistId::Liked.batch_size(), 50);
    assert_eq!(PlaylistId::parse("x").batch_size(), 100);
    assert_eq!(PlaylistId::Liked.to_string(), "liked-songs");
}

#[test]
fn test_copy_destination_parse() {
    assert_eq!(CopyDestination::parse("new-playlist"), CopyDestination::NewPlaylist);
    assert_eq!(
        CopyDestination::parse("liked-songs"),
        CopyDestination::Existing(PlaylistId::Liked)
    );
}

#[test]
fn test_track_reference_depends_on_playlist_kind() {
    let track = Track {
        id: Some("abc".to_string()),
        uri: Some("spotify:track:abc".to_string()),
        ..Default::default()
    };

    assert_eq!(track.reference(&PlaylistId::Liked), Some("abc"));
    assert_eq!(
        track.reference(&PlaylistId::parse("pl")),
        Some("spotify:track:abc")
    );
}

#[test]
fn test_track_page_decoding() {
    let body = r#"{
        "items": [
            {
                "track": {
                    "id": "t1",
                    "uri": "spotify:track:t1",
                    "name": "First",
                    "track_number": 3,
                    "duration_ms": 201000,
                    "explicit": true,
                    "artists": [{"name": "Band"}, {"name": "Guest"}],
                    "album": {
                        "id": "al1",
                        "name": "Record",
                        "release_date": "2019-05",
                        "release_date_precision": "month",
                        "images": [{"url": "https://i.scdn.co/image/1"}]
                    }
                }
            },
            { "track": null },
            {
                "track": {
                    "id": null,
                    "uri": "spotify:local:x",
                    "name": "Local file",
                    "artists": [],
                    "album": {"id": null, "name": "", "release_date": null, "images": []}
                }
            }
        ],
        "next": "https://api.spotify.com/v1/me/tracks?offset=50&limit=50"
    }"#;

    let page: TrackPageResponse = serde_json::from_str(body).unwrap();
    assert!(page.next.is_some());
    let tracks: Vec<Track> = page.items.into_iter().map(Track::from).collect();

    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[0].id.as_deref(), Some("t1"));
    assert_eq!(tracks[0].artist_name, "Band");
    assert_eq!(tracks[0].album_id.as_deref(), Some("al1"));
    assert_eq!(tracks[0].release_date, NaiveDate::from_ymd_opt(2019, 5, 1));
    assert_eq!(tracks[0].track_number, 3);
    assert!(tracks[0].explicit);
    assert_eq!(tracks[0].image_url.as_deref(), Some("https://i.scdn.co/image/1"));

    assert_eq!(tracks[1], Track::default());

    assert!(tracks[2].id.is_none());
    assert!(tracks[2].album_id.is_none());
    assert!(tracks[2].release_date.is_none());
}

#[test]
fn test_playlist_object_conversion() {
    let body = r#"{
        "id": "pl1",
        "name": "Road trip",
        "description": "long drives",
        "public": true,
        "owner": {"display_name": "someone"},
        "images": [{"url": "https://i.scdn.co/image/p"}],
        "external_urls": {"spotify": "https://open.spotify.com/playlist/pl1"},
        "tracks": {"total": 42}
    }"#;

    let details: PlaylistDetails = serde_json::from_str::<PlaylistObject>(body)
        .unwrap()
        .into();

    assert_eq!(details.id, "pl1");
    assert_eq!(details.owner_name.as_deref(), Some("someone"));
    assert_eq!(details.total_tracks, 42);
    assert!(details.public);
    assert_eq!(
        details.spotify_url.as_deref(),
        Some("https://open.spotify.com/playlist/pl1")
    );
}

#[test]
fn test_playlist_view_serializes_camel_case() {
    let view = PlaylistView {
        id: "pl1".to_string(),
        name: "Road trip".to_string(),
        owner_name: "someone".to_string(),
        description: None,
        total_tracks: 1,
        image_url: None,
        spotify_url: None,
        public: false,
        is_favorite: true,
        auto_sort: false,
        tracks: vec![TrackView::from(&Track {
            id: Some("t1".to_string()),
            name: "First".to_string(),
            explicit: true,
            duration_ms: 1000,
            ..Default::default()
        })],
    };

    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["ownerName"], "someone");
    assert_eq!(json["totalTracks"], 1);
    assert_eq!(json["isFavorite"], true);
    assert_eq!(json["autoSort"], false);
    assert_eq!(json["tracks"][0]["isExplicit"], true);
    assert_eq!(json["tracks"][0]["duration"], 1000);
}
