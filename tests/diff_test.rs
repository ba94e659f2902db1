use std::sync::Arc;

use async_trait::async_trait;
use syncli::Res;
use syncli::sync::{ServiceClient, SyncError, diff};
use syncli::types::{
    Playlist, Service, SyncDirection, SyncOptions, Track,
};

// Helper function to create a Spotify-side track
fn spotify_track(title: &str, artist: &str, id: &str) -> Track {
    Track {
        title: title.to_string(),
        artists: vec![artist.to_string()],
        source_id: id.to_string(),
        origin: Service::Spotify,
    }
}

// Helper function to create a Tidal-side track
fn tidal_track(title: &str, artist: &str, id: &str) -> Track {
    Track {
        title: title.to_string(),
        artists: vec![artist.to_string()],
        source_id: id.to_string(),
        origin: Service::Tidal,
    }
}

fn options(direction: SyncDirection, cleanup: bool) -> SyncOptions {
    SyncOptions {
        direction,
        cleanup,
        threshold: 0.85,
        workers: 2,
        auto: true,
    }
}

// Mock service used for the live search pass
struct MockService {
    service: Service,
    catalog: Vec<Track>,
    fail: bool,
}

#[async_trait]
impl ServiceClient for MockService {
    fn service(&self) -> Service {
        self.service
    }

    async fn fetch_playlist_tracks(&self, _playlist: &Playlist) -> Res<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn search_tracks(&self, _query: &str) -> Res<Vec<Track>> {
        if self.fail {
            return Err("connection reset by peer".into());
        }
        Ok(self.catalog.clone())
    }

    async fn add_track(&self, _playlist: &Playlist, _track: &Track) -> Res<()> {
        Ok(())
    }

    async fn remove_track(&self, _playlist: &Playlist, _track: &Track) -> Res<()> {
        Ok(())
    }
}

fn live_search(spotify_catalog: Vec<Track>, tidal_catalog: Vec<Track>) -> diff::LiveSearch {
    diff::LiveSearch {
        spotify: Arc::new(MockService {
            service: Service::Spotify,
            catalog: spotify_catalog,
            fail: false,
        }),
        tidal: Arc::new(MockService {
            service: Service::Tidal,
            catalog: tidal_catalog,
            fail: false,
        }),
        progress: None,
    }
}

#[tokio::test]
async fn test_cosmetic_variants_produce_empty_plan() {
    // "shape of you (radio edit)" is the same song as "Shape of You"
    let spotify = vec![spotify_track("Shape of You", "Ed Sheeran", "s1")];
    let tidal = vec![tidal_track("shape of you (radio edit)", "Ed Sheeran", "t1")];

    let report = diff::compute_plan(&spotify, &tidal, &options(SyncDirection::Both, false), None)
        .await
        .unwrap();

    assert!(report.plan.is_empty());
    // One exact signature match per direction
    assert_eq!(report.matched.exact, 2);
}

#[tokio::test]
async fn test_empty_destination_adds_every_source_track() {
    let spotify = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];
    let tidal: Vec<Track> = Vec::new();

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, false),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.plan.add_to_tidal.len(), 1);
    assert_eq!(report.plan.add_to_tidal[0].title, "Photograph");
    // One-directional sync never touches the other side
    assert!(report.plan.add_to_spotify.is_empty());
    assert!(report.plan.remove_from_tidal.is_empty());
}

#[tokio::test]
async fn test_duplicate_source_signatures_added_once() {
    // Two cosmetic variants of the same song in the source
    let spotify = vec![
        spotify_track("Hello", "Adele", "s1"),
        spotify_track("Hello (Remastered)", "Adele", "s2"),
    ];
    let tidal: Vec<Track> = Vec::new();

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, false),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.plan.add_to_tidal.len(), 1);
    assert_eq!(report.plan.add_to_tidal[0].source_id, "s1");
}

#[tokio::test]
async fn test_delta_sync_converges() {
    let spotify = vec![
        spotify_track("Photograph", "Ed Sheeran", "s1"),
        spotify_track("Shape of You", "Ed Sheeran", "s2"),
    ];
    let tidal = vec![tidal_track("Castle on the Hill", "Ed Sheeran", "t1")];

    let opts = options(SyncDirection::Both, false);
    let report = diff::compute_plan(&spotify, &tidal, &opts, None).await.unwrap();

    // Apply the plan to both snapshots
    let mut spotify_after = spotify.clone();
    spotify_after.extend(report.plan.add_to_spotify.clone());
    let mut tidal_after = tidal.clone();
    tidal_after.extend(report.plan.add_to_tidal.clone());

    // Re-running the diff on the converged snapshots plans nothing
    let second = diff::compute_plan(&spotify_after, &tidal_after, &opts, None)
        .await
        .unwrap();
    assert!(second.plan.is_empty());
}

#[tokio::test]
async fn test_both_mode_unions_independent_directions() {
    // One track missing from each side resolves to one add per side
    let spotify = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];
    let tidal = vec![tidal_track("Castle on the Hill", "Ed Sheeran", "t1")];

    let report = diff::compute_plan(&spotify, &tidal, &options(SyncDirection::Both, false), None)
        .await
        .unwrap();

    assert_eq!(report.plan.add_to_tidal.len(), 1);
    assert_eq!(report.plan.add_to_spotify.len(), 1);
    assert_eq!(report.plan.add_to_tidal[0].title, "Photograph");
    assert_eq!(report.plan.add_to_spotify[0].title, "Castle on the Hill");
}

#[tokio::test]
async fn test_cleanup_removes_orphaned_destination_tracks() {
    let spotify = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];
    let tidal = vec![
        tidal_track("Photograph", "Ed Sheeran", "t1"),
        tidal_track("Some Removed Song", "Somebody", "t2"),
    ];

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, true),
        None,
    )
    .await
    .unwrap();

    // The orphan goes, the matched track stays
    assert_eq!(report.plan.remove_from_tidal.len(), 1);
    assert_eq!(report.plan.remove_from_tidal[0].source_id, "t2");
    assert!(report.plan.add_to_tidal.is_empty());
}

#[tokio::test]
async fn test_cleanup_spares_fuzzy_equivalents() {
    // Typo on the destination side - same song, no signature match
    let spotify = vec![spotify_track("Believe", "Cher", "s1")];
    let tidal = vec![tidal_track("Belive", "Cher", "t1")];

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, true),
        None,
    )
    .await
    .unwrap();

    assert!(report.plan.remove_from_tidal.is_empty());
    assert!(report.plan.add_to_tidal.is_empty());
    assert_eq!(report.matched.fuzzy, 1);
}

#[tokio::test]
async fn test_empty_source_with_cleanup_clears_destination() {
    let spotify: Vec<Track> = Vec::new();
    let tidal = vec![
        tidal_track("First", "Artist", "t1"),
        tidal_track("Second", "Artist", "t2"),
    ];

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, true),
        None,
    )
    .await
    .unwrap();

    assert!(report.plan.add_to_tidal.is_empty());
    assert_eq!(report.plan.remove_from_tidal.len(), 2);
}

#[tokio::test]
async fn test_live_search_resolves_destination_records() {
    let spotify = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];
    let tidal: Vec<Track> = Vec::new();

    // The song exists on Tidal, it just is not in the playlist yet
    let live = live_search(
        Vec::new(),
        vec![tidal_track("Photograph", "Ed Sheeran", "t9")],
    );

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, false),
        Some(&live),
    )
    .await
    .unwrap();

    // The add entry carries the Tidal-side record, ready to execute
    assert_eq!(report.plan.add_to_tidal.len(), 1);
    assert_eq!(report.plan.add_to_tidal[0].source_id, "t9");
    assert_eq!(report.plan.add_to_tidal[0].origin, Service::Tidal);
    // Exact signature match - no confirmation needed
    assert!(report.fuzzy_adds.is_empty());
}

#[tokio::test]
async fn test_live_search_confirms_absence() {
    let spotify = vec![spotify_track("Obscure B-Side", "Unknown Band", "s1")];
    let tidal: Vec<Track> = Vec::new();

    // Tidal has nothing remotely similar
    let live = live_search(Vec::new(), Vec::new());

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, false),
        Some(&live),
    )
    .await
    .unwrap();

    // Confirmed absent: reported, never added
    assert!(report.plan.add_to_tidal.is_empty());
    assert_eq!(report.ambiguous.len(), 1);
    assert_eq!(report.ambiguous[0].track.source_id, "s1");
    assert!(report.failed_searches.is_empty());
}

#[tokio::test]
async fn test_search_errors_are_not_absence() {
    let spotify = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];
    let tidal: Vec<Track> = Vec::new();

    let live = diff::LiveSearch {
        spotify: Arc::new(MockService {
            service: Service::Spotify,
            catalog: Vec::new(),
            fail: false,
        }),
        tidal: Arc::new(MockService {
            service: Service::Tidal,
            catalog: Vec::new(),
            fail: true,
        }),
        progress: None,
    };

    let report = diff::compute_plan(
        &spotify,
        &tidal,
        &options(SyncDirection::SpotifyToTidal, false),
        Some(&live),
    )
    .await
    .unwrap();

    // "try again later", not "confirmed absent"
    assert!(report.plan.add_to_tidal.is_empty());
    assert!(report.ambiguous.is_empty());
    assert_eq!(report.failed_searches.len(), 1);
}

#[tokio::test]
async fn test_invalid_options_rejected_before_any_work() {
    let spotify = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];
    let tidal: Vec<Track> = Vec::new();

    let mut opts = options(SyncDirection::Both, false);
    opts.threshold = 1.5;
    let result = diff::compute_plan(&spotify, &tidal, &opts, None).await;
    assert!(matches!(result, Err(SyncError::Config(_))));

    let mut opts = options(SyncDirection::Both, false);
    opts.workers = 0;
    let result = diff::compute_plan(&spotify, &tidal, &opts, None).await;
    assert!(matches!(result, Err(SyncError::Config(_))));
}
