use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use syncli::Res;
use syncli::sync::{ServiceClient, pool};
use syncli::types::{Playlist, Service, Track};

fn spotify_track(title: &str, artist: &str, id: &str) -> Track {
    Track {
        title: title.to_string(),
        artists: vec![artist.to_string()],
        source_id: id.to_string(),
        origin: Service::Spotify,
    }
}

fn tidal_track(title: &str, artist: &str, id: &str) -> Track {
    Track {
        title: title.to_string(),
        artists: vec![artist.to_string()],
        source_id: id.to_string(),
        origin: Service::Tidal,
    }
}

// Mock destination service: serves a fixed catalog and tracks how many
// search calls run at the same time.
struct MockCatalog {
    catalog: Vec<Track>,
    fail: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockCatalog {
    fn new(catalog: Vec<Track>) -> Self {
        Self {
            catalog,
            fail: false,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            catalog: Vec::new(),
            fail: true,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ServiceClient for MockCatalog {
    fn service(&self) -> Service {
        Service::Tidal
    }

    async fn fetch_playlist_tracks(&self, _playlist: &Playlist) -> Res<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn search_tracks(&self, _query: &str) -> Res<Vec<Track>> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

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

#[tokio::test]
async fn test_outcomes_are_keyed_by_track() {
    let titles = ["Photograph", "Shape of You", "Castle on the Hill", "Perfect", "Sing"];

    let catalog: Vec<Track> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| tidal_track(title, "Ed Sheeran", &format!("t{}", i)))
        .collect();
    let tracks: Vec<Track> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| spotify_track(title, "Ed Sheeran", &format!("s{}", i)))
        .collect();

    let client = Arc::new(MockCatalog::new(catalog));
    let outcomes = pool::resolve_missing(client, tracks.clone(), 0.85, 3, None)
        .await
        .unwrap();

    // Every track has its own slot, keyed by source id, regardless of
    // which worker finished first
    assert_eq!(outcomes.len(), tracks.len());
    for (i, track) in tracks.iter().enumerate() {
        match outcomes.get(&track.source_id) {
            Some(pool::SearchOutcome::Matched(result)) => {
                let candidate = result.candidate.as_ref().unwrap();
                assert_eq!(candidate.source_id, format!("t{}", i));
            }
            other => panic!("expected a match for {}, got {:?}", track.title, other),
        }
    }
}

#[tokio::test]
async fn test_worker_count_bounds_concurrency() {
    let tracks: Vec<Track> = (0..12)
        .map(|i| spotify_track(&format!("Song Number {}", i), "Artist", &format!("s{}", i)))
        .collect();

    let client = Arc::new(MockCatalog::new(Vec::new()));
    let observer = Arc::clone(&client);
    pool::resolve_missing(client, tracks, 0.85, 3, None)
        .await
        .unwrap();

    let max = observer.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 3, "observed {} concurrent searches, limit was 3", max);
    assert!(max >= 1);
}

#[tokio::test]
async fn test_retry_exhaustion_is_failed_not_unmatched() {
    let tracks = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];

    let client = Arc::new(MockCatalog::failing());
    let outcomes = pool::resolve_missing(client, tracks, 0.85, 2, None)
        .await
        .unwrap();

    match outcomes.get("s1") {
        Some(pool::SearchOutcome::Failed(reason)) => {
            assert!(reason.contains("connection reset"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_catalog_confirms_absence() {
    let tracks = vec![spotify_track("Photograph", "Ed Sheeran", "s1")];

    let client = Arc::new(MockCatalog::new(Vec::new()));
    let outcomes = pool::resolve_missing(client, tracks, 0.85, 2, None)
        .await
        .unwrap();

    match outcomes.get("s1") {
        Some(pool::SearchOutcome::Unmatched(result)) => {
            assert_eq!(result.confidence, 0.0);
        }
        other => panic!("expected Unmatched, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_tracks_no_work() {
    let client = Arc::new(MockCatalog::new(Vec::new()));
    let outcomes = pool::resolve_missing(client, Vec::new(), 0.85, 5, None)
        .await
        .unwrap();
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn test_progress_reports_every_completion() {
    let tracks: Vec<Track> = (0..4)
        .map(|i| spotify_track(&format!("Song Number {}", i), "Artist", &format!("s{}", i)))
        .collect();

    let completions = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&completions);
    let progress: pool::ProgressFn = Arc::new(move |completed, total| {
        assert!(completed <= total);
        assert_eq!(total, 4);
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let client = Arc::new(MockCatalog::new(Vec::new()));
    pool::resolve_missing(client, tracks, 0.85, 2, Some(progress))
        .await
        .unwrap();

    assert_eq!(completions.load(Ordering::SeqCst), 4);
}
