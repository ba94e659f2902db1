use std::sync::Mutex;

use async_trait::async_trait;
use syncli::Res;
use syncli::sync::{ServiceClient, executor};
use syncli::types::{Playlist, Service, SyncAction, SyncPlan, Track};

fn track(title: &str, id: &str, origin: Service) -> Track {
    Track {
        title: title.to_string(),
        artists: vec!["Artist".to_string()],
        source_id: id.to_string(),
        origin,
    }
}

fn playlist(service: Service) -> Playlist {
    Playlist {
        id: "p1".to_string(),
        name: "Test".to_string(),
        service,
        track_count: 0,
    }
}

// Mock mutation API recording calls; ids listed in `reject` always fail.
struct MockMutations {
    service: Service,
    added: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    reject: Vec<String>,
}

impl MockMutations {
    fn new(service: Service) -> Self {
        Self {
            service,
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            reject: Vec::new(),
        }
    }

    fn rejecting(service: Service, ids: &[&str]) -> Self {
        Self {
            reject: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::new(service)
        }
    }
}

#[async_trait]
impl ServiceClient for MockMutations {
    fn service(&self) -> Service {
        self.service
    }

    async fn fetch_playlist_tracks(&self, _playlist: &Playlist) -> Res<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn search_tracks(&self, _query: &str) -> Res<Vec<Track>> {
        Ok(Vec::new())
    }

    async fn add_track(&self, _playlist: &Playlist, track: &Track) -> Res<()> {
        if self.reject.contains(&track.source_id) {
            return Err("503 service unavailable".into());
        }
        self.added.lock().unwrap().push(track.source_id.clone());
        Ok(())
    }

    async fn remove_track(&self, _playlist: &Playlist, track: &Track) -> Res<()> {
        if self.reject.contains(&track.source_id) {
            return Err("503 service unavailable".into());
        }
        self.removed.lock().unwrap().push(track.source_id.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_plan_is_applied_per_service() {
    let spotify = MockMutations::new(Service::Spotify);
    let tidal = MockMutations::new(Service::Tidal);

    let plan = SyncPlan {
        add_to_spotify: vec![track("Castle on the Hill", "sp9", Service::Spotify)],
        add_to_tidal: vec![
            track("Photograph", "td1", Service::Tidal),
            track("Perfect", "td2", Service::Tidal),
        ],
        remove_from_spotify: Vec::new(),
        remove_from_tidal: vec![track("Old Song", "td3", Service::Tidal)],
    };

    let summary = executor::execute(
        &plan,
        &spotify,
        &tidal,
        &playlist(Service::Spotify),
        &playlist(Service::Tidal),
    )
    .await;

    assert_eq!(summary.added_to_spotify, 1);
    assert_eq!(summary.added_to_tidal, 2);
    assert_eq!(summary.removed_from_tidal, 1);
    assert_eq!(summary.removed_from_spotify, 0);
    assert!(summary.failed.is_empty());

    assert_eq!(*spotify.added.lock().unwrap(), vec!["sp9"]);
    assert_eq!(*tidal.added.lock().unwrap(), vec!["td1", "td2"]);
    assert_eq!(*tidal.removed.lock().unwrap(), vec!["td3"]);
}

#[tokio::test]
async fn test_one_failure_does_not_abort_the_batch() {
    let spotify = MockMutations::new(Service::Spotify);
    let tidal = MockMutations::rejecting(Service::Tidal, &["td1"]);

    let plan = SyncPlan {
        add_to_spotify: Vec::new(),
        add_to_tidal: vec![
            track("Photograph", "td1", Service::Tidal),
            track("Perfect", "td2", Service::Tidal),
        ],
        remove_from_spotify: Vec::new(),
        remove_from_tidal: Vec::new(),
    };

    let summary = executor::execute(
        &plan,
        &spotify,
        &tidal,
        &playlist(Service::Spotify),
        &playlist(Service::Tidal),
    )
    .await;

    // The failing entry is recorded, the rest still goes through
    assert_eq!(summary.added_to_tidal, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].track.source_id, "td1");
    assert_eq!(summary.failed[0].action, SyncAction::Add);
    assert!(summary.failed[0].reason.contains("503"));
}

#[tokio::test]
async fn test_unresolved_entries_are_recorded_not_sent() {
    let spotify = MockMutations::new(Service::Spotify);
    let tidal = MockMutations::new(Service::Tidal);

    // A Spotify-origin record in the Tidal add list means no Tidal id was
    // ever resolved for it
    let plan = SyncPlan {
        add_to_spotify: Vec::new(),
        add_to_tidal: vec![track("Photograph", "s1", Service::Spotify)],
        remove_from_spotify: Vec::new(),
        remove_from_tidal: Vec::new(),
    };

    let summary = executor::execute(
        &plan,
        &spotify,
        &tidal,
        &playlist(Service::Spotify),
        &playlist(Service::Tidal),
    )
    .await;

    assert_eq!(summary.added_to_tidal, 0);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].reason.contains("not resolved"));
    assert!(tidal.added.lock().unwrap().is_empty());
}
