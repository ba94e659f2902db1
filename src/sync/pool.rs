//! Bounded worker pool for live cross-service track resolution.
//!
//! The diff engine cannot prove a track absent from a service by looking at
//! one fetched snapshot, so unresolved tracks are confirmed with live search
//! calls. Those calls are network-bound and independent, which makes them the
//! one concurrent part of the engine: a fixed number of workers consumes a
//! shared queue and writes each outcome into its own slot of a track-keyed
//! map, so completion order never influences the resulting plan.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{
    config,
    sync::{ServiceClient, SyncError, matcher, normalize},
    types::{MatchMethod, MatchResult, Track},
    utils,
};

/// Progress callback invoked with (completed, total) as workers finish.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Outcome of one live search confirmation.
///
/// `Unmatched` means the service was searched successfully and no equivalent
/// track exists - the track is confirmed absent. `Failed` means the search
/// itself kept failing after retries and nothing was proven; the two must
/// never be conflated.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Matched(MatchResult),
    Unmatched(MatchResult),
    Failed(String),
}

/// Resolves each track against the destination service through a bounded
/// worker pool and returns the outcomes keyed by the track's `source_id`.
///
/// Worker count is capped by the number of tracks. Transient search errors
/// are retried with exponential backoff inside the worker; a worker that
/// cannot be joined aborts the whole resolution so the caller never reduces
/// a partial result set into a plan.
pub async fn resolve_missing(
    client: Arc<dyn ServiceClient>,
    tracks: Vec<Track>,
    threshold: f64,
    workers: usize,
    progress: Option<ProgressFn>,
) -> Result<HashMap<String, SearchOutcome>, SyncError> {
    let total = tracks.len();
    if total == 0 {
        return Ok(HashMap::new());
    }

    let queue: Arc<Mutex<VecDeque<Track>>> = Arc::new(Mutex::new(tracks.into()));
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, SearchOutcome)>();

    let worker_count = workers.max(1).min(total);
    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let queue = Arc::clone(&queue);
        let client = Arc::clone(&client);
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let track = { queue.lock().await.pop_front() };
                let Some(track) = track else { break };

                let outcome = resolve_one(client.as_ref(), &track, threshold).await;
                if tx.send((track.source_id.clone(), outcome)).is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    let mut results = HashMap::with_capacity(total);
    let mut completed = 0usize;
    while let Some((source_id, outcome)) = rx.recv().await {
        completed += 1;
        if let Some(report) = &progress {
            report(completed, total);
        }
        results.insert(source_id, outcome);
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| SyncError::Worker(e.to_string()))?;
    }

    Ok(results)
}

// Tries each search strategy in order until one produces an accepted match.
// The best rejected score is kept so the caller can report how close the
// nearest candidate came.
async fn resolve_one(client: &dyn ServiceClient, track: &Track, threshold: f64) -> SearchOutcome {
    let mut best_miss: Option<MatchResult> = None;

    for query in normalize::search_queries(track) {
        let candidates = match utils::retry_with_backoff(config::RETRY_MAX_ATTEMPTS, || {
            client.search_tracks(&query)
        })
        .await
        {
            Ok(candidates) => candidates,
            Err(e) => return SearchOutcome::Failed(e.to_string()),
        };

        let result = matcher::match_track(track, &candidates, threshold);
        match result.method {
            MatchMethod::ExactSignature | MatchMethod::Fuzzy => {
                return SearchOutcome::Matched(result);
            }
            MatchMethod::Unmatched => {
                let is_closer = best_miss
                    .as_ref()
                    .map(|b| result.confidence > b.confidence)
                    .unwrap_or(true);
                if is_closer {
                    best_miss = Some(result);
                }
            }
        }
    }

    SearchOutcome::Unmatched(best_miss.unwrap_or(MatchResult {
        track: track.clone(),
        candidate: None,
        confidence: 0.0,
        method: MatchMethod::Unmatched,
    }))
}
