//! Computes the sync plan for a pair of playlist snapshots.
//!
//! One direction at a time: every source track is first looked up in the
//! destination's signature index, then fuzzy-matched against the destination
//! snapshot, and only tracks still unresolved are confirmed through a live
//! search on the destination service. A signature miss alone never causes an
//! add - formatting differs by service, and an exact-signature miss does not
//! prove absence. "Both" mode computes the two one-directional plans
//! independently and unions them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    sync::{ServiceClient, SyncError, matcher, normalize, pool, validate_options},
    types::{
        DiffReport, MatchMethod, SearchFailure, Service, SyncOptions, Track,
    },
};

/// Live-search capabilities for both destinations, used for the third
/// matching pass. Without it the diff runs offline on the two snapshots
/// alone and add candidates keep their source-side records.
pub struct LiveSearch {
    pub spotify: Arc<dyn ServiceClient>,
    pub tidal: Arc<dyn ServiceClient>,
    pub progress: Option<pool::ProgressFn>,
}

impl LiveSearch {
    fn client_for(&self, service: Service) -> Arc<dyn ServiceClient> {
        match service {
            Service::Spotify => Arc::clone(&self.spotify),
            Service::Tidal => Arc::clone(&self.tidal),
        }
    }
}

/// Builds a signature index over a snapshot. First occurrence wins on
/// duplicate signatures, so cosmetic duplicates within one service are
/// treated as already-synced.
fn signature_index(tracks: &[Track]) -> HashMap<String, &Track> {
    let mut index = HashMap::with_capacity(tracks.len());
    for track in tracks {
        index.entry(normalize::track_signature(track)).or_insert(track);
    }
    index
}

/// Computes the add/remove plan that reconciles the two snapshots under the
/// configured direction and cleanup policy.
///
/// The report also carries the fuzzy matches backing add entries (so callers
/// can ask for confirmation), tracks skipped as ambiguous or confirmed
/// absent, and lookups that failed after retries. Deterministic for fixed
/// snapshots and options regardless of worker completion order.
pub async fn compute_plan(
    spotify_tracks: &[Track],
    tidal_tracks: &[Track],
    opts: &SyncOptions,
    live: Option<&LiveSearch>,
) -> Result<DiffReport, SyncError> {
    validate_options(opts)?;

    let mut report = DiffReport::default();

    if opts.direction.includes_spotify_to_tidal() {
        plan_direction(
            spotify_tracks,
            tidal_tracks,
            Service::Tidal,
            opts,
            live,
            &mut report,
        )
        .await?;
    }

    if opts.direction.includes_tidal_to_spotify() {
        plan_direction(
            tidal_tracks,
            spotify_tracks,
            Service::Spotify,
            opts,
            live,
            &mut report,
        )
        .await?;
    }

    Ok(report)
}

async fn plan_direction(
    source: &[Track],
    destination: &[Track],
    destination_service: Service,
    opts: &SyncOptions,
    live: Option<&LiveSearch>,
    report: &mut DiffReport,
) -> Result<(), SyncError> {
    let destination_index = signature_index(destination);

    // Pass 1: exact signatures. Duplicate source signatures collapse to the
    // first occurrence so one logical song is never added twice.
    let mut unresolved: Vec<&Track> = Vec::new();
    let mut seen_signatures: HashSet<String> = HashSet::new();
    for track in source {
        let sig = normalize::track_signature(track);
        if !seen_signatures.insert(sig.clone()) {
            continue;
        }
        if destination_index.contains_key(&sig) {
            report.matched.exact += 1;
        } else {
            unresolved.push(track);
        }
    }

    // Pass 2: fuzzy match against the destination snapshot. A hit means the
    // song is already present under different formatting - no action.
    let mut missing: Vec<Track> = Vec::new();
    for track in unresolved {
        let result = matcher::match_track(track, destination, opts.threshold);
        match result.method {
            MatchMethod::ExactSignature | MatchMethod::Fuzzy => report.matched.fuzzy += 1,
            MatchMethod::Unmatched => missing.push(track.clone()),
        }
    }

    // Pass 3: live confirmation on the destination service. Resolved tracks
    // become adds carrying the destination-side record; the rest are either
    // confirmed absent or errored.
    let mut adds: Vec<Track> = Vec::new();
    match live {
        Some(live) => {
            let outcomes = pool::resolve_missing(
                live.client_for(destination_service),
                missing.clone(),
                opts.threshold,
                opts.workers,
                live.progress.clone(),
            )
            .await?;

            let mut added_ids: HashSet<String> = HashSet::new();
            for track in &missing {
                match outcomes.get(&track.source_id) {
                    Some(pool::SearchOutcome::Matched(result)) => {
                        let Some(candidate) = result.candidate.clone() else {
                            continue;
                        };
                        // Two source tracks can resolve to the same
                        // destination record; add it once.
                        if !added_ids.insert(candidate.source_id.clone()) {
                            continue;
                        }
                        if result.method == MatchMethod::Fuzzy {
                            report.fuzzy_adds.push(result.clone());
                        }
                        adds.push(candidate);
                    }
                    Some(pool::SearchOutcome::Unmatched(result)) => {
                        report.ambiguous.push(result.clone());
                    }
                    Some(pool::SearchOutcome::Failed(reason)) => {
                        report.failed_searches.push(SearchFailure {
                            track: track.clone(),
                            reason: reason.clone(),
                        });
                    }
                    None => {
                        report.failed_searches.push(SearchFailure {
                            track: track.clone(),
                            reason: "no search outcome recorded".to_string(),
                        });
                    }
                }
            }
        }
        // Offline diff: adds keep the source-side records.
        None => adds = missing,
    }

    // Cleanup: destination tracks without any source counterpart are
    // scheduled for removal. Signature first, fuzzy second, so cosmetic
    // differences never cause a removal.
    let mut removes: Vec<Track> = Vec::new();
    if opts.cleanup {
        let source_index = signature_index(source);
        let mut seen_ids: HashSet<&str> = HashSet::new();
        for track in destination {
            if !seen_ids.insert(track.source_id.as_str()) {
                continue;
            }
            if source_index.contains_key(&normalize::track_signature(track)) {
                continue;
            }
            let result = matcher::match_track(track, source, opts.threshold);
            if result.method == MatchMethod::Unmatched {
                removes.push(track.clone());
            }
        }
    }

    match destination_service {
        Service::Spotify => {
            report.plan.add_to_spotify.extend(adds);
            report.plan.remove_from_spotify.extend(removes);
        }
        Service::Tidal => {
            report.plan.add_to_tidal.extend(adds);
            report.plan.remove_from_tidal.extend(removes);
        }
    }

    Ok(())
}
