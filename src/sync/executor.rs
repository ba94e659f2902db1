//! Applies a sync plan against the services' mutation APIs.
//!
//! Partial-failure tolerant: every entry is attempted with bounded retry,
//! failures are recorded with their reason, and the run continues to the
//! next entry. The summary distinguishes what was added, removed and failed
//! per service.

use crate::{
    config,
    sync::ServiceClient,
    types::{FailedOp, Playlist, SyncAction, SyncPlan, SyncSummary, Track},
    utils,
};

/// Executes the plan: adds and removals for Spotify, then for Tidal.
/// Individual failures never abort the run.
pub async fn execute(
    plan: &SyncPlan,
    spotify: &dyn ServiceClient,
    tidal: &dyn ServiceClient,
    spotify_playlist: &Playlist,
    tidal_playlist: &Playlist,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    summary.added_to_spotify = apply(
        spotify,
        spotify_playlist,
        &plan.add_to_spotify,
        SyncAction::Add,
        &mut summary.failed,
    )
    .await;
    summary.removed_from_spotify = apply(
        spotify,
        spotify_playlist,
        &plan.remove_from_spotify,
        SyncAction::Remove,
        &mut summary.failed,
    )
    .await;

    summary.added_to_tidal = apply(
        tidal,
        tidal_playlist,
        &plan.add_to_tidal,
        SyncAction::Add,
        &mut summary.failed,
    )
    .await;
    summary.removed_from_tidal = apply(
        tidal,
        tidal_playlist,
        &plan.remove_from_tidal,
        SyncAction::Remove,
        &mut summary.failed,
    )
    .await;

    summary
}

async fn apply(
    client: &dyn ServiceClient,
    playlist: &Playlist,
    tracks: &[Track],
    action: SyncAction,
    failed: &mut Vec<FailedOp>,
) -> usize {
    let service = client.service();
    let mut applied = 0usize;

    for track in tracks {
        // An add entry that was never resolved against this service carries
        // no usable id here; record it instead of issuing a doomed call.
        if track.origin != service {
            failed.push(FailedOp {
                track: track.clone(),
                action,
                service,
                reason: format!("track was not resolved on {}", service),
            });
            continue;
        }

        let attempt = utils::retry_with_backoff(config::RETRY_MAX_ATTEMPTS, || async {
            match action {
                SyncAction::Add => client.add_track(playlist, track).await,
                SyncAction::Remove => client.remove_track(playlist, track).await,
            }
        })
        .await;

        match attempt {
            Ok(()) => applied += 1,
            Err(e) => failed.push(FailedOp {
                track: track.clone(),
                action,
                service,
                reason: e.to_string(),
            }),
        }
    }

    applied
}
