//! # Playlist Reconciliation Engine
//!
//! This module implements the core of the application: deciding which tracks
//! on Spotify and Tidal are "the same song" despite differing metadata
//! formatting, and computing the minimal set of add/remove operations that
//! brings the configured playlists into sync.
//!
//! ## Overview
//!
//! There is no shared track identifier between streaming services, so track
//! identity is resolved with a two-pass strategy:
//!
//! 1. **Exact pass** - a canonical signature ([`normalize`]) is computed for
//!    every track on both sides. Tracks whose signatures collide are the same
//!    song, with confidence 1.0.
//! 2. **Fuzzy pass** - tracks without a signature match are scored against a
//!    bounded candidate set ([`matcher`]), first against the other side's
//!    snapshot and then, for tracks still unresolved, against a live search
//!    on the destination service executed by a bounded worker pool
//!    ([`pool`]).
//!
//! The [`diff`] module combines both passes into a [`SyncPlan`] and the
//! [`executor`] module applies the plan against the services' mutation APIs,
//! tolerating individual failures.
//!
//! ```text
//! Snapshots (both services)
//!          ↓
//! Diff Engine (exact signature pass)
//!          ↓ unresolved tracks
//! Search Worker Pool (fuzzy pass, concurrent)
//!          ↓ resolved / unresolved partition
//! Sync Executor → result summary
//! ```
//!
//! ## Determinism and idempotence
//!
//! No match state is persisted between runs; every run recomputes matches
//! from fresh snapshots. A track already present in the destination (by
//! signature or fuzzy equivalence) is classified as matched and never
//! re-added, which makes repeated runs converge. Plan contents are
//! deterministic for fixed snapshots and threshold: worker results are
//! reduced through a track-keyed map in snapshot order, never in completion
//! order.
//!
//! ## Concurrency model
//!
//! Only the live search confirmations run concurrently. Snapshots, signature
//! indexes and candidate lists are read-only once built; each worker writes
//! its outcome into its own slot of the result map, so no locking is needed
//! beyond the pool's work queue. If a worker dies the whole diff is aborted -
//! a partially-searched plan is never handed to the executor.

pub mod diff;
pub mod executor;
pub mod matcher;
pub mod normalize;
pub mod pool;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    Res,
    types::{Playlist, Service, SyncOptions, Track},
};

/// Errors that abort a sync run. Per-track failures are not represented
/// here; they are carried inside reports and summaries so one bad track
/// never stops the batch.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to fetch playlist from {service}: {reason}")]
    Fetch { service: Service, reason: String },

    #[error("search worker failed: {0}")]
    Worker(String),
}

/// Already-authenticated capabilities of one streaming service, as consumed
/// by the engine. The engine holds no credential state; implementations wrap
/// their service's API and token management.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    fn service(&self) -> Service;

    /// Reads the full current track list of a playlist, paging through all
    /// results.
    async fn fetch_playlist_tracks(&self, playlist: &Playlist) -> Res<Vec<Track>>;

    /// Runs a track search and returns a small candidate list in the
    /// service's own relevance order.
    async fn search_tracks(&self, query: &str) -> Res<Vec<Track>>;

    async fn add_track(&self, playlist: &Playlist, track: &Track) -> Res<()>;

    async fn remove_track(&self, playlist: &Playlist, track: &Track) -> Res<()>;
}

/// Rejects invalid engine configuration before any fetch occurs.
pub fn validate_options(opts: &SyncOptions) -> Result<(), SyncError> {
    if !(0.0..=1.0).contains(&opts.threshold) || !opts.threshold.is_finite() {
        return Err(SyncError::Config(format!(
            "match threshold must be within [0.0, 1.0], got {}",
            opts.threshold
        )));
    }
    if opts.workers == 0 {
        return Err(SyncError::Config(
            "worker count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
