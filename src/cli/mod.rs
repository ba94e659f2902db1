//! # CLI Module
//!
//! User-facing command implementations for syncli. Each command coordinates
//! the service clients, the token management layer and the reconciliation
//! engine, and owns all console interaction (spinners, progress bars,
//! confirmation prompts, result tables).
//!
//! ## Commands
//!
//! - [`auth`] - runs the OAuth flow for one service and caches the token
//!   (PKCE with a local callback server for Spotify, device-code for Tidal)
//! - [`playlists`] - lists the user's playlists on one service
//! - [`sync`] - the full pipeline: fetch both snapshots, compute the plan,
//!   confirm fuzzy matches and removals unless `--auto`, execute, and print
//!   the run summary
//!
//! The engine itself never prints; everything user-visible is rendered here
//! from the data shapes the engine returns.

mod auth;
mod playlists;
mod sync;

pub use auth::auth;
pub use playlists::playlists;
pub use sync::{SyncParams, sync};
