//! # Tidal Integration Module
//!
//! Interface to the Tidal v1 API: OAuth 2.0 device-code authentication and
//! the playlist, favorites and search operations the sync engine consumes.
//!
//! - [`auth`] - device-code flow: the user confirms the login in a browser
//!   while the CLI polls the token endpoint.
//! - [`client`] - [`TidalClient`], the authenticated API client. Resolves the
//!   session (user id, country code) lazily, pages through playlists and
//!   favorites, and performs the ETag-guarded playlist mutations the API
//!   requires.

pub mod auth;
pub mod client;

pub use client::TidalClient;
